//! Tests for the action side channel: aggregation over the walk order,
//! delegate redirection, and type-based behavior lookup.

use eventnav::kurbo::Rect;
use eventnav::{
    Action, ActionGroup, Behavior, Dispatcher, NodeId, NodeTree, Platform, Shortcut,
};

/// Offers card-level actions for whatever node it is asked about.
struct CardActions;

impl Behavior for CardActions {
    fn actions(&self, _tree: &NodeTree, _node: NodeId) -> Vec<ActionGroup> {
        vec![ActionGroup {
            label: "Card".into(),
            actions: vec![
                Action::new("Duplicate").with_hotkey(Shortcut::MetaJ),
                Action::new("Delete"),
            ],
        }]
    }
}

/// Sits on a collapse handle and redirects actions to the handle's parent,
/// the card the handle belongs to.
struct HandleActions;

impl Behavior for HandleActions {
    fn actions(&self, _tree: &NodeTree, _node: NodeId) -> Vec<ActionGroup> {
        vec![ActionGroup {
            label: "Handle".into(),
            actions: vec![Action::new("Collapse")],
        }]
    }

    fn delegate(&self, tree: &NodeTree, node: NodeId) -> NodeId {
        tree.parent(node).unwrap_or(node)
    }
}

struct CanvasActions;

impl Behavior for CanvasActions {
    fn actions(&self, _tree: &NodeTree, _node: NodeId) -> Vec<ActionGroup> {
        vec![ActionGroup {
            label: "Canvas".into(),
            actions: vec![Action::new("Paste here").with_hotkey(Shortcut::MetaV)],
        }]
    }
}

#[test]
fn actions_aggregate_in_walk_order() {
    let mut nav = Dispatcher::new(Platform::Other);
    let root = nav.tree().root();
    nav.tree_mut().set_rect(root, Rect::new(0.0, 0.0, 800.0, 600.0));
    let card = nav.tree_mut().add_child(root);

    let card_b = nav.add_behavior(Box::new(CardActions));
    nav.tree_mut().add_local_behavior(card, card_b);
    let canvas_b = nav.add_behavior(Box::new(CanvasActions));
    nav.add_default_behavior(canvas_b);

    let groups = nav.actions_for(card);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["Card", "Canvas"]);

    let hotkey = groups[0].actions[0].hotkey;
    assert_eq!(hotkey, Some(Shortcut::MetaJ));
}

#[test]
fn delegate_redirects_but_grouping_stays_with_the_behavior() {
    let mut nav = Dispatcher::new(Platform::Other);
    let root = nav.tree().root();
    let card = nav.tree_mut().add_child(root);
    let handle = nav.tree_mut().add_child(card);

    let handle_b = nav.add_behavior(Box::new(HandleActions));
    nav.tree_mut().add_local_behavior(handle, handle_b);

    // asked about the handle, the group still appears; its delegate was the
    // card, which is where a host would anchor the menu
    let groups = nav.actions_for(handle);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "Handle");
    assert_eq!(groups[0].actions[0].label, "Collapse");
}

#[test]
fn find_behavior_walks_in_precedence_order() {
    let mut nav = Dispatcher::new(Platform::Other);
    let root = nav.tree().root();
    let card = nav.tree_mut().add_child(root);

    let card_b = nav.add_behavior(Box::new(CardActions));
    nav.tree_mut().add_local_behavior(card, card_b);
    let canvas_b = nav.add_behavior(Box::new(CanvasActions));
    nav.add_default_behavior(canvas_b);

    assert_eq!(nav.find_behavior::<CardActions>(card), Some(card_b));
    assert_eq!(nav.find_behavior::<CanvasActions>(card), Some(canvas_b));
    assert_eq!(nav.find_behavior::<HandleActions>(card), None);

    // root never had CardActions attached, locally or by inheritance
    assert_eq!(nav.find_behavior::<CardActions>(root), None);
}

#[test]
fn downcast_access_to_a_found_behavior() {
    struct Counter {
        count: u32,
    }

    impl Behavior for Counter {}

    let mut nav = Dispatcher::new(Platform::Other);
    let root = nav.tree().root();
    let id = nav.add_behavior(Box::new(Counter { count: 7 }));
    nav.tree_mut().add_local_behavior(root, id);

    let found = nav.find_behavior::<Counter>(root).unwrap();
    let count = nav.behaviors().with_downcast(found, |c: &mut Counter| {
        c.count += 1;
        c.count
    });
    assert_eq!(count, Some(8));
}
