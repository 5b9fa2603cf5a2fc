//! Fractional-indexing sort keys for ordered sibling lists.
//!
//! Reordering an outline item, dropping a card between two others, and tab
//! ordering all need a key strictly between two neighbors without
//! renumbering the rest of the list.

use rand::Rng;

/// A sort key strictly between `prev` and `next`.
///
/// With both bounds, the result is uniform over the middle third of the gap:
/// leaving a third of the gap untouched on each side slows floating-point
/// precision exhaustion under repeated same-spot insertion. With one bound,
/// the result lands a random 0.25..0.75 beyond it; with neither, beyond 0.
///
/// The caller guarantees `prev < next` when both are given; ordering is
/// undefined otherwise. Unbounded repeated insertion at one spot still
/// exhausts f64 precision eventually; lists that churn forever need a
/// periodic renumbering pass, which is out of scope here.
pub fn insert_seq(prev: Option<f64>, next: Option<f64>) -> f64 {
    let mut rng = rand::rng();
    match (prev, next) {
        (Some(prev), Some(next)) => {
            let third = (next - prev) / 3.0;
            rng.random_range(prev + third..=next - third)
        }
        (None, Some(next)) => next - rng.random_range(0.25..0.75),
        (prev, None) => prev.unwrap_or(0.0) + rng.random_range(0.25..0.75),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_keys_stay_strictly_inside() {
        for _ in 0..10_000 {
            let key = insert_seq(Some(1.0), Some(2.0));
            assert!(1.0 < key && key < 2.0, "key {key} escaped (1.0, 2.0)");
        }
    }

    #[test]
    fn bounded_keys_stay_in_the_middle_third() {
        for _ in 0..1_000 {
            let key = insert_seq(Some(0.0), Some(3.0));
            assert!((1.0..=2.0).contains(&key), "key {key} outside middle third");
        }
    }

    #[test]
    fn random_bounds_hold() {
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let prev: f64 = rng.random_range(-1_000.0..1_000.0);
            let next = prev + rng.random_range(0.001..100.0);
            let key = insert_seq(Some(prev), Some(next));
            assert!(prev < key && key < next, "{prev} < {key} < {next} violated");
        }
    }

    #[test]
    fn next_only_sorts_before_next() {
        for _ in 0..1_000 {
            let key = insert_seq(None, Some(5.0));
            assert!(key < 5.0);
            assert!(key > 4.0);
        }
    }

    #[test]
    fn prev_only_sorts_after_prev() {
        for _ in 0..1_000 {
            let key = insert_seq(Some(5.0), None);
            assert!(key > 5.0);
            assert!(key < 6.0);
        }
    }

    #[test]
    fn no_bounds_starts_above_zero() {
        for _ in 0..1_000 {
            let key = insert_seq(None, None);
            assert!(key > 0.0 && key < 1.0);
        }
    }

    #[test]
    fn repeated_insertion_preserves_order() {
        // simulate always inserting between the first two entries; the gap
        // shrinks by a third each round, so keep the depth well inside f64
        // precision
        let mut keys = vec![insert_seq(None, None)];
        keys.push(insert_seq(Some(keys[0]), None));
        for _ in 0..16 {
            let key = insert_seq(Some(keys[0]), Some(keys[1]));
            assert!(keys[0] < key && key < keys[1]);
            keys.insert(1, key);
        }
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
