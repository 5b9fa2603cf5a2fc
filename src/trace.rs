//! Structured dispatch diagnostics.
//!
//! Every dispatch emits a begin record (kind, target node, the ordered
//! behavior list) and one record per behavior turn, including the entries
//! that were *skipped* after a terminating status — knowing what would have
//! run next is most of the value when debugging precedence.

use regex::Regex;
use thiserror::Error;

use crate::behavior::DispatchStatus;
use crate::event::EventKind;
use crate::node::NodeId;

/// Outcome of one behavior's turn as seen by the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStatus {
    /// The handler ran and returned this status.
    Status(DispatchStatus),
    /// Not invoked: an earlier entry already terminated the walk.
    Skipped,
    /// The handler panicked; dispatch treated it as ignore.
    Panicked,
}

impl std::fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceStatus::Status(status) => status.fmt(f),
            TraceStatus::Skipped => f.write_str("skipped"),
            TraceStatus::Panicked => f.write_str("panicked"),
        }
    }
}

/// One behavior turn within a dispatch.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub kind: EventKind,
    pub node: NodeId,
    pub behavior: &'static str,
    /// Whether this was the global-override turn.
    pub priority: bool,
    pub status: TraceStatus,
    /// Verbosity required for this record to surface.
    pub level: u8,
}

/// Receives dispatch diagnostics. The dispatcher owns one sink; production
/// uses [`LogTrace`], tests a recording sink.
pub trait TraceSink {
    /// A dispatch is starting; `behaviors` is the ordered walk list.
    fn begin(&mut self, kind: EventKind, node: NodeId, behaviors: &[&'static str]) {
        let _ = (kind, node, behaviors);
    }

    fn record(&mut self, record: &TraceRecord);
}

/// A sink that drops everything. The default until the host configures one.
#[derive(Debug, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn record(&mut self, _record: &TraceRecord) {}
}

#[derive(Debug, Error)]
pub enum TraceConfigError {
    #[error("invalid trace filter: {0}")]
    InvalidFilter(#[from] regex::Error),
}

/// Host-supplied trace settings, typically parsed from launch parameters.
#[derive(Debug, Clone, Default)]
pub struct TraceConfig {
    /// Verbosity; records above this level are dropped. 0 disables all.
    pub level: u8,
    /// Optional regex matched against `kind behavior` of each record.
    pub filter: Option<String>,
}

impl TraceConfig {
    pub fn build(self) -> Result<LogTrace, TraceConfigError> {
        let filter = self.filter.as_deref().map(Regex::new).transpose()?;
        Ok(LogTrace {
            level: self.level,
            filter,
        })
    }
}

/// Forwards matching records to the `log` facade at trace level.
#[derive(Debug)]
pub struct LogTrace {
    level: u8,
    filter: Option<Regex>,
}

impl LogTrace {
    fn passes(&self, level: u8, line: &str) -> bool {
        level <= self.level
            && self
                .filter
                .as_ref()
                .is_none_or(|filter| filter.is_match(line))
    }
}

impl TraceSink for LogTrace {
    fn begin(&mut self, kind: EventKind, node: NodeId, behaviors: &[&'static str]) {
        let line = format!("dispatch {kind} -> {node:?} {behaviors:?}");
        if self.passes(kind.trace_level(), &line) {
            log::trace!("{line}");
        }
    }

    fn record(&mut self, record: &TraceRecord) {
        let priority = if record.priority { " PRIORITY" } else { "" };
        let line = format!(
            "  {} {}{priority} ({})",
            record.kind, record.behavior, record.status
        );
        if self.passes(record.level, &line) {
            log::trace!("{line}");
        }
    }
}

/// Keeps every record in memory. Used by the crate's own tests and handy
/// for inspecting precedence from host-side debug tooling.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    pub records: Vec<TraceRecord>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses_for(&self, kind: EventKind) -> Vec<(&'static str, TraceStatus)> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| (r.behavior, r.status))
            .collect()
    }
}

impl TraceSink for RecordingTrace {
    fn record(&mut self, record: &TraceRecord) {
        self.records.push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_bad_regex() {
        let config = TraceConfig {
            level: 3,
            filter: Some("[unclosed".to_string()),
        };
        assert!(matches!(
            config.build(),
            Err(TraceConfigError::InvalidFilter(_))
        ));
    }

    #[test]
    fn filter_gates_by_level_and_pattern() {
        let trace = TraceConfig {
            level: 2,
            filter: Some("KeyDown".to_string()),
        }
        .build()
        .unwrap();
        assert!(trace.passes(1, "dispatch KeyDown -> root"));
        assert!(!trace.passes(3, "dispatch KeyDown -> root"));
        assert!(!trace.passes(1, "dispatch MouseUp -> root"));
    }
}
