use std::fmt;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

/// Marker of how much of the replicated operation log a node holds.
///
/// Ordering is lexicographic: first by the epoch of the primary that wrote
/// the entry, then by the sequence number within that epoch. Freshness
/// comparisons between members rely solely on this total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogPosition {
    pub term: u64,
    pub index: u64,
}

impl LogPosition {
    pub const ZERO: LogPosition = LogPosition { term: 0, index: 0 };

    pub fn new(
        term: u64,
        index: u64,
    ) -> Self {
        Self { term, index }
    }
}

impl fmt::Display for LogPosition {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.term, self.index)
    }
}

/// Read-only view onto the local operation log.
///
/// Within one election attempt repeated calls must return non-decreasing
/// positions; the log engine behind it owns everything else.
#[cfg_attr(test, automock)]
pub trait LogOracle: Send + Sync + 'static {
    /// Current local log head.
    fn live_position(&self) -> LogPosition;
}
