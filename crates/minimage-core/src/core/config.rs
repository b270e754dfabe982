use serde::{Deserialize, Serialize};

/// Default number of (i, j) pairs above which pairwise routines switch to
/// chunked row processing.
pub const DEFAULT_PAIR_THRESHOLD: usize = 1_000_000;

/// Memory/throughput trade-off for the pairwise geometry routines.
///
/// Routines that conceptually form an n x m intermediate (the minimum-image
/// displacement engine in particular) process their row loop in chunks of
/// `pair_threshold / m` rows once `n * m` exceeds `pair_threshold`, bounding
/// peak memory at the cost of some throughput. The threshold is deliberately
/// a per-call parameter rather than process-wide state so that concurrent
/// callers with different memory budgets do not interfere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub pair_threshold: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pair_threshold: DEFAULT_PAIR_THRESHOLD,
        }
    }
}

impl BatchConfig {
    /// Rows per chunk for an n x m pairwise pass. Always at least one row.
    pub(crate) fn rows_per_chunk(&self, m: usize) -> usize {
        if m == 0 {
            return 1;
        }
        (self.pair_threshold / m).max(1)
    }
}
