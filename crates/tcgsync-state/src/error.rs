//! Error types for the state layer.

use crate::BENCH_SIZE;

/// Errors raised while addressing or mutating a match.
///
/// Every variant is scoped to the request that caused it: the match is
/// left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A bench index outside `0..BENCH_SIZE`.
    #[error("bench index {0} is out of range (0..{BENCH_SIZE})")]
    BenchIndexOutOfRange(i64),
}
