//! Automatic transaction matching.
//!
//! Pairs unmatched statement transactions with unmatched ledger lines by
//! exact signed amount and a configurable date tolerance, optionally using
//! description similarity to break ties. The pass is deterministic: the same
//! inputs always produce the same pairs.

pub mod matcher;
pub mod similarity;
pub mod types;

pub use matcher::auto_match;
pub use similarity::description_similarity;
pub use types::{CandidateView, MatchParams, MatchPair, TransactionView};
