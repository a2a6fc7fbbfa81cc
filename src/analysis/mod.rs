//! Line classification and failure aggregation.

pub mod aggregator;
pub mod classifier;

pub use aggregator::Aggregation;
pub use classifier::{classify, LineKind};
