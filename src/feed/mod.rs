//! Home feed assembly: per-section fallback chains and the concurrent aggregator.

pub mod aggregator;
pub mod chain;

pub use aggregator::FeedAggregator;
pub use chain::{ChainStep, FallbackOrchestrator, Section};
