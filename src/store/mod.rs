//! Shared mutable state: durable correlation index and notice suppression.

pub mod antispam;
pub mod correlation;

pub use antispam::AntiSpamSet;
pub use correlation::CorrelationStore;
