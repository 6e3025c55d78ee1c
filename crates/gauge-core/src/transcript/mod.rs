//! Session cost estimation from assistant transcripts.

pub mod estimator;
pub mod pricing;
pub mod types;

pub use estimator::estimate;
pub use pricing::{ModelPricing, pricing_for};
pub use types::CostEstimate;
