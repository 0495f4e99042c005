pub mod advisory;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod predictor;
pub mod presentation;
pub mod prompt;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use config::AdvisorConfig;
pub use context::FarmerInput;
pub use error::{AdvisorError, Result};
pub use pipeline::{Advisor, AdvisoryOutcome};
