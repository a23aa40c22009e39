//! # AHP Common Library
//!
//! Shared code for the AHP survey aggregation workspace:
//! - Domain models (indicators, judgments, submissions, results)
//! - Event types (AhpEvent enum) and the EventBus
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use models::{Category, Indicator, Iteration, Judgment, Submission, WeightMap};
