//! # Tracker Common Library
//!
//! Shared code for the Target Tracker service:
//! - Error taxonomy
//! - Entity enums (target status, source type, indicator type)
//! - Database schema and models
//! - Write-time validation helpers

pub mod db;
pub mod error;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
pub use types::{IndicatorType, SourceType, TargetStatus};
