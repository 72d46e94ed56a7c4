//! Sift Core - the telemetry record model.
//!
//! This crate defines the tree-shaped data structure the rule engine
//! operates over:
//!
//! - [`Reading`]: one telemetry record (asset name + datapoints + timestamp)
//! - [`DataPoint`]: one named value within a reading
//! - [`Value`]: scalar, array, or nested container value
//!
//! Readings cross the host boundary as JSON; the conversion rules live
//! on the types themselves ([`Reading::from_json`], [`Reading::to_json`]).

pub mod reading;
pub mod value;

pub use reading::{DataPoint, Reading};
pub use value::{Image, Value};

use thiserror::Error;

/// Result type for record model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while converting readings to or from JSON.
#[derive(Debug, Error)]
pub enum Error {
    /// A reading document is missing a required field.
    #[error("Reading is missing the '{0}' field")]
    MissingField(&'static str),

    /// A field holds a JSON value of the wrong shape.
    #[error("Field '{field}' has unexpected shape: {reason}")]
    BadField {
        /// Name of the offending field.
        field: String,
        /// Description of what was expected.
        reason: String,
    },

    /// A datapoint value could not be mapped onto the value model.
    #[error("Unsupported value for datapoint '{name}': {reason}")]
    UnsupportedValue {
        /// Name of the offending datapoint.
        name: String,
        /// Description of the unsupported shape.
        reason: String,
    },

    /// A timestamp string failed to parse.
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// JSON syntax error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
