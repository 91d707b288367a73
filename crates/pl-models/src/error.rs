//! Error types for model configuration.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model '{model}' is not simulatable: {reason}")]
    NotSimulatable { model: String, reason: String },

    #[error("Model '{model}' has an unresolved input at slot {slot}")]
    UnresolvedInput { model: String, slot: usize },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
