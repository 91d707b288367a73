//! Error types for plant simulation.

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Simulation has no external input data")]
    NoExternalSignals,

    #[error("Model id '{id}' is not unique in the plant")]
    DuplicateModelId { id: String },

    #[error("Unknown model id '{id}'")]
    UnknownModelId { id: String },

    #[error("PID controller '{model}' has no setpoint value and no upstream controller")]
    MissingSetpoint { model: String },

    #[error("Failed to initialize PID controller '{model}'")]
    UninitializedController { model: String },

    #[error("Initialization value missing for signal '{signal}' needed by model '{model}'")]
    MissingInitValue { model: String, signal: String },

    #[error("Steady-state initialization failed: {what}")]
    InitFailed { what: String },

    #[error("Unsupported plant topology: {what}")]
    UnsupportedTopology { what: String },

    #[error("Graph analysis failed: {0}")]
    Graph(#[from] pl_graph::GraphError),

    #[error("Model configuration error: {0}")]
    Model(#[from] pl_models::ModelError),

    #[error("Signal store error: {0}")]
    Store(#[from] pl_core::CoreError),
}
