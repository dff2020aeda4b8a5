//! Error types for simulation construction and execution

use hecs::Entity;
use thiserror::Error;

/// Errors raised while building or running a simulation.
///
/// Configuration errors are raised before any simulation state exists.
/// The remaining variants are invariant violations and abort the run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{style} is not a recognized environment, available environments are: {available}")]
    UnknownEnvironment { style: String, available: String },

    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("entity {entity:?} is not in the living set")]
    NotLiving { entity: Entity },

    #[error("entity {entity:?} is not a complete organism")]
    Detached { entity: Entity },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
