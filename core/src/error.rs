use crate::types::{EngineId, Seed};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Configuration error for '{key}': {reason}")]
    Configuration { key: String, reason: String },

    #[error("Unrecognized seed policy '{name}'. Known policies are: {known}")]
    UnknownPolicy { name: String, known: String },

    #[error("Engine '{engine}' already registered")]
    AlreadyRegistered { engine: EngineId },

    #[error("Engine '{engine}' has not been registered")]
    NotRegistered { engine: EngineId },

    #[error("Cannot {operation} during {phase}")]
    InvalidLifecyclePhase { operation: String, phase: String },

    #[error("Seed {seed} already used by '{existing}', may not be reused by '{requested}'")]
    DuplicateSeed {
        seed:      Seed,
        existing:  EngineId,
        requested: EngineId,
    },

    #[error("No seed configuration found for engine '{engine}'")]
    MissingMapping { engine: EngineId },

    #[error(
        "Policy '{policy}': seed {seed} for engine '{engine}' has offset {offset}, \
         allowed offsets are 0..{max} (maxUniqueEngines)"
    )]
    OutOfRange {
        policy: &'static str,
        engine: EngineId,
        seed:   Seed,
        offset: i128,
        max:    Seed,
    },

    #[error("Invalid unit-of-work context for engine '{engine}': {reason}")]
    InvalidContext { engine: EngineId, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SeedError {
    pub(crate) fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration { key: key.into(), reason: reason.into() }
    }
}

pub type SeedResult<T> = Result<T, SeedError>;
