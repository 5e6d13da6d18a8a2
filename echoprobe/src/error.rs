//! Error types for EchoProbe

use crate::world::EmitterId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoProbeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Emitter {0} not found")]
    UnknownEmitter(EmitterId),

    #[error("Emitter limit reached (max {0})")]
    EmitterLimit(usize),

    #[error("Audio backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, EchoProbeError>;
