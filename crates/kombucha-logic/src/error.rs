//! Engine error taxonomy.
//!
//! All engine errors are local input-validation failures. A call that
//! returns one of these has not touched the engine state.

use crate::params::ParamError;

/// Errors returned by [`SimulationEngine`](crate::engine::SimulationEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Step count was not a positive integer.
    InvalidArgument { reason: String },
    /// Contaminant kind is not in the parameter catalogue.
    UnknownContaminant { kind: String },
    /// Construction was attempted with a parameter set that fails validation.
    InvalidParameters(Vec<ParamError>),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidArgument { reason } => write!(f, "Invalid argument: {}", reason),
            EngineError::UnknownContaminant { kind } => {
                write!(f, "Unknown contaminant kind '{}'", kind)
            }
            EngineError::InvalidParameters(errors) => {
                write!(f, "Invalid parameters: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for EngineError {}
