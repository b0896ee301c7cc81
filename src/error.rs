use std::fmt;

use crate::memory::block::ProcessId;

/// Recoverable failures of a simulation command. None of them leave the
/// session in a modified state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No free block can hold the request.
    InsufficientMemory { requested: usize, largest_free: usize },
    /// The process holds no block.
    ProcessNotFound(ProcessId),
    /// Rejected before touching any state.
    InvalidRequest(String),
}

impl SimError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SimError::InvalidRequest(reason.into())
    }

    /// Stable machine-readable name, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::InsufficientMemory { .. } => "insufficient_memory",
            SimError::ProcessNotFound(_) => "process_not_found",
            SimError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InsufficientMemory {
                requested,
                largest_free,
            } => write!(
                f,
                "Cannot allocate {}KB - insufficient memory (largest free block {}KB)",
                requested, largest_free
            ),
            SimError::ProcessNotFound(pid) => write!(f, "Process {} not found", pid),
            SimError::InvalidRequest(reason) => write!(f, "Invalid request: {}", reason),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
