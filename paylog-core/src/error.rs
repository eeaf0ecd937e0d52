use thiserror::Error;

/// Unified error type for Paylog.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Port {0} is already in use")]
    PortConflict(u16),

    #[error("Supervisor error: {0}")]
    Supervisor(String),

    #[error("Log retrieval failed: {0}")]
    Retrieval(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl RecorderError {
    /// Map to a process exit code: 1 for configuration problems caught
    /// before any side effect, 2 for operational failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            RecorderError::Config(_) => 1,
            _ => 2,
        }
    }
}
