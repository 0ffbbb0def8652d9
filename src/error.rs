use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::session::LifecycleState;

#[derive(Error, Debug)]
pub enum BastionError {
    // Selector / precondition errors
    #[error("{0}")]
    Precondition(String),

    #[error("Compartment not found: {0}")]
    CompartmentNotFound(String),

    #[error("Bastion '{name}' not found in compartment '{compartment}'")]
    BastionNotFound { name: String, compartment: String },

    // Gateway errors
    #[error("OCI CLI not found. Install from: https://docs.oracle.com/en-us/iaas/Content/API/SDKDocs/cliinstall.htm")]
    OciCliNotFound,

    #[error("{operation} failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    // Session errors
    #[error("Session {session_id} targets a {kind} resource; only MANAGED_SSH sessions are supported by this tool")]
    UnsupportedTargetKind { session_id: String, kind: String },

    #[error("Unrecognized session lifecycle state: {0}")]
    UnknownLifecycleState(String),

    #[error("Session {session_id} is no longer usable. Current state is: {state}")]
    TerminalUnusable {
        session_id: String,
        state: LifecycleState,
    },

    #[error("Session {session_id} did not become ACTIVE within {}s after {polls} polls (last state: {last_state})", .waited.as_secs())]
    Timeout {
        session_id: String,
        last_state: LifecycleState,
        polls: u32,
        waited: Duration,
    },

    // Key file errors
    #[error("SSH key file {}: {message}", .path.display())]
    KeyFile { path: PathBuf, message: String },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prerequisites not met: {0}")]
    Prerequisites(String),

    // File/IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BastionError {
    pub fn gateway(operation: &'static str, err: impl std::fmt::Display) -> Self {
        BastionError::Gateway {
            operation,
            message: err.to_string(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        BastionError::Precondition(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BastionError::Precondition(_)
            | BastionError::CompartmentNotFound(_)
            | BastionError::BastionNotFound { .. }
            | BastionError::KeyFile { .. } => 2,
            BastionError::TerminalUnusable { .. } => 3,
            BastionError::Timeout { .. } => 4,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BastionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_outcome() {
        let terminal = BastionError::TerminalUnusable {
            session_id: "sess-2".to_string(),
            state: LifecycleState::Deleted,
        };
        let timeout = BastionError::Timeout {
            session_id: "sess-3".to_string(),
            last_state: LifecycleState::Creating,
            polls: 3,
            waited: Duration::from_secs(20),
        };

        assert_eq!(BastionError::precondition("missing").exit_code(), 2);
        assert_eq!(terminal.exit_code(), 3);
        assert_eq!(timeout.exit_code(), 4);
        assert_eq!(BastionError::gateway("get session", "boom").exit_code(), 1);
    }

    #[test]
    fn test_messages_name_operation_and_state() {
        let err = BastionError::gateway("CreateSession", "409 Conflict");
        assert_eq!(err.to_string(), "CreateSession failed: 409 Conflict");

        let err = BastionError::TerminalUnusable {
            session_id: "sess-2".to_string(),
            state: LifecycleState::Deleted,
        };
        assert!(err.to_string().contains("sess-2"));
        assert!(err.to_string().contains("DELETED"));
    }
}
