use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::BastionError;

/// Remote-authoritative lifecycle state of a bastion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Creating,
    Active,
    Deleting,
    Deleted,
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Creating => "CREATING",
            LifecycleState::Active => "ACTIVE",
            LifecycleState::Deleting => "DELETING",
            LifecycleState::Deleted => "DELETED",
            LifecycleState::Failed => "FAILED",
        }
    }

    /// Polling stops once a session reaches one of these states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Active | LifecycleState::Deleted | LifecycleState::Failed
        )
    }

    pub fn is_usable(&self) -> bool {
        *self == LifecycleState::Active
    }
}

impl FromStr for LifecycleState {
    type Err = BastionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATING" => Ok(LifecycleState::Creating),
            "ACTIVE" => Ok(LifecycleState::Active),
            "DELETING" => Ok(LifecycleState::Deleting),
            "DELETED" => Ok(LifecycleState::Deleted),
            "FAILED" => Ok(LifecycleState::Failed),
            other => Err(BastionError::UnknownLifecycleState(other.to_string())),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a managed SSH session, as resolved by the bastion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSshTarget {
    pub private_ip: String,
    pub os_user: String,
    pub port: u16,
    pub display_name: Option<String>,
    pub resource_id: Option<String>,
}

/// What a session connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResource {
    ManagedSsh(ManagedSshTarget),
    /// Any other session type (port forwarding, dynamic port forwarding, ...)
    Unsupported { kind: String },
}

/// A session as reported by the gateway, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub display_name: Option<String>,
    pub lifecycle_state: String,
    /// Absent while the service is still resolving the target.
    pub target: Option<TargetResource>,
    pub time_created: Option<DateTime<Utc>>,
    pub ttl_seconds: Option<u32>,
}

/// Result of a single session read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: String,
    pub state: LifecycleState,
    pub target: Option<ManagedSshTarget>,
}

/// A session observed in the ACTIVE state with a resolved target.
///
/// Only the controller constructs this, so anything taking an
/// `ActiveSession` can read the target without re-checking the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    id: String,
    target: ManagedSshTarget,
}

impl ActiveSession {
    pub(crate) fn new(id: String, target: ManagedSshTarget) -> Self {
        Self { id, target }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &ManagedSshTarget {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_states() {
        for state in [
            LifecycleState::Creating,
            LifecycleState::Active,
            LifecycleState::Deleting,
            LifecycleState::Deleted,
            LifecycleState::Failed,
        ] {
            assert_eq!(state.as_str().parse::<LifecycleState>().unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let err = "UPDATING".parse::<LifecycleState>().unwrap_err();
        assert!(matches!(err, BastionError::UnknownLifecycleState(ref s) if s == "UPDATING"));
        assert!("active".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LifecycleState::Creating.is_terminal());
        assert!(!LifecycleState::Deleting.is_terminal());
        assert!(LifecycleState::Active.is_terminal());
        assert!(LifecycleState::Deleted.is_terminal());
        assert!(LifecycleState::Failed.is_terminal());

        assert!(LifecycleState::Active.is_usable());
        assert!(!LifecycleState::Deleted.is_usable());
    }
}
