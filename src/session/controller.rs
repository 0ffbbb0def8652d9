use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::model::{ActiveSession, LifecycleState, SessionInfo, TargetResource};
use crate::config::Verbosity;
use crate::oci::{CreateSessionRequest, SessionGateway};
use crate::{BastionError, Result};

/// Maximum lifetime requested for every session.
pub const SESSION_TTL_SECONDS: u32 = 1800;

/// Display name given to every session created by this tool.
pub const SESSION_DISPLAY_NAME: &str = "OCIBastionSession";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Bounds for [`SessionController::await_active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Wall-clock bound measured from the first poll.
    pub timeout: Duration,
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
            max_polls: None,
        }
    }
}

/// Parameters of a new managed SSH session.
#[derive(Debug, Clone)]
pub struct NewSession<'a> {
    pub bastion_id: &'a str,
    pub target_resource_id: &'a str,
    pub target_private_ip: &'a str,
    pub public_key: &'a str,
    pub ssh_user: &'a str,
    pub ssh_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwaitOutcome {
    Active(ActiveSession),
    /// The session reached DELETED or FAILED.
    Terminal { state: LifecycleState },
    TimedOut {
        last_state: LifecycleState,
        polls: u32,
        waited: Duration,
    },
}

impl AwaitOutcome {
    /// Converts the non-active outcomes into their errors.
    pub fn into_active(self, session_id: &str) -> Result<ActiveSession> {
        match self {
            AwaitOutcome::Active(session) => Ok(session),
            AwaitOutcome::Terminal { state } => Err(BastionError::TerminalUnusable {
                session_id: session_id.to_string(),
                state,
            }),
            AwaitOutcome::TimedOut {
                last_state,
                polls,
                waited,
            } => Err(BastionError::Timeout {
                session_id: session_id.to_string(),
                last_state,
                polls,
                waited,
            }),
        }
    }
}

/// Drives one session from creation (or an existing id) to a usable or
/// terminal state.
pub struct SessionController<'a, G: SessionGateway + ?Sized> {
    gateway: &'a G,
    verbosity: Verbosity,
}

impl<'a, G: SessionGateway + ?Sized> SessionController<'a, G> {
    pub fn new(gateway: &'a G, verbosity: Verbosity) -> Self {
        Self { gateway, verbosity }
    }

    /// Issue exactly one create request and return the new session id.
    /// Failures are never retried.
    pub async fn create_session(&self, new: &NewSession<'_>) -> Result<String> {
        if new.public_key.trim().is_empty() {
            return Err(BastionError::precondition("Public key material is empty"));
        }

        let request = CreateSessionRequest {
            bastion_id: new.bastion_id.to_string(),
            display_name: SESSION_DISPLAY_NAME.to_string(),
            ttl_seconds: SESSION_TTL_SECONDS,
            public_key: new.public_key.to_string(),
            target_resource_id: new.target_resource_id.to_string(),
            target_private_ip: new.target_private_ip.to_string(),
            ssh_user: new.ssh_user.to_string(),
            ssh_port: new.ssh_port,
        };

        info!(bastion_id = new.bastion_id, target = new.target_private_ip, "creating session");
        let record = self.gateway.create_session(&request).await?;

        if self.verbosity.is_debug() {
            debug!(?record, "CreateSession response");
        }
        info!(session_id = %record.id, ttl_seconds = ?record.ttl_seconds, "session created");

        Ok(record.id)
    }

    /// Read the session once and interpret its state and target.
    pub async fn resolve_session(&self, session_id: &str) -> Result<SessionInfo> {
        let record = self.gateway.get_session(session_id).await?;

        if self.verbosity.is_debug() {
            debug!(?record, "GetSession response");
        }

        let state: LifecycleState = record.lifecycle_state.parse()?;
        let target = match record.target {
            Some(TargetResource::ManagedSsh(target)) => Some(target),
            Some(TargetResource::Unsupported { kind }) => {
                return Err(BastionError::UnsupportedTargetKind {
                    session_id: record.id,
                    kind,
                })
            }
            None => None,
        };

        Ok(SessionInfo {
            id: record.id,
            state,
            target,
        })
    }

    /// Poll until the session is ACTIVE, reaches a terminal state, or the
    /// policy bound is exceeded.
    ///
    /// `on_poll` sees every observed state along with the 1-based poll number.
    pub async fn await_active<F>(
        &self,
        session_id: &str,
        policy: &PollPolicy,
        mut on_poll: F,
    ) -> Result<AwaitOutcome>
    where
        F: FnMut(&SessionInfo, u32),
    {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let info = self.resolve_session(session_id).await?;
            polls += 1;
            on_poll(&info, polls);

            match info.state {
                LifecycleState::Active => {
                    let target = info.target.ok_or_else(|| {
                        BastionError::gateway(
                            "GetSession",
                            format!("session {} is ACTIVE but has no target details", info.id),
                        )
                    })?;
                    info!(session_id, polls, "session active");
                    return Ok(AwaitOutcome::Active(ActiveSession::new(info.id, target)));
                }
                state if state.is_terminal() => {
                    info!(session_id, %state, "session reached a terminal state");
                    return Ok(AwaitOutcome::Terminal { state });
                }
                state => {
                    info!(session_id, %state, polls, "session not yet active");
                }
            }

            let waited = started.elapsed();
            let out_of_polls = policy.max_polls.is_some_and(|max| polls >= max);
            if out_of_polls || waited + policy.interval > policy.timeout {
                return Ok(AwaitOutcome::TimedOut {
                    last_state: info.state,
                    polls,
                    waited,
                });
            }

            tokio::time::sleep(policy.interval).await;
        }
    }
}
