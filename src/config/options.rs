use std::path::PathBuf;
use std::time::Duration;

use super::Settings;
use crate::keys;
use crate::oci::config::OciProfile;
use crate::session::PollPolicy;

/// Tenancy OCID; takes precedence over `--tenancy`.
pub const TENANCY_ENV: &str = "OCI_CLI_TENANCY";
/// Compartment name; takes precedence over `--compartment`.
pub const COMPARTMENT_ENV: &str = "OCIBAST_COMPARTMENT";
pub const REGION_ENV: &str = "OCI_CLI_REGION";
pub const PROFILE_ENV: &str = "OCI_CLI_PROFILE";

pub const DEFAULT_SSH_USER: &str = "opc";
pub const DEFAULT_SSH_PORT: u16 = 22;

/// How much informational output to emit. Never affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    pub fn is_debug(&self) -> bool {
        *self == Verbosity::Debug
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "ocibast=info,warn",
            Verbosity::Debug => "ocibast=debug,info",
        }
    }
}

/// Names selecting a bastion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    pub tenancy_id: Option<String>,
    pub compartment: Option<String>,
    pub bastion: Option<String>,
}

/// Environment lookup that treats empty values as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Environment > flag > settings, then the OCI config profile for tenancy.
pub fn resolve_selectors<E>(
    flags: &Selectors,
    settings: &Settings,
    oci_profile: Option<&OciProfile>,
    env: E,
) -> Selectors
where
    E: Fn(&str) -> Option<String>,
{
    Selectors {
        tenancy_id: env(TENANCY_ENV)
            .or_else(|| flags.tenancy_id.clone())
            .or_else(|| settings.tenancy_id.clone())
            .or_else(|| oci_profile.and_then(|p| p.tenancy.clone())),
        compartment: env(COMPARTMENT_ENV)
            .or_else(|| flags.compartment.clone())
            .or_else(|| settings.compartment.clone()),
        bastion: flags.bastion.clone().or_else(|| settings.bastion.clone()),
    }
}

/// Flag > environment > settings.
pub fn resolve_profile<E>(flag: Option<&str>, settings: &Settings, env: E) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    flag.map(String::from)
        .or_else(|| env(PROFILE_ENV))
        .or_else(|| settings.profile.clone())
}

/// Flag > environment > settings > OCI config profile.
pub fn resolve_region<E>(
    flag: Option<&str>,
    settings: &Settings,
    oci_profile: Option<&OciProfile>,
    env: E,
) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    flag.map(String::from)
        .or_else(|| env(REGION_ENV))
        .or_else(|| settings.region.clone())
        .or_else(|| oci_profile.and_then(|p| p.region.clone()))
}

/// SSH details as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SshFlags {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub private_key: Option<PathBuf>,
    pub public_key: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshOptions {
    pub user: String,
    pub port: u16,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl SshOptions {
    /// Flag > settings > default.
    pub fn resolve(flags: &SshFlags, settings: &Settings) -> Self {
        Self {
            user: flags
                .user
                .clone()
                .or_else(|| settings.ssh_user.clone())
                .unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
            port: flags.port.or(settings.ssh_port).unwrap_or(DEFAULT_SSH_PORT),
            private_key: flags
                .private_key
                .clone()
                .or_else(|| settings.private_key.clone())
                .unwrap_or_else(keys::default_private_key_path),
            public_key: flags
                .public_key
                .clone()
                .or_else(|| settings.public_key.clone())
                .unwrap_or_else(keys::default_public_key_path),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaitFlags {
    pub poll_interval: Option<u64>,
    pub timeout: Option<u64>,
    pub max_polls: Option<u32>,
}

/// Flag > settings > default.
pub fn resolve_poll_policy(flags: &WaitFlags, settings: &Settings) -> PollPolicy {
    let defaults = PollPolicy::default();
    PollPolicy {
        interval: flags
            .poll_interval
            .or(settings.poll_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval),
        timeout: flags
            .timeout
            .or(settings.wait_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        max_polls: flags.max_polls,
    }
}
