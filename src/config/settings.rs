use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::{BastionError, Result};

/// Keys accepted by `ocibast config set`.
pub const SETTINGS_KEYS: &[&str] = &[
    "tenancy",
    "compartment",
    "bastion",
    "region",
    "profile",
    "endpoint",
    "ssh-user",
    "ssh-port",
    "private-key",
    "public-key",
    "poll-interval",
    "wait-timeout",
];

/// Persisted defaults for ocibast
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tenancy_id: Option<String>,
    pub compartment: Option<String>,
    pub bastion: Option<String>,
    pub region: Option<String>,
    /// OCI CLI profile name
    pub profile: Option<String>,
    /// Bastion service endpoint URL, for realms outside oraclecloud.com
    pub endpoint: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_port: Option<u16>,
    pub private_key: Option<PathBuf>,
    pub public_key: Option<PathBuf>,
    pub poll_interval_secs: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

impl Settings {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ocibast").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from the config file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| BastionError::Config("Cannot determine config directory".to_string()))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            BastionError::Config(format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Save settings to the config file with restricted permissions (0600)
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| BastionError::Config("Cannot determine config directory".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
        }

        Ok(())
    }

    /// Set a value by its `config set` key (validates the value)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(BastionError::Config(format!("Value for '{}' cannot be empty", key)));
        }

        match key {
            "tenancy" => {
                if !value.starts_with("ocid1.tenancy.") {
                    return Err(BastionError::Config(format!(
                        "'{}' is not a tenancy OCID",
                        value
                    )));
                }
                self.tenancy_id = Some(value.to_string());
            }
            "compartment" => self.compartment = Some(value.to_string()),
            "bastion" => self.bastion = Some(value.to_string()),
            "region" => self.region = Some(value.to_string()),
            "profile" => self.profile = Some(value.to_string()),
            "endpoint" => {
                url::Url::parse(value).map_err(|e| {
                    BastionError::Config(format!("Invalid endpoint URL '{}': {}", value, e))
                })?;
                self.endpoint = Some(value.to_string());
            }
            "ssh-user" => self.ssh_user = Some(value.to_string()),
            "ssh-port" => self.ssh_port = Some(parse_port(value)?),
            "private-key" => self.private_key = Some(PathBuf::from(value)),
            "public-key" => self.public_key = Some(PathBuf::from(value)),
            "poll-interval" => self.poll_interval_secs = Some(parse_seconds(key, value)?),
            "wait-timeout" => self.wait_timeout_secs = Some(parse_seconds(key, value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Clear a value; returns whether it was set
    pub fn unset(&mut self, key: &str) -> Result<bool> {
        let was_set = match key {
            "tenancy" => self.tenancy_id.take().is_some(),
            "compartment" => self.compartment.take().is_some(),
            "bastion" => self.bastion.take().is_some(),
            "region" => self.region.take().is_some(),
            "profile" => self.profile.take().is_some(),
            "endpoint" => self.endpoint.take().is_some(),
            "ssh-user" => self.ssh_user.take().is_some(),
            "ssh-port" => self.ssh_port.take().is_some(),
            "private-key" => self.private_key.take().is_some(),
            "public-key" => self.public_key.take().is_some(),
            "poll-interval" => self.poll_interval_secs.take().is_some(),
            "wait-timeout" => self.wait_timeout_secs.take().is_some(),
            _ => return Err(unknown_key(key)),
        };
        Ok(was_set)
    }

    /// Configured values in `SETTINGS_KEYS` order
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        vec![
            ("tenancy", self.tenancy_id.clone()),
            ("compartment", self.compartment.clone()),
            ("bastion", self.bastion.clone()),
            ("region", self.region.clone()),
            ("profile", self.profile.clone()),
            ("endpoint", self.endpoint.clone()),
            ("ssh-user", self.ssh_user.clone()),
            ("ssh-port", self.ssh_port.map(|p| p.to_string())),
            ("private-key", path(&self.private_key)),
            ("public-key", path(&self.public_key)),
            ("poll-interval", self.poll_interval_secs.map(|s| format!("{}s", s))),
            ("wait-timeout", self.wait_timeout_secs.map(|s| format!("{}s", s))),
        ]
    }
}

fn unknown_key(key: &str) -> BastionError {
    BastionError::Config(format!(
        "Unknown setting '{}'. Valid keys: {}",
        key,
        SETTINGS_KEYS.join(", ")
    ))
}

fn parse_port(value: &str) -> Result<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(BastionError::Config(format!(
            "'{}' is not a valid port (1-65535)",
            value
        ))),
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(BastionError::Config(format!(
            "'{}' must be a positive number of seconds",
            key
        ))),
    }
}
