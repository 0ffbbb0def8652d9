use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::{BastionError, Result};

/// Every `oci` command wraps its payload in a `data` field.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Thin wrapper around the `oci` command line tool.
///
/// Authentication is entirely the CLI's business: it reads the profile from
/// its own config file, so nothing here ever handles credentials.
#[derive(Debug, Clone, Default)]
pub struct OciCli {
    pub program: Option<PathBuf>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub config_file: Option<PathBuf>,
}

impl OciCli {
    pub fn new(profile: Option<String>, region: Option<String>) -> Self {
        Self {
            profile,
            region,
            ..Self::default()
        }
    }

    fn program(&self) -> PathBuf {
        self.program.clone().unwrap_or_else(|| PathBuf::from("oci"))
    }

    /// Arguments shared by every invocation.
    pub fn global_args(&self) -> Vec<String> {
        let mut args = vec!["--output".to_string(), "json".to_string()];
        if let Some(ref profile) = self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(ref region) = self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(ref config_file) = self.config_file {
            args.push("--config-file".to_string());
            args.push(config_file.to_string_lossy().to_string());
        }
        args
    }

    /// Run a command and return its raw stdout.
    async fn run_raw(&self, operation: &'static str, args: &[String]) -> Result<String> {
        let mut command = Command::new(self.program());
        command.args(args).args(self.global_args());
        debug!(operation, ?args, "running oci");

        let output = command.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BastionError::OciCliNotFound,
            _ => BastionError::gateway(operation, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("oci exited with code: {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(BastionError::Gateway { operation, message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command returning a single resource.
    pub async fn run<T: DeserializeOwned>(&self, operation: &'static str, args: &[String]) -> Result<T> {
        let stdout = self.run_raw(operation, args).await?;
        parse_data(operation, &stdout)
    }

    /// Run a list command. The CLI prints nothing at all for an empty list.
    pub async fn run_list<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: &[String],
    ) -> Result<Vec<T>> {
        let stdout = self.run_raw(operation, args).await?;
        parse_list(operation, &stdout)
    }

    /// Report the installed CLI version.
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(self.program())
            .arg("--version")
            .output()
            .await
            .map_err(|_| BastionError::OciCliNotFound)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(BastionError::OciCliNotFound)
        }
    }
}

pub(crate) fn parse_data<T: DeserializeOwned>(operation: &'static str, stdout: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(stdout)
        .map_err(|e| BastionError::gateway(operation, format!("unexpected response: {}", e)))?;
    Ok(envelope.data)
}

pub(crate) fn parse_list<T: DeserializeOwned>(operation: &'static str, stdout: &str) -> Result<Vec<T>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_data(operation, stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_global_args() {
        assert_eq!(OciCli::default().global_args(), vec!["--output", "json"]);

        let cli = OciCli {
            config_file: Some(PathBuf::from("/tmp/oci.cfg")),
            ..OciCli::new(Some("WORK".to_string()), Some("eu-frankfurt-1".to_string()))
        };
        assert_eq!(
            cli.global_args(),
            vec![
                "--output",
                "json",
                "--profile",
                "WORK",
                "--region",
                "eu-frankfurt-1",
                "--config-file",
                "/tmp/oci.cfg"
            ]
        );
    }

    #[test]
    fn test_parse_envelope() {
        let named: Named = parse_data("GetTenancy", r#"{"data": {"name": "acme"}}"#).unwrap();
        assert_eq!(named.name, "acme");
    }

    #[test]
    fn test_parse_empty_list() {
        let items: Vec<Named> = parse_list("ListBastions", "  \n").unwrap();
        assert!(items.is_empty());

        let items: Vec<Named> = parse_list("ListBastions", r#"{"data": [{"name": "a"}]}"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_parse_garbage_is_gateway_error() {
        let err = parse_data::<Named>("GetSession", "Traceback ...").unwrap_err();
        assert!(matches!(err, BastionError::Gateway { operation: "GetSession", .. }));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let cli = OciCli {
            program: Some(PathBuf::from("/nonexistent/oci-binary")),
            ..OciCli::default()
        };
        let err = cli
            .run::<Named>("GetTenancy", &["iam".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::OciCliNotFound));
    }
}
