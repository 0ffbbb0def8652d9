use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::client::OciCli;
use crate::session::model::{ManagedSshTarget, SessionRecord, TargetResource};
use crate::{BastionError, Result};

/// Session type label of the only target kind this tool supports.
pub const MANAGED_SSH: &str = "MANAGED_SSH";

/// Realm domain of the commercial OCI realm.
pub const DEFAULT_REALM_DOMAIN: &str = "oraclecloud.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub bastion_id: String,
    pub display_name: String,
    pub ttl_seconds: u32,
    pub public_key: String,
    pub target_resource_id: String,
    pub target_private_ip: String,
    pub ssh_user: String,
    pub ssh_port: u16,
}

/// Remote bastion session API.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionRecord>;

    async fn get_session(&self, session_id: &str) -> Result<SessionRecord>;

    async fn list_sessions(&self, bastion_id: &str) -> Result<Vec<SessionRecord>>;

    /// Host name of the bastion service endpoint.
    fn endpoint(&self) -> Result<String>;
}

/// Session as printed by `oci bastion session get|list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireSession {
    id: String,
    display_name: Option<String>,
    lifecycle_state: String,
    target_resource_details: Option<WireTargetDetails>,
    time_created: Option<DateTime<Utc>>,
    session_ttl_in_seconds: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireTargetDetails {
    session_type: String,
    target_resource_id: Option<String>,
    target_resource_display_name: Option<String>,
    target_resource_operating_system_user_name: Option<String>,
    target_resource_port: Option<u16>,
    target_resource_private_ip_address: Option<String>,
}

impl WireTargetDetails {
    fn into_target(self) -> Option<TargetResource> {
        if self.session_type != MANAGED_SSH {
            return Some(TargetResource::Unsupported {
                kind: self.session_type,
            });
        }

        // The service fills these in once the target is resolved.
        Some(TargetResource::ManagedSsh(ManagedSshTarget {
            private_ip: self.target_resource_private_ip_address?,
            os_user: self.target_resource_operating_system_user_name?,
            port: self.target_resource_port?,
            display_name: self.target_resource_display_name,
            resource_id: self.target_resource_id,
        }))
    }
}

impl From<WireSession> for SessionRecord {
    fn from(wire: WireSession) -> Self {
        SessionRecord {
            id: wire.id,
            display_name: wire.display_name,
            lifecycle_state: wire.lifecycle_state,
            target: wire
                .target_resource_details
                .and_then(WireTargetDetails::into_target),
            time_created: wire.time_created,
            ttl_seconds: wire.session_ttl_in_seconds,
        }
    }
}

/// `SessionGateway` backed by the `oci` CLI.
#[derive(Debug, Clone)]
pub struct OciSessionGateway {
    cli: OciCli,
    region: String,
    endpoint_override: Option<String>,
}

impl OciSessionGateway {
    pub fn new(cli: OciCli, region: impl Into<String>, endpoint_override: Option<String>) -> Self {
        Self {
            cli,
            region: region.into(),
            endpoint_override,
        }
    }
}

/// Arguments for `oci bastion session create`.
pub fn create_session_args(request: &CreateSessionRequest) -> Vec<String> {
    let key_details = json!({ "publicKeyContent": request.public_key });
    let target_details = json!({
        "sessionType": MANAGED_SSH,
        "targetResourceId": request.target_resource_id,
        "targetResourceOperatingSystemUserName": request.ssh_user,
        "targetResourcePort": request.ssh_port,
        "targetResourcePrivateIpAddress": request.target_private_ip,
    });

    vec![
        "bastion".to_string(),
        "session".to_string(),
        "create".to_string(),
        "--bastion-id".to_string(),
        request.bastion_id.clone(),
        "--display-name".to_string(),
        request.display_name.clone(),
        "--key-type".to_string(),
        "PUB".to_string(),
        "--session-ttl-in-seconds".to_string(),
        request.ttl_seconds.to_string(),
        "--key-details".to_string(),
        key_details.to_string(),
        "--target-resource-details".to_string(),
        target_details.to_string(),
    ]
}

/// Host of the bastion service endpoint for a region, or of an explicit
/// endpoint URL.
pub fn endpoint_host(region: &str, endpoint_override: Option<&str>) -> Result<String> {
    let endpoint = match endpoint_override {
        Some(endpoint) => endpoint.to_string(),
        None => format!("https://bastion.{}.oci.{}", region, DEFAULT_REALM_DOMAIN),
    };

    let url = Url::parse(&endpoint)
        .map_err(|e| BastionError::Config(format!("Invalid bastion endpoint '{}': {}", endpoint, e)))?;

    url.host_str()
        .map(String::from)
        .ok_or_else(|| BastionError::Config(format!("Bastion endpoint '{}' has no host", endpoint)))
}

#[async_trait]
impl SessionGateway for OciSessionGateway {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionRecord> {
        let wire: WireSession = self
            .cli
            .run("CreateSession", &create_session_args(request))
            .await?;
        Ok(wire.into())
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionRecord> {
        let args = [
            "bastion".to_string(),
            "session".to_string(),
            "get".to_string(),
            "--session-id".to_string(),
            session_id.to_string(),
        ];
        let wire: WireSession = self.cli.run("GetSession", &args).await?;
        Ok(wire.into())
    }

    async fn list_sessions(&self, bastion_id: &str) -> Result<Vec<SessionRecord>> {
        let args = [
            "bastion".to_string(),
            "session".to_string(),
            "list".to_string(),
            "--bastion-id".to_string(),
            bastion_id.to_string(),
            "--all".to_string(),
        ];
        let wire: Vec<WireSession> = self.cli.run_list("ListSessions", &args).await?;
        Ok(wire.into_iter().map(SessionRecord::from).collect())
    }

    fn endpoint(&self) -> Result<String> {
        endpoint_host(&self.region, self.endpoint_override.as_deref())
    }
}
