//! Scripted gateway used by the session tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::model::{ManagedSshTarget, SessionRecord, TargetResource};
use crate::oci::{CreateSessionRequest, SessionGateway};
use crate::{BastionError, Result};

pub const TEST_ENDPOINT: &str = "bastion.us-ashburn-1.oci.oraclecloud.com";

pub fn managed_target(ip: &str, user: &str, port: u16) -> ManagedSshTarget {
    ManagedSshTarget {
        private_ip: ip.to_string(),
        os_user: user.to_string(),
        port,
        display_name: Some("app-server".to_string()),
        resource_id: Some("ocid1.instance.oc1..app".to_string()),
    }
}

pub fn record(id: &str, state: &str, target: Option<TargetResource>) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        display_name: Some("OCIBastionSession".to_string()),
        lifecycle_state: state.to_string(),
        target,
        time_created: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ttl_seconds: Some(1800),
    }
}

/// Replays a fixed sequence of get responses. Once the script runs out,
/// reads fail with a gateway error unless a repeating response was set.
#[derive(Default)]
pub struct ScriptedGateway {
    created: Option<SessionRecord>,
    gets: Mutex<VecDeque<SessionRecord>>,
    repeat: Option<SessionRecord>,
    listing: Vec<SessionRecord>,
    create_requests: Mutex<Vec<CreateSessionRequest>>,
    get_count: Mutex<u32>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created(mut self, record: SessionRecord) -> Self {
        self.created = Some(record);
        self
    }

    pub fn then_get(self, record: SessionRecord) -> Self {
        self.gets.lock().unwrap().push_back(record);
        self
    }

    pub fn repeat_get(mut self, record: SessionRecord) -> Self {
        self.repeat = Some(record);
        self
    }

    pub fn with_listing(mut self, records: Vec<SessionRecord>) -> Self {
        self.listing = records;
        self
    }

    pub fn create_requests(&self) -> Vec<CreateSessionRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    pub fn get_count(&self) -> u32 {
        *self.get_count.lock().unwrap()
    }
}

#[async_trait]
impl SessionGateway for ScriptedGateway {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionRecord> {
        self.create_requests.lock().unwrap().push(request.clone());
        self.created
            .clone()
            .ok_or_else(|| BastionError::gateway("CreateSession", "scripted failure"))
    }

    async fn get_session(&self, _session_id: &str) -> Result<SessionRecord> {
        *self.get_count.lock().unwrap() += 1;
        let next = self.gets.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| BastionError::gateway("GetSession", "script exhausted"))
    }

    async fn list_sessions(&self, _bastion_id: &str) -> Result<Vec<SessionRecord>> {
        Ok(self.listing.clone())
    }

    fn endpoint(&self) -> Result<String> {
        Ok(TEST_ENDPOINT.to_string())
    }
}
