use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use super::model::{LifecycleState, SessionRecord, TargetResource};
use crate::oci::SessionGateway;
use crate::Result;

/// One ACTIVE session in a bastion listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListing {
    pub id: String,
    pub display_name: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
    pub target: TargetResource,
}

/// Fetch all sessions of a bastion and keep the ACTIVE ones, oldest first.
pub async fn list_active_sessions<G>(gateway: &G, bastion_id: &str) -> Result<Vec<SessionListing>>
where
    G: SessionGateway + ?Sized,
{
    let records = gateway.list_sessions(bastion_id).await?;
    active_listings(records)
}

fn active_listings(records: Vec<SessionRecord>) -> Result<Vec<SessionListing>> {
    let mut listings = Vec::new();

    for record in records {
        let state: LifecycleState = record.lifecycle_state.parse()?;
        if !state.is_usable() {
            continue;
        }

        let Some(target) = record.target else {
            warn!(session_id = %record.id, "active session has no target details");
            continue;
        };
        if let TargetResource::Unsupported { ref kind } = target {
            warn!(session_id = %record.id, %kind, "active session has an unsupported target kind");
        }

        listings.push(SessionListing {
            id: record.id,
            display_name: record.display_name,
            time_created: record.time_created,
            target,
        });
    }

    listings.sort_by(|a, b| {
        a.time_created
            .cmp(&b.time_created)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(listings)
}

/// Render a listing for the terminal.
pub fn render_listing(listings: &[SessionListing]) -> String {
    if listings.is_empty() {
        return "No active sessions\n".to_string();
    }

    let mut out = String::new();
    for listing in listings {
        out.push_str(listing.display_name.as_deref().unwrap_or("-"));
        out.push('\n');
        out.push_str(&listing.id);
        out.push('\n');
        match listing.time_created {
            Some(created) => out.push_str(&created.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => out.push('-'),
        }
        out.push('\n');

        match &listing.target {
            TargetResource::ManagedSsh(target) => {
                out.push_str(target.display_name.as_deref().unwrap_or("-"));
                out.push('\n');
                out.push_str(&target.private_ip);
                out.push('\n');
                out.push_str(target.resource_id.as_deref().unwrap_or("-"));
                out.push('\n');
            }
            TargetResource::Unsupported { kind } => {
                out.push_str(&format!("({} session)\n", kind));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{managed_target, record, ScriptedGateway};
    use crate::BastionError;
    use chrono::TimeZone;

    fn ssh(ip: &str) -> Option<TargetResource> {
        Some(TargetResource::ManagedSsh(managed_target(ip, "opc", 22)))
    }

    #[tokio::test]
    async fn test_lists_only_active_sessions() {
        let gateway = ScriptedGateway::new().with_listing(vec![
            record("sess-a", "ACTIVE", ssh("10.0.0.5")),
            record("sess-c", "CREATING", None),
            record("sess-d", "DELETED", ssh("10.0.0.7")),
        ]);

        let listings = list_active_sessions(&gateway, "b1").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "sess-a");

        let rendered = render_listing(&listings);
        assert!(rendered.contains("sess-a"));
        assert!(rendered.contains("10.0.0.5"));
        assert!(rendered.contains("2024-05-01T12:00:00Z"));
        assert!(!rendered.contains("sess-c"));
        assert!(!rendered.contains("sess-d"));
    }

    #[test]
    fn test_listing_is_sorted_by_creation_then_id() {
        let mut newer = record("sess-b", "ACTIVE", ssh("10.0.0.2"));
        newer.time_created = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let records = vec![
            newer,
            record("sess-z", "ACTIVE", ssh("10.0.0.3")),
            record("sess-a", "ACTIVE", ssh("10.0.0.1")),
        ];

        let ids: Vec<_> = active_listings(records)
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["sess-a", "sess-z", "sess-b"]);
    }

    #[test]
    fn test_unknown_state_fails_the_listing() {
        let err = active_listings(vec![record("sess-x", "HIBERNATING", None)]).unwrap_err();
        assert!(matches!(err, BastionError::UnknownLifecycleState(_)));
    }

    #[test]
    fn test_unsupported_active_session_shows_kind() {
        let listings = active_listings(vec![record(
            "sess-p",
            "ACTIVE",
            Some(TargetResource::Unsupported {
                kind: "PORT_FORWARDING".to_string(),
            }),
        )])
        .unwrap();

        assert!(render_listing(&listings).contains("(PORT_FORWARDING session)"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(render_listing(&[]), "No active sessions\n");
    }
}
