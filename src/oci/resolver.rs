use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::client::OciCli;
use crate::config::Selectors;
use crate::{BastionError, Result};

/// Name to identifier lookups against the identity and bastion services.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    async fn tenancy_name(&self, tenancy_id: &str) -> Result<String>;

    /// Compartments directly under the tenancy, keyed by name.
    async fn list_compartments(&self, tenancy_id: &str) -> Result<BTreeMap<String, String>>;

    /// Bastions in a compartment, keyed by name.
    async fn list_bastions(&self, compartment_id: &str) -> Result<BTreeMap<String, String>>;

    /// Confirm the bastion exists and is readable.
    async fn get_bastion(&self, bastion_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCompartment {
    pub tenancy_id: String,
    pub tenancy_name: String,
    pub compartment_name: String,
    pub compartment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBastion {
    pub compartment: ResolvedCompartment,
    pub bastion_name: String,
    pub bastion_id: String,
}

pub fn require_tenancy(selectors: &Selectors) -> Result<&str> {
    selectors.tenancy_id.as_deref().ok_or_else(|| {
        BastionError::precondition(
            "Tenancy is not set. Set OCI_CLI_TENANCY, pass --tenancy, or add tenancy to the OCI config profile",
        )
    })
}

/// Resolve tenancy and compartment names to identifiers.
pub async fn resolve_compartment<R>(resolver: &R, selectors: &Selectors) -> Result<ResolvedCompartment>
where
    R: TargetResolver + ?Sized,
{
    let tenancy_id = require_tenancy(selectors)?;
    let compartment_name = selectors.compartment.as_deref().ok_or_else(|| {
        BastionError::precondition("Must pass compartment name with -c (or set OCIBAST_COMPARTMENT)")
    })?;

    let tenancy_name = resolver.tenancy_name(tenancy_id).await?;
    let compartments = resolver.list_compartments(tenancy_id).await?;
    let compartment_id = compartments
        .get(compartment_name)
        .cloned()
        .ok_or_else(|| BastionError::CompartmentNotFound(compartment_name.to_string()))?;
    debug!(compartment_name, %compartment_id, "resolved compartment");

    Ok(ResolvedCompartment {
        tenancy_id: tenancy_id.to_string(),
        tenancy_name,
        compartment_name: compartment_name.to_string(),
        compartment_id,
    })
}

/// Resolve all selectors down to a bastion identifier.
///
/// Every missing or unknown name fails here, before any session call.
pub async fn resolve_bastion<R>(resolver: &R, selectors: &Selectors) -> Result<ResolvedBastion>
where
    R: TargetResolver + ?Sized,
{
    let bastion_name = selectors
        .bastion
        .as_deref()
        .ok_or_else(|| BastionError::precondition("Must pass bastion name with -b"))?;

    let compartment = resolve_compartment(resolver, selectors).await?;
    let bastions = resolver.list_bastions(&compartment.compartment_id).await?;
    let bastion_id = bastions
        .get(bastion_name)
        .cloned()
        .ok_or_else(|| BastionError::BastionNotFound {
            name: bastion_name.to_string(),
            compartment: compartment.compartment_name.clone(),
        })?;

    resolver.get_bastion(&bastion_id).await?;
    debug!(bastion_name, %bastion_id, "resolved bastion");

    Ok(ResolvedBastion {
        compartment,
        bastion_name: bastion_name.to_string(),
        bastion_id,
    })
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Tenancy {
    name: String,
}

/// `TargetResolver` backed by the `oci` CLI.
#[derive(Debug, Clone)]
pub struct OciTargetResolver {
    cli: OciCli,
}

impl OciTargetResolver {
    pub fn new(cli: OciCli) -> Self {
        Self { cli }
    }
}

fn by_name(items: Vec<NamedResource>) -> BTreeMap<String, String> {
    items.into_iter().map(|item| (item.name, item.id)).collect()
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

#[async_trait]
impl TargetResolver for OciTargetResolver {
    async fn tenancy_name(&self, tenancy_id: &str) -> Result<String> {
        let args = strings(&["iam", "tenancy", "get", "--tenancy-id", tenancy_id]);
        let tenancy: Tenancy = self.cli.run("GetTenancy", &args).await?;
        Ok(tenancy.name)
    }

    async fn list_compartments(&self, tenancy_id: &str) -> Result<BTreeMap<String, String>> {
        let args = strings(&["iam", "compartment", "list", "--compartment-id", tenancy_id, "--all"]);
        let items = self.cli.run_list("ListCompartments", &args).await?;
        Ok(by_name(items))
    }

    async fn list_bastions(&self, compartment_id: &str) -> Result<BTreeMap<String, String>> {
        let args = strings(&["bastion", "bastion", "list", "--compartment-id", compartment_id, "--all"]);
        let items = self.cli.run_list("ListBastions", &args).await?;
        Ok(by_name(items))
    }

    async fn get_bastion(&self, bastion_id: &str) -> Result<()> {
        let args = strings(&["bastion", "bastion", "get", "--bastion-id", bastion_id]);
        let _: serde_json::Value = self.cli.run("GetBastion", &args).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeResolver {
        calls: Mutex<Vec<String>>,
    }

    impl FakeResolver {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TargetResolver for FakeResolver {
        async fn tenancy_name(&self, _tenancy_id: &str) -> Result<String> {
            self.calls.lock().unwrap().push("tenancy".to_string());
            Ok("acme".to_string())
        }

        async fn list_compartments(&self, _tenancy_id: &str) -> Result<BTreeMap<String, String>> {
            self.calls.lock().unwrap().push("compartments".to_string());
            Ok(BTreeMap::from([
                ("prod".to_string(), "ocid1.compartment..prod".to_string()),
                ("dev".to_string(), "ocid1.compartment..dev".to_string()),
            ]))
        }

        async fn list_bastions(&self, compartment_id: &str) -> Result<BTreeMap<String, String>> {
            self.calls.lock().unwrap().push(format!("bastions:{compartment_id}"));
            Ok(BTreeMap::from([(
                "jump".to_string(),
                "ocid1.bastion..jump".to_string(),
            )]))
        }

        async fn get_bastion(&self, bastion_id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("bastion:{bastion_id}"));
            Ok(())
        }
    }

    fn selectors(tenancy: Option<&str>, compartment: Option<&str>, bastion: Option<&str>) -> Selectors {
        Selectors {
            tenancy_id: tenancy.map(String::from),
            compartment: compartment.map(String::from),
            bastion: bastion.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_resolve_bastion() {
        let resolver = FakeResolver::default();
        let resolved = resolve_bastion(&resolver, &selectors(Some("t"), Some("prod"), Some("jump")))
            .await
            .unwrap();

        assert_eq!(resolved.bastion_id, "ocid1.bastion..jump");
        assert_eq!(resolved.compartment.compartment_id, "ocid1.compartment..prod");
        assert_eq!(resolved.compartment.tenancy_name, "acme");
        assert_eq!(
            resolver.calls(),
            vec![
                "tenancy",
                "compartments",
                "bastions:ocid1.compartment..prod",
                "bastion:ocid1.bastion..jump"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_selectors_fail_before_remote_calls() {
        let resolver = FakeResolver::default();

        let err = resolve_bastion(&resolver, &selectors(None, Some("prod"), Some("jump")))
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::Precondition(_)));

        let err = resolve_bastion(&resolver, &selectors(Some("t"), None, Some("jump")))
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::Precondition(_)));

        let err = resolve_bastion(&resolver, &selectors(Some("t"), Some("prod"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::Precondition(_)));

        assert!(resolver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_names() {
        let resolver = FakeResolver::default();

        let err = resolve_bastion(&resolver, &selectors(Some("t"), Some("qa"), Some("jump")))
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::CompartmentNotFound(ref name) if name == "qa"));
        assert_eq!(err.exit_code(), 2);

        let err = resolve_bastion(&resolver, &selectors(Some("t"), Some("dev"), Some("other")))
            .await
            .unwrap_err();
        assert!(matches!(err, BastionError::BastionNotFound { ref name, .. } if name == "other"));
    }

    #[test]
    fn test_by_name_is_sorted() {
        let items = vec![
            NamedResource { id: "2".to_string(), name: "zeta".to_string() },
            NamedResource { id: "1".to_string(), name: "alpha".to_string() },
        ];
        let names: Vec<_> = by_name(items).into_keys().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
