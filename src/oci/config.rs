use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::Result;

pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// The subset of an OCI CLI config profile this tool reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OciProfile {
    pub region: Option<String>,
    pub tenancy: Option<String>,
}

/// `~/.oci/config`, unless overridden with `OCI_CLI_CONFIG_FILE`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("OCI_CLI_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".oci").join("config"))
}

/// Read a profile from the OCI config file. A missing file is not an error.
pub fn read_profile(path: &Path, profile: &str) -> Result<Option<OciProfile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_profile(&content, profile))
}

/// Values of `profile`, falling back to the DEFAULT section the same way
/// the OCI CLI does.
pub fn parse_profile(content: &str, profile: &str) -> Option<OciProfile> {
    let mut defaults = OciProfile::default();
    let mut selected = OciProfile::default();
    let mut found = false;
    let mut section = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            if section == profile {
                found = true;
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let target = if section == profile {
            &mut selected
        } else if section == DEFAULT_PROFILE {
            &mut defaults
        } else {
            continue;
        };

        let value = value.trim().to_string();
        match key.trim() {
            "region" => target.region = Some(value),
            "tenancy" => target.tenancy = Some(value),
            _ => {}
        }
    }

    if !found {
        return None;
    }

    Some(OciProfile {
        region: selected.region.or(defaults.region),
        tenancy: selected.tenancy.or(defaults.tenancy),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = "\
[DEFAULT]
user=ocid1.user.oc1..me
tenancy=ocid1.tenancy.oc1..root
region=us-ashburn-1
key_file=~/.oci/oci_api_key.pem

# secondary
[WORK]
region = eu-frankfurt-1
";

    #[test]
    fn test_default_profile() {
        let profile = parse_profile(CONFIG, "DEFAULT").unwrap();
        assert_eq!(profile.region.as_deref(), Some("us-ashburn-1"));
        assert_eq!(profile.tenancy.as_deref(), Some("ocid1.tenancy.oc1..root"));
    }

    #[test]
    fn test_named_profile_inherits_default() {
        let profile = parse_profile(CONFIG, "WORK").unwrap();
        assert_eq!(profile.region.as_deref(), Some("eu-frankfurt-1"));
        assert_eq!(profile.tenancy.as_deref(), Some("ocid1.tenancy.oc1..root"));
    }

    #[test]
    fn test_missing_profile() {
        assert!(parse_profile(CONFIG, "NOPE").is_none());
    }

    #[test]
    fn test_read_profile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let profile = read_profile(file.path(), "WORK").unwrap().unwrap();
        assert_eq!(profile.region.as_deref(), Some("eu-frankfurt-1"));

        assert!(read_profile(Path::new("/nonexistent/oci/config"), "DEFAULT")
            .unwrap()
            .is_none());
    }
}
