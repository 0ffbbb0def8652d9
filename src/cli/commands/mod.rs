pub mod config;
pub mod connect;
pub mod resources;
pub mod session;
pub mod sessions;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::config::{env_var, resolve_profile, resolve_region, resolve_selectors, Selectors, Settings, Verbosity};
use crate::keys;
use crate::oci::config::{default_config_path, read_profile, OciProfile, DEFAULT_PROFILE};
use crate::oci::{OciCli, OciSessionGateway, OciTargetResolver, SessionGateway};
use crate::session::{ConnectionCommands, PollPolicy, SessionController};
use crate::{BastionError, Result};

/// Everything resolved from flags, environment, settings and the OCI config
/// file before a command runs.
pub struct Context {
    pub settings: Settings,
    pub selectors: Selectors,
    pub verbosity: Verbosity,
    pub region: Option<String>,
    pub profile_name: String,
    pub oci_config_path: Option<PathBuf>,
    pub oci_profile: Option<OciProfile>,
    pub cli: OciCli,
}

impl Context {
    pub fn load(
        flags: &Selectors,
        region_flag: Option<&str>,
        profile_flag: Option<&str>,
        verbosity: Verbosity,
    ) -> Result<Self> {
        let settings = Settings::load()?;
        let profile = resolve_profile(profile_flag, &settings, env_var);
        let profile_name = profile.clone().unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let oci_config_path = default_config_path();
        let oci_profile = match oci_config_path {
            Some(ref path) => read_profile(path, &profile_name)?,
            None => None,
        };

        let selectors = resolve_selectors(flags, &settings, oci_profile.as_ref(), env_var);
        let region = resolve_region(region_flag, &settings, oci_profile.as_ref(), env_var);
        let cli = OciCli::new(profile, region.clone());

        Ok(Self {
            settings,
            selectors,
            verbosity,
            region,
            profile_name,
            oci_config_path,
            oci_profile,
            cli,
        })
    }

    pub fn resolver(&self) -> OciTargetResolver {
        OciTargetResolver::new(self.cli.clone())
    }

    /// The session gateway needs a region to know its endpoint.
    pub fn gateway(&self) -> Result<OciSessionGateway> {
        let region = self.region.clone().ok_or_else(|| {
            BastionError::precondition(
                "Region is not set. Pass --region, set OCI_CLI_REGION, or add region to the OCI config profile",
            )
        })?;
        Ok(OciSessionGateway::new(
            self.cli.clone(),
            region,
            self.settings.endpoint.clone(),
        ))
    }
}

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Wait for the session to become active, then print its connection
/// commands. Nothing is printed for a session that never becomes usable.
pub async fn await_and_print<G>(
    gateway: &G,
    verbosity: Verbosity,
    session_id: &str,
    policy: &PollPolicy,
    identity_file: &Path,
) -> Result<()>
where
    G: SessionGateway + ?Sized,
{
    // Resolve the endpoint first so a bad region fails before any waiting.
    let endpoint = gateway.endpoint()?;
    let controller = SessionController::new(gateway, verbosity);

    let spinner = create_spinner("Checking session...");
    let outcome = controller
        .await_active(session_id, policy, |info, poll| {
            if !info.state.is_terminal() {
                spinner.set_message(format!(
                    "Session not yet active (state: {}, poll {}). Waiting...",
                    info.state, poll
                ));
            }
        })
        .await;

    let session = match outcome.and_then(|outcome| outcome.into_active(session_id)) {
        Ok(session) => {
            spinner.finish_with_message("Session active");
            session
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    if !keys::private_key_exists(identity_file) {
        warn!(path = %identity_file.display(), "identity file not found; the printed command will fail until it exists");
    }

    let commands = ConnectionCommands::build(&endpoint, &session, identity_file);
    println!();
    print!("{}", commands.render());

    Ok(())
}
