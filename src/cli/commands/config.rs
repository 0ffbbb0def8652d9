use dialoguer::Input;

use super::Context;
use crate::config::options::{COMPARTMENT_ENV, PROFILE_ENV, REGION_ENV, TENANCY_ENV};
use crate::config::{env_var, Settings, SshOptions, SshFlags};
use crate::keys;
use crate::{BastionError, Result};

pub async fn init(ctx: &Context) -> Result<()> {
    println!("Checking prerequisites...\n");

    let mut all_ok = true;

    // Check OCI CLI
    print!("  OCI CLI: ");
    match ctx.cli.version().await {
        Ok(version) => println!("OK ({})", version),
        Err(e) => {
            println!("MISSING");
            println!("    {}", e);
            all_ok = false;
        }
    }

    // Check OCI config profile
    print!("  OCI config profile: ");
    match (&ctx.oci_config_path, &ctx.oci_profile) {
        (Some(path), Some(_)) => println!("OK ({} in {})", ctx.profile_name, path.display()),
        (Some(path), None) => {
            println!("MISSING");
            println!("    Profile [{}] not found in {}", ctx.profile_name, path.display());
            println!("    Configure with: oci setup config");
            all_ok = false;
        }
        (None, _) => {
            println!("MISSING");
            println!("    Cannot determine the OCI config file location");
            all_ok = false;
        }
    }

    // Check tenancy and region
    print!("  Tenancy: ");
    match ctx.selectors.tenancy_id {
        Some(ref tenancy) => println!("OK ({})", tenancy),
        None => {
            println!("NOT SET");
            println!("    Set {} or add tenancy to the OCI config profile", TENANCY_ENV);
            all_ok = false;
        }
    }

    print!("  Region: ");
    match ctx.region {
        Some(ref region) => println!("OK ({})", region),
        None => {
            println!("NOT SET");
            println!("    Set {} or pass --region", REGION_ENV);
            all_ok = false;
        }
    }

    // Check SSH keys
    let ssh = SshOptions::resolve(&SshFlags::default(), &ctx.settings);
    print!("  SSH public key: ");
    match keys::read_public_key(&ssh.public_key) {
        Ok(_) => println!("OK ({})", ssh.public_key.display()),
        Err(e) => {
            println!("MISSING");
            println!("    {}", e);
            all_ok = false;
        }
    }

    print!("  SSH private key: ");
    if keys::private_key_exists(&ssh.private_key) {
        println!("OK ({})", ssh.private_key.display());
    } else {
        println!("MISSING");
        println!("    {} does not exist", ssh.private_key.display());
        all_ok = false;
    }

    // Default selectors
    let mut settings = ctx.settings.clone();
    if settings.compartment.is_none() || settings.bastion.is_none() {
        println!();
        println!("  Storing default selectors (leave empty to skip)...");

        let compartment: String = Input::new()
            .with_prompt("    Default compartment name")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BastionError::Config(format!("Failed to read input: {}", e)))?;
        let bastion: String = Input::new()
            .with_prompt("    Default bastion name")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BastionError::Config(format!("Failed to read input: {}", e)))?;

        let mut changed = false;
        for (key, value) in [("compartment", compartment), ("bastion", bastion)] {
            if value.trim().is_empty() {
                continue;
            }
            settings.set(key, &value)?;
            changed = true;
        }
        if changed {
            settings.save()?;
            println!("    Defaults saved");
        }
    }

    println!();

    if all_ok {
        println!("All prerequisites met! You can now use 'ocibast connect' to open a session.");
        Ok(())
    } else {
        Err(BastionError::Prerequisites(
            "Some prerequisites are not met".to_string(),
        ))
    }
}

pub fn show(ctx: &Context) -> Result<()> {
    println!("Configuration:");
    println!();

    println!("Settings file:");
    match Settings::config_path() {
        Some(path) => println!("  {}", path.display()),
        None => println!("  (cannot determine config directory)"),
    }

    println!();
    println!("OCI config:");
    match ctx.oci_config_path {
        Some(ref path) => println!("  {} [{}]", path.display(), ctx.profile_name),
        None => println!("  (not found)"),
    }

    println!();
    println!("Stored defaults:");
    for (key, value) in ctx.settings.entries() {
        println!("  {} = {}", key, value.as_deref().unwrap_or("(unset)"));
    }

    println!();
    println!("Environment overrides:");
    for name in [TENANCY_ENV, COMPARTMENT_ENV, REGION_ENV, PROFILE_ENV] {
        if let Some(value) = env_var(name) {
            println!("  {}={}", name, value);
        }
    }

    println!();
    println!("Effective selection:");
    println!("  tenancy = {}", ctx.selectors.tenancy_id.as_deref().unwrap_or("(unset)"));
    println!("  compartment = {}", ctx.selectors.compartment.as_deref().unwrap_or("(unset)"));
    println!("  bastion = {}", ctx.selectors.bastion.as_deref().unwrap_or("(unset)"));
    println!("  region = {}", ctx.region.as_deref().unwrap_or("(unset)"));

    Ok(())
}

/// Set a stored default
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load()?;
    settings.set(key, value)?;
    settings.save()?;
    println!("'{}' set to '{}'", key, value.trim());
    Ok(())
}

/// Remove a stored default
pub fn unset(key: &str) -> Result<()> {
    let mut settings = Settings::load()?;

    if settings.unset(key)? {
        settings.save()?;
        println!("'{}' removed", key);
    } else {
        println!("'{}' was not set", key);
    }

    Ok(())
}
