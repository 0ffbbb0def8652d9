use super::{await_and_print, create_spinner, Context};
use crate::config::{resolve_poll_policy, SshFlags, SshOptions, WaitFlags};
use crate::keys;
use crate::oci::{resolve_bastion, SessionGateway};
use crate::session::{NewSession, SessionController};
use crate::Result;

pub async fn execute(
    ctx: &Context,
    instance_id: &str,
    instance_ip: &str,
    ssh_flags: &SshFlags,
    wait_flags: &WaitFlags,
) -> Result<()> {
    let ssh = SshOptions::resolve(ssh_flags, &ctx.settings);
    let policy = resolve_poll_policy(wait_flags, &ctx.settings);

    // Local preconditions before any remote call
    let public_key = keys::read_public_key(&ssh.public_key)?;
    let gateway = ctx.gateway()?;
    gateway.endpoint()?;

    let spinner = create_spinner("Resolving bastion...");
    let bastion = match resolve_bastion(&ctx.resolver(), &ctx.selectors).await {
        Ok(bastion) => {
            spinner.finish_and_clear();
            bastion
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    println!("Current tenant: {}", bastion.compartment.tenancy_name);
    println!("  Compartment: {}", bastion.compartment.compartment_name);
    println!("  Bastion: {}", bastion.bastion_name);
    println!("  Target: {}@{}:{}", ssh.user, instance_ip, ssh.port);
    println!("  Public key: {}", ssh.public_key.display());

    let controller = SessionController::new(&gateway, ctx.verbosity);
    let spinner = create_spinner("Creating session...");
    let session_id = match controller
        .create_session(&NewSession {
            bastion_id: &bastion.bastion_id,
            target_resource_id: instance_id,
            target_private_ip: instance_ip,
            public_key: &public_key,
            ssh_user: &ssh.user,
            ssh_port: ssh.port,
        })
        .await
    {
        Ok(id) => {
            spinner.finish_with_message("Session created");
            id
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    println!("  Session ID: {}", session_id);

    await_and_print(&gateway, ctx.verbosity, &session_id, &policy, &ssh.private_key).await
}
