use super::{await_and_print, Context};
use crate::config::{resolve_poll_policy, SshFlags, SshOptions, WaitFlags};
use crate::Result;

/// Check an existing session by id. No bastion lookup is needed: the
/// session id alone identifies it.
pub async fn execute(
    ctx: &Context,
    session_id: &str,
    ssh_flags: &SshFlags,
    wait_flags: &WaitFlags,
) -> Result<()> {
    let ssh = SshOptions::resolve(ssh_flags, &ctx.settings);
    let policy = resolve_poll_policy(wait_flags, &ctx.settings);
    let gateway = ctx.gateway()?;

    println!("Checking session {}...", session_id);
    await_and_print(&gateway, ctx.verbosity, session_id, &policy, &ssh.private_key).await
}
