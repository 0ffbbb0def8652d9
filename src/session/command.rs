use std::borrow::Cow;
use std::path::Path;

use shell_escape::escape;

use super::model::ActiveSession;

/// SSH port of the bastion jump host.
pub const BASTION_SSH_PORT: u16 = 22;

/// Placeholders the operator fills in for the tunnel command.
pub const LOCAL_PORT_PLACEHOLDER: &str = "<LOCAL_PORT>";
pub const REMOTE_PORT_PLACEHOLDER: &str = "<REMOTE_PORT>";

/// Host keys are not pinned: the bastion-issued host changes per session.
const HOST_KEY_OPTIONS: &str = "-o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null";

/// The SSH invocations for an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCommands {
    pub jump_host: String,
    /// Interactive session on the target.
    pub direct: Vec<String>,
    /// Local port forward through the same proxy chain.
    pub tunnel: Vec<String>,
}

/// `<sessionId>@host.<endpointHost>`
pub fn jump_host(session_id: &str, endpoint_host: &str) -> String {
    format!("{}@host.{}", session_id, endpoint_host)
}

impl ConnectionCommands {
    pub fn build(endpoint_host: &str, session: &ActiveSession, identity_file: &Path) -> Self {
        let target = session.target();
        let jump_host = jump_host(session.id(), endpoint_host);
        let identity = identity_file.to_string_lossy();
        let identity = escape(Cow::Borrowed(identity.as_ref())).into_owned();

        let ssh_head = format!("ssh -i {} {}", identity, HOST_KEY_OPTIONS);
        let proxy_command = format!(
            "ProxyCommand=ssh -i {} -W %h:%p -p {} {}",
            identity, BASTION_SSH_PORT, jump_host
        );
        let proxy = format!("-o {}", escape(Cow::Owned(proxy_command)));
        let destination = format!("-p {} {}@{}", target.port, target.os_user, target.private_ip);

        let direct = vec![ssh_head.clone(), proxy.clone(), destination.clone()];
        let tunnel = vec![
            ssh_head,
            proxy,
            format!(
                "-N -L {}:localhost:{}",
                LOCAL_PORT_PLACEHOLDER, REMOTE_PORT_PLACEHOLDER
            ),
            destination,
        ];

        Self {
            jump_host,
            direct,
            tunnel,
        }
    }

    /// Printable block with shell line continuations.
    pub fn render(&self) -> String {
        let mut out = format!("Jump host: {}\n\n", self.jump_host);
        out.push_str("SSH session:\n");
        out.push_str(&self.direct.join(" \\\n"));
        out.push_str("\n\nPort forwarding tunnel (fill in the ports):\n");
        out.push_str(&self.tunnel.join(" \\\n"));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::ActiveSession;
    use crate::session::testing::{managed_target, TEST_ENDPOINT};

    fn active(id: &str) -> ActiveSession {
        ActiveSession::new(id.to_string(), managed_target("10.0.0.5", "opc", 22))
    }

    #[test]
    fn test_jump_host_format() {
        assert_eq!(
            jump_host("sess-1", "bastion.us-ashburn-1.oci.oraclecloud.com"),
            "sess-1@host.bastion.us-ashburn-1.oci.oraclecloud.com"
        );
    }

    #[test]
    fn test_direct_command() {
        let commands =
            ConnectionCommands::build(TEST_ENDPOINT, &active("sess-1"), Path::new("/home/me/.ssh/id_rsa"));

        assert_eq!(
            commands.direct.join(" "),
            "ssh -i /home/me/.ssh/id_rsa -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null \
             -o 'ProxyCommand=ssh -i /home/me/.ssh/id_rsa -W %h:%p -p 22 \
             sess-1@host.bastion.us-ashburn-1.oci.oraclecloud.com' -p 22 opc@10.0.0.5"
        );
    }

    #[test]
    fn test_tunnel_command_leaves_ports_to_operator() {
        let commands =
            ConnectionCommands::build(TEST_ENDPOINT, &active("sess-1"), Path::new("/k"));
        let tunnel = commands.tunnel.join(" ");

        assert!(tunnel.contains("-N -L <LOCAL_PORT>:localhost:<REMOTE_PORT>"));
        assert!(tunnel.contains("sess-1@host.bastion.us-ashburn-1.oci.oraclecloud.com"));
        assert!(tunnel.ends_with("opc@10.0.0.5"));
    }

    #[test]
    fn test_identity_path_is_escaped() {
        let commands = ConnectionCommands::build(
            TEST_ENDPOINT,
            &active("sess-1"),
            Path::new("/home/me/my keys/id_rsa"),
        );
        let direct = commands.direct.join(" ");
        assert!(direct.starts_with("ssh -i '/home/me/my keys/id_rsa' "));
        assert!(direct.contains("-o 'ProxyCommand=ssh -i '\\''/home/me/my keys/id_rsa'\\'' -W"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let session = active("sess-1");
        let a = ConnectionCommands::build(TEST_ENDPOINT, &session, Path::new("/k"));
        let b = ConnectionCommands::build(TEST_ENDPOINT, &session, Path::new("/k"));
        assert_eq!(a, b);
        assert_eq!(a.render(), b.render());
    }

    #[test]
    fn test_render_contains_both_commands() {
        let rendered =
            ConnectionCommands::build(TEST_ENDPOINT, &active("sess-1"), Path::new("/k")).render();
        assert!(rendered.contains("sess-1@host.bastion.us-ashburn-1.oci.oraclecloud.com"));
        assert!(rendered.contains("opc@10.0.0.5"));
        assert!(rendered.contains(" \\\n-o 'ProxyCommand="));
        assert!(rendered.contains("Port forwarding tunnel"));
    }
}
