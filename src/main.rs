use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod error;
mod keys;
mod oci;
mod session;

pub use error::{BastionError, Result};

use cli::commands::{self, Context};
use config::{Selectors, SshFlags, Verbosity, WaitFlags};

#[derive(Parser)]
#[command(name = "ocibast")]
#[command(about = "Create OCI Bastion sessions and print ready-to-run SSH commands")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Tenancy OCID (OCI_CLI_TENANCY takes precedence)
    #[arg(short, long, global = true)]
    tenancy: Option<String>,

    /// Compartment name (OCIBAST_COMPARTMENT takes precedence)
    #[arg(short, long, global = true)]
    compartment: Option<String>,

    /// Bastion name
    #[arg(short, long, global = true)]
    bastion: Option<String>,

    /// OCI region, e.g. us-ashburn-1
    #[arg(long, global = true)]
    region: Option<String>,

    /// OCI CLI config profile
    #[arg(long, global = true)]
    profile: Option<String>,

    /// More output (-v info, -vv debug including raw responses)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct SshArgs {
    /// SSH user on the target [default: opc]
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// SSH port on the target [default: 22]
    #[arg(short = 'p', long = "port", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Private key (identity file) used in the printed command [default: ~/.ssh/id_rsa]
    #[arg(short = 'k', long = "private-key")]
    private_key: Option<PathBuf>,
}

#[derive(Args)]
struct WaitArgs {
    /// Seconds between session state polls [default: 10]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: Option<u64>,

    /// Give up waiting for ACTIVE after this many seconds [default: 600]
    #[arg(long)]
    timeout: Option<u64>,

    /// Give up waiting for ACTIVE after this many polls
    #[arg(long)]
    max_polls: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new session and print the SSH command once it is active
    Connect {
        /// Instance OCID of the host to connect to
        #[arg(short = 'o', long = "instance-id")]
        instance_id: String,

        /// Private IP address of the host to connect to
        #[arg(short = 'i', long = "instance-ip")]
        instance_ip: String,

        /// Public key sent to the bastion [default: ~/.ssh/id_rsa.pub]
        #[arg(short = 'e', long = "public-key")]
        public_key: Option<PathBuf>,

        #[command(flatten)]
        ssh: SshArgs,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Check an existing session and print the SSH command if it is active
    Session {
        /// Session OCID
        session_id: String,

        /// Private key (identity file) used in the printed command [default: ~/.ssh/id_rsa]
        #[arg(short = 'k', long = "private-key")]
        private_key: Option<PathBuf>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List active sessions on a bastion
    Sessions,

    /// List compartments in the tenancy
    Compartments,

    /// List bastions in a compartment
    Bastions,

    /// Manage ocibast defaults
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Check prerequisites and store default selectors
    Init,

    /// Show current configuration
    Show,

    /// Set a default value
    Set {
        /// Setting key (see `config show`)
        key: String,

        /// Value
        value: String,
    },

    /// Remove a default value
    Unset {
        /// Setting key
        key: String,
    },
}

impl From<WaitArgs> for WaitFlags {
    fn from(args: WaitArgs) -> Self {
        WaitFlags {
            poll_interval: args.poll_interval,
            timeout: args.timeout,
            max_polls: args.max_polls,
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    let verbosity = Verbosity::from_occurrences(global.verbose);
    let flags = Selectors {
        tenancy_id: global.tenancy,
        compartment: global.compartment,
        bastion: global.bastion,
    };
    let load_context =
        || Context::load(&flags, global.region.as_deref(), global.profile.as_deref(), verbosity);

    match cli.command {
        Commands::Connect {
            instance_id,
            instance_ip,
            public_key,
            ssh,
            wait,
        } => {
            let ssh_flags = SshFlags {
                user: ssh.user,
                port: ssh.port,
                private_key: ssh.private_key,
                public_key,
            };
            commands::connect::execute(&load_context()?, &instance_id, &instance_ip, &ssh_flags, &wait.into())
                .await
        }
        Commands::Session {
            session_id,
            private_key,
            wait,
        } => {
            let ssh_flags = SshFlags {
                private_key,
                ..SshFlags::default()
            };
            commands::session::execute(&load_context()?, &session_id, &ssh_flags, &wait.into()).await
        }
        Commands::Sessions => commands::sessions::execute(&load_context()?).await,
        Commands::Compartments => commands::resources::compartments(&load_context()?).await,
        Commands::Bastions => commands::resources::bastions(&load_context()?).await,
        Commands::Config { command } => match command {
            ConfigCommands::Init => commands::config::init(&load_context()?).await,
            ConfigCommands::Show => commands::config::show(&load_context()?),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
            ConfigCommands::Unset { key } => commands::config::unset(&key),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(Verbosity::from_occurrences(cli.global.verbose));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
