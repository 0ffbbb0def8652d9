pub mod options;
mod settings;

pub use options::{
    env_var, resolve_poll_policy, resolve_profile, resolve_region, resolve_selectors, Selectors,
    SshFlags, SshOptions, Verbosity, WaitFlags,
};
pub use settings::Settings;
