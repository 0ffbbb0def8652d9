pub mod command;
pub mod controller;
pub mod lister;
pub mod model;

#[cfg(test)]
pub(crate) mod testing;

pub use command::ConnectionCommands;
pub use controller::{NewSession, PollPolicy, SessionController};
pub use lister::{list_active_sessions, render_listing};
pub use model::LifecycleState;
