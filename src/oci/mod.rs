pub mod client;
pub mod config;
pub mod gateway;
pub mod resolver;

pub use client::OciCli;
pub use gateway::{CreateSessionRequest, OciSessionGateway, SessionGateway};
pub use resolver::{resolve_bastion, resolve_compartment, OciTargetResolver, TargetResolver};
