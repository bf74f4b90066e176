//! Relay bot that keeps a drand registry contract fed with verified beacons.

pub mod bot;
pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod source;

pub use bot::{plan_next_round, Bot, Clock, Settings};
pub use client::{ExecutionResult, RegistryClient};
pub use config::BotConfig;
pub use error::{BotError, ClientError, ConfigError, FetchError, Rejection};
pub use retry::RetryPolicy;
pub use source::{BeaconSource, HttpBeaconSource};
