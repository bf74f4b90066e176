//! The bot's view of a deployed registry contract.
//!
//! Signing, fees and the RPC transport belong to the implementation; the bot
//! only needs queries, an execute call and the gas figures the chain reports.

use async_trait::async_trait;
use drand_registry::msg::ExecuteMsg;
use drand_registry::state::{Config, QueriedBeacon, QueriedBot};

use crate::error::ClientError;

/// Outcome of a successful execute transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub gas_used: u64,
    pub gas_wanted: u64,
    pub tx_hash: Option<String>,
}

/// A registry instance bound to one contract address and one signing account.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Contract address this client talks to
    fn address(&self) -> &str;

    /// Account that signs execute messages
    fn sender(&self) -> &str;

    async fn query_config(&self) -> Result<Config, ClientError>;

    async fn query_beacon(&self, round: u64) -> Result<Option<QueriedBeacon>, ClientError>;

    /// Highest verified round, `None` if nothing is stored yet
    async fn query_latest_round(&self) -> Result<Option<u64>, ClientError>;

    async fn query_bot(&self, address: &str) -> Result<Option<QueriedBot>, ClientError>;

    async fn execute(&self, msg: ExecuteMsg) -> Result<ExecutionResult, ClientError>;
}
