//! An in-process chain hosting one registry instance.
//!
//! Every execute runs the contract entry point against a single store behind a
//! mutex, so transactions are applied one at a time and atomically, the way a
//! real chain serializes them. Each transaction moves the block forward.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use cosmwasm_std::testing::{message_info, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    from_json, Addr, Binary, BlockInfo, Deps, DepsMut, Env, MemoryStorage, Order, QuerierWrapper,
    Record, Response, StdError, StdResult, Storage, Timestamp,
};
use drand_bot::{ClientError, ExecutionResult, RegistryClient, Rejection};
use drand_registry::contract;
use drand_registry::msg::{
    BeaconResponse, BotResponse, ExecuteMsg, InstantiateMsg, LatestRoundResponse, QueryMsg,
};
use drand_registry::state::{Config, QueriedBeacon, QueriedBot};
use drand_registry::ContractError;
use serde::de::DeserializeOwned;

/// Seconds between blocks
pub const BLOCK_TIME_SECONDS: u64 = 5;
/// Gas limit reported for every transaction
pub const GAS_WANTED: u64 = 500_000;

struct ChainState {
    storage: MemoryStorage,
    api: MockApi,
    env: Env,
    txs: u64,
}

impl ChainState {
    fn deps_mut<'a>(&'a mut self, querier: &'a MockQuerier) -> DepsMut<'a> {
        DepsMut {
            storage: &mut self.storage,
            api: &self.api,
            querier: QuerierWrapper::new(querier),
        }
    }

    fn deps<'a>(&'a self, querier: &'a MockQuerier) -> Deps<'a> {
        Deps {
            storage: &self.storage,
            api: &self.api,
            querier: QuerierWrapper::new(querier),
        }
    }

    fn next_block(&mut self) {
        let block = &mut self.env.block;
        block.height += 1;
        block.time = block.time.plus_seconds(BLOCK_TIME_SECONDS);
    }
}

#[derive(Clone)]
pub struct LocalChain {
    state: Arc<Mutex<ChainState>>,
}

impl LocalChain {
    /// Starts a chain at the default mock block and instantiates the registry.
    pub fn instantiate(sender: &Addr, msg: InstantiateMsg) -> Result<Self, ContractError> {
        Self::instantiate_at(mock_env().block, sender, msg)
    }

    pub fn instantiate_at(
        block: BlockInfo,
        sender: &Addr,
        msg: InstantiateMsg,
    ) -> Result<Self, ContractError> {
        let mut env = mock_env();
        env.block = block;
        let mut state = ChainState {
            storage: MemoryStorage::new(),
            api: MockApi::default(),
            env,
            txs: 0,
        };
        let querier = MockQuerier::new(&[]);
        let env = state.env.clone();
        contract::instantiate(state.deps_mut(&querier), env, message_info(sender, &[]), msg)?;
        state.next_block();
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Deterministic account address for `label`.
    pub fn addr(label: &str) -> Addr {
        MockApi::default().addr_make(label)
    }

    pub fn contract_address(&self) -> Addr {
        self.lock().env.contract.address.clone()
    }

    pub fn block(&self) -> BlockInfo {
        self.lock().env.block.clone()
    }

    pub fn block_time(&self) -> Timestamp {
        self.block().time
    }

    /// Number of transactions executed, failed ones included.
    pub fn tx_count(&self) -> u64 {
        self.lock().txs
    }

    /// Runs one transaction. State changes only persist on success.
    pub fn execute(&self, sender: &Addr, msg: ExecuteMsg) -> Result<Response, ContractError> {
        let mut state = self.lock();
        state.txs += 1;
        let env = state.env.clone();
        let querier = MockQuerier::new(&[]);

        let snapshot: Vec<Record> = state.storage.range(None, None, Order::Ascending).collect();
        let res = contract::execute(state.deps_mut(&querier), env, message_info(sender, &[]), msg);
        if res.is_err() {
            // Failed transactions leave no writes behind
            let mut storage = MemoryStorage::new();
            for (key, value) in snapshot {
                storage.set(&key, &value);
            }
            state.storage = storage;
        }
        state.next_block();
        res
    }

    pub fn query_raw(&self, msg: &QueryMsg) -> StdResult<Binary> {
        let state = self.lock();
        let querier = MockQuerier::new(&[]);
        contract::query(state.deps(&querier), state.env.clone(), msg.clone())
    }

    pub fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> StdResult<T> {
        from_json(self.query_raw(msg)?)
    }

    /// Query result as untyped JSON, the shape an external client sees.
    pub fn query_json(&self, msg: &QueryMsg) -> StdResult<serde_json::Value> {
        let raw = self.query_raw(msg)?;
        serde_json::from_slice(raw.as_slice()).map_err(|e| StdError::generic_err(e.to_string()))
    }

    /// A client that signs as `sender`.
    pub fn client(&self, sender: &Addr) -> LocalClient {
        LocalClient {
            chain: self.clone(),
            address: self.contract_address().to_string(),
            sender: sender.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// [`RegistryClient`] over a [`LocalChain`].
#[derive(Clone)]
pub struct LocalClient {
    chain: LocalChain,
    address: String,
    sender: String,
}

impl LocalClient {
    fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> Result<T, ClientError> {
        self.chain
            .query(&msg)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RegistryClient for LocalClient {
    fn address(&self) -> &str {
        &self.address
    }

    fn sender(&self) -> &str {
        &self.sender
    }

    async fn query_config(&self) -> Result<Config, ClientError> {
        self.query(QueryMsg::Config {})
    }

    async fn query_beacon(&self, round: u64) -> Result<Option<QueriedBeacon>, ClientError> {
        let res: BeaconResponse = self.query(QueryMsg::Beacon { round })?;
        Ok(res.beacon)
    }

    async fn query_latest_round(&self) -> Result<Option<u64>, ClientError> {
        let res: LatestRoundResponse = self.query(QueryMsg::LatestRound {})?;
        Ok(res.round)
    }

    async fn query_bot(&self, address: &str) -> Result<Option<QueriedBot>, ClientError> {
        let res: BotResponse = self.query(QueryMsg::Bot {
            address: address.to_string(),
        })?;
        Ok(res.bot)
    }

    async fn execute(&self, msg: ExecuteMsg) -> Result<ExecutionResult, ClientError> {
        let sender = Addr::unchecked(&self.sender);
        match self.chain.execute(&sender, msg) {
            Ok(_) => Ok(ExecutionResult {
                // No metering in process
                gas_used: 0,
                gas_wanted: GAS_WANTED,
                tx_hash: None,
            }),
            Err(e) => Err(ClientError::Rejected(Rejection::classify(&e.to_string()))),
        }
    }
}
