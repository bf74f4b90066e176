use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{HexBinary, Uint128};
use drand_common::DrandNetwork;

use crate::incentives::IncentiveAccount;
use crate::state::{Config, QueriedBeacon, QueriedBot};

#[cw_serde]
pub struct InstantiateMsg {
    pub manager: String,
    /// The lowest drand round accepted for verification and storage
    pub min_round: u64,
    pub incentive_point_price: Uint128,
    pub incentive_denom: String,
    /// Defaults to drand mainnet
    pub network: Option<DrandNetwork>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register the sender as a bot.
    Register { moniker: String },
    /// Submit a drand round for verification and storage. Randomness is
    /// derived from the signature, never submitted.
    SubmitRound {
        round: u64,
        signature: HexBinary,
        /// Empty on unchained networks
        #[serde(default)]
        previous_signature: HexBinary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},

    #[returns(BeaconResponse)]
    Beacon { round: u64 },

    /// Verified beacons in ascending round order
    #[returns(BeaconsResponse)]
    BeaconsAsc {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    /// Verified beacons in descending round order
    #[returns(BeaconsResponse)]
    BeaconsDesc {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(LatestRoundResponse)]
    LatestRound {},

    #[returns(BotResponse)]
    Bot { address: String },

    /// Registered bots ordered by address
    #[returns(BotsResponse)]
    Bots {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(IncentiveResponse)]
    Incentive { address: String },

    #[returns(IncentiveTotalResponse)]
    IncentiveTotal {},
}

#[cw_serde]
pub struct BeaconResponse {
    pub beacon: Option<QueriedBeacon>,
}

#[cw_serde]
pub struct BeaconsResponse {
    pub beacons: Vec<QueriedBeacon>,
}

#[cw_serde]
pub struct LatestRoundResponse {
    pub round: Option<u64>,
}

#[cw_serde]
pub struct BotResponse {
    pub bot: Option<QueriedBot>,
}

#[cw_serde]
pub struct BotsResponse {
    pub bots: Vec<QueriedBot>,
}

#[cw_serde]
pub struct IncentiveResponse {
    pub account: Option<IncentiveAccount>,
}

#[cw_serde]
pub struct IncentiveTotalResponse {
    pub total: Uint128,
    pub denom: String,
}
