use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, HexBinary, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use drand_common::DrandNetwork;

pub const CONFIG: Item<Config> = Item::new("config");
/// round => {verified, randomness}
pub const BEACONS: Map<u64, VerifiedBeacon> = Map::new("beacons");
/// Highest verified round
pub const LATEST_ROUND: Item<u64> = Item::new("latest_round");
pub const BOTS: Map<&Addr, Bot> = Map::new("bots");

#[cw_serde]
pub struct Config {
    /// Manager of this registry instance. Informational only, no operation
    /// checks it.
    pub manager: Addr,
    /// The lowest drand round this contract accepts for verification and storage
    pub min_round: u64,
    /// Incentive credited per first submission of a round
    pub incentive_point_price: Uint128,
    /// Bot incentive denom
    pub incentive_denom: String,
    /// The drand chain beacons are verified against
    pub network: DrandNetwork,
}

#[cw_serde]
pub struct VerifiedBeacon {
    /// Block time at which the round was committed
    pub verified: Timestamp,
    /// The sha256(signature) in lower case hex
    pub randomness: HexBinary,
}

/// Like [`VerifiedBeacon`] but with round and publish time
#[cw_serde]
pub struct QueriedBeacon {
    pub round: u64,
    pub published: Timestamp,
    pub verified: Timestamp,
    /// The sha256(signature) in lower case hex
    pub randomness: HexBinary,
}

impl QueriedBeacon {
    pub fn make(beacon: VerifiedBeacon, round: u64, network: &DrandNetwork) -> Self {
        Self {
            round,
            published: network.time_of_round(round),
            verified: beacon.verified,
            randomness: beacon.randomness,
        }
    }
}

/// The address is the storage key.
#[cw_serde]
pub struct Bot {
    pub moniker: String,
    /// Number of rounds this bot committed first
    pub rounds_added: u64,
    pub registered: Timestamp,
}

/// Like [`Bot`] but with address
#[cw_serde]
pub struct QueriedBot {
    pub moniker: String,
    pub address: Addr,
    pub rounds_added: u64,
    pub registered: Timestamp,
}

impl QueriedBot {
    pub fn make(bot: Bot, address: Addr) -> Self {
        Self {
            moniker: bot.moniker,
            address,
            rounds_added: bot.rounds_added,
            registered: bot.registered,
        }
    }
}
