use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdResult};
use cw_storage_plus::Bound;

use crate::incentives::{self, IncentiveAccount};
use crate::msg::{
    BeaconResponse, BeaconsResponse, BotResponse, BotsResponse, IncentiveResponse,
    IncentiveTotalResponse, LatestRoundResponse,
};
use crate::state::{QueriedBeacon, QueriedBot, BEACONS, BOTS, CONFIG, LATEST_ROUND};

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_beacon(deps: Deps, round: u64) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let beacon = BEACONS
        .may_load(deps.storage, round)?
        .map(|beacon| QueriedBeacon::make(beacon, round, &config.network));
    to_json_binary(&BeaconResponse { beacon })
}

pub fn query_beacons(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
    order: Order,
) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let (min, max) = match order {
        Order::Ascending => (start_after.map(Bound::exclusive), None),
        Order::Descending => (None, start_after.map(Bound::exclusive)),
    };
    let beacons = BEACONS
        .range(deps.storage, min, max, order)
        .take(limit)
        .map(|item| item.map(|(round, beacon)| QueriedBeacon::make(beacon, round, &config.network)))
        .collect::<StdResult<Vec<_>>>()?;
    to_json_binary(&BeaconsResponse { beacons })
}

pub fn query_latest_round(deps: Deps) -> StdResult<Binary> {
    let round = LATEST_ROUND.may_load(deps.storage)?;
    to_json_binary(&LatestRoundResponse { round })
}

pub fn query_bot(deps: Deps, address: String) -> StdResult<Binary> {
    let address = deps.api.addr_validate(&address)?;
    let bot = BOTS
        .may_load(deps.storage, &address)?
        .map(|bot| QueriedBot::make(bot, address));
    to_json_binary(&BotResponse { bot })
}

pub fn query_bots(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let start = start_after
        .map(|address| deps.api.addr_validate(&address))
        .transpose()?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let bots = BOTS
        .range(
            deps.storage,
            start.as_ref().map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .take(limit)
        .map(|item| item.map(|(address, bot)| QueriedBot::make(bot, address)))
        .collect::<StdResult<Vec<_>>>()?;
    to_json_binary(&BotsResponse { bots })
}

pub fn query_incentive(deps: Deps, address: String) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let address = deps.api.addr_validate(&address)?;
    let account = incentives::balance(deps.storage, &address)?.map(|balance| IncentiveAccount {
        address,
        balance,
        denom: config.incentive_denom,
    });
    to_json_binary(&IncentiveResponse { account })
}

pub fn query_incentive_total(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let total = incentives::total(deps.storage)?;
    to_json_binary(&IncentiveTotalResponse {
        total,
        denom: config.incentive_denom,
    })
}
