use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Order, Response, StdResult, Uint128,
};
use cw2::set_contract_version;
use drand_common::verify::check_pubkey;
use drand_common::DrandNetwork;

use crate::error::ContractError;
use crate::execute;
use crate::incentives::INCENTIVE_TOTAL;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query;
use crate::state::{Config, CONFIG};

const CONTRACT_NAME: &str = "crates.io:drand-registry";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let manager = deps.api.addr_validate(&msg.manager)?;

    if msg.min_round == 0 {
        return Err(ContractError::InvalidMinRound);
    }
    if msg.incentive_denom.trim().is_empty() {
        return Err(ContractError::InvalidDenom);
    }

    let network = msg.network.unwrap_or_else(DrandNetwork::mainnet);
    if network.period_seconds == 0 {
        return Err(ContractError::InvalidNetwork {
            reason: "period must be positive".to_string(),
        });
    }
    check_pubkey(&network).map_err(|e| ContractError::InvalidNetwork {
        reason: e.to_string(),
    })?;

    let config = Config {
        manager: manager.clone(),
        min_round: msg.min_round,
        incentive_point_price: msg.incentive_point_price,
        incentive_denom: msg.incentive_denom,
        network,
    };

    CONFIG.save(deps.storage, &config)?;
    INCENTIVE_TOTAL.save(deps.storage, &Uint128::zero())?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "drand-registry")
        .add_attribute("manager", manager.to_string())
        .add_attribute("min_round", config.min_round.to_string())
        .add_attribute("chain_hash", config.network.chain_hash)
        .add_attribute("instantiator", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Register { moniker } => execute::register(deps, env, info, moniker),
        ExecuteMsg::SubmitRound {
            round,
            signature,
            previous_signature,
        } => execute::submit_round(deps, env, info, round, signature, previous_signature),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Beacon { round } => query::query_beacon(deps, round),
        QueryMsg::BeaconsAsc { start_after, limit } => {
            query::query_beacons(deps, start_after, limit, Order::Ascending)
        }
        QueryMsg::BeaconsDesc { start_after, limit } => {
            query::query_beacons(deps, start_after, limit, Order::Descending)
        }
        QueryMsg::LatestRound {} => query::query_latest_round(deps),
        QueryMsg::Bot { address } => query::query_bot(deps, address),
        QueryMsg::Bots { start_after, limit } => query::query_bots(deps, start_after, limit),
        QueryMsg::Incentive { address } => query::query_incentive(deps, address),
        QueryMsg::IncentiveTotal {} => query::query_incentive_total(deps),
    }
}
