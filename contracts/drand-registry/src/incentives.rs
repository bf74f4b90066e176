//! Per-bot incentive ledger.
//!
//! Balances only grow: an account is opened at zero on registration and
//! credited on the first commit of a round. The running total always equals
//! `incentive_point_price * number of verified rounds`.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;

pub const INCENTIVES: Map<&Addr, Uint128> = Map::new("incentives");
pub const INCENTIVE_TOTAL: Item<Uint128> = Item::new("incentive_total");

#[cw_serde]
pub struct IncentiveAccount {
    pub address: Addr,
    pub balance: Uint128,
    pub denom: String,
}

pub fn open_account(storage: &mut dyn Storage, bot: &Addr) -> StdResult<()> {
    INCENTIVES.save(storage, bot, &Uint128::zero())
}

/// Credits `amount` to `bot` and returns the new balance.
pub fn credit(
    storage: &mut dyn Storage,
    bot: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let balance = INCENTIVES
        .may_load(storage, bot)?
        .unwrap_or_default()
        .checked_add(amount)?;
    INCENTIVES.save(storage, bot, &balance)?;

    let total = INCENTIVE_TOTAL
        .may_load(storage)?
        .unwrap_or_default()
        .checked_add(amount)?;
    INCENTIVE_TOTAL.save(storage, &total)?;

    Ok(balance)
}

pub fn balance(storage: &dyn Storage, bot: &Addr) -> StdResult<Option<Uint128>> {
    INCENTIVES.may_load(storage, bot)
}

pub fn total(storage: &dyn Storage) -> StdResult<Uint128> {
    Ok(INCENTIVE_TOTAL.may_load(storage)?.unwrap_or_default())
}
