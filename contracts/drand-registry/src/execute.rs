use cosmwasm_std::{DepsMut, Env, Event, HexBinary, MessageInfo, Response};
use drand_common::{verify_beacon, Beacon};

use crate::error::ContractError;
use crate::incentives;
use crate::state::{Bot, VerifiedBeacon, BEACONS, BOTS, CONFIG, LATEST_ROUND};

pub const MAX_MONIKER_LENGTH: usize = 64;

/// Register the sender as a bot. A registration is never overwritten.
pub fn register(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    moniker: String,
) -> Result<Response, ContractError> {
    let moniker = moniker.trim().to_string();
    if moniker.is_empty() {
        return Err(ContractError::InvalidMoniker {
            reason: "moniker must not be empty".to_string(),
        });
    }
    if moniker.len() > MAX_MONIKER_LENGTH {
        return Err(ContractError::InvalidMoniker {
            reason: format!("moniker exceeds {} bytes", MAX_MONIKER_LENGTH),
        });
    }

    if BOTS.has(deps.storage, &info.sender) {
        return Err(ContractError::AlreadyRegistered {
            address: info.sender.to_string(),
        });
    }

    let bot = Bot {
        moniker: moniker.clone(),
        rounds_added: 0,
        registered: env.block.time,
    };
    BOTS.save(deps.storage, &info.sender, &bot)?;
    incentives::open_account(deps.storage, &info.sender)?;

    Ok(Response::new()
        .add_attribute("action", "register")
        .add_attribute("bot", info.sender.to_string())
        .add_attribute("moniker", moniker))
}

/// Submit a drand round. Only registered bots can call this.
///
/// The beacon is BLS-verified before anything else. A round that is already
/// stored is a successful no-op and earns nothing; the first verified
/// submission stores the round and credits the submitter.
pub fn submit_round(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    round: u64,
    signature: HexBinary,
    previous_signature: HexBinary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    // Authorization: only registered bots
    let mut bot = BOTS
        .may_load(deps.storage, &info.sender)?
        .ok_or_else(|| ContractError::Unauthorized {
            reason: "only registered bots can submit rounds".to_string(),
        })?;

    let beacon = Beacon::from_signature(round, signature, previous_signature);
    let randomness = verify_beacon(&beacon, &config.network, config.min_round).map_err(|e| {
        ContractError::InvalidBeacon {
            reason: e.to_string(),
        }
    })?;

    if BEACONS.has(deps.storage, round) {
        return Ok(Response::new()
            .add_attribute("action", "submit_round")
            .add_attribute("round", round.to_string())
            .add_attribute("bot", info.sender.to_string())
            .add_attribute("outcome", "already_verified"));
    }

    let verified = VerifiedBeacon {
        verified: env.block.time,
        randomness: HexBinary::from(randomness.to_vec()),
    };
    BEACONS.save(deps.storage, round, &verified)?;

    // Update latest round if this is newer
    let current_latest = LATEST_ROUND.may_load(deps.storage)?.unwrap_or(0);
    if round > current_latest {
        LATEST_ROUND.save(deps.storage, &round)?;
    }

    bot.rounds_added += 1;
    BOTS.save(deps.storage, &info.sender, &bot)?;

    let reward = config.incentive_point_price;
    incentives::credit(deps.storage, &info.sender, reward)?;

    Ok(Response::new()
        .add_attribute("action", "submit_round")
        .add_attribute("round", round.to_string())
        .add_attribute("bot", info.sender.to_string())
        .add_attribute("outcome", "verified")
        .add_event(
            Event::new("drand_round_added")
                .add_attribute("round", round.to_string())
                .add_attribute("randomness", hex::encode(randomness))
                .add_attribute(
                    "published",
                    config.network.time_of_round(round).nanos().to_string(),
                )
                .add_attribute("verified", env.block.time.nanos().to_string())
                .add_attribute("bot", info.sender.to_string())
                .add_attribute("reward", format!("{}{}", reward, config.incentive_denom)),
        ))
}
