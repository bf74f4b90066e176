use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("bot {address} is already registered")]
    AlreadyRegistered { address: String },

    #[error("invalid moniker: {reason}")]
    InvalidMoniker { reason: String },

    #[error("invalid beacon: {reason}")]
    InvalidBeacon { reason: String },

    #[error("min_round must be at least 1")]
    InvalidMinRound,

    #[error("incentive denom must not be empty")]
    InvalidDenom,

    #[error("invalid drand network: {reason}")]
    InvalidNetwork { reason: String },
}
