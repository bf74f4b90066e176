use cosmwasm_schema::cw_serde;
use cosmwasm_std::HexBinary;

use crate::verify::derive_randomness;

/// A drand beacon as published by the network.
#[cw_serde]
pub struct Beacon {
    pub round: u64,
    /// sha256(signature), 32 bytes
    pub randomness: HexBinary,
    pub signature: HexBinary,
    /// Empty on unchained networks
    pub previous_signature: HexBinary,
}

impl Beacon {
    /// Builds a beacon whose randomness is derived from the signature.
    pub fn from_signature(
        round: u64,
        signature: HexBinary,
        previous_signature: HexBinary,
    ) -> Self {
        Self {
            round,
            randomness: HexBinary::from(derive_randomness(&signature).as_slice()),
            signature,
            previous_signature,
        }
    }
}
