use drand_verify::{G1Pubkey, G2PubkeyFastnet, G2PubkeyRfc, Pubkey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::network::{DrandNetwork, Scheme};
use crate::types::Beacon;

/// Errors from beacon verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("round {round} is below the minimum round {min_round}")]
    RoundBelowMinimum { round: u64, min_round: u64 },

    #[error("randomness does not match sha256(signature)")]
    RandomnessMismatch,

    #[error("previous signature must be empty for scheme {scheme}")]
    UnexpectedPreviousSignature { scheme: Scheme },

    #[error("previous signature is required for scheme {scheme}")]
    MissingPreviousSignature { scheme: Scheme },

    #[error("previous signature of round 1 must be the genesis seed")]
    GenesisSeedMismatch,

    #[error("invalid pubkey length: expected {expected} bytes, got {got}")]
    InvalidPubkeyLength { expected: usize, got: usize },

    #[error("invalid pubkey (failed to parse curve point)")]
    InvalidPubkey,

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("invalid BLS signature")]
    InvalidSignature,
}

/// Derive randomness: sha256(signature).
pub fn derive_randomness(signature: &[u8]) -> [u8; 32] {
    Sha256::digest(signature).into()
}

/// Full verification of a published beacon.
///
/// Checks the round floor, that `randomness = sha256(signature)`, and the BLS
/// signature under the network key and chaining rule. Returns the 32-byte
/// randomness on success. Pure: no state, safe to call repeatedly.
pub fn verify_beacon(
    beacon: &Beacon,
    network: &DrandNetwork,
    min_round: u64,
) -> Result<[u8; 32], VerifyError> {
    // drand rounds start at 1
    let floor = min_round.max(1);
    if beacon.round < floor {
        return Err(VerifyError::RoundBelowMinimum {
            round: beacon.round,
            min_round: floor,
        });
    }

    let randomness = derive_randomness(&beacon.signature);
    if beacon.randomness.as_slice() != randomness.as_slice() {
        return Err(VerifyError::RandomnessMismatch);
    }

    verify_signature(
        network,
        beacon.round,
        &beacon.previous_signature,
        &beacon.signature,
    )?;
    Ok(randomness)
}

/// Checks the BLS signature of `round` against the network public key.
///
/// Chained networks sign `sha256(previous_signature || round)`, so the
/// previous signature must be present; round 1 must present the genesis seed
/// when the network defines one. Unchained networks sign `sha256(round)` and
/// reject a non-empty previous signature.
pub fn verify_signature(
    network: &DrandNetwork,
    round: u64,
    previous_signature: &[u8],
    signature: &[u8],
) -> Result<(), VerifyError> {
    let scheme = network.scheme;
    if scheme.is_chained() {
        if previous_signature.is_empty() {
            return Err(VerifyError::MissingPreviousSignature { scheme });
        }
        if let (1, Some(seed)) = (round, &network.genesis_seed) {
            if seed.as_slice() != previous_signature {
                return Err(VerifyError::GenesisSeedMismatch);
            }
        }
    } else if !previous_signature.is_empty() {
        return Err(VerifyError::UnexpectedPreviousSignature { scheme });
    }

    let pubkey = network.pubkey.as_slice();
    let verified = match scheme {
        Scheme::Chained | Scheme::Unchained => G1Pubkey::from_fixed(fixed_pubkey(pubkey)?)
            .map_err(|_| VerifyError::InvalidPubkey)?
            .verify(round, previous_signature, signature),
        Scheme::UnchainedOnG1 => G2PubkeyFastnet::from_fixed(fixed_pubkey(pubkey)?)
            .map_err(|_| VerifyError::InvalidPubkey)?
            .verify(round, previous_signature, signature),
        Scheme::UnchainedG1Rfc9380 => G2PubkeyRfc::from_fixed(fixed_pubkey(pubkey)?)
            .map_err(|_| VerifyError::InvalidPubkey)?
            .verify(round, previous_signature, signature),
    };

    let is_valid = verified.map_err(|e| VerifyError::VerificationFailed(format!("{:?}", e)))?;
    if !is_valid {
        return Err(VerifyError::InvalidSignature);
    }
    Ok(())
}

/// Validates the shape of a network's public key without verifying anything.
pub fn check_pubkey(network: &DrandNetwork) -> Result<(), VerifyError> {
    let pubkey = network.pubkey.as_slice();
    match network.scheme {
        Scheme::Chained | Scheme::Unchained => G1Pubkey::from_fixed(fixed_pubkey(pubkey)?)
            .map(|_| ())
            .map_err(|_| VerifyError::InvalidPubkey),
        Scheme::UnchainedOnG1 => G2PubkeyFastnet::from_fixed(fixed_pubkey(pubkey)?)
            .map(|_| ())
            .map_err(|_| VerifyError::InvalidPubkey),
        Scheme::UnchainedG1Rfc9380 => G2PubkeyRfc::from_fixed(fixed_pubkey(pubkey)?)
            .map(|_| ())
            .map_err(|_| VerifyError::InvalidPubkey),
    }
}

fn fixed_pubkey<const N: usize>(pubkey: &[u8]) -> Result<[u8; N], VerifyError> {
    pubkey
        .try_into()
        .map_err(|_| VerifyError::InvalidPubkeyLength {
            expected: N,
            got: pubkey.len(),
        })
}
