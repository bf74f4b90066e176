use cosmwasm_schema::cw_serde;
use cosmwasm_std::{HexBinary, Timestamp};

/// League of Entropy mainnet public key (G1, 48 bytes).
/// Network: drand default chain (pedersen-bls-chained)
pub const MAINNET_PUBKEY_HEX: &str = "868f005eb8e6e4ca0a47c8a77ceaa5309a47978a7c71bc5cce96366b5d7a569937c529eeda66c7293784a9402801af31";
pub const MAINNET_CHAIN_HASH: &str =
    "8990e7a9aaed2ffed73dbd7092123d6f289930540d7651336225dc172e51b2ce";
pub const MAINNET_GENESIS_TIME: u64 = 1595431050;
pub const MAINNET_PERIOD_SECONDS: u64 = 30;

/// Quicknet public key (G2, 96 bytes).
/// Network: drand quicknet (bls-unchained-g1-rfc9380)
pub const QUICKNET_PUBKEY_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";
pub const QUICKNET_CHAIN_HASH: &str =
    "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971";
pub const QUICKNET_GENESIS_TIME: u64 = 1692803367;
pub const QUICKNET_PERIOD_SECONDS: u64 = 3;

/// The signing scheme of a drand chain. It fixes the curve the public key
/// lives on and the message each round signs (the chaining rule).
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Scheme {
    /// G1 public key, G2 signatures. Round `r` signs
    /// `sha256(previous_signature || r)`. Round 1 chains to the genesis seed.
    #[serde(rename = "pedersen-bls-chained")]
    Chained,
    /// G1 public key, G2 signatures. Round `r` signs `sha256(r)`.
    #[serde(rename = "pedersen-bls-unchained")]
    Unchained,
    /// G2 public key, G1 signatures, legacy hash-to-curve domain.
    #[serde(rename = "bls-unchained-on-g1")]
    UnchainedOnG1,
    /// G2 public key, G1 signatures, RFC 9380 hash-to-curve (quicknet).
    #[serde(rename = "bls-unchained-g1-rfc9380")]
    UnchainedG1Rfc9380,
}

impl Scheme {
    pub fn is_chained(&self) -> bool {
        matches!(self, Scheme::Chained)
    }

    /// Compressed public key length in bytes.
    pub fn pubkey_len(&self) -> usize {
        match self {
            Scheme::Chained | Scheme::Unchained => 48,
            Scheme::UnchainedOnG1 | Scheme::UnchainedG1Rfc9380 => 96,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Chained => "pedersen-bls-chained",
            Scheme::Unchained => "pedersen-bls-unchained",
            Scheme::UnchainedOnG1 => "bls-unchained-on-g1",
            Scheme::UnchainedG1Rfc9380 => "bls-unchained-g1-rfc9380",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the drand chain a registry verifies against.
#[cw_serde]
pub struct DrandNetwork {
    /// Chain hash identifying the drand network
    pub chain_hash: String,
    /// Group public key, compressed
    pub pubkey: HexBinary,
    pub scheme: Scheme,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between rounds in seconds
    pub period_seconds: u64,
    /// Previous signature of round 1 on chained networks
    pub genesis_seed: Option<HexBinary>,
}

impl DrandNetwork {
    pub fn mainnet() -> Self {
        Self {
            chain_hash: MAINNET_CHAIN_HASH.to_string(),
            pubkey: builtin_pubkey(MAINNET_PUBKEY_HEX),
            scheme: Scheme::Chained,
            genesis_time: MAINNET_GENESIS_TIME,
            period_seconds: MAINNET_PERIOD_SECONDS,
            genesis_seed: None,
        }
    }

    pub fn quicknet() -> Self {
        Self {
            chain_hash: QUICKNET_CHAIN_HASH.to_string(),
            pubkey: builtin_pubkey(QUICKNET_PUBKEY_HEX),
            scheme: Scheme::UnchainedG1Rfc9380,
            genesis_time: QUICKNET_GENESIS_TIME,
            period_seconds: QUICKNET_PERIOD_SECONDS,
            genesis_seed: None,
        }
    }

    /// Publish time of `round` as claimed by the network schedule:
    /// `genesis_time + (round - 1) * period`.
    pub fn time_of_round(&self, round: u64) -> Timestamp {
        let offset = round.saturating_sub(1).saturating_mul(self.period_seconds);
        Timestamp::from_seconds(self.genesis_time.saturating_add(offset))
    }

    /// The latest round published at or before `time`. Returns 0 before genesis.
    pub fn current_round(&self, time: Timestamp) -> u64 {
        let now = time.seconds();
        if now < self.genesis_time || self.period_seconds == 0 {
            return 0;
        }
        (now - self.genesis_time) / self.period_seconds + 1
    }
}

/// An undecodable constant yields an empty key, which `check_pubkey` rejects.
fn builtin_pubkey(hex: &str) -> HexBinary {
    HexBinary::from_hex(hex).unwrap_or_default()
}
