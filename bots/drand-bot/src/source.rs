//! Fetching beacons from drand HTTP endpoints.

use std::time::Duration;

use async_trait::async_trait;
use cosmwasm_std::HexBinary;
use drand_common::Beacon;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;

/// Anything that can hand out drand beacons by round.
#[async_trait]
pub trait BeaconSource: Send + Sync {
    async fn fetch(&self, round: u64) -> Result<Beacon, FetchError>;
}

/// Body of `GET {endpoint}/{chain_hash}/public/{round}`.
#[derive(Debug, Deserialize)]
struct PublicRandResponse {
    round: u64,
    randomness: String,
    signature: String,
    #[serde(default)]
    previous_signature: String,
}

impl PublicRandResponse {
    fn into_beacon(self) -> Result<Beacon, FetchError> {
        let round = self.round;
        let decode = |field: &str, value: &str| {
            HexBinary::from_hex(value).map_err(|e| FetchError::Malformed {
                round,
                reason: format!("{}: {}", field, e),
            })
        };
        Ok(Beacon {
            round,
            randomness: decode("randomness", &self.randomness)?,
            signature: decode("signature", &self.signature)?,
            previous_signature: decode("previous_signature", &self.previous_signature)?,
        })
    }
}

/// Fetches beacons over HTTP, trying each endpoint in order.
pub struct HttpBeaconSource {
    endpoints: Vec<String>,
    chain_hash: String,
    timeout: Duration,
    client: Client,
}

impl HttpBeaconSource {
    pub fn new(
        endpoints: Vec<String>,
        chain_hash: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        if endpoints.is_empty() {
            return Err(FetchError::Unreachable("no drand endpoints configured".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        Ok(Self {
            endpoints: endpoints
                .into_iter()
                .map(|e| e.trim_end_matches('/').to_string())
                .collect(),
            chain_hash: chain_hash.into(),
            timeout,
            client,
        })
    }

    /// An empty chain hash addresses the endpoint's default chain.
    pub fn round_url(&self, endpoint: &str, round: u64) -> String {
        if self.chain_hash.is_empty() {
            format!("{}/public/{}", endpoint, round)
        } else {
            format!("{}/{}/public/{}", endpoint, self.chain_hash, round)
        }
    }

    async fn fetch_from(&self, endpoint: &str, round: u64) -> Result<Beacon, FetchError> {
        let url = self.round_url(endpoint, round);
        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Unreachable(e.to_string())
            }
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::TOO_EARLY => {
                return Err(FetchError::NotAvailable { round })
            }
            status if !status.is_success() => {
                return Err(FetchError::Unreachable(format!("{} returned {}", url, status)))
            }
            _ => {}
        }

        let body: PublicRandResponse = resp.json().await.map_err(|e| FetchError::Malformed {
            round,
            reason: e.to_string(),
        })?;
        body.into_beacon()
    }
}

#[async_trait]
impl BeaconSource for HttpBeaconSource {
    async fn fetch(&self, round: u64) -> Result<Beacon, FetchError> {
        let mut last_error = None;
        for endpoint in &self.endpoints {
            match self.fetch_from(endpoint, round).await {
                Ok(beacon) => return Ok(beacon),
                Err(e) => {
                    debug!(endpoint = %endpoint, round, error = %e, "drand endpoint failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FetchError::Unreachable("no drand endpoints".to_string())))
    }
}
