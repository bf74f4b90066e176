use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cosmwasm_std::Timestamp;
use drand_common::{derive_randomness, Beacon};
use drand_registry::msg::ExecuteMsg;
use drand_registry::state::{Config, QueriedBot};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::client::{ExecutionResult, RegistryClient};
use crate::error::{BotError, ClientError, FetchError, Rejection};
use crate::retry::RetryPolicy;
use crate::source::BeaconSource;

/// Wall clock used to work out the current drand round.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fetch_timeout: Duration,
    pub submit_timeout: Duration,
    pub retry: RetryPolicy,
    /// Gap beyond which the bot jumps straight to the current round
    pub max_gap: u64,
    /// Rounds in flight at once while catching up
    pub concurrency: usize,
    /// Pause after a failed loop iteration
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            submit_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_gap: 10,
            concurrency: 4,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Picks the round to submit next.
///
/// Advances one past the highest verified round (or starts at `min_round`),
/// jumps to `current` when more than `max_gap` rounds are missing, and
/// returns `None` once the registry has caught up with the network.
pub fn plan_next_round(
    latest_verified: Option<u64>,
    current: u64,
    min_round: u64,
    max_gap: u64,
) -> Option<u64> {
    let next = latest_verified
        .map(|latest| latest.saturating_add(1))
        .unwrap_or(min_round)
        .max(min_round)
        .max(1);
    if next > current {
        return None;
    }
    if current - next > max_gap {
        Some(current)
    } else {
        Some(next)
    }
}

fn system_clock() -> Timestamp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    Timestamp::from_nanos(nanos)
}

/// Relays drand beacons from a [`BeaconSource`] into a registry.
pub struct Bot<C, S> {
    client: C,
    source: S,
    settings: Settings,
    config: Config,
    /// Highest round this bot has seen committed. Never ahead of the registry.
    cursor: AtomicU64,
    clock: Clock,
}

impl<C, S> Bot<C, S>
where
    C: RegistryClient,
    S: BeaconSource,
{
    /// Binds to a registry, proving the address answers the config query.
    pub async fn connect(client: C, source: S, settings: Settings) -> Result<Self, BotError> {
        let connect_error = |reason: String| BotError::Connect {
            address: client.address().to_string(),
            reason,
        };
        let config = match tokio::time::timeout(settings.submit_timeout, client.query_config())
            .await
        {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => return Err(connect_error(e.to_string())),
            Err(_) => return Err(connect_error("config query timed out".to_string())),
        };

        info!(
            registry = client.address(),
            chain_hash = %config.network.chain_hash,
            scheme = %config.network.scheme,
            min_round = config.min_round,
            "connected to registry"
        );

        Ok(Self {
            client,
            source,
            settings,
            config,
            cursor: AtomicU64::new(0),
            clock: Arc::new(system_clock),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Highest round this bot submitted successfully, 0 if none.
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::SeqCst)
    }

    pub async fn register(&self, moniker: &str) -> Result<ExecutionResult, BotError> {
        let msg = ExecuteMsg::Register {
            moniker: moniker.to_string(),
        };
        let attempts = AtomicU32::new(0);
        match self.execute_counted("register", msg, &attempts).await {
            Ok(result) => {
                info!(
                    moniker,
                    gas_used = result.gas_used,
                    gas_wanted = result.gas_wanted,
                    "registered bot"
                );
                Ok(result)
            }
            Err(ClientError::Rejected(Rejection::AlreadyRegistered))
                if attempts.load(Ordering::SeqCst) > 1 =>
            {
                // An earlier attempt may have landed before its reply was lost
                match self.own_registration().await? {
                    Some(bot) if bot.moniker == moniker.trim() => {
                        info!(moniker, "registration landed on an earlier attempt");
                        Ok(ExecutionResult::default())
                    }
                    _ => Err(BotError::AlreadyRegistered),
                }
            }
            Err(ClientError::Rejected(Rejection::AlreadyRegistered)) => {
                Err(BotError::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn is_registered(&self) -> Result<bool, BotError> {
        Ok(self.own_registration().await?.is_some())
    }

    async fn own_registration(&self) -> Result<Option<QueriedBot>, ClientError> {
        let timeout = self.settings.submit_timeout;
        tokio::time::timeout(timeout, self.client.query_bot(self.client.sender()))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
    }

    /// Fetches `round` and submits it to the registry.
    pub async fn submit_round(&self, round: u64) -> Result<ExecutionResult, BotError> {
        let beacon = self
            .settings
            .retry
            .retry("fetch", || self.fetch_once(round), BotError::is_retryable)
            .await?;

        let msg = ExecuteMsg::SubmitRound {
            round,
            signature: beacon.signature,
            previous_signature: beacon.previous_signature,
        };
        let result = match self.execute_with_retry("submit_round", msg).await {
            Ok(result) => result,
            Err(ClientError::Rejected(Rejection::InvalidBeacon(reason))) => {
                error!(round, reason = %reason, "registry rejected beacon");
                return Err(BotError::RejectedBeacon { round, reason });
            }
            Err(ClientError::Rejected(Rejection::Unauthorized)) => {
                return Err(BotError::NotRegistered)
            }
            Err(e) => return Err(e.into()),
        };

        self.cursor.fetch_max(round, Ordering::SeqCst);
        info!(
            round,
            gas_used = result.gas_used,
            gas_wanted = result.gas_wanted,
            tx_hash = result.tx_hash.as_deref().unwrap_or("-"),
            "submitted round"
        );
        Ok(result)
    }

    /// Runs up to `settings.concurrency` round pipelines at once. Results come
    /// back in completion order.
    pub async fn submit_rounds(
        &self,
        rounds: Vec<u64>,
    ) -> Vec<(u64, Result<ExecutionResult, BotError>)> {
        stream::iter(rounds)
            .map(|round| async move { (round, self.submit_round(round).await) })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await
    }

    /// Keeps the registry up to date with the drand network until `shutdown`
    /// resolves. In-flight work is dropped on shutdown.
    ///
    /// Returns an error only for a rejected beacon or a missing registration.
    /// Any other failure is logged and the loop tries again after
    /// `poll_interval`.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), BotError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if !self.is_registered().await? {
            error!(sender = self.client.sender(), "bot is not registered");
            return Err(BotError::NotRegistered);
        }

        loop {
            let wait = tokio::select! {
                _ = &mut shutdown => {
                    info!(cursor = self.cursor(), "shutting down");
                    return Ok(());
                }
                step = self.step() => match step {
                    Ok(wait) => wait,
                    Err(e) if e.halts() => {
                        error!(error = %e, "halting");
                        return Err(e);
                    }
                    Err(e) => {
                        warn!(error = %e, "loop iteration failed");
                        self.settings.poll_interval
                    }
                },
            };

            if wait.is_zero() {
                continue;
            }
            tokio::select! {
                _ = &mut shutdown => {
                    info!(cursor = self.cursor(), "shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// One loop iteration. Returns how long to wait before the next one.
    async fn step(&self) -> Result<Duration, BotError> {
        let latest = tokio::time::timeout(
            self.settings.submit_timeout,
            self.client.query_latest_round(),
        )
        .await
        .map_err(|_| ClientError::Timeout(self.settings.submit_timeout))??;
        let latest = latest.max(Some(self.cursor()).filter(|c| *c > 0));

        let now = (self.clock)();
        let network = &self.config.network;
        let current = network.current_round(now);

        match plan_next_round(latest, current, self.config.min_round, self.settings.max_gap) {
            Some(round) => {
                if let Some(latest) = latest {
                    if round > latest + 1 {
                        info!(from = latest, to = round, "skipping ahead");
                    }
                }
                let batch: Vec<u64> = (round..=current).collect();
                if batch.len() > 1 {
                    debug!(from = round, to = current, "catching up");
                }
                let mut first_error = None;
                for (_, result) in self.submit_rounds(batch).await {
                    match result {
                        Err(e) if e.halts() => return Err(e),
                        Err(e) => {
                            first_error.get_or_insert(e);
                        }
                        Ok(_) => {}
                    }
                }
                first_error.map_or(Ok(Duration::ZERO), Err)
            }
            None => {
                let due = network.time_of_round(current.saturating_add(1).max(1));
                let wait = Duration::from_nanos(due.nanos().saturating_sub(now.nanos()));
                debug!(current, ?wait, "caught up");
                Ok(wait.max(Duration::from_millis(100)))
            }
        }
    }

    async fn fetch_once(&self, round: u64) -> Result<Beacon, BotError> {
        let beacon = tokio::time::timeout(self.settings.fetch_timeout, self.source.fetch(round))
            .await
            .map_err(|_| FetchError::Timeout(self.settings.fetch_timeout))??;

        if beacon.round != round {
            return Err(FetchError::Malformed {
                round,
                reason: format!("got round {}", beacon.round),
            }
            .into());
        }
        if beacon.randomness.as_slice() != derive_randomness(&beacon.signature).as_slice() {
            return Err(FetchError::Malformed {
                round,
                reason: "randomness does not match signature".to_string(),
            }
            .into());
        }
        Ok(beacon)
    }

    async fn execute_with_retry(
        &self,
        what: &str,
        msg: ExecuteMsg,
    ) -> Result<ExecutionResult, ClientError> {
        self.execute_counted(what, msg, &AtomicU32::new(0)).await
    }

    /// Like `execute_with_retry`, counting attempts into `attempts`.
    async fn execute_counted(
        &self,
        what: &str,
        msg: ExecuteMsg,
        attempts: &AtomicU32,
    ) -> Result<ExecutionResult, ClientError> {
        let timeout = self.settings.submit_timeout;
        self.settings
            .retry
            .retry(
                what,
                || {
                    let msg = msg.clone();
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async move {
                        tokio::time::timeout(timeout, self.client.execute(msg))
                            .await
                            .map_err(|_| ClientError::Timeout(timeout))?
                    }
                },
                ClientError::is_retryable,
            )
            .await
    }
}
