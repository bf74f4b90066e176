//! Integration tests for the drand registry and relay bot.
//!
//! The registry is driven two ways: through its entry points directly with
//! `cosmwasm_std::testing` mocks, and through [`LocalChain`], an in-process
//! chain the relay bot talks to via its `RegistryClient` interface.
//!
//! Run:
//! ```bash
//! cargo test -p drand-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env};
use cosmwasm_std::{from_json, HexBinary, Uint128};
use drand_bot::{Bot, BotError, Clock, RegistryClient, RetryPolicy, Settings};
use drand_common::network::{MAINNET_CHAIN_HASH, QUICKNET_CHAIN_HASH};
use drand_common::testing::{
    MAINNET_TEST_PREVIOUS_SIG_HEX, MAINNET_TEST_RANDOMNESS_HEX, MAINNET_TEST_ROUND,
    MAINNET_TEST_SIG_HEX, QUICKNET_TEST_RANDOMNESS_HEX, QUICKNET_TEST_ROUND,
};
use drand_common::DrandNetwork;
use drand_integration_tests::local_chain::GAS_WANTED;
use drand_integration_tests::{ForgedSource, LocalChain, LocalClient, VectorSource};
use drand_registry::msg::{
    BotResponse, ExecuteMsg, IncentiveResponse, IncentiveTotalResponse, InstantiateMsg,
    LatestRoundResponse, QueryMsg,
};
use serde_json::{json, Value};

// ─── Helpers ───

fn quicknet_instantiate_msg(min_round: u64, price: &str) -> InstantiateMsg {
    let manager = LocalChain::addr("manager");
    serde_json::from_value(json!({
        "manager": manager.to_string(),
        "min_round": min_round,
        "incentive_point_price": price,
        "incentive_denom": "unois",
        "network": DrandNetwork::quicknet(),
    }))
    .unwrap()
}

fn setup_chain(min_round: u64, price: &str) -> LocalChain {
    LocalChain::instantiate(
        &LocalChain::addr("manager"),
        quicknet_instantiate_msg(min_round, price),
    )
    .unwrap()
}

fn fast_settings() -> Settings {
    Settings {
        fetch_timeout: Duration::from_millis(500),
        submit_timeout: Duration::from_millis(500),
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        max_gap: 10,
        concurrency: 2,
        poll_interval: Duration::from_millis(5),
    }
}

async fn quicknet_bot(chain: &LocalChain, name: &str) -> Bot<LocalClient, VectorSource> {
    let client = chain.client(&LocalChain::addr(name));
    Bot::connect(client, VectorSource::new(QUICKNET_CHAIN_HASH), fast_settings())
        .await
        .unwrap()
}

/// Clock pinned to the publish time of a quicknet round.
fn quicknet_clock(round: u64) -> Clock {
    let now = DrandNetwork::quicknet().time_of_round(round);
    Arc::new(move || now)
}

fn balance_of(chain: &LocalChain, name: &str) -> Option<Uint128> {
    let res: IncentiveResponse = chain
        .query(&QueryMsg::Incentive {
            address: LocalChain::addr(name).to_string(),
        })
        .unwrap();
    res.account.map(|account| account.balance)
}

fn assert_nanosecond_timestamp(value: &Value) {
    let s = value.as_str().expect("timestamp is a string");
    assert_eq!(s.len(), 19, "{}", s);
    assert!(s.starts_with('1'), "{}", s);
    assert!(s.chars().all(|c| c.is_ascii_digit()), "{}", s);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_bot_submits_round() {
    let chain = setup_chain(990, "0");

    // 1. Nothing stored yet
    let before = chain
        .query_json(&QueryMsg::Beacon {
            round: QUICKNET_TEST_ROUND,
        })
        .unwrap();
    assert_eq!(before, json!({ "beacon": null }));

    // 2. Register bot "joe"
    let bot = quicknet_bot(&chain, "joe").await;
    bot.register("joe").await.unwrap();
    assert!(bot.is_registered().await.unwrap());

    // 3. Submit round 1000
    let result = bot.submit_round(QUICKNET_TEST_ROUND).await.unwrap();
    assert_eq!(result.gas_wanted, GAS_WANTED);
    assert!(result.gas_used <= result.gas_wanted);
    assert_eq!(bot.cursor(), QUICKNET_TEST_ROUND);

    // 4. Stored beacon as an external client sees it
    let after = chain
        .query_json(&QueryMsg::Beacon {
            round: QUICKNET_TEST_ROUND,
        })
        .unwrap();
    let beacon = &after["beacon"];
    assert_eq!(beacon["round"], json!(QUICKNET_TEST_ROUND));
    assert_eq!(beacon["published"], json!("1692806364000000000"));
    assert_nanosecond_timestamp(&beacon["verified"]);
    assert_eq!(beacon["randomness"], json!(QUICKNET_TEST_RANDOMNESS_HEX));

    let latest: LatestRoundResponse = chain.query(&QueryMsg::LatestRound {}).unwrap();
    assert_eq!(latest.round, Some(QUICKNET_TEST_ROUND));

    let bot_info: BotResponse = chain
        .query(&QueryMsg::Bot {
            address: LocalChain::addr("joe").to_string(),
        })
        .unwrap();
    let bot_info = bot_info.bot.unwrap();
    assert_eq!(bot_info.moniker, "joe");
    assert_eq!(bot_info.rounds_added, 1);
}

#[test]
fn test_end_to_end_mainnet_entry_points() {
    let mut deps = mock_dependencies();
    let manager = deps.api.addr_make("manager");
    let joe = deps.api.addr_make("joe");

    // 1. Instantiate against the default network (drand mainnet)
    let msg: InstantiateMsg = serde_json::from_value(json!({
        "manager": manager.to_string(),
        "min_round": MAINNET_TEST_ROUND - 5,
        "incentive_point_price": "0",
        "incentive_denom": "unois",
    }))
    .unwrap();
    drand_registry::contract::instantiate(
        deps.as_mut(),
        mock_env(),
        message_info(&manager, &[]),
        msg,
    )
    .unwrap();

    // 2. Query before submission
    let query_msg = QueryMsg::Beacon {
        round: MAINNET_TEST_ROUND,
    };
    let res =
        drand_registry::contract::query(deps.as_ref(), mock_env(), query_msg.clone()).unwrap();
    let value: Value = from_json(res).unwrap();
    assert_eq!(value, json!({ "beacon": null }));

    // 3. Register and submit the chained round
    drand_registry::contract::execute(
        deps.as_mut(),
        mock_env(),
        message_info(&joe, &[]),
        ExecuteMsg::Register {
            moniker: "joe".to_string(),
        },
    )
    .unwrap();
    let res = drand_registry::contract::execute(
        deps.as_mut(),
        mock_env(),
        message_info(&joe, &[]),
        ExecuteMsg::SubmitRound {
            round: MAINNET_TEST_ROUND,
            signature: HexBinary::from_hex(MAINNET_TEST_SIG_HEX).unwrap(),
            previous_signature: HexBinary::from_hex(MAINNET_TEST_PREVIOUS_SIG_HEX).unwrap(),
        },
    )
    .unwrap();
    assert_eq!(res.events.len(), 1);
    assert_eq!(res.events[0].ty, "drand_round_added");

    // 4. Query after submission
    let res = drand_registry::contract::query(deps.as_ref(), mock_env(), query_msg).unwrap();
    let value: Value = from_json(res).unwrap();
    let beacon = &value["beacon"];
    assert_eq!(beacon["published"], json!("1597614570000000000"));
    assert_nanosecond_timestamp(&beacon["verified"]);
    assert_eq!(beacon["randomness"], json!(MAINNET_TEST_RANDOMNESS_HEX));

    eprintln!("test_end_to_end_mainnet_entry_points passed");
}

#[test]
fn test_published_time_mainnet() {
    let network = DrandNetwork::mainnet();
    assert_eq!(network.chain_hash, MAINNET_CHAIN_HASH);
    assert_eq!(
        network.time_of_round(2183666).nanos().to_string(),
        "1660941000000000000"
    );
}

#[tokio::test]
async fn test_two_bots_same_round_single_credit() {
    let chain = setup_chain(990, "250");

    let joe = quicknet_bot(&chain, "joe").await;
    let ann = quicknet_bot(&chain, "ann").await;
    joe.register("joe").await.unwrap();
    ann.register("ann").await.unwrap();

    // Both submit the same round; both observe success
    let (a, b) = tokio::join!(
        joe.submit_round(QUICKNET_TEST_ROUND),
        ann.submit_round(QUICKNET_TEST_ROUND)
    );
    a.unwrap();
    b.unwrap();

    let joe_balance = balance_of(&chain, "joe").unwrap();
    let ann_balance = balance_of(&chain, "ann").unwrap();
    assert_eq!(joe_balance + ann_balance, Uint128::new(250));
    assert!(joe_balance.is_zero() || ann_balance.is_zero());

    let total: IncentiveTotalResponse = chain.query(&QueryMsg::IncentiveTotal {}).unwrap();
    assert_eq!(total.total, Uint128::new(250));
    assert_eq!(total.denom, "unois");
}

#[tokio::test]
async fn test_unregistered_bot_is_rejected() {
    let chain = setup_chain(990, "250");
    let bot = quicknet_bot(&chain, "mallory").await;

    let txs = chain.tx_count();
    let err = bot.submit_round(QUICKNET_TEST_ROUND).await.unwrap_err();
    assert!(matches!(err, BotError::NotRegistered), "{}", err);
    assert!(!err.is_retryable());
    assert_eq!(chain.tx_count(), txs + 1);

    // Chain state unchanged
    let value = chain
        .query_json(&QueryMsg::Beacon {
            round: QUICKNET_TEST_ROUND,
        })
        .unwrap();
    assert_eq!(value, json!({ "beacon": null }));
    assert_eq!(balance_of(&chain, "mallory"), None);

    // The run loop refuses to start
    let err = bot.run(std::future::pending()).await.unwrap_err();
    assert!(matches!(err, BotError::NotRegistered));
}

#[tokio::test]
async fn test_register_twice() {
    let chain = setup_chain(990, "0");
    let bot = quicknet_bot(&chain, "joe").await;

    bot.register("joe").await.unwrap();
    let err = bot.register("joe again").await.unwrap_err();
    assert!(matches!(err, BotError::AlreadyRegistered), "{}", err);

    let bot_info: BotResponse = chain
        .query(&QueryMsg::Bot {
            address: LocalChain::addr("joe").to_string(),
        })
        .unwrap();
    assert_eq!(bot_info.bot.unwrap().moniker, "joe");
}

#[tokio::test]
async fn test_connect_checks_registry_surface() {
    let chain = setup_chain(990, "0");
    let bot = quicknet_bot(&chain, "joe").await;
    assert_eq!(bot.config().min_round, 990);
    assert_eq!(bot.config().network, DrandNetwork::quicknet());
    assert_eq!(bot.client().address(), chain.contract_address().as_str());
}

#[tokio::test]
async fn test_run_loop_submits_current_round() {
    let chain = setup_chain(QUICKNET_TEST_ROUND, "10");
    let bot = quicknet_bot(&chain, "joe")
        .await
        .with_clock(quicknet_clock(QUICKNET_TEST_ROUND));
    bot.register("joe").await.unwrap();

    let watcher = chain.clone();
    let shutdown = async move {
        loop {
            let latest: LatestRoundResponse = watcher.query(&QueryMsg::LatestRound {}).unwrap();
            if latest.round == Some(QUICKNET_TEST_ROUND) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), bot.run(shutdown))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(bot.cursor(), QUICKNET_TEST_ROUND);
    assert_eq!(balance_of(&chain, "joe"), Some(Uint128::new(10)));
}

#[tokio::test]
async fn test_invalid_beacon_halts_run_loop() {
    let chain = setup_chain(999, "10");
    let client = chain.client(&LocalChain::addr("joe"));
    let bot = Bot::connect(client, ForgedSource, fast_settings())
        .await
        .unwrap()
        .with_clock(quicknet_clock(QUICKNET_TEST_ROUND));
    bot.register("joe").await.unwrap();

    // Round 999 carries round 1000's signature and fails verification
    let err = tokio::time::timeout(Duration::from_secs(10), bot.run(std::future::pending()))
        .await
        .unwrap()
        .unwrap_err();
    match err {
        BotError::RejectedBeacon { round, reason } => {
            assert_eq!(round, 999);
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected error: {}", other),
    }

    let latest: LatestRoundResponse = chain.query(&QueryMsg::LatestRound {}).unwrap();
    assert_eq!(latest.round, None);
    assert_eq!(balance_of(&chain, "joe"), Some(Uint128::zero()));
}

#[test]
fn test_failed_transaction_leaves_no_writes() {
    let chain = setup_chain(990, "0");
    let joe = LocalChain::addr("joe");

    let err = chain
        .execute(
            &joe,
            ExecuteMsg::Register {
                moniker: "   ".to_string(),
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("invalid moniker"));

    let bot_info: BotResponse = chain
        .query(&QueryMsg::Bot {
            address: joe.to_string(),
        })
        .unwrap();
    assert!(bot_info.bot.is_none());

    // Blocks advance per transaction, failed ones included
    let height = chain.block().height;
    chain
        .execute(
            &joe,
            ExecuteMsg::Register {
                moniker: "joe".to_string(),
            },
        )
        .unwrap();
    assert_eq!(chain.block().height, height + 1);
}
