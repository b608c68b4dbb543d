mod common;

use common::*;
use sendflow::FlowError;
use sendflow::actions::Agent;
use sendflow::actions::builtin::DryRunAgent;
use sendflow::actions::catalog::{ACTION_DEFINITIONS, categories, get_action_label, is_token_based};
use sendflow::actions::params::{PLACEHOLDER_IMAGE_URL, PLACEHOLDER_NAME, PLACEHOLDER_TICKER, normalize_fields};
use sendflow::actions::presets::{StakeParams, SwapParams, execute_stake, execute_swap};
use sendflow::actions::registry::{ActionRegistry, RegistryConfig, is_failure_status};
use sendflow::actions::resolve::{MatchRule, find_action_by_name, resolve_in, to_snake, to_upper_snake};
use sendflow::actions::schema::{FieldKind, ParamSchema};
use serde_json::{Map, Value, json};
use std::sync::Arc;

fn config(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn rule_for(actions: &[Arc<dyn sendflow::actions::ActionHandler>], action_type: &str) -> Option<(String, MatchRule)> {
    resolve_in(actions, action_type).map(|(a, rule)| (a.name().to_string(), rule))
}

#[test]
fn test_catalog_labels() {
    assert_eq!(get_action_label("stakeWithJup"), "Stake with Jup");
    assert_eq!(get_action_label("notAnAction"), "notAnAction");
    assert!(is_token_based("fetchPrice"));
    assert!(!is_token_based("trade"));
    assert!(categories().contains(&"Jupiter"));

    let mut types: Vec<&str> = ACTION_DEFINITIONS.iter().map(|d| d.action_type).collect();
    types.sort();
    types.dedup();
    assert_eq!(types.len(), ACTION_DEFINITIONS.len());
}

#[test]
fn test_transliteration() {
    assert_eq!(to_upper_snake("stakeWithJup"), "STAKE_WITH_JUPITER");
    assert_eq!(to_upper_snake("launchPumpFunToken"), "LAUNCH_PUMPFUN_TOKEN");
    assert_eq!(to_upper_snake("fluxBeamCreatePool"), "FLUXBEAM_CREATE_POOL");
    assert_eq!(to_upper_snake("openbookCreateMarket"), "OPENBOOK_CREATE_MARKET");
    assert_eq!(to_upper_snake("getTPS"), "GET_TPS");
    assert_eq!(to_upper_snake("get_token_balance"), "GET_TOKEN_BALANCE");
    assert_eq!(to_snake("stakeWithJup"), "stake_with_jup");
    assert_eq!(to_snake("fetchPythPriceFeedID"), "fetch_pyth_price_feed_id");
}

#[test]
fn test_resolution_rule_order() {
    let actions = vec![
        named("STAKE_WITH_JUPITER"),
        named("transfer"),
        named("FETCH_PRICE"),
        named("launch_pump_fun_token"),
        with_similes("DEPLOY_TOKEN", &["getTokenByTicker"]),
        named("ORCA_CREATECLMM"),
    ];

    assert_eq!(
        rule_for(&actions, "stakeWithJup"),
        Some(("STAKE_WITH_JUPITER".to_string(), MatchRule::Override))
    );
    assert_eq!(
        rule_for(&actions, "transfer"),
        Some(("transfer".to_string(), MatchRule::CaseInsensitive))
    );
    assert_eq!(
        rule_for(&actions, "fetchPrice"),
        Some(("FETCH_PRICE".to_string(), MatchRule::UpperSnake))
    );
    assert_eq!(
        rule_for(&actions, "launchPumpFunToken"),
        Some(("launch_pump_fun_token".to_string(), MatchRule::Snake))
    );
    assert_eq!(
        rule_for(&actions, "getTokenByTicker"),
        Some(("DEPLOY_TOKEN".to_string(), MatchRule::Simile))
    );
    assert_eq!(
        rule_for(&actions, "orcaCreateClmm"),
        Some(("ORCA_CREATECLMM".to_string(), MatchRule::Normalized))
    );
    assert_eq!(rule_for(&actions, "sanctumGetLSTTVL"), None);
}

#[test]
fn test_earlier_rule_beats_earlier_action() {
    // An upper-snake hit listed first loses to a case-insensitive hit listed later
    let actions = vec![named("GET_TPS"), named("gettps")];
    assert_eq!(
        rule_for(&actions, "getTPS"),
        Some(("gettps".to_string(), MatchRule::CaseInsensitive))
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let agent = DryRunAgent::from_catalog();
    for def in ACTION_DEFINITIONS {
        let first = find_action_by_name(&agent, def.action_type).map(|a| a.name().to_string());
        let second = find_action_by_name(&agent, def.action_type).map(|a| a.name().to_string());
        assert!(first.is_some(), "{} did not resolve", def.action_type);
        assert_eq!(first, second);
    }
}

#[test]
fn test_registry_distinguishes_unknown_and_unavailable() {
    let registry = ActionRegistry::default();
    let agent = MockAgent::new(vec![named("TRADE")]);

    let err = registry.resolve(&agent, "teleportTokens").unwrap_err();
    assert!(matches!(err, FlowError::UnknownAction(_)));

    let err = registry.resolve(&agent, "stakeWithSolayer").unwrap_err();
    assert!(matches!(err, FlowError::ActionUnavailable(_)));
    assert!(err.to_string().contains("unavailable"));
}

#[test]
fn test_field_aliases() {
    let params = config(json!({ "desc": "memecoin", "ticker": "FLOW", "img": "a.png", "supply": 1000 }));
    let out = normalize_fields(params, None);

    let keys: Vec<&str> = out.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["description", "tokenTicker", "imageUrl", "supply"]);

    // Canonical values are never overwritten by an alias
    let params = config(json!({ "description": "kept", "details": "dropped" }));
    assert_eq!(normalize_fields(params, None)["description"], "kept");

    // An alias the schema asks for stays as is
    let schema = ParamSchema::required(&[("url", FieldKind::String)]);
    let params = config(json!({ "url": "https://example.com" }));
    assert!(normalize_fields(params, Some(&schema)).contains_key("url"));
}

#[test]
fn test_schema_separates_missing_and_invalid() {
    let schema = ParamSchema::required(&[
        ("name", FieldKind::String),
        ("amount", FieldKind::Number),
        ("decimals", FieldKind::Integer),
    ]);

    let errors = schema
        .validate(&config(json!({ "amount": "10", "decimals": 9 })))
        .unwrap_err();
    assert_eq!(errors.missing, vec!["name"]);
    assert_eq!(errors.invalid.len(), 1);
    assert!(errors.invalid[0].starts_with("amount"));
    assert!(!errors.only_missing());

    // Null is present but wrong, not missing
    let errors = schema
        .validate(&config(json!({ "name": null, "amount": 1, "decimals": 9 })))
        .unwrap_err();
    assert!(errors.missing.is_empty());
    assert_eq!(errors.invalid.len(), 1);
}

fn launch_action(log: &CallLog) -> MockAction {
    let mut a = action(
        "LAUNCH_PUMPFUN_TOKEN",
        Reply::Value(json!({ "status": "success", "signature": "mint-sig" })),
        log,
    );
    a.schema = Some(ParamSchema::required(&[
        ("tokenName", FieldKind::String),
        ("tokenTicker", FieldKind::String),
        ("imageUrl", FieldKind::String),
        ("twitter", FieldKind::String),
        ("initialLiquiditySOL", FieldKind::Number),
    ]));
    a
}

#[tokio::test]
async fn test_missing_fields_get_placeholders() {
    let log = CallLog::default();
    let agent = MockAgent::new(vec![shared(launch_action(&log))]);
    let registry = ActionRegistry::default();

    let result = registry
        .run_action(&agent, "launchPumpFunToken", &[], &config(json!({ "initialLiquiditySOL": 0.1 })))
        .await
        .unwrap();
    assert_eq!(result["signature"], "mint-sig");

    let sent = &log.params()[0];
    assert_eq!(sent["tokenName"], PLACEHOLDER_NAME);
    assert_eq!(sent["tokenTicker"], PLACEHOLDER_TICKER);
    assert_eq!(sent["imageUrl"], PLACEHOLDER_IMAGE_URL);
    assert_eq!(sent["twitter"], "");
    assert_eq!(sent["initialLiquiditySOL"], 0.1);
    assert_eq!(sent["tokens"], json!([]));
}

#[tokio::test]
async fn test_strict_params_reports_missing() {
    let log = CallLog::default();
    let agent = MockAgent::new(vec![shared(launch_action(&log))]);
    let registry = ActionRegistry::new(RegistryConfig { inject_defaults: false });

    let err = registry
        .run_action(&agent, "launchPumpFunToken", &[], &config(json!({ "ticker": "ABC" })))
        .await
        .unwrap_err();

    match err {
        FlowError::InvalidParams { action, missing, invalid } => {
            assert_eq!(action, "launchPumpFunToken");
            assert_eq!(missing, vec!["tokenName", "imageUrl", "twitter", "initialLiquiditySOL"]);
            assert!(invalid.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.len(), 0);
}

#[tokio::test]
async fn test_type_errors_skip_injection() {
    let log = CallLog::default();
    let agent = MockAgent::new(vec![shared(launch_action(&log))]);

    let err = ActionRegistry::default()
        .run_action(&agent, "launchPumpFunToken", &[], &config(json!({ "initialLiquiditySOL": "lots" })))
        .await
        .unwrap_err();

    match err {
        FlowError::InvalidParams { missing, invalid, .. } => {
            assert_eq!(missing.len(), 4);
            assert_eq!(invalid.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(log.len(), 0);
}

#[tokio::test]
async fn test_complete_numeric_config_is_sent_unchanged() {
    let log = CallLog::default();
    let mut swap = action("TRADE", Reply::Value(json!({ "status": "success" })), &log);
    swap.schema = Some(ParamSchema::required(&[
        ("outputMint", FieldKind::String),
        ("inputAmount", FieldKind::Number),
    ]));
    let agent = MockAgent::new(vec![shared(swap)]);

    let cfg = config(json!({ "outputMint": USDC, "inputAmount": 1.5, "slippageBps": 50 }));
    ActionRegistry::default()
        .run_action(&agent, "trade", &[], &cfg)
        .await
        .unwrap();

    let sent = log.params()[0].as_object().cloned().unwrap();
    let keys: Vec<&str> = sent.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["outputMint", "inputAmount", "slippageBps", "tokens"]);
}

#[tokio::test]
async fn test_thrown_error_becomes_action_failed() {
    let log = CallLog::default();
    let agent = MockAgent::new(vec![failing("TRANSFER", "blockhash expired", &log)]);

    let err = ActionRegistry::default()
        .run_action(&agent, "transfer", &[], &Map::new())
        .await
        .unwrap_err();
    assert!(matches!(&err, FlowError::ActionFailed { action, .. } if action == "transfer"));
    assert_eq!(err.to_string(), "blockhash expired");
}

#[tokio::test]
async fn test_non_success_without_message_uses_label() {
    let agent = MockAgent::new(vec![replying("TRADE", json!({ "status": "failed" }), &CallLog::default())]);

    let err = ActionRegistry::default()
        .run_action(&agent, "trade", &[], &Map::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Trade (Jup) failed");
}

#[test]
fn test_failure_status_truthiness() {
    assert!(!is_failure_status(&json!("success")));
    assert!(!is_failure_status(&json!("")));
    assert!(!is_failure_status(&Value::Null));
    assert!(!is_failure_status(&json!(false)));
    assert!(!is_failure_status(&json!(0)));
    assert!(is_failure_status(&json!("error")));
    assert!(is_failure_status(&json!(500)));
    assert!(is_failure_status(&json!(true)));
}

#[tokio::test]
async fn test_empty_status_counts_as_success() {
    let agent = MockAgent::new(vec![replying(
        "TRADE",
        json!({ "status": "", "signature": "sig-trade" }),
        &CallLog::default(),
    )]);

    let result = ActionRegistry::default()
        .run_action(&agent, "trade", &[], &Map::new())
        .await
        .unwrap();
    assert_eq!(result["signature"], "sig-trade");
}

#[tokio::test]
async fn test_numeric_status_counts_as_failure() {
    let agent = MockAgent::new(vec![replying("TRADE", json!({ "status": 500 }), &CallLog::default())]);

    let err = ActionRegistry::default()
        .run_action(&agent, "trade", &[], &Map::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Trade (Jup) failed");
}

#[tokio::test]
async fn test_dry_run_agent_echoes_payload() {
    let agent = DryRunAgent::from_catalog();
    let result = ActionRegistry::default()
        .run_action(&agent, "stakeWithJup", &[], &config(json!({ "amount": 2 })))
        .await
        .unwrap();

    assert_eq!(result["status"], "success");
    assert_eq!(result["data"]["amount"], 2);
    assert!(agent.actions().iter().any(|a| a.name() == "STAKE_WITH_JUPITER"));
}

#[tokio::test]
async fn test_presets_use_exact_agent_names() {
    let log = CallLog::default();
    let agent = MockAgent::new(vec![succeeding("TRADE", &log), succeeding("STAKE_WITH_JUPITER", &log)]);

    let swap = SwapParams {
        output_mint: USDC.to_string(),
        input_amount: 0.25,
        input_mint: None,
        slippage_bps: Some(50),
    };
    execute_swap(&agent, &swap).await.unwrap();
    execute_stake(&agent, &StakeParams { amount: 1.0 }).await.unwrap();

    assert_eq!(log.names(), vec!["TRADE", "STAKE_WITH_JUPITER"]);
    assert_eq!(log.params()[0], json!({ "outputMint": USDC, "inputAmount": 0.25, "slippageBps": 50 }));

    let missing = MockAgent::new(vec![]);
    assert!(execute_stake(&missing, &StakeParams { amount: 1.0 }).await.is_err());
}
