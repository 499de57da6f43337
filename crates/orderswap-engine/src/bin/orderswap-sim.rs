//! Replays the two-party swap: Alice offers 100 WEB3 for 20 GUZ and Bob
//! fills it.
//!
//! ```text
//! orderswap-sim [CONFIG_JSON]
//! ```
//!
//! Set `ORDERSWAP_LOG_FORMAT=json` for JSON log lines.

use orderswap_custody::{AssetCustody, AssetRegistry};
use orderswap_engine::{SwapEngine, SystemClock, telemetry};
use orderswap_types::{
    AccountId, AssetConfig, AssetId, EngineConfig, NewOrder, OrderRef, Result, SwapError,
    constants, from_base_units,
};
use rust_decimal::Decimal;

fn load_config() -> Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| SwapError::Configuration(format!("cannot read {path}: {e}")))?;
            EngineConfig::from_json_str(&raw)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    let json = std::env::var("ORDERSWAP_LOG_FORMAT").is_ok_and(|v| v == "json");
    telemetry::init_tracing(json)?;
    let config = load_config()?;
    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        allow_cancellation = config.allow_cancellation,
        "Starting swap simulation"
    );

    let web3 = AssetId::new("WEB3");
    let guz = AssetId::new("GUZ");
    let mut custody =
        AssetRegistry::with_assets([AssetConfig::standard("WEB3"), AssetConfig::standard("GUZ")])?;

    let (alice, bob, engine_acct) = (AccountId::new(), AccountId::new(), AccountId::new());
    let initial = custody.units(&web3, Decimal::from(500))?;
    custody
        .mint(&web3, alice, initial)
        .and_then(|()| custody.mint(&guz, bob, initial))
        .map_err(|e| SwapError::Internal(format!("mint: {e}")))?;

    let offered = custody.units(&web3, Decimal::from(100))?;
    let desired = custody.units(&guz, Decimal::from(20))?;
    custody
        .approve(&web3, alice, engine_acct, offered)
        .and_then(|()| custody.approve(&guz, bob, engine_acct, desired))
        .map_err(|e| SwapError::Internal(format!("approve: {e}")))?;

    let mut engine = SwapEngine::new(engine_acct, custody, SystemClock, config)?;
    let deadline = engine.now() + chrono::Duration::hours(1);

    let order_id = engine.create_order(NewOrder {
        depositor: alice,
        offered_asset: web3.clone(),
        desired_asset: guz.clone(),
        offered_amount: offered,
        desired_amount: desired,
        deadline,
    })?;
    println!(
        "{order_id} open, engine holds {} WEB3",
        human(&engine, &web3, engine_acct)?
    );

    engine.fulfill_order(bob, OrderRef::Paying(guz.clone()))?;
    engine.verify_escrow(&web3)?;
    engine.verify_escrow(&guz)?;
    engine
        .custody()
        .verify_all_supply()
        .map_err(|e| SwapError::EscrowInvariantViolation {
            reason: e.to_string(),
        })?;

    for (name, account) in [("alice", alice), ("bob", bob), ("engine", engine_acct)] {
        println!(
            "{name:>6}: {} WEB3, {} GUZ",
            human(&engine, &web3, account)?,
            human(&engine, &guz, account)?
        );
    }
    if let Some(receipt) = engine.receipts().latest() {
        println!(
            "receipts: {} committed, head #{} {}",
            engine.receipts().total_committed(),
            receipt.sequence,
            receipt.hash_hex()
        );
    }
    Ok(())
}

fn human(
    engine: &SwapEngine<AssetRegistry>,
    asset: &AssetId,
    account: AccountId,
) -> Result<Decimal> {
    let custody = engine.custody();
    let raw = custody
        .balance_of(asset, account)
        .map_err(|e| SwapError::transfer(asset, e))?;
    let decimals = custody
        .decimals(asset)
        .map_err(|e| SwapError::transfer(asset, e))?;
    from_base_units(raw, decimals)
}
