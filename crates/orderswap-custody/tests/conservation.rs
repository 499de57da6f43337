//! Randomized custody workload: whatever mix of transfers, pulls, and
//! rollbacks runs, per-asset supply never changes.

use orderswap_custody::{AssetCustody, AssetRegistry};
use orderswap_types::{AccountId, AssetConfig, AssetId};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;

#[test]
fn random_transfers_conserve_supply() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let assets = [AssetId::new("WEB3"), AssetId::new("GUZ")];
    let mut reg = AssetRegistry::with_assets(assets.iter().cloned().map(AssetConfig::standard))
        .expect("register assets");

    let accounts: Vec<AccountId> = (0..6).map(|_| AccountId::new()).collect();
    for asset in &assets {
        for acct in &accounts {
            reg.mint(asset, *acct, Decimal::new(1_000, 0)).unwrap();
        }
    }

    let mut failures = 0usize;
    for _ in 0..2_000 {
        let asset = &assets[rng.gen_range(0..assets.len())];
        let from = accounts[rng.gen_range(0..accounts.len())];
        let to = accounts[rng.gen_range(0..accounts.len())];
        let amount = Decimal::new(rng.gen_range(0..400), 0);

        match rng.gen_range(0..3) {
            0 => {
                if reg.transfer(asset, from, to, amount).is_err() {
                    failures += 1;
                }
            }
            1 => {
                reg.approve(asset, from, to, amount).unwrap();
                if reg.transfer_from(asset, to, from, to, amount).is_err() {
                    failures += 1;
                }
            }
            _ => {
                let cp = reg.checkpoint(&[asset]);
                let before = reg.balance_of(asset, from).unwrap();
                let _ = reg.transfer(asset, from, to, amount);
                reg.rollback(cp);
                assert_eq!(reg.balance_of(asset, from).unwrap(), before);
            }
        }
        reg.verify_supply(asset).unwrap();
    }

    // An overdraw always fails and is counted like any other rejection.
    let total = Decimal::new(6 * 1_000, 0);
    if reg
        .transfer(&assets[0], accounts[0], accounts[1], total + Decimal::ONE)
        .is_err()
    {
        failures += 1;
    }

    reg.verify_all_supply().unwrap();
    assert!(failures > 0);
}
