//! Tests for whole-wallet UTxO migration

use coinvault_core::coin::{Coin, DustThreshold, Fee};
use coinvault_core::fee::{calculate_fee, FeeOptions};
use coinvault_core::logging::{self, LogConfig, LogLevel};
use coinvault_core::migration::{deplete_utxo, ideal_batch_size, CoinSelectionOptions};
use coinvault_core::selection::{CoinMap, CoinSelection};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

fn setup() {
    INIT_LOGGER.call_once(|| {
        let config = LogConfig {
            level: LogLevel::Debug,
            include_timestamps: false,
            include_source_location: false,
            json_format: false,
        };
        let _ = logging::init(&config);
    });
}

type TestSelection = CoinSelection<&'static str, &'static str>;

fn coins(values: &[u64]) -> Vec<Coin> {
    values.iter().map(|v| Coin::new(*v)).collect()
}

fn coin_map(entries: &[(&'static str, u64)]) -> CoinMap<&'static str> {
    let mut map = CoinMap::new();
    for (key, value) in entries {
        map.insert(*key, Coin::new(*value));
    }
    map
}

fn flat_fee(value: u64) -> impl Fn(&TestSelection) -> Fee {
    move |_: &TestSelection| Fee::new(Coin::new(value))
}

#[test]
fn single_batch_migration_pays_the_fee_from_change() {
    setup();

    let options = FeeOptions::new(flat_fee(15), DustThreshold::new(Coin::new(10)));
    let utxo = coin_map(&[("utxo1", 100), ("utxo2", 200)]);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 255, utxo);

    assert_eq!(selections.len(), 1);
    let selection = &selections[0];
    assert!(selection.outputs.is_empty());
    assert_eq!(selection.inputs.len(), 2);
    assert_eq!(selection.change, coins(&[85, 200]));
    assert_eq!(calculate_fee(selection), Some(Fee::new(Coin::new(15))));
}

#[test]
fn batch_size_caps_the_inputs_of_each_selection() {
    setup();

    let options = FeeOptions::new(flat_fee(15), DustThreshold::new(Coin::new(10)));
    let utxo = coin_map(&[("utxo1", 100), ("utxo2", 200), ("utxo3", 300)]);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 1, utxo);

    assert_eq!(selections.len(), 3);
    for selection in &selections {
        assert_eq!(selection.inputs.len(), 1);
        assert!(selection.outputs.is_empty());
        assert_eq!(calculate_fee(selection), Some(Fee::new(Coin::new(15))));
    }
}

#[test]
fn migrated_entries_are_a_subset_of_the_wallet() {
    setup();

    let options = FeeOptions::new(flat_fee(15), DustThreshold::new(Coin::new(10)));
    let entries = [
        ("utxo1", 40),
        ("utxo2", 55),
        ("utxo3", 70),
        ("utxo4", 85),
        ("utxo5", 100),
    ];
    let utxo = coin_map(&entries);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 2, utxo.clone());

    let mut seen = Vec::new();
    for selection in &selections {
        assert!(selection.inputs.len() <= 2);
        for (key, value) in selection.inputs.iter() {
            assert_eq!(utxo.get(key), Some(value));
            assert!(!seen.contains(key), "entry migrated twice: {}", key);
            seen.push(*key);
        }
    }
}

#[test]
fn dust_inputs_do_not_become_change() {
    setup();

    let options = FeeOptions::new(flat_fee(15), DustThreshold::new(Coin::new(10)));
    let utxo = coin_map(&[("utxo1", 100), ("utxo2", 3)]);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 255, utxo);

    assert_eq!(selections.len(), 1);
    // The 3-value input is spent but its value goes to fee and the
    // surviving change coin, not to a dust output of its own.
    assert_eq!(selections[0].inputs.len(), 2);
    assert_eq!(selections[0].change, coins(&[88]));
}

#[test]
fn unpayable_batch_stops_the_migration() {
    setup();

    // A wallet of nothing but dust cannot pay a 15-unit fee from any
    // batch; the migration yields no selections at all.
    let options = FeeOptions::new(flat_fee(15), DustThreshold::new(Coin::new(10)));
    let utxo = coin_map(&[("utxo1", 5)]);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 255, utxo);
    assert!(selections.is_empty());
}

#[test]
fn change_survivors_stay_above_the_dust_threshold() {
    setup();

    let threshold = DustThreshold::new(Coin::new(10));
    let options = FeeOptions::new(flat_fee(15), threshold);
    let utxo = coin_map(&[("utxo1", 12), ("utxo2", 13), ("utxo3", 200)]);

    let selections: Vec<TestSelection> = deplete_utxo(&options, 255, utxo);

    for selection in &selections {
        for coin in &selection.change {
            assert!(!threshold.is_dust(*coin), "dust change survived: {}", coin);
        }
    }
}

#[test]
#[should_panic(expected = "batch size must be at least 1")]
fn zero_batch_size_is_rejected() {
    setup();

    let options = FeeOptions::new(flat_fee(15), DustThreshold::ZERO);
    let _: Vec<TestSelection> = deplete_utxo(&options, 0, CoinMap::<&'static str>::new());
}

#[test]
fn ideal_batch_size_finds_the_fixed_point() {
    setup();

    // A transaction can always carry ten inputs regardless of outputs.
    let options = CoinSelectionOptions::new(|_outputs: usize| 10);
    assert_eq!(ideal_batch_size(&options), 10);

    // Capacity shrinks as outputs grow; the crossover is the answer.
    let options = CoinSelectionOptions::new(|outputs: usize| 8_usize.saturating_sub(outputs));
    assert_eq!(ideal_batch_size(&options), 4);

    // No capacity at all still yields a minimal batch.
    let options = CoinSelectionOptions::new(|_outputs: usize| 0);
    assert_eq!(ideal_batch_size(&options), 1);
}

#[test]
fn ideal_batch_size_is_capped() {
    setup();

    let options = CoinSelectionOptions::new(|outputs: usize| outputs + 1);
    assert_eq!(ideal_batch_size(&options), 255);
}
