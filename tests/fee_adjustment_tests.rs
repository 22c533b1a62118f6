//! Tests for the iterative fee adjuster

use coinvault_core::coin::{Coin, DustThreshold, Fee};
use coinvault_core::error::FeeError;
use coinvault_core::fee::{adjust_for_fee, calculate_fee, FeeOptions};
use coinvault_core::logging::{self, LogConfig, LogLevel};
use coinvault_core::selection::{CoinMap, CoinSelection};
use rand::rngs::StdRng;
use rand::SeedableRng;
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

fn selection(
    inputs: &[(&'static str, u64)],
    outputs: &[(&'static str, u64)],
    change: &[u64],
) -> TestSelection {
    CoinSelection::new(coin_map(inputs), coin_map(outputs), coins(change))
}

/// An estimator that charges the same fee for every selection.
fn flat_fee(value: u64) -> impl Fn(&TestSelection) -> Fee {
    move |_: &TestSelection| Fee::new(Coin::new(value))
}

#[test]
fn change_absorbs_the_whole_fee() {
    setup();

    let options = FeeOptions::new(flat_fee(10), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 60)], &[40]);

    let result = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial).unwrap();

    assert_eq!(result.change, coins(&[30]));
    assert_eq!(calculate_fee(&result), Some(Fee::new(Coin::new(10))));
    assert_eq!(result.inputs.len(), 1);
}

#[test]
fn balanced_selection_satisfies_the_balance_equation() {
    setup();

    let options = FeeOptions::new(flat_fee(10), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 70), ("in2", 30)], &[("out1", 55)], &[25, 20]);

    let result = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial).unwrap();

    let paid = result
        .output_total()
        .saturating_add(result.change_total())
        .saturating_add(Coin::new(10));
    assert_eq!(result.input_total(), paid);
}

#[test]
fn extra_inputs_are_recruited_when_change_is_too_small() {
    setup();

    let options = FeeOptions::new(flat_fee(5), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(7);
    let initial = selection(&[("in1", 50)], &[("out1", 49)], &[1]);
    let pool = coin_map(&[("pool1", 3), ("pool2", 3)]);

    let result = adjust_for_fee(&options, pool, &mut rng, initial).unwrap();

    // Both pool entries are needed: the first draw covers 3 of the
    // remaining 4, the second finishes the job.
    assert_eq!(result.inputs.len(), 3);
    assert!(result.inputs.contains_key(&"pool1"));
    assert!(result.inputs.contains_key(&"pool2"));
    assert_eq!(result.change, coins(&[2]));
    assert_eq!(calculate_fee(&result), Some(Fee::new(Coin::new(5))));
}

#[test]
fn exhausted_pool_reports_the_shortfall() {
    setup();

    let options = FeeOptions::new(flat_fee(30), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 90)], &[10]);

    let result = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial);
    assert_eq!(result, Err(FeeError::CannotCoverFee(Coin::new(20))));
}

#[test]
fn partially_covered_shortfall_counts_the_drawn_value() {
    setup();

    let options = FeeOptions::new(flat_fee(5), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 50)], &[("out1", 49)], &[1]);
    let pool = coin_map(&[("pool1", 1)]);

    let result = adjust_for_fee(&options, pool, &mut rng, initial);
    assert_eq!(result, Err(FeeError::CannotCoverFee(Coin::new(3))));
}

#[test]
fn reduced_dust_change_is_coalesced() {
    setup();

    let options = FeeOptions::new(flat_fee(38), DustThreshold::new(Coin::new(1)));
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 60)], &[20, 20]);

    let result = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial).unwrap();

    // Each change coin pays 19 and drops to dust; the two remainders
    // collapse into one output.
    assert_eq!(result.change, coins(&[2]));
    assert_eq!(calculate_fee(&result), Some(Fee::new(Coin::new(38))));
}

#[test]
fn dangling_surplus_is_paid_as_extra_fee() {
    setup();

    // Carrying a change output costs 10; a surplus of 5 is not worth
    // keeping.
    let estimator = |sel: &TestSelection| {
        Fee::new(Coin::new(35 + 10 * sel.change.len() as u64))
    };
    let options = FeeOptions::new(estimator, DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 60)], &[40]);

    let result = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial).unwrap();

    assert_eq!(result.change, Vec::<Coin>::new());
    assert_eq!(calculate_fee(&result), Some(Fee::new(Coin::new(40))));
}

#[test]
fn adjustment_is_idempotent_on_a_changeless_result() {
    setup();

    let estimator = |sel: &TestSelection| {
        Fee::new(Coin::new(35 + 10 * sel.change.len() as u64))
    };
    let options = FeeOptions::new(estimator, DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 60)], &[40]);

    let first = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial).unwrap();
    let second = adjust_for_fee(&options, CoinMap::new(), &mut rng, first.clone()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn equal_seeds_produce_identical_results() {
    setup();

    let pool = coin_map(&[
        ("pool1", 7),
        ("pool2", 8),
        ("pool3", 9),
        ("pool4", 10),
        ("pool5", 11),
    ]);
    let options = FeeOptions::new(flat_fee(20), DustThreshold::ZERO);
    let initial = selection(&[("in1", 100)], &[("out1", 99)], &[1]);

    let mut rng_a = StdRng::seed_from_u64(1234);
    let run_a = adjust_for_fee(&options, pool.clone(), &mut rng_a, initial.clone()).unwrap();

    let mut rng_b = StdRng::seed_from_u64(1234);
    let run_b = adjust_for_fee(&options, pool, &mut rng_b, initial).unwrap();

    assert_eq!(run_a, run_b);
    assert_eq!(calculate_fee(&run_a), Some(Fee::new(Coin::new(20))));
}

#[test]
#[should_panic(expected = "non-zero initial fee estimate")]
fn zero_initial_fee_estimate_is_rejected() {
    setup();

    let options = FeeOptions::new(flat_fee(0), DustThreshold::ZERO);
    let mut rng = StdRng::seed_from_u64(0);
    let initial = selection(&[("in1", 100)], &[("out1", 60)], &[40]);
    let _ = adjust_for_fee(&options, CoinMap::new(), &mut rng, initial);
}
