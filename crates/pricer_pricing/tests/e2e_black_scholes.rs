//! End-to-end Monte Carlo prices against the Black-Scholes formula.
//!
//! One lognormal market (S0 = 100, r = 0, σ = 0.2) and three calls with
//! strikes 90 / 100 / 110 maturing at T = 1, priced with every sampling
//! strategy. Multi-maturity portfolios check that quasi-random draws stay
//! correct when the market is stepped through several dates.

use std::rc::Rc;

use pricer_core::math::CorrelationMatrix;
use pricer_core::traits::{Asset, Market};
use pricer_core::types::SimDate;
use pricer_models::analytical::{black_scholes_call_delta, black_scholes_call_price};
use pricer_models::instruments::EuropeanCall;
use pricer_models::models::BlackScholesMarket;
use pricer_pricing::mc::{get_delta, get_mtm, run_mc, EngineConfig, McResults, DEFAULT_CONFIDENCE};
use pricer_pricing::rng::SamplingKind;

const SPOT: f64 = 100.0;
const RATE: f64 = 0.0;
const SIGMA: f64 = 0.2;
const STRIKES: [(&str, f64); 3] = [("ITM", 90.0), ("ATM", 100.0), ("OTM", 110.0)];

/// High enough that a failure means a pricing error rather than bad luck.
const STRICT_CONFIDENCE: f64 = 0.999;

fn portfolio(sampling: SamplingKind, n_sims: usize, seed: u64, rate: f64) -> Vec<Rc<dyn Asset>> {
    portfolio_with(sampling, n_sims, seed, rate, &STRIKES)
}

fn portfolio_with(
    sampling: SamplingKind,
    n_sims: usize,
    seed: u64,
    rate: f64,
    strikes: &[(&str, f64)],
) -> Vec<Rc<dyn Asset>> {
    let calls: Vec<_> = strikes.iter().map(|&(name, strike)| (name, strike, 1.0)).collect();
    calls_with_maturities(sampling, n_sims, seed, rate, &calls)
}

fn calls_with_maturities(
    sampling: SamplingKind,
    n_sims: usize,
    seed: u64,
    rate: f64,
    calls: &[(&str, f64, f64)],
) -> Vec<Rc<dyn Asset>> {
    let config = EngineConfig::builder()
        .n_sims(n_sims)
        .seed(seed)
        .sampling(sampling)
        .build()
        .unwrap();
    let generator = Rc::new(
        config
            .build_generator(CorrelationMatrix::identity(1), ["BlackScholes"])
            .unwrap(),
    );
    let market: Rc<dyn Market> =
        Rc::new(BlackScholesMarket::new("BlackScholes", SPOT, rate, SIGMA, generator).unwrap());
    calls
        .iter()
        .map(|&(name, strike, years)| {
            let maturity = SimDate::new(years).unwrap();
            Rc::new(EuropeanCall::new(name, Rc::clone(&market), strike, maturity).unwrap())
                as Rc<dyn Asset>
        })
        .collect()
}

fn reference(strike: f64, rate: f64) -> f64 {
    black_scholes_call_price(SPOT, strike, rate, SIGMA, 1.0).unwrap()
}

fn assert_within_interval(result: &McResults, expected: f64, label: &str) {
    assert!(
        result.contains(expected),
        "{label}: analytical {expected:.5} outside [{:.5}, {:.5}]",
        result.lower,
        result.upper
    );
}

fn assert_close(result: &McResults, expected: f64, tolerance: f64, label: &str) {
    let error = (result.mean - expected).abs();
    assert!(
        error < tolerance,
        "{label}: MC {:.5} vs analytical {:.5} (error {:.5}, tolerance {:.5})",
        result.mean,
        expected,
        error,
        tolerance
    );
}

#[test]
fn test_independent_matches_black_scholes_within_ci() {
    let assets = portfolio(SamplingKind::Independent, 500_000, 0, RATE);
    let output = run_mc(&assets).unwrap();
    assert_eq!(output.n_sims(), 500_000);

    let mtm = get_mtm(&output, STRICT_CONFIDENCE).unwrap();
    for (name, strike) in STRIKES {
        let result = &mtm[name];
        assert!(result.lower < result.mean && result.mean < result.upper);
        assert_within_interval(result, reference(strike, RATE), name);
    }
    assert!((mtm["ATM"].mean - 7.97).abs() < 0.1);
}

#[test]
fn test_prices_are_ordered_by_strike() {
    let assets = portfolio(SamplingKind::Independent, 20_000, 3, RATE);
    let mtm = get_mtm(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap();
    assert!(mtm["ITM"].mean > mtm["ATM"].mean);
    assert!(mtm["ATM"].mean > mtm["OTM"].mean);
}

#[test]
fn test_discounting_with_positive_rate() {
    let rate = 0.05;
    let assets = portfolio(SamplingKind::Sobol, 8_192, 0, rate);
    let mtm = get_mtm(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap();
    for (name, strike) in STRIKES {
        assert_close(&mtm[name], reference(strike, rate), 0.1, name);
    }
}

#[test]
fn test_low_discrepancy_strategies_with_fewer_paths() {
    for sampling in [
        SamplingKind::Sobol,
        SamplingKind::Halton,
        SamplingKind::LeapedHalton,
        SamplingKind::VanDerCorput,
        SamplingKind::Hammersley,
        SamplingKind::Faure,
        SamplingKind::LatinHypercube,
    ] {
        let assets = portfolio(sampling, 8_192, 1, RATE);
        let mtm = get_mtm(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap();
        for (name, strike) in STRIKES {
            assert_close(&mtm[name], reference(strike, RATE), 0.1, &format!("{sampling}/{name}"));
        }
    }
}

#[test]
fn test_antithetic_reduces_error_on_near_linear_payoff() {
    // A deep in-the-money call is almost linear in the terminal spot, where
    // mirrored draws cancel most of the noise.
    let deep = [("DEEP", 60.0)];
    let expected = reference(60.0, RATE);
    let mut independent_error = 0.0;
    let mut antithetic_error = 0.0;
    for seed in 0..10 {
        let mtm = |sampling| {
            let assets = portfolio_with(sampling, 20_000, seed, RATE, &deep);
            get_mtm(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap()["DEEP"]
        };
        independent_error += (mtm(SamplingKind::Independent).mean - expected).abs();
        antithetic_error += (mtm(SamplingKind::Antithetic).mean - expected).abs();
    }
    assert!(
        antithetic_error < independent_error,
        "antithetic {antithetic_error:.5} vs independent {independent_error:.5}"
    );
}

#[test]
fn test_antithetic_interval_contains_reference() {
    let assets = portfolio(SamplingKind::Antithetic, 200_000, 0, RATE);
    let mtm = get_mtm(&run_mc(&assets).unwrap(), STRICT_CONFIDENCE).unwrap();
    for (name, strike) in STRIKES {
        assert_within_interval(&mtm[name], reference(strike, RATE), name);
    }
}

#[test]
fn test_low_discrepancy_multi_maturity_portfolio() {
    // Each maturity adds a date, so the market steps through 0.5, 1 and 2.
    let calls = [("ATM_6M", 100.0, 0.5), ("ATM_1Y", 100.0, 1.0), ("ITM_2Y", 90.0, 2.0)];
    for sampling in [
        SamplingKind::Sobol,
        SamplingKind::Halton,
        SamplingKind::LeapedHalton,
        SamplingKind::VanDerCorput,
        SamplingKind::Hammersley,
        SamplingKind::Faure,
    ] {
        let assets = calls_with_maturities(sampling, 8_192, 0, RATE, &calls);
        let mtm = get_mtm(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap();
        for (name, strike, years) in calls {
            let expected = black_scholes_call_price(SPOT, strike, RATE, SIGMA, years).unwrap();
            assert_close(&mtm[name], expected, 0.1, &format!("{sampling}/{name}"));
        }
    }
}

#[test]
fn test_extra_date_leaves_low_discrepancy_price_unchanged() {
    let expected = reference(100.0, RATE);
    for sampling in [SamplingKind::Sobol, SamplingKind::Halton] {
        let alone = calls_with_maturities(sampling, 8_192, 0, RATE, &[("ATM", 100.0, 1.0)]);
        let alone = get_mtm(&run_mc(&alone).unwrap(), DEFAULT_CONFIDENCE).unwrap()["ATM"];

        let stepped = calls_with_maturities(
            sampling,
            8_192,
            0,
            RATE,
            &[("ATM", 100.0, 1.0), ("SHORT", 100.0, 0.5)],
        );
        let stepped = get_mtm(&run_mc(&stepped).unwrap(), DEFAULT_CONFIDENCE).unwrap()["ATM"];

        assert_close(&alone, expected, 0.1, &format!("{sampling}/alone"));
        assert_close(&stepped, expected, 0.1, &format!("{sampling}/stepped"));
    }
}

#[test]
fn test_delta_matches_black_scholes() {
    let assets = portfolio(SamplingKind::Independent, 200_000, 0, RATE);
    let deltas = get_delta(&run_mc(&assets).unwrap(), DEFAULT_CONFIDENCE).unwrap();
    assert_eq!(deltas.len(), STRIKES.len());
    for (name, strike) in STRIKES {
        let result = &deltas[&(name.to_string(), "BlackScholes".to_string())];
        let expected = black_scholes_call_delta(SPOT, strike, RATE, SIGMA, 1.0).unwrap();
        assert_close(result, expected, 0.01, name);
    }
}

#[test]
fn test_confidence_level_widens_interval() {
    let assets = portfolio(SamplingKind::Independent, 10_000, 5, RATE);
    let output = run_mc(&assets).unwrap();
    let narrow = get_mtm(&output, 0.9).unwrap();
    let wide = get_mtm(&output, 0.99).unwrap();
    assert_eq!(narrow["ATM"].mean, wide["ATM"].mean);
    assert!(wide["ATM"].half_width() > narrow["ATM"].half_width());
}
