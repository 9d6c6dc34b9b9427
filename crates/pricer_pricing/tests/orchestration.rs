//! Orchestration properties of `run_mc` over shared markets and noise.

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use pricer_core::math::{CorrelationMatrix, Matrix};
use pricer_core::traits::{Asset, Market, NoiseSource};
use pricer_core::types::{PathValue, SimDate, SimulationError};
use pricer_models::instruments::{BasketCall, EuropeanCall, SpreadOption};
use pricer_models::models::{BasketComponent, BlackScholesBasketModel, BlackScholesMarket};
use pricer_pricing::mc::{collect_markets, get_delta, get_mtm, run_mc, DEFAULT_CONFIDENCE};
use pricer_pricing::rng::{IndependentGaussian, NoiseGenerator, SamplingKind};

fn date(t: f64) -> SimDate {
    SimDate::new(t).unwrap()
}

/// Counts the requests reaching the generator.
struct CountingNoise {
    inner: NoiseGenerator,
    calls: Cell<usize>,
}

impl CountingNoise {
    fn new(n_sims: usize, correlation: CorrelationMatrix, ids: &[&str]) -> Rc<Self> {
        let inner =
            NoiseGenerator::new(n_sims, correlation, ids.iter().copied(), SamplingKind::Independent.build(9))
                .unwrap();
        Rc::new(Self {
            inner,
            calls: Cell::new(0),
        })
    }
}

impl NoiseSource for CountingNoise {
    fn n_sims(&self) -> usize {
        self.inner.n_sims()
    }

    fn noise_ids(&self) -> &[String] {
        self.inner.noise_ids()
    }

    fn noises(&self, date: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.noises(date, ids)
    }
}

fn market(name: &str, noise: Rc<dyn NoiseSource>) -> Rc<dyn Market> {
    Rc::new(BlackScholesMarket::new(name, 100.0, 0.01, 0.2, noise).unwrap())
}

fn call(name: &str, market: &Rc<dyn Market>, strike: f64, maturity: f64) -> Rc<dyn Asset> {
    Rc::new(EuropeanCall::new(name, Rc::clone(market), strike, date(maturity)).unwrap())
}

#[test]
fn test_shared_market_advances_once_per_date() {
    let noise = CountingNoise::new(1_000, CorrelationMatrix::identity(1), &["eq"]);
    let eq = market("eq", noise.clone());
    let assets = vec![
        call("c90", &eq, 90.0, 0.5),
        call("c100", &eq, 100.0, 1.0),
        call("c110", &eq, 110.0, 1.0),
    ];

    let output = run_mc(&assets).unwrap();

    assert_eq!(output.dates(), &[date(0.5), date(1.0)]);
    assert_eq!(noise.calls.get(), 2);
    assert_eq!(output.n_sims(), 1_000);
    assert_eq!(output.spots("eq").unwrap().len(), 2);
}

#[test]
fn test_cashflows_recorded_on_every_date() {
    let noise = CountingNoise::new(500, CorrelationMatrix::identity(1), &["eq"]);
    let eq = market("eq", noise);
    let assets = vec![call("early", &eq, 100.0, 0.5), call("late", &eq, 100.0, 1.0)];

    let output = run_mc(&assets).unwrap();
    let early = output.cashflows("early").unwrap();
    assert_eq!(early.len(), 2);
    assert_eq!(early.get(date(1.0)), Some(&PathValue::ZERO));
    assert!(!early.get(date(0.5)).unwrap().is_constant());

    let late_volume = output.volumes("late", "eq").unwrap();
    assert_eq!(late_volume.get(date(0.5)), Some(&PathValue::ZERO));
}

#[test]
fn test_correlated_markets_share_one_draw_per_date() {
    let correlation = CorrelationMatrix::new(&[1.0, 0.7, 0.7, 1.0], 2).unwrap();
    let noise = CountingNoise::new(2_000, correlation, &["a", "b"]);
    let a = market("a", noise.clone());
    let b = market("b", noise.clone());
    let spread: Rc<dyn Asset> = Rc::new(
        SpreadOption::new("spread", Rc::clone(&a), Rc::clone(&b), 0.0, date(1.0)).unwrap(),
    );

    let output = run_mc(&[spread]).unwrap();
    // One request per market, both served from the same memoized draw.
    assert_eq!(noise.calls.get(), 2);

    let deltas = get_delta(&output, DEFAULT_CONFIDENCE).unwrap();
    let long = deltas[&("spread".to_string(), "a".to_string())];
    let short = deltas[&("spread".to_string(), "b".to_string())];
    assert!(long.mean > 0.0);
    assert!(short.mean < 0.0);

    let spots_a = output.spots("a").unwrap().values()[0].to_vec(2_000).unwrap();
    let spots_b = output.spots("b").unwrap().values()[0].to_vec(2_000).unwrap();
    let (ma, mb) = (mean(&spots_a), mean(&spots_b));
    let cov: f64 = spots_a.iter().zip(&spots_b).map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>();
    let var_a: f64 = spots_a.iter().map(|x| (x - ma).powi(2)).sum();
    let var_b: f64 = spots_b.iter().map(|y| (y - mb).powi(2)).sum();
    assert!(cov / (var_a * var_b).sqrt() > 0.5);
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[test]
fn test_basket_model_components() {
    let correlation = CorrelationMatrix::new(&[1.0, 0.3, 0.3, 1.0], 2).unwrap();
    let generator = Rc::new(
        NoiseGenerator::new(20_000, correlation, ["x", "y"], IndependentGaussian::new(21)).unwrap(),
    );
    let model = BlackScholesBasketModel::new(
        "basket",
        0.0,
        vec![
            BasketComponent::new("x", 100.0, 0.2),
            BasketComponent::new("y", 50.0, 0.3),
        ],
        generator,
    )
    .unwrap();
    let basket: Rc<dyn Asset> = Rc::new(
        BasketCall::new("bc", model.components(), vec![0.5, 1.0], 100.0, date(1.0)).unwrap(),
    );
    let single: Rc<dyn Asset> = Rc::new(
        EuropeanCall::new("cx", model.component(0).unwrap(), 100.0, date(1.0)).unwrap(),
    );

    let output = run_mc(&[basket, single]).unwrap();
    let names: Vec<&str> = output.market_names().collect();
    assert_eq!(names, vec!["basket/x", "basket/y"]);

    let mtm = get_mtm(&output, DEFAULT_CONFIDENCE).unwrap();
    assert!(mtm["bc"].mean > 0.0);
    assert_relative_eq!(mtm["cx"].mean, 7.97, epsilon = 0.6);

    let deltas = get_delta(&output, DEFAULT_CONFIDENCE).unwrap();
    assert_eq!(deltas.len(), 3);
    assert!(deltas.contains_key(&("bc".to_string(), "basket/y".to_string())));
}

#[test]
fn test_deterministic_market_gives_zero_width_interval() {
    let noise = CountingNoise::new(64, CorrelationMatrix::identity(1), &["flat"]);
    let flat: Rc<dyn Market> = Rc::new(BlackScholesMarket::new("flat", 100.0, 0.0, 0.0, noise).unwrap());
    let output = run_mc(&[call("itm", &flat, 90.0, 1.0)]).unwrap();

    let mtm = get_mtm(&output, DEFAULT_CONFIDENCE).unwrap()["itm"];
    assert_relative_eq!(mtm.mean, 10.0, epsilon = 1e-12);
    assert_eq!(mtm.lower, mtm.mean);
    assert_eq!(mtm.upper, mtm.mean);

    let delta = get_delta(&output, DEFAULT_CONFIDENCE).unwrap()[&("itm".to_string(), "flat".to_string())];
    assert_relative_eq!(delta.mean, 1.0, epsilon = 1e-12);
}

#[test]
fn test_duplicate_market_names_are_rejected() {
    let noise = CountingNoise::new(10, CorrelationMatrix::identity(1), &["eq"]);
    let first = market("eq", noise.clone());
    let second = market("eq", noise);
    let assets = vec![call("a", &first, 100.0, 1.0), call("b", &second, 100.0, 1.0)];

    assert!(matches!(
        collect_markets(&assets),
        Err(SimulationError::DuplicateMarket(name)) if name == "eq"
    ));
    assert!(matches!(run_mc(&assets), Err(SimulationError::DuplicateMarket(_))));
}

#[test]
fn test_duplicate_asset_names_are_rejected() {
    let noise = CountingNoise::new(10, CorrelationMatrix::identity(1), &["eq"]);
    let eq = market("eq", noise);
    let assets = vec![call("same", &eq, 100.0, 1.0), call("same", &eq, 90.0, 1.0)];
    assert!(matches!(run_mc(&assets), Err(SimulationError::InvalidConfig(_))));
}

#[test]
fn test_markets_are_deduplicated_by_identity() {
    let noise = CountingNoise::new(10, CorrelationMatrix::identity(2), &["a", "b"]);
    let a = market("a", noise.clone());
    let b = market("b", noise);
    let assets = vec![
        call("ca", &a, 100.0, 1.0),
        call("cb", &b, 100.0, 1.0),
        call("ca2", &a, 110.0, 1.0),
    ];
    let markets = collect_markets(&assets).unwrap();
    let names: Vec<&str> = markets.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_market_cannot_go_back_after_run() {
    let noise = CountingNoise::new(10, CorrelationMatrix::identity(1), &["eq"]);
    let eq = market("eq", noise);
    run_mc(&[call("c", &eq, 100.0, 1.0)]).unwrap();
    assert!(matches!(
        eq.simulate(date(0.5)),
        Err(SimulationError::BackwardSimulation { .. })
    ));
}
