//! Date-stepping Monte Carlo orchestration.
//!
//! [`run_mc`] walks the union of every market and asset date in ascending
//! order. At each date it advances every market once, then collects the
//! discounted cash-flows, the volumes of each asset on each of its markets
//! and the spot of each market. Markets memoize their own state per date, so
//! an asset reading a price never triggers a second simulation step.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

use pricer_core::traits::{Asset, Market};
use pricer_core::types::{PathValue, SimDate, SimulationError};
use tracing::{debug, info, info_span};

/// Values of one quantity at successive simulation dates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathSeries {
    dates: Vec<SimDate>,
    values: Vec<PathValue>,
}

impl PathSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the value observed at `date`.
    pub fn push(&mut self, date: SimDate, value: PathValue) {
        self.dates.push(date);
        self.values.push(value);
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[SimDate] {
        &self.dates
    }

    /// Observed values, aligned with [`PathSeries::dates`].
    pub fn values(&self) -> &[PathValue] {
        &self.values
    }

    /// Value at `date`, if observed.
    pub fn get(&self, date: SimDate) -> Option<&PathValue> {
        self.dates
            .iter()
            .position(|&d| d == date)
            .map(|index| &self.values[index])
    }

    /// `(date, value)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (SimDate, &PathValue)> {
        self.dates.iter().copied().zip(self.values.iter())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns `true` if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Sum over dates, path by path.
    ///
    /// # Errors
    ///
    /// [`SimulationError::ShapeMismatch`] if a path vector does not have
    /// `n_sims` entries.
    pub fn sum_per_path(&self, n_sims: usize) -> Result<Vec<f64>, SimulationError> {
        let mut totals = vec![0.0; n_sims];
        for value in &self.values {
            match value {
                PathValue::Constant(c) => totals.iter_mut().for_each(|t| *t += c),
                PathValue::Paths(paths) => {
                    if paths.len() != n_sims {
                        return Err(SimulationError::ShapeMismatch {
                            expected: n_sims,
                            got: paths.len(),
                        });
                    }
                    for (t, v) in totals.iter_mut().zip(paths.iter()) {
                        *t += v;
                    }
                }
            }
        }
        Ok(totals)
    }
}

/// Everything recorded by one Monte Carlo run.
#[derive(Clone, Debug, Default)]
pub struct SimulationOutput {
    n_sims: usize,
    dates: Vec<SimDate>,
    cashflows: BTreeMap<String, PathSeries>,
    volumes: BTreeMap<(String, String), PathSeries>,
    spots: BTreeMap<String, PathSeries>,
}

impl SimulationOutput {
    /// Number of simulated paths.
    pub fn n_sims(&self) -> usize {
        self.n_sims
    }

    /// Every simulated date, ascending.
    pub fn dates(&self) -> &[SimDate] {
        &self.dates
    }

    /// Discounted cash-flows of `asset`.
    pub fn cashflows(&self, asset: &str) -> Option<&PathSeries> {
        self.cashflows.get(asset)
    }

    /// Volumes of `asset` on `market`.
    pub fn volumes(&self, asset: &str, market: &str) -> Option<&PathSeries> {
        self.volumes.get(&(asset.to_string(), market.to_string()))
    }

    /// Spots of `market`.
    pub fn spots(&self, market: &str) -> Option<&PathSeries> {
        self.spots.get(market)
    }

    /// Discounted cash-flow series keyed by asset name.
    pub fn iter_cashflows(&self) -> impl Iterator<Item = (&str, &PathSeries)> {
        self.cashflows.iter().map(|(name, series)| (name.as_str(), series))
    }

    /// Volume series keyed by `(asset, market)`.
    pub fn iter_volumes(&self) -> impl Iterator<Item = ((&str, &str), &PathSeries)> {
        self.volumes
            .iter()
            .map(|((asset, market), series)| ((asset.as_str(), market.as_str()), series))
    }

    /// Spot series keyed by market name.
    pub fn iter_spots(&self) -> impl Iterator<Item = (&str, &PathSeries)> {
        self.spots.iter().map(|(name, series)| (name.as_str(), series))
    }

    /// Market names, sorted.
    pub fn market_names(&self) -> impl Iterator<Item = &str> {
        self.spots.keys().map(String::as_str)
    }
}

/// Tracks the path count shared by every path-valued result.
#[derive(Default)]
struct PathCount(Option<usize>);

impl PathCount {
    fn observe(&mut self, value: &PathValue) -> Result<(), SimulationError> {
        if let Some(len) = value.len_hint() {
            match self.0 {
                None => self.0 = Some(len),
                Some(expected) if expected != len => {
                    return Err(SimulationError::ShapeMismatch { expected, got: len })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn same_object(a: &Rc<dyn Market>, b: &Rc<dyn Market>) -> bool {
    // Compare data pointers only: vtables of one type may be duplicated.
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Union of the markets of `assets`, in first-seen order.
///
/// # Errors
///
/// [`SimulationError::DuplicateMarket`] if two distinct objects share a name.
pub fn collect_markets(assets: &[Rc<dyn Asset>]) -> Result<Vec<Rc<dyn Market>>, SimulationError> {
    let mut markets: Vec<Rc<dyn Market>> = Vec::new();
    for asset in assets {
        for market in asset.markets() {
            match markets.iter().find(|known| known.name() == market.name()) {
                Some(known) if same_object(known, &market) => {}
                Some(_) => return Err(SimulationError::DuplicateMarket(market.name().to_string())),
                None => markets.push(market),
            }
        }
    }
    Ok(markets)
}

/// Simulates `assets` over the union of their dates and their markets' dates.
///
/// # Errors
///
/// - [`SimulationError::EmptyPortfolio`] without assets
/// - [`SimulationError::InvalidConfig`] if two assets share a name
/// - [`SimulationError::DuplicateMarket`] if two market objects share a name
/// - [`SimulationError::ShapeMismatch`] if path counts disagree
/// - any error raised by a market or an asset
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
///
/// use pricer_core::math::CorrelationMatrix;
/// use pricer_core::traits::{Asset, Market};
/// use pricer_core::types::SimDate;
/// use pricer_models::instruments::EuropeanCall;
/// use pricer_models::models::BlackScholesMarket;
/// use pricer_pricing::mc::{get_mtm, run_mc, DEFAULT_CONFIDENCE};
/// use pricer_pricing::rng::{IndependentGaussian, NoiseGenerator};
///
/// let generator = Rc::new(
///     NoiseGenerator::new(10_000, CorrelationMatrix::identity(1), ["eq"], IndependentGaussian::new(0))
///         .unwrap(),
/// );
/// let market: Rc<dyn Market> =
///     Rc::new(BlackScholesMarket::new("eq", 100.0, 0.0, 0.2, generator).unwrap());
/// let call: Rc<dyn Asset> = Rc::new(
///     EuropeanCall::new("atm", market, 100.0, SimDate::new(1.0).unwrap()).unwrap(),
/// );
///
/// let output = run_mc(&[call]).unwrap();
/// let mtm = get_mtm(&output, DEFAULT_CONFIDENCE).unwrap();
/// assert!((mtm["atm"].mean - 7.97).abs() < 0.5);
/// ```
pub fn run_mc(assets: &[Rc<dyn Asset>]) -> Result<SimulationOutput, SimulationError> {
    if assets.is_empty() {
        return Err(SimulationError::EmptyPortfolio);
    }
    {
        let mut names = HashSet::with_capacity(assets.len());
        if let Some(duplicate) = assets.iter().find(|asset| !names.insert(asset.name())) {
            return Err(SimulationError::InvalidConfig(format!(
                "two assets share the name '{}'",
                duplicate.name()
            )));
        }
    }

    let markets = collect_markets(assets)?;
    let dates: BTreeSet<SimDate> = markets
        .iter()
        .flat_map(|market| market.dates())
        .chain(assets.iter().flat_map(|asset| asset.dates()))
        .collect();

    let span = info_span!(
        "run_mc",
        n_assets = assets.len(),
        n_markets = markets.len(),
        n_dates = dates.len()
    );
    let _guard = span.enter();

    let mut output = SimulationOutput {
        dates: dates.iter().copied().collect(),
        ..SimulationOutput::default()
    };
    let mut path_count = PathCount::default();

    for &date in &dates {
        debug!(%date, "simulating date");
        for market in &markets {
            let state = market.simulate(date)?;
            path_count.observe(&state)?;
        }

        for asset in assets {
            let cashflow = asset.discounted_cashflow(date)?;
            path_count.observe(&cashflow)?;
            output
                .cashflows
                .entry(asset.name().to_string())
                .or_default()
                .push(date, cashflow);

            for market in asset.markets() {
                let volume = asset.volume(date, market.as_ref())?;
                path_count.observe(&volume)?;
                output
                    .volumes
                    .entry((asset.name().to_string(), market.name().to_string()))
                    .or_default()
                    .push(date, volume);
            }
        }

        for market in &markets {
            let spot = market.spot(date)?;
            path_count.observe(&spot)?;
            output
                .spots
                .entry(market.name().to_string())
                .or_default()
                .push(date, spot);
        }
    }

    output.n_sims = path_count.0.unwrap_or(1);
    info!(n_sims = output.n_sims, "Monte Carlo run complete");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_sum_per_path_broadcasts_constants() {
        let mut series = PathSeries::new();
        series.push(SimDate::new(0.5).unwrap(), PathValue::Constant(1.0));
        series.push(SimDate::new(1.0).unwrap(), PathValue::from_vec(vec![1.0, 2.0, 3.0]));

        let totals = series.sum_per_path(3).unwrap();
        assert_relative_eq!(totals[0], 2.0);
        assert_relative_eq!(totals[2], 4.0);
        assert!(series.sum_per_path(2).is_err());
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.get(SimDate::new(0.5).unwrap()),
            Some(&PathValue::Constant(1.0))
        );
    }

    #[test]
    fn test_path_count_detects_mismatch() {
        let mut count = PathCount::default();
        count.observe(&PathValue::Constant(1.0)).unwrap();
        assert_eq!(count.0, None);
        count.observe(&PathValue::from_vec(vec![0.0; 4])).unwrap();
        assert!(matches!(
            count.observe(&PathValue::from_vec(vec![0.0; 5])),
            Err(SimulationError::ShapeMismatch { expected: 4, got: 5 })
        ));
    }

    #[test]
    fn test_empty_portfolio() {
        assert!(matches!(run_mc(&[]), Err(SimulationError::EmptyPortfolio)));
    }
}
