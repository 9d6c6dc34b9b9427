//! Aggregation of simulated paths into estimates with confidence intervals.

use std::collections::BTreeMap;

use pricer_core::math::norm_inv_cdf;
use pricer_core::types::SimulationError;

use super::runner::{PathSeries, SimulationOutput};

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Monte Carlo estimate with its confidence interval.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McResults {
    /// Sample mean.
    pub mean: f64,
    /// Lower bound of the confidence interval.
    pub lower: f64,
    /// Upper bound of the confidence interval.
    pub upper: f64,
}

impl McResults {
    /// Half-width of the confidence interval.
    #[inline]
    pub fn half_width(&self) -> f64 {
        0.5 * (self.upper - self.lower)
    }

    /// Returns `true` if `value` lies within the interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

fn check_confidence(confidence: f64) -> Result<(), SimulationError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            "confidence",
            format!("{} is outside (0, 1)", confidence),
        ))
    }
}

/// Builds the interval `mean ± z · std / √n_sims` with `z = Φ⁻¹(½ + ½c)`.
///
/// # Errors
///
/// [`SimulationError::InvalidParameter`] if `n_sims` is zero or `confidence`
/// is outside (0, 1).
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::mc_results;
///
/// let r = mc_results(10.0, 2.0, 400, 0.95).unwrap();
/// assert!((r.half_width() - 1.959_964 * 0.1).abs() < 1e-6);
/// ```
pub fn mc_results(
    mean: f64,
    std: f64,
    n_sims: usize,
    confidence: f64,
) -> Result<McResults, SimulationError> {
    check_confidence(confidence)?;
    if n_sims == 0 {
        return Err(SimulationError::invalid_parameter(
            "n_sims",
            "at least one path is required",
        ));
    }
    let half = norm_inv_cdf(0.5 + 0.5 * confidence) * std / (n_sims as f64).sqrt();
    Ok(McResults {
        mean,
        lower: mean - half,
        upper: mean + half,
    })
}

/// Sample mean and standard deviation (n − 1 denominator, 0 for one value).
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt())
}

fn summarise(values: &[f64], confidence: f64) -> Result<McResults, SimulationError> {
    let (mean, std) = mean_std(values);
    mc_results(mean, std, values.len(), confidence)
}

/// Sums `series` over its dates path by path and summarises the totals.
///
/// # Errors
///
/// [`SimulationError::ShapeMismatch`] if a path vector does not have
/// `n_sims` entries, plus the errors of [`mc_results`].
pub fn postpro(
    series: &PathSeries,
    n_sims: usize,
    confidence: f64,
) -> Result<McResults, SimulationError> {
    let totals = series.sum_per_path(n_sims)?;
    summarise(&totals, confidence)
}

/// Mark-to-market of every asset: the sum of its discounted cash-flows.
///
/// # Errors
///
/// Errors of [`postpro`].
pub fn get_mtm(
    output: &SimulationOutput,
    confidence: f64,
) -> Result<BTreeMap<String, McResults>, SimulationError> {
    let mut mtm = BTreeMap::new();
    for (asset, series) in output.iter_cashflows() {
        mtm.insert(asset.to_string(), postpro(series, output.n_sims(), confidence)?);
    }
    Ok(mtm)
}

/// Forward-weighted hedge ratio of every asset on each of its markets.
///
/// With `fwd_d` the path mean of the market spot at date `d`, path `i` gets
/// `Σ_d volume_d[i] · spot_d[i] / Σ_d fwd_d`, summed over every simulated
/// date. A zero denominator gives a zero delta.
///
/// # Errors
///
/// - [`SimulationError::UnknownMarket`] if no spots were recorded for a
///   market carrying volumes
/// - [`SimulationError::ShapeMismatch`] on inconsistent path counts
/// - errors of [`mc_results`]
pub fn get_delta(
    output: &SimulationOutput,
    confidence: f64,
) -> Result<BTreeMap<(String, String), McResults>, SimulationError> {
    check_confidence(confidence)?;
    let n_sims = output.n_sims();
    let mut deltas = BTreeMap::new();

    for ((asset, market), volumes) in output.iter_volumes() {
        let spots = output
            .spots(market)
            .ok_or_else(|| SimulationError::UnknownMarket {
                asset: asset.to_string(),
                market: market.to_string(),
            })?;

        let forward_sum: f64 = spots.values().iter().map(|spot| spot.mean()).sum();
        let mut weighted = vec![0.0; n_sims];
        for (date, volume) in volumes.iter() {
            let Some(spot) = spots.get(date) else {
                continue;
            };
            let exposure = volume.zip_with(spot, |v, s| v * s)?.to_vec(n_sims)?;
            for (w, e) in weighted.iter_mut().zip(exposure) {
                *w += e;
            }
        }

        let delta: Vec<f64> = if forward_sum == 0.0 {
            vec![0.0; n_sims]
        } else {
            weighted.iter().map(|w| w / forward_sum).collect()
        };
        deltas.insert(
            (asset.to_string(), market.to_string()),
            summarise(&delta, confidence)?,
        );
    }
    Ok(deltas)
}
