//! Pricing reports rendered as a table or as JSON.

use std::str::FromStr;

use pricer_pricing::mc::{get_delta, get_mtm, McResults, SimulationOutput};
use pricer_pricing::rng::SamplingKind;
use serde::Serialize;

use crate::{CliError, Result};

/// Output format of the pricing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable table.
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: table, json",
                other
            ))),
        }
    }
}

/// Estimates of one run.
#[derive(Debug, Clone, Serialize)]
pub struct PricingReport {
    /// Simulated paths.
    pub n_sims: usize,
    /// Sampling strategy.
    pub sampling: SamplingKind,
    /// Confidence level of every interval.
    pub confidence: f64,
    /// One entry per asset, by name.
    pub assets: Vec<AssetReport>,
}

/// Estimates of one asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    /// Asset name.
    pub name: String,
    /// Mark-to-market.
    pub mtm: McResults,
    /// Closed-form price, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical: Option<f64>,
    /// Deltas on each market the asset trades.
    pub deltas: Vec<DeltaReport>,
}

/// Delta of an asset on one market.
#[derive(Debug, Clone, Serialize)]
pub struct DeltaReport {
    /// Market name.
    pub market: String,
    /// Forward-weighted hedge ratio.
    pub delta: McResults,
    /// Closed-form delta, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytical: Option<f64>,
}

impl PricingReport {
    /// Aggregates a finished run.
    pub fn from_output(
        output: &SimulationOutput,
        sampling: SamplingKind,
        confidence: f64,
    ) -> Result<Self> {
        let mtm = get_mtm(output, confidence)?;
        let deltas = get_delta(output, confidence)?;

        let assets = mtm
            .into_iter()
            .map(|(name, mtm)| {
                let deltas = deltas
                    .iter()
                    .filter(|((asset, _), _)| *asset == name)
                    .map(|((_, market), delta)| DeltaReport {
                        market: market.clone(),
                        delta: *delta,
                        analytical: None,
                    })
                    .collect();
                AssetReport {
                    name,
                    mtm,
                    analytical: None,
                    deltas,
                }
            })
            .collect();

        Ok(Self {
            n_sims: output.n_sims(),
            sampling,
            confidence,
            assets,
        })
    }

    /// Attaches closed-form references to `asset` on `market`.
    pub fn set_analytical(&mut self, asset: &str, market: &str, price: f64, delta: f64) {
        if let Some(report) = self.assets.iter_mut().find(|a| a.name == asset) {
            report.analytical = Some(price);
            if let Some(d) = report.deltas.iter_mut().find(|d| d.market == market) {
                d.analytical = Some(delta);
            }
        }
    }

    /// Report of `asset`.
    pub fn asset(&self, name: &str) -> Option<&AssetReport> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// Renders the report.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_table(&self) -> String {
        let mut lines = vec![
            format!(
                "{} paths, {} sampling, {:.0}% confidence",
                self.n_sims,
                self.sampling,
                self.confidence * 100.0
            ),
            format!(
                "{:<16} {:<8} {:<16} {:>12} {:>12} {:>12} {:>12}",
                "Asset", "Measure", "Market", "Estimate", "Lower", "Upper", "Analytical"
            ),
            "-".repeat(94),
        ];

        for asset in &self.assets {
            lines.push(row(&asset.name, "mtm", "", &asset.mtm, asset.analytical));
            for delta in &asset.deltas {
                lines.push(row(&asset.name, "delta", &delta.market, &delta.delta, delta.analytical));
            }
        }
        lines.join("\n")
    }
}

fn row(asset: &str, measure: &str, market: &str, result: &McResults, analytical: Option<f64>) -> String {
    let analytical = analytical.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
    format!(
        "{:<16} {:<8} {:<16} {:>12.4} {:>12.4} {:>12.4} {:>12}",
        asset, measure, market, result.mean, result.lower, result.upper, analytical
    )
}
