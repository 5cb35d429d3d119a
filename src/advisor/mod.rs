//! Metrics summary and recommendation engines.
//!
//! The advisor boundary reduces a canonical table to a small typed metrics
//! struct. Recommendation engines consume the struct directly, never
//! re-parsing formatted strings, and come in two variants selected by
//! configuration: a local heuristic generator and a bridge to an external
//! text-completion service.

mod external;
mod heuristic;

pub use external::{ExternalAdvisor, TextCompletion};
pub use heuristic::HeuristicAdvisor;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::config::AdvisorBackend;
use crate::core::{DatasetKind, EnergyTable};
use crate::error::Result;

/// Default electricity price used when the caller supplies none.
pub const DEFAULT_PRICE_PER_KWH: f64 = 0.15;

/// Typed metrics handed to a recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Total consumption; `None` for multi-type industrial tables, where
    /// units differ per type.
    pub total_kwh: Option<f64>,
    /// Hour of day with the largest summed consumption (lowest hour wins
    /// ties); `None` when the table is empty or multi-type.
    pub peak_hour: Option<u32>,
    /// Per-energy-type totals in first-appearance order; empty outside the
    /// industrial case.
    pub per_type_totals: Vec<(String, f64)>,
    pub price_per_kwh: f64,
    /// Free-form caller context forwarded to the engine.
    pub context: String,
}

impl MetricsSummary {
    /// Compute the summary for a canonical table.
    pub fn from_table(table: &EnergyTable) -> Self {
        let (total_kwh, peak_hour, per_type_totals) =
            if table.kind() == DatasetKind::Industrial && table.has_categories() {
                let totals = table
                    .categories()
                    .into_iter()
                    .map(|category| {
                        let total = table
                            .category_records(&category)
                            .iter()
                            .map(|r| r.value)
                            .filter(|v| !v.is_nan())
                            .sum::<f64>();
                        (category, total)
                    })
                    .collect();
                (None, None, totals)
            } else {
                (Some(table.total_value()), peak_hour(table), Vec::new())
            };

        Self {
            total_kwh,
            peak_hour,
            per_type_totals,
            price_per_kwh: DEFAULT_PRICE_PER_KWH,
            context: String::new(),
        }
    }

    /// Override the electricity price.
    pub fn with_price(mut self, price_per_kwh: f64) -> Self {
        self.price_per_kwh = price_per_kwh;
        self
    }

    /// Attach caller context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// The short metric line consumed by the external text service.
    pub fn summary_line(&self) -> String {
        if !self.per_type_totals.is_empty() {
            return self
                .per_type_totals
                .iter()
                .map(|(name, total)| format!("{name}={total:.2}"))
                .collect::<Vec<_>>()
                .join(" ");
        }
        let total = self.total_kwh.unwrap_or(0.0);
        match self.peak_hour {
            Some(hour) => format!("total_kwh={total:.2}, peak_hour={hour}"),
            None => format!("total_kwh={total:.2}"),
        }
    }
}

/// Hour of day with the largest summed finite consumption.
fn peak_hour(table: &EnergyTable) -> Option<u32> {
    let mut by_hour = [0.0_f64; 24];
    let mut seen = false;
    for record in table.records() {
        if record.value.is_nan() {
            continue;
        }
        by_hour[record.timestamp.hour() as usize] += record.value;
        seen = true;
    }
    if !seen {
        return None;
    }
    let mut best = 0;
    for hour in 1..24 {
        if by_hour[hour] > by_hour[best] {
            best = hour;
        }
    }
    Some(best as u32)
}

/// Reduce a normalized table to the metric line the recommendation service
/// consumes.
pub fn summarize_for_advisor(table: &EnergyTable) -> String {
    MetricsSummary::from_table(table).summary_line()
}

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub estimated_kwh_savings: f64,
    pub estimated_usd_savings: f64,
}

/// Recommendations bucketed by time horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub immediate: Vec<Recommendation>,
    #[serde(default)]
    pub scheduled: Vec<Recommendation>,
    #[serde(default)]
    pub investment: Vec<Recommendation>,
}

/// Engine output: structured when the reply parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisorReply {
    Structured(Recommendations),
    Text(String),
}

/// A source of energy-saving recommendations.
pub trait RecommendationEngine {
    fn recommend(&self, metrics: &MetricsSummary) -> Result<AdvisorReply>;
}

/// Pick the engine for the configured backend.
///
/// Requesting the external backend without supplying a client falls back
/// to the heuristic engine.
pub fn select_engine(
    backend: AdvisorBackend,
    client: Option<Box<dyn TextCompletion>>,
) -> Box<dyn RecommendationEngine> {
    match (backend, client) {
        (AdvisorBackend::External, Some(client)) => Box::new(ExternalAdvisor::new(client)),
        _ => Box::new(HeuristicAdvisor::new()),
    }
}
