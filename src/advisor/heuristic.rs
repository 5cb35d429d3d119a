//! Local rule-based recommendation engine.

use crate::advisor::{
    AdvisorReply, MetricsSummary, Recommendation, RecommendationEngine, Recommendations,
};
use crate::error::Result;

/// Reference consumption assumed when the table total is unknown.
const FALLBACK_TOTAL_KWH: f64 = 100.0;

/// Heuristic recommendation generator.
///
/// Produces a fixed set of suggestions scaled by the table's total
/// consumption and the configured price. Works offline; this is the
/// default engine when no external service is wired up.
pub struct HeuristicAdvisor;

impl HeuristicAdvisor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeuristicAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine for HeuristicAdvisor {
    fn recommend(&self, metrics: &MetricsSummary) -> Result<AdvisorReply> {
        let price = metrics.price_per_kwh;
        let reference_total = metrics.total_kwh.unwrap_or(FALLBACK_TOTAL_KWH);

        let mut immediate = Vec::new();
        if metrics.total_kwh.is_some_and(|total| total > 100.0) {
            let total = reference_total;
            immediate.push(Recommendation {
                title: "Check HVAC setpoints and schedules".to_string(),
                description: "Adjust thermostat and schedules to reduce excessive heating/cooling."
                    .to_string(),
                estimated_kwh_savings: round2(0.05 * total),
                estimated_usd_savings: round2(0.05 * total * price),
            });
        }

        immediate.push(Recommendation {
            title: "Unplug phantom loads / use smart strips".to_string(),
            description: "Reduces standby consumption from peripherals and chargers.".to_string(),
            estimated_kwh_savings: round2(0.01 * reference_total),
            estimated_usd_savings: round2(0.01 * reference_total * price),
        });

        let scheduled = vec![Recommendation {
            title: "Shift flexible loads to off-peak hours".to_string(),
            description: "Schedule EV charging, dishwashers, and laundry during off-peak/night."
                .to_string(),
            estimated_kwh_savings: 0.0,
            estimated_usd_savings: 0.0,
        }];

        let investment = vec![Recommendation {
            title: "Install programmable/smart thermostat and sensors".to_string(),
            description: "Improves setpoint control and can save energy long-term.".to_string(),
            estimated_kwh_savings: round2(0.1 * reference_total),
            estimated_usd_savings: round2(0.1 * reference_total * price),
        }];

        Ok(AdvisorReply::Structured(Recommendations {
            immediate,
            scheduled,
            investment,
        }))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
