//! Bridge to an external recommendation text service.

use crate::advisor::{AdvisorReply, MetricsSummary, RecommendationEngine, Recommendations};
use crate::error::Result;

/// System prompt sent with every advisor request.
pub const SYSTEM_PROMPT: &str = "You are an energy advisor that produces JSON recommendations.";

/// A text-completion capability: `(system prompt, user prompt) -> text`.
///
/// Implemented by the excluded HTTP collaborator; the core only consumes
/// it. Implementations report failures as
/// [`EnergyError::Advisor`](crate::error::EnergyError::Advisor).
pub trait TextCompletion {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Recommendation engine backed by an external text service.
///
/// Builds the metric prompt, delegates, and parses the reply: a JSON body
/// becomes structured recommendations, anything else is passed through as
/// free text rather than treated as an error.
pub struct ExternalAdvisor {
    client: Box<dyn TextCompletion>,
}

impl ExternalAdvisor {
    pub fn new(client: Box<dyn TextCompletion>) -> Self {
        Self { client }
    }

    fn user_prompt(metrics: &MetricsSummary) -> String {
        format!(
            "Metrics: {} price_per_kwh={} context={}",
            metrics.summary_line(),
            metrics.price_per_kwh,
            metrics.context
        )
    }
}

impl RecommendationEngine for ExternalAdvisor {
    fn recommend(&self, metrics: &MetricsSummary) -> Result<AdvisorReply> {
        let reply = self
            .client
            .generate(SYSTEM_PROMPT, &Self::user_prompt(metrics))?;

        match serde_json::from_str::<Recommendations>(&reply) {
            Ok(recommendations) => Ok(AdvisorReply::Structured(recommendations)),
            Err(_) => Ok(AdvisorReply::Text(reply)),
        }
    }
}
