//! Narrative insights over a route summary.
//!
//! Two producers share one output shape: a language model (prompt built by
//! [`build_prompt`], reply checked by [`parse_model_reply`]) and the
//! deterministic [`template_bundle`] used whenever the model is absent or
//! its reply does not fit the schema.

pub mod heatmap;
pub mod market;
mod model;
pub mod pricing;
pub mod routes;
mod template;

pub use heatmap::{heatmap_insights, HeatmapInsights, RouteAirlineCount, WeekendSplit};
pub use market::{market_overview, MarketOverview};
pub use pricing::{price_insights, PriceInsights, RoutePrice, RouteVolatility, WeeklyPrice};
pub use routes::{route_insights, RouteInsight};
pub use model::{build_prompt, parse_model_reply, SYSTEM_PROMPT};
pub use template::template_bundle;

use crate::error::{FarescopeError, Result};
use crate::summary::RouteSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entries in each list section of an [`InsightBundle`].
pub const SECTION_ITEMS: usize = 8;

/// Structured narrative consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InsightBundle {
    pub market_trends: String,
    pub pricing_analysis: String,
    pub demand_analysis: String,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
}

impl InsightBundle {
    /// Every text section non-empty and every list exactly
    /// [`SECTION_ITEMS`] non-empty entries long.
    pub fn validate(&self) -> Result<()> {
        for (name, text) in [
            ("market_trends", &self.market_trends),
            ("pricing_analysis", &self.pricing_analysis),
            ("demand_analysis", &self.demand_analysis),
        ] {
            if text.trim().is_empty() {
                return Err(FarescopeError::UpstreamUnavailable(format!(
                    "insight section {} is empty",
                    name
                )));
            }
        }
        for (name, list) in [
            ("recommendations", &self.recommendations),
            ("risk_factors", &self.risk_factors),
            ("opportunities", &self.opportunities),
        ] {
            if list.len() != SECTION_ITEMS {
                return Err(FarescopeError::UpstreamUnavailable(format!(
                    "insight section {} has {} entries, expected {}",
                    name,
                    list.len(),
                    SECTION_ITEMS
                )));
            }
            if list.iter().any(|item| item.trim().is_empty()) {
                return Err(FarescopeError::UpstreamUnavailable(format!(
                    "insight section {} contains an empty entry",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Which producer wrote an [`InsightBundle`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Model,
    Template,
}

impl fmt::Display for InsightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightSource::Model => f.write_str("model"),
            InsightSource::Template => f.write_str("template"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightReport {
    pub source: InsightSource,
    #[serde(flatten)]
    pub bundle: InsightBundle,
}

impl InsightReport {
    pub fn template(summary: &RouteSummary) -> Self {
        Self {
            source: InsightSource::Template,
            bundle: template_bundle(summary),
        }
    }

    pub fn model(bundle: InsightBundle) -> Self {
        Self {
            source: InsightSource::Model,
            bundle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_display_matches_wire_name() {
        for source in [InsightSource::Model, InsightSource::Template] {
            let wire = serde_json::to_value(source).unwrap();
            assert_eq!(wire, source.to_string());
        }
    }
}
