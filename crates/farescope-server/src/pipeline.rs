//! Request pipelines with their fallbacks.
//!
//! [`FlightDataService`] tries the live provider and falls back to the mock
//! generator; [`InsightService`] tries the language model and falls back to
//! the templated bundle. Neither ever returns an error to its caller.

use crate::config::FarescopeConfig;
use crate::upstream::{
    AviationStackClient, FlightSource, InsightModel, OpenAiClient, UpstreamError,
};
use chrono::{Duration as Days, Local, NaiveDate};
use farescope_core::insights::{build_prompt, parse_model_reply, SYSTEM_PROMPT};
use farescope_core::query::{parse_airport_code, parse_date};
use farescope_core::{
    build_all, heatmap_insights, map_response, price_insights, route_insights, summarize,
    ChartSet, DataSource, FarescopeError, FetchOutcome, FlightRecord, HeatmapInsights,
    InsightBundle, InsightReport, MockGenerator, PriceInsights, RouteInsight, RouteQuery,
    RouteSummary,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ORIGIN: &str = "SYD";
pub const DEFAULT_DESTINATION: &str = "MEL";

/// Largest generated table a single request may ask for.
pub const MAX_ROWS: usize = 10_000;

/// Route query from optional request fields. Missing endpoints default to
/// SYD→MEL and missing dates to the window from `today + 7` to `today + 30`.
pub fn route_query(
    origin: Option<&str>,
    destination: Option<&str>,
    date_from: Option<&str>,
    date_to: Option<&str>,
    today: NaiveDate,
) -> farescope_core::Result<RouteQuery> {
    let origin = parse_airport_code(origin.unwrap_or(DEFAULT_ORIGIN))?;
    let destination = parse_airport_code(destination.unwrap_or(DEFAULT_DESTINATION))?;
    let date_from = match date_from {
        Some(s) => parse_date(s)?,
        None => today + Days::days(7),
    };
    let date_to = match date_to {
        Some(s) => parse_date(s)?,
        None => today + Days::days(30),
    };
    RouteQuery::new(&origin, &destination, date_from, date_to)
}

pub fn check_rows(rows: Option<usize>) -> farescope_core::Result<Option<usize>> {
    match rows {
        Some(0) => Err(FarescopeError::Validation("rows must be > 0".into())),
        Some(n) if n > MAX_ROWS => Err(FarescopeError::Validation(format!(
            "rows must be <= {}",
            MAX_ROWS
        ))),
        other => Ok(other),
    }
}

/// Flight tables from the live provider, or from the mock generator when
/// the provider is unconfigured or fails.
#[derive(Clone)]
pub struct FlightDataService {
    source: Option<Arc<dyn FlightSource>>,
    generator: MockGenerator,
    timeout: Duration,
}

impl FlightDataService {
    pub fn new(generator: MockGenerator, timeout: Duration) -> Self {
        Self {
            source: None,
            generator,
            timeout,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn FlightSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Fails when the `[generator]` section is inconsistent.
    pub fn from_config(config: &FarescopeConfig) -> farescope_core::Result<Self> {
        let upstream = &config.upstream;
        let generator = config.generator.to_generator_config();
        generator.validate()?;

        let service = Self::new(MockGenerator::new(generator), upstream.timeout());
        Ok(match upstream.aviation_stack_key() {
            Some(key) => service.with_source(Arc::new(AviationStackClient::new(
                upstream.aviation_stack_base_url.clone(),
                key,
                upstream.timeout(),
            ))),
            None => service,
        })
    }

    pub fn has_live_source(&self) -> bool {
        self.source.is_some()
    }

    /// Records for `query`, tagged with where they came from. `rows` is a
    /// target size for generated tables only.
    pub async fn fetch(&self, query: &RouteQuery, rows: Option<usize>) -> FetchOutcome {
        match self.fetch_live(query).await {
            Ok(records) => {
                info!(
                    "Fetched {} live records for {}",
                    records.len(),
                    query.route_label()
                );
                FetchOutcome {
                    source: DataSource::Live,
                    records,
                }
            }
            Err(e) => {
                warn!("{}; using mock data for {}", e, query.route_label());
                FetchOutcome {
                    source: DataSource::Mock,
                    records: self.generator.generate(query, rows),
                }
            }
        }
    }

    async fn fetch_live(&self, query: &RouteQuery) -> Result<Vec<FlightRecord>, UpstreamError> {
        let source = self
            .source
            .as_ref()
            .ok_or(UpstreamError::MissingCredential("aviationstack"))?;

        let response = tokio::time::timeout(self.timeout, source.fetch(query))
            .await
            .map_err(|_| UpstreamError::Timeout {
                service: source.name(),
                after: self.timeout,
            })??;

        map_response(&response, query, &self.generator, &mut rand::thread_rng()).map_err(|e| {
            UpstreamError::Malformed {
                service: source.name(),
                reason: e.to_string(),
            }
        })
    }

    /// Thirty days of multi-route traffic starting today, for endpoints
    /// called without a data context.
    pub fn market_sample(&self) -> Vec<FlightRecord> {
        self.market_sample_from(Local::now().date_naive())
    }

    pub fn market_sample_from(&self, start: NaiveDate) -> Vec<FlightRecord> {
        self.generator.market_sample(start, &mut rand::thread_rng())
    }
}

/// Narrative insights from the language model, or the templated bundle.
#[derive(Clone)]
pub struct InsightService {
    model: Option<Arc<dyn InsightModel>>,
    timeout: Duration,
}

impl InsightService {
    pub fn new(timeout: Duration) -> Self {
        Self {
            model: None,
            timeout,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn InsightModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn from_config(config: &FarescopeConfig) -> Self {
        let upstream = &config.upstream;
        let service = Self::new(upstream.timeout());
        match upstream.openai_key() {
            Some(key) => service.with_model(Arc::new(
                OpenAiClient::new(
                    upstream.openai_base_url.clone(),
                    key,
                    upstream.openai_model.clone(),
                    upstream.timeout(),
                )
                .with_sampling(upstream.max_tokens, upstream.temperature),
            )),
            None => service,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn report(&self, summary: &RouteSummary) -> InsightReport {
        if summary.is_empty() {
            debug!("Empty summary; using templated insights");
            return InsightReport::template(summary);
        }
        match self.ask_model(summary).await {
            Ok(bundle) => InsightReport::model(bundle),
            Err(e) => {
                warn!("{}; using templated insights", e);
                InsightReport::template(summary)
            }
        }
    }

    async fn ask_model(&self, summary: &RouteSummary) -> Result<InsightBundle, UpstreamError> {
        let model = self
            .model
            .as_ref()
            .ok_or(UpstreamError::MissingCredential("openai"))?;

        let prompt = build_prompt(summary);
        let reply = tokio::time::timeout(self.timeout, model.complete(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| UpstreamError::Timeout {
                service: model.name(),
                after: self.timeout,
            })??;

        parse_model_reply(&reply).map_err(|e| UpstreamError::Malformed {
            service: model.name(),
            reason: e.to_string(),
        })
    }
}

/// Everything a fetch returns: the table, its summary, all four charts,
/// the per-route and pricing breakdowns and the insights, with provenance
/// for data and insights.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub source: DataSource,
    pub records: Vec<FlightRecord>,
    pub summary: RouteSummary,
    pub charts: ChartSet,
    pub route_insights: BTreeMap<String, RouteInsight>,
    pub price_insights: PriceInsights,
    pub heatmap_insights: HeatmapInsights,
    pub insights: InsightReport,
}

/// Both services, shared by the HTTP handlers and the CLI.
#[derive(Clone)]
pub struct Pipeline {
    pub data: FlightDataService,
    pub insights: InsightService,
}

impl Pipeline {
    /// Validates `config` first; an invalid configuration never reaches
    /// the generator.
    pub fn from_config(config: &FarescopeConfig) -> anyhow::Result<Self> {
        config.ensure_valid()?;
        Ok(Self {
            data: FlightDataService::from_config(config)?,
            insights: InsightService::from_config(config),
        })
    }

    pub async fn analyze(&self, query: &RouteQuery, rows: Option<usize>) -> Analysis {
        let FetchOutcome { source, records } = self.data.fetch(query, rows).await;
        let summary = summarize(&records);
        let charts = build_all(&records);
        let insights = self.insights.report(&summary).await;
        Analysis {
            source,
            route_insights: route_insights(&records),
            price_insights: price_insights(&records),
            heatmap_insights: heatmap_insights(&records),
            records,
            summary,
            charts,
            insights,
        }
    }
}
