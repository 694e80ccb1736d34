pub mod types;
pub mod error;
pub mod reference;
pub mod query;
pub mod generator;
pub mod provider;
pub mod summary;
pub mod charts;
pub mod insights;

pub use error::{FarescopeError, Result};
pub use types::*;
pub use query::RouteQuery;
pub use generator::{GeneratorConfig, MockGenerator};
pub use provider::{map_response, FlightsResponse};
pub use summary::{summarize, Aggregator, PriceBands, RouteCount, RouteSummary, Trend};
pub use charts::{
    build_all, build_chart, build_heatmap_view, build_named_chart, ChartPayload, ChartSet,
    ChartType, Heatmap, HeatmapGrid, HeatmapView, HeatmapViewChart, PricePoint,
};
pub use insights::{
    heatmap_insights, market_overview, price_insights, route_insights, template_bundle,
    HeatmapInsights, InsightBundle, InsightReport, InsightSource, MarketOverview, PriceInsights,
    RouteInsight,
};
