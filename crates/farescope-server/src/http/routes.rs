use super::{AppResult, AppState, JsonResponse};
use crate::config::Credentials;
use crate::pipeline::{check_rows, route_query, Analysis};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Local;
use farescope_core::query::parse_airport_code;
use farescope_core::reference::{airport_info, available_routes, AirportInfo, RouteInfo};
use farescope_core::{
    build_chart, build_heatmap_view, heatmap_insights, market_overview, summarize, ChartPayload,
    ChartType, FarescopeError, FlightRecord, HeatmapInsights, HeatmapView, HeatmapViewChart,
    InsightReport, MarketOverview,
};
use serde::{Deserialize, Serialize};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/fetch-data", post(fetch_data))
        .route("/api/charts", post(chart))
        .route("/api/market-analysis", get(market_analysis))
        .route("/api/heatmap-insights", get(heatmap))
        .route("/api/test-insights", get(test_insights))
        .route("/api/routes", get(routes))
        .route("/api/airports/:code", get(airport))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: String,
    uptime_seconds: u64,
    credentials: Credentials,
}

async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthResponse>> {
    Json(JsonResponse::ok(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        credentials: state.credentials,
    }))
}

#[derive(Deserialize)]
struct FetchBody {
    origin: Option<String>,
    destination: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    rows: Option<usize>,
}

/// Unreadable request bodies answer with the validation envelope.
fn rejected(rejection: JsonRejection) -> FarescopeError {
    FarescopeError::Validation(rejection.body_text())
}

async fn fetch_data(
    State(state): State<AppState>,
    body: Result<Json<FetchBody>, JsonRejection>,
) -> AppResult<Json<JsonResponse<Analysis>>> {
    let Json(body) = body.map_err(rejected)?;
    let query = route_query(
        body.origin.as_deref(),
        body.destination.as_deref(),
        body.date_from.as_deref(),
        body.date_to.as_deref(),
        Local::now().date_naive(),
    )?;
    let rows = check_rows(body.rows)?;

    let analysis = state.pipeline.analyze(&query, rows).await;
    Ok(Json(JsonResponse::ok(analysis)))
}

#[derive(Deserialize)]
struct ChartBody {
    chart_type: String,
    /// Only meaningful for `demand_heatmap`.
    heatmap_view: Option<String>,
    records: Option<Vec<FlightRecord>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChartReply {
    Chart(ChartPayload),
    HeatmapView(HeatmapViewChart),
}

async fn chart(
    State(state): State<AppState>,
    body: Result<Json<ChartBody>, JsonRejection>,
) -> AppResult<Json<JsonResponse<ChartReply>>> {
    let Json(body) = body.map_err(rejected)?;
    let chart_type: ChartType = body.chart_type.parse()?;
    let view = match body.heatmap_view.as_deref() {
        None => None,
        Some(_) if chart_type != ChartType::DemandHeatmap => {
            return Err(FarescopeError::Validation(format!(
                "heatmap_view does not apply to {}",
                chart_type
            ))
            .into())
        }
        Some(name) => Some(name.parse::<HeatmapView>()?),
    };

    let records = match body.records {
        Some(records) => records,
        None => state.pipeline.data.market_sample(),
    };
    let reply = match view {
        Some(view) => ChartReply::HeatmapView(build_heatmap_view(view, &records)),
        None => ChartReply::Chart(build_chart(chart_type, &records)),
    };
    Ok(Json(JsonResponse::ok(reply)))
}

#[derive(Serialize)]
struct MarketAnalysis {
    overview: MarketOverview,
    insights: InsightReport,
}

async fn market_analysis(State(state): State<AppState>) -> Json<JsonResponse<MarketAnalysis>> {
    let records = state.pipeline.data.market_sample();
    let summary = summarize(&records);
    let insights = state.pipeline.insights.report(&summary).await;
    Json(JsonResponse::ok(MarketAnalysis {
        overview: market_overview(),
        insights,
    }))
}

async fn heatmap(State(state): State<AppState>) -> Json<JsonResponse<HeatmapInsights>> {
    let records = state.pipeline.data.market_sample();
    Json(JsonResponse::ok(heatmap_insights(&records)))
}

/// Templated insights only, regardless of model configuration.
async fn test_insights(State(state): State<AppState>) -> Json<JsonResponse<InsightReport>> {
    let records = state.pipeline.data.market_sample();
    Json(JsonResponse::ok(InsightReport::template(&summarize(&records))))
}

async fn routes() -> Json<JsonResponse<Vec<RouteInfo>>> {
    Json(JsonResponse::ok(available_routes()))
}

async fn airport(Path(code): Path<String>) -> AppResult<Json<JsonResponse<AirportInfo>>> {
    let code = parse_airport_code(&code)?;
    Ok(Json(JsonResponse::ok(airport_info(&code))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FarescopeConfig;
    use crate::pipeline::Pipeline;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = FarescopeConfig::default();
        create_router(AppState {
            pipeline: Pipeline::from_config(&config).unwrap(),
            credentials: config.credentials(),
            start_time: std::time::Instant::now(),
        })
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // ── /api/fetch-data ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_without_credentials_is_mock() {
        let (status, body) = send(post_json(
            "/api/fetch-data",
            json!({
                "origin": "SYD",
                "destination": "MEL",
                "date_from": "2025-07-19",
                "date_to": "2025-07-21"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["source"], "mock");
        assert!(data["records"].as_array().unwrap().len() >= 3);
        assert!(data["summary"]["total_flights"].as_u64().unwrap() >= 3);
        assert_eq!(data["charts"]["price_trend"]["points"].as_array().unwrap().len(), 3);
        assert_eq!(data["insights"]["source"], "template");
        assert_eq!(data["insights"]["recommendations"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn fetch_with_empty_body_uses_defaults() {
        let (status, body) = send(post_json("/api/fetch-data", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["records"][0]["route"], "SYD-MEL");
    }

    #[tokio::test]
    async fn fetch_rejects_reversed_dates() {
        let (status, body) = send(post_json(
            "/api/fetch-data",
            json!({ "date_from": "2025-07-21", "date_to": "2025-07-19" }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn fetch_honours_row_target() {
        let (_, body) = send(post_json(
            "/api/fetch-data",
            json!({ "date_from": "2025-07-19", "date_to": "2025-07-28", "rows": 40 }),
        ))
        .await;
        assert_eq!(body["data"]["records"].as_array().unwrap().len(), 40);
    }

    #[tokio::test]
    async fn fetch_with_malformed_body_uses_envelope() {
        let (status, body) = send(post_json("/api/fetch-data", json!({ "rows": "x" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "validation");
        assert!(body["error"].is_string());
    }

    // ── /api/charts ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_chart_type_is_bad_request() {
        let (status, body) = send(post_json("/api/charts", json!({ "chart_type": "bogus" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_chart_type");
    }

    #[tokio::test]
    async fn heatmap_chart_is_seven_by_twenty_four() {
        let (status, body) =
            send(post_json("/api/charts", json!({ "chart_type": "demand_heatmap" }))).await;

        assert_eq!(status, StatusCode::OK);
        let counts = body["data"]["counts"].as_array().unwrap();
        assert_eq!(counts.len(), 7);
        assert!(counts.iter().all(|row| row.as_array().unwrap().len() == 24));
    }

    #[tokio::test]
    async fn chart_over_posted_records() {
        let records = json!([{
            "airline": "Jetstar",
            "flight_number": "JQ501",
            "origin": "MEL",
            "destination": "SYD",
            "departure_date": "2025-07-19",
            "departure_time": "08:30:00",
            "price": 129.0,
            "duration_minutes": 90
        }]);
        let (status, body) = send(post_json(
            "/api/charts",
            json!({ "chart_type": "airline_distribution", "records": records }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["chart_type"], "airline_distribution");
        assert_eq!(body["data"]["counts"]["Jetstar"], 1);
    }

    #[tokio::test]
    async fn chart_with_invalid_record_uses_envelope() {
        let records = json!([{
            "airline": "Jetstar",
            "flight_number": "JQ501",
            "origin": "MEL",
            "destination": "SYD",
            "departure_date": "2025-07-19",
            "departure_time": "08:30:00",
            "price": 0.0,
            "duration_minutes": 90
        }]);
        let (status, body) = send(post_json(
            "/api/charts",
            json!({ "chart_type": "airline_distribution", "records": records }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
    }

    #[tokio::test]
    async fn heatmap_view_is_selectable() {
        let (status, body) = send(post_json(
            "/api/charts",
            json!({ "chart_type": "demand_heatmap", "heatmap_view": "weekend_analysis" }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["current_view"], "weekend_analysis");
        assert_eq!(data["heatmap_views"].as_array().unwrap().len(), 6);
        assert_eq!(data["chart"]["row_labels"], json!(["Weekday", "Weekend"]));
        assert_eq!(data["chart"]["values"][0].as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn heatmap_view_rejects_unknown_or_misplaced_views() {
        let (status, body) = send(post_json(
            "/api/charts",
            json!({ "chart_type": "demand_heatmap", "heatmap_view": "contour" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, _) = send(post_json(
            "/api/charts",
            json!({ "chart_type": "price_trend", "heatmap_view": "flight_count" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn default_heatmap_lists_views() {
        let (_, body) = send(post_json("/api/charts", json!({ "chart_type": "demand_heatmap" }))).await;
        assert_eq!(body["data"]["heatmap_views"][4], "route_day_price");
    }

    // ── Market-sample endpoints ─────────────────────────────────────────────

    #[tokio::test]
    async fn market_analysis_has_overview_and_insights() {
        let (status, body) = send(get("/api/market-analysis")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["overview"]["major_players"].is_array());
        assert_eq!(body["data"]["insights"]["risk_factors"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn heatmap_insights_report_peaks() {
        let (status, body) = send(get("/api/heatmap-insights")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["peak_hour"].is_u64());
    }

    #[tokio::test]
    async fn test_insights_are_templated() {
        let (_, body) = send(get("/api/test-insights")).await;
        assert_eq!(body["data"]["source"], "template");
        assert_eq!(body["data"]["opportunities"].as_array().unwrap().len(), 8);
    }

    // ── Reference data and health ───────────────────────────────────────────

    #[tokio::test]
    async fn routes_and_airports() {
        let (_, body) = send(get("/api/routes")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 45);

        let (status, body) = send(get("/api/airports/syd")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["code"], "SYD");

        let (status, _) = send(get("/api/airports/SYDNEY")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_credentials() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["healthy"], true);
        assert_eq!(body["data"]["credentials"]["flight_data"], false);
    }
}
