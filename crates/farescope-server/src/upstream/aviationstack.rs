use super::{http_client, FlightSource, UpstreamError};
use async_trait::async_trait;
use farescope_core::{FlightsResponse, RouteQuery};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "aviationstack";

/// Client for an AviationStack-compatible `/flights` endpoint.
pub struct AviationStackClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl AviationStackClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: http_client(timeout),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}/flights", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FlightSource for AviationStackClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn fetch(&self, query: &RouteQuery) -> Result<FlightsResponse, UpstreamError> {
        let mut params = vec![
            ("access_key", self.api_key.clone()),
            ("dep_iata", query.origin().to_string()),
            ("arr_iata", query.destination().to_string()),
        ];
        // The provider filters on one date only; wider ranges are filtered
        // locally after mapping.
        if query.day_count() == 1 {
            params.push(("flight_date", query.date_from().to_string()));
        }

        debug!("GET {} for {}", self.url(), query.route_label());
        let resp = self
            .http
            .get(self.url())
            .query(&params)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout, e))?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed {
            service: SERVICE,
            reason: e.to_string(),
        })
    }
}
