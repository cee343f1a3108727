//! Typed client for the backend trips API.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/v1/trips` | [`TripSource::list_trips`] |
//! | GET | `/api/v1/trips/active` | [`TripSource::list_active_trips`] |
//! | GET | `/api/v1/warehouses` | [`TripSource::lookup_warehouses`] |

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use tripwatch_state::Trip;

use crate::config::{ConfigError, SourceConfig};
use crate::error::SourceError;
use crate::retry::RetryPolicy;
use crate::{ListTripsRequest, TripPage, TripSource, Warehouse};

/// API version path segment.
const API_PREFIX: &str = "api/v1";

/// [`TripSource`] backed by the trips API.
#[derive(Debug, Clone)]
pub struct HttpTripSource {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpTripSource {
    /// Build a client from configuration.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, SourceError> {
        let url = self.url(path);
        let resp = self
            .retry
            .send(endpoint, || self.http.get(&url).query(query).send())
            .await
            .map_err(|e| SourceError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| SourceError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}

#[async_trait]
impl TripSource for HttpTripSource {
    async fn list_trips(&self, request: &ListTripsRequest) -> Result<TripPage, SourceError> {
        let page: TripPage = self
            .get_json("GET /trips", "trips", &request.query_pairs())
            .await?;
        tracing::debug!(
            page = request.page,
            trip_count = page.items.len(),
            total_count = page.total_count,
            "fetched trip page"
        );
        Ok(page)
    }

    async fn list_active_trips(&self) -> Result<Vec<Trip>, SourceError> {
        let trips: Vec<Trip> = self.get_json("GET /trips/active", "trips/active", &[]).await?;
        tracing::debug!(trip_count = trips.len(), "fetched active trips");
        Ok(trips)
    }

    async fn lookup_warehouses(&self) -> Result<Vec<Warehouse>, SourceError> {
        self.get_json("GET /warehouses", "warehouses", &[]).await
    }

    fn source_name(&self) -> &str {
        "trips-api"
    }
}
