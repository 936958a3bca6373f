// FDSN event-service catalog client
// One bounded request per call; pagination lives in the application layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use quake_domain::ports::CatalogClient;
use quake_domain::{CatalogError, EventFilter, EventId, EventSummary, RuntimeConfig};

pub struct FdsnCatalogClient {
    client: Client,
    base_url: String,
}

impl FdsnCatalogClient {
    pub fn new(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogClient for FdsnCatalogClient {
    async fn count(&self, filter: &EventFilter) -> Result<u64, CatalogError> {
        let url = format!("{}/count", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&filter_query(filter))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response)?;
        let body = response
            .text()
            .await
            .map_err(|err| CatalogError::Malformed(err.to_string()))?;
        parse_count(&body)
    }

    async fn fetch_page(
        &self,
        filter: &EventFilter,
        limit: u64,
    ) -> Result<Vec<EventSummary>, CatalogError> {
        let url = format!("{}/query", self.base_url);
        let mut params = filter_query(filter);
        params.push(("orderby".to_string(), "time-asc".to_string()));
        params.push(("limit".to_string(), limit.to_string()));
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response)?;
        let body = response
            .text()
            .await
            .map_err(|err| CatalogError::Malformed(err.to_string()))?;
        parse_summary_collection(&body)
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> CatalogError {
    CatalogError::Unavailable(err.to_string())
}

/// The service signals overload with 429/503; both are worth retrying.
pub(crate) fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::Unavailable(format!(
            "service responded {status}"
        )));
    }
    Err(CatalogError::Rejected(format!("service responded {status}")))
}

/// Map a canonical filter to FDSN query parameters.
///
/// The service treats `endtime` as inclusive at millisecond resolution,
/// so the half-open upper bound is sent as `end - 1 ms`. That keeps
/// adjacent decomposition windows from both matching a boundary event.
pub(crate) fn filter_query(filter: &EventFilter) -> Vec<(String, String)> {
    let mut params = vec![("format".to_string(), "geojson".to_string())];
    let mut push = |key: &str, value: String| params.push((key.to_string(), value));

    if let Some(start) = filter.start_time {
        push("starttime", fdsn_time(start));
    }
    if let Some(end) = filter.end_time {
        push("endtime", fdsn_time(end - ChronoDuration::milliseconds(1)));
    }
    if let Some(after) = filter.updated_after {
        push("updatedafter", fdsn_time(after));
    }
    if let Some(bounds) = filter.bounds {
        push("minlongitude", bounds.lon_min.to_string());
        push("maxlongitude", bounds.lon_max.to_string());
        push("minlatitude", bounds.lat_min.to_string());
        push("maxlatitude", bounds.lat_max.to_string());
    }
    if let Some(radius) = filter.radius {
        push("latitude", radius.latitude.to_string());
        push("longitude", radius.longitude.to_string());
        push("maxradiuskm", radius.max_radius_km.to_string());
    }
    push("minmagnitude", filter.min_magnitude.to_string());
    push("maxmagnitude", filter.max_magnitude.to_string());
    if let Some(catalog) = &filter.catalog {
        push("catalog", catalog.clone());
    }
    if let Some(contributor) = &filter.contributor {
        push("contributor", contributor.clone());
    }
    if let Some(product_type) = &filter.product_type {
        push("producttype", product_type.clone());
    }
    params
}

fn fdsn_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

fn parse_count(body: &str) -> Result<u64, CatalogError> {
    let parsed: CountResponse =
        serde_json::from_str(body).map_err(|err| CatalogError::Malformed(err.to_string()))?;
    Ok(parsed.count)
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    id: String,
    properties: SummaryProperties,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct SummaryProperties {
    time: i64,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    mag: Option<f64>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: [f64; 3],
}

pub(crate) fn parse_summary_collection(body: &str) -> Result<Vec<EventSummary>, CatalogError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|err| CatalogError::Malformed(err.to_string()))?;
    collection
        .features
        .into_iter()
        .map(|feature| {
            let time = Utc
                .timestamp_millis_opt(feature.properties.time)
                .single()
                .ok_or_else(|| {
                    CatalogError::Malformed(format!(
                        "event {} has an out-of-range time {}",
                        feature.id, feature.properties.time
                    ))
                })?;
            let [longitude, latitude, depth] = feature.geometry.coordinates;
            Ok(EventSummary {
                id: EventId(feature.id),
                time,
                location: feature.properties.place.unwrap_or_default(),
                latitude,
                longitude,
                depth,
                magnitude: feature.properties.mag.unwrap_or(f64::NAN),
            })
        })
        .collect()
}
