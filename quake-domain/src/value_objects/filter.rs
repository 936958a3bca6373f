// Catalog filter value objects
// FilterParams is raw user input; EventFilter is the canonical form
// produced by the normalizer and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::TimeWindow;

/// Geographic bounding box in decimal degrees.
///
/// After normalization `lon_min <= lon_max` always holds for boxes that
/// cross the antimeridian; `lon_min` may then be below -180.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

/// Circular search area around a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRadius {
    pub latitude: f64,
    pub longitude: f64,
    pub max_radius_km: f64,
}

/// Raw filter input as collected from the caller. Everything is optional;
/// the normalizer decides what is valid and fills defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterParams {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub bounds: Option<BoundingBox>,
    pub radius: Option<SearchRadius>,
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
    pub catalog: Option<String>,
    pub contributor: Option<String>,
    pub product_type: Option<String>,
}

/// Canonical, validated filter. Constructed only by
/// [`crate::services::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFilter {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub bounds: Option<BoundingBox>,
    pub radius: Option<SearchRadius>,
    pub min_magnitude: f64,
    pub max_magnitude: f64,
    pub catalog: Option<String>,
    pub contributor: Option<String>,
    pub product_type: Option<String>,
}

impl EventFilter {
    /// The bounded half-open time window of this filter, if both ends are
    /// present. Pagination needs this to decompose oversized queries.
    pub fn time_window(&self) -> Option<TimeWindow> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        }
    }

    /// The same filter restricted to `window`. Used by the pagination
    /// engine to issue non-overlapping sub-queries.
    pub fn with_window(&self, window: TimeWindow) -> Self {
        let mut sub = self.clone();
        sub.start_time = Some(window.start);
        sub.end_time = Some(window.end);
        sub
    }
}
