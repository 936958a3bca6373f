// GeoQuery normalizer
// Canonicalizes raw filter input before anything touches the network.

use crate::error::FilterError;
use crate::value_objects::{EventFilter, FilterParams};

pub const DEFAULT_MIN_MAGNITUDE: f64 = 0.0;
pub const DEFAULT_MAX_MAGNITUDE: f64 = 9.9;

/// Validate and canonicalize `params` into an [`EventFilter`].
///
/// Spatial modes are mutually exclusive; a bounding box that crosses the
/// antimeridian is rewritten into a continuous longitude interval so that
/// downstream numeric comparisons need no wraparound handling.
pub fn normalize(params: FilterParams) -> Result<EventFilter, FilterError> {
    if params.bounds.is_some() && params.radius.is_some() {
        return Err(FilterError::ConflictingSpatialConstraint);
    }

    if let (Some(start), Some(end)) = (params.start_time, params.end_time) {
        if start >= end {
            return Err(FilterError::InvalidTimeRange { start, end });
        }
    }

    let (min_magnitude, max_magnitude) = match (params.min_magnitude, params.max_magnitude) {
        (None, None) => (DEFAULT_MIN_MAGNITUDE, DEFAULT_MAX_MAGNITUDE),
        (Some(min), Some(max)) => (min, max),
        _ => return Err(FilterError::IncompleteMagnitudeRange),
    };

    let mut bounds = params.bounds;
    if let Some(b) = bounds.as_mut() {
        // lon_min > lon_max with lon_max >= -180 means the box wraps the
        // antimeridian; shift the left edge down a full turn. Anything
        // with lon_max < -180 is the caller's problem and passes through.
        if b.lon_min > b.lon_max && b.lon_max >= -180.0 {
            b.lon_min -= 360.0;
        }
    }

    Ok(EventFilter {
        start_time: params.start_time,
        end_time: params.end_time,
        updated_after: params.updated_after,
        bounds,
        radius: params.radius,
        min_magnitude,
        max_magnitude,
        catalog: params.catalog,
        contributor: params.contributor,
        product_type: params.product_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{BoundingBox, SearchRadius};
    use chrono::TimeZone;
    use chrono::Utc;

    fn box_params(lon_min: f64, lon_max: f64) -> FilterParams {
        FilterParams {
            bounds: Some(BoundingBox {
                lon_min,
                lon_max,
                lat_min: -10.0,
                lat_max: 10.0,
            }),
            ..FilterParams::default()
        }
    }

    #[test]
    fn box_and_radius_together_are_rejected() {
        let params = FilterParams {
            radius: Some(SearchRadius {
                latitude: 35.0,
                longitude: 140.0,
                max_radius_km: 500.0,
            }),
            ..box_params(100.0, 120.0)
        };
        assert_eq!(
            normalize(params),
            Err(FilterError::ConflictingSpatialConstraint)
        );
    }

    #[test]
    fn antimeridian_box_is_rewritten_to_a_continuous_interval() {
        let filter = normalize(box_params(170.0, -170.0)).expect("normalize");
        let bounds = filter.bounds.expect("bounds");
        assert_eq!(bounds.lon_min, -190.0);
        assert_eq!(bounds.lon_max, -170.0);
        assert!(bounds.lon_min <= bounds.lon_max);
    }

    #[test]
    fn degenerate_box_below_minus_180_passes_through() {
        let filter = normalize(box_params(170.0, -181.0)).expect("normalize");
        let bounds = filter.bounds.expect("bounds");
        assert_eq!(bounds.lon_min, 170.0);
        assert_eq!(bounds.lon_max, -181.0);
    }

    #[test]
    fn ordinary_box_is_untouched() {
        let filter = normalize(box_params(-120.0, -110.0)).expect("normalize");
        let bounds = filter.bounds.expect("bounds");
        assert_eq!(bounds.lon_min, -120.0);
        assert_eq!(bounds.lon_max, -110.0);
    }

    #[test]
    fn magnitude_range_defaults_when_unspecified() {
        let filter = normalize(FilterParams::default()).expect("normalize");
        assert_eq!(filter.min_magnitude, 0.0);
        assert_eq!(filter.max_magnitude, 9.9);
    }

    #[test]
    fn single_magnitude_bound_is_rejected() {
        let params = FilterParams {
            min_magnitude: Some(4.5),
            ..FilterParams::default()
        };
        assert_eq!(normalize(params), Err(FilterError::IncompleteMagnitudeRange));

        let params = FilterParams {
            max_magnitude: Some(7.0),
            ..FilterParams::default()
        };
        assert_eq!(normalize(params), Err(FilterError::IncompleteMagnitudeRange));
    }

    #[test]
    fn inverted_time_range_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let params = FilterParams {
            start_time: Some(start),
            end_time: Some(end),
            ..FilterParams::default()
        };
        assert_eq!(normalize(params), Err(FilterError::InvalidTimeRange { start, end }));
    }
}
