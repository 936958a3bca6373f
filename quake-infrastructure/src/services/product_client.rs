// Per-event detail fetcher
// Expands contributed catalog products (moment tensors, focal mechanisms,
// origins) into flat, name-discovered enrichment fields.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use quake_domain::ports::DetailFetcher;
use quake_domain::{
    CatalogError, CellValue, DetailRecord, EnrichmentOptions, EventId, ProductSelection,
    RuntimeConfig,
};

use crate::services::fdsn_client::{check_status, transport_error};

const TENSOR_FIELDS: [(&str, &str); 6] = [
    ("mrr", "tensor-mrr"),
    ("mtt", "tensor-mtt"),
    ("mpp", "tensor-mpp"),
    ("mrt", "tensor-mrt"),
    ("mrp", "tensor-mrp"),
    ("mtp", "tensor-mtp"),
];

const TENSOR_SUPPLEMENT: [(&str, &str); 5] = [
    ("scalar_moment", "scalar-moment"),
    ("percent_double_couple", "percent-double-couple"),
    ("derived_latitude", "derived-latitude"),
    ("derived_longitude", "derived-longitude"),
    ("derived_depth", "derived-depth"),
];

const FOCAL_ANGLES: [&str; 3] = ["strike", "dip", "rake"];

pub struct FdsnDetailFetcher {
    client: Client,
    base_url: String,
}

impl FdsnDetailFetcher {
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
impl DetailFetcher for FdsnDetailFetcher {
    async fn fetch_detail(
        &self,
        id: &EventId,
        options: &EnrichmentOptions,
    ) -> Result<DetailRecord, CatalogError> {
        if !options.any_requested() {
            return Ok(DetailRecord::new());
        }
        let url = format!("{}/query", self.base_url);
        let params = [
            ("format".to_string(), "geojson".to_string()),
            ("eventid".to_string(), id.as_str().to_string()),
        ];
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
        parse_detail(&body, options)
    }
}

/// Flatten the detail document's products into an ordered record.
pub(crate) fn parse_detail(
    body: &str,
    options: &EnrichmentOptions,
) -> Result<DetailRecord, CatalogError> {
    let root: Value =
        serde_json::from_str(body).map_err(|err| CatalogError::Malformed(err.to_string()))?;
    let products = &root["properties"]["products"];

    let mut record = DetailRecord::new();

    for product in selected(products, "moment-tensor", options.moment_tensor) {
        let prefix = product_prefix(&product);
        let props = &product["properties"];
        for (short, key) in TENSOR_FIELDS {
            if let Some(cell) = prop_cell(props, key) {
                record.push(format!("{prefix}_{short}"), cell);
            }
        }
        if options.include_supplement {
            for (short, key) in TENSOR_SUPPLEMENT {
                if let Some(cell) = prop_cell(props, key) {
                    record.push(format!("{prefix}_{short}"), cell);
                }
            }
        }
    }

    for product in selected(products, "focal-mechanism", options.focal_mechanism) {
        let prefix = product_prefix(&product);
        let props = &product["properties"];
        for plane in 1..=2 {
            for angle in FOCAL_ANGLES {
                let key = format!("nodal-plane-{plane}-{angle}");
                if let Some(cell) = prop_cell(props, &key) {
                    record.push(format!("{prefix}_np{plane}_{angle}"), cell);
                }
            }
        }
    }

    if options.include_all_magnitudes {
        for product in selected(products, "origin", ProductSelection::All) {
            let source = str_or(&product, "source", "unknown").to_string();
            let props = &product["properties"];
            let magtype = props
                .get("magnitude-type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            if let Some(cell) = prop_cell(props, "magnitude") {
                record.push(format!("{source}_{magtype}_magnitude"), cell);
            }
        }
    }

    Ok(record)
}

/// Products come back most-preferred first, so `Preferred` is the head of
/// the list.
fn selected(products: &Value, kind: &str, selection: ProductSelection) -> Vec<Value> {
    let Some(list) = products.get(kind).and_then(Value::as_array) else {
        return Vec::new();
    };
    match selection {
        ProductSelection::None => Vec::new(),
        ProductSelection::Preferred => list.first().cloned().into_iter().collect(),
        ProductSelection::All => list.clone(),
    }
}

/// Column prefix `{source}_{method}`, e.g. `us_Mww`.
fn product_prefix(product: &Value) -> String {
    let source = str_or(product, "source", "unknown");
    let props = &product["properties"];
    let method = props
        .get("derived-magnitude-type")
        .and_then(Value::as_str)
        .or_else(|| props.get("beachball-type").and_then(Value::as_str))
        .unwrap_or("unknown");
    format!("{source}_{method}")
}

fn str_or<'a>(value: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(fallback)
}

/// Product property values arrive as strings; numeric ones become numbers.
fn prop_cell(props: &Value, key: &str) -> Option<CellValue> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64().map(CellValue::Number),
        Value::String(s) => Some(
            s.parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::Text(s.clone())),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        r#"{
            "properties": {
                "products": {
                    "moment-tensor": [
                        {
                            "source": "us",
                            "properties": {
                                "derived-magnitude-type": "Mww",
                                "tensor-mrr": "1.2e+19",
                                "tensor-mtt": "-4.5e+18",
                                "tensor-mpp": "3.3e+18",
                                "tensor-mrt": "2.0e+18",
                                "tensor-mrp": "-1.1e+18",
                                "tensor-mtp": "5.0e+17",
                                "scalar-moment": "1.4e+19",
                                "percent-double-couple": "0.97"
                            }
                        },
                        {
                            "source": "nc",
                            "properties": {
                                "derived-magnitude-type": "mwr",
                                "tensor-mrr": "9.0e+16"
                            }
                        }
                    ],
                    "focal-mechanism": [
                        {
                            "source": "us",
                            "properties": {
                                "derived-magnitude-type": "Mww",
                                "nodal-plane-1-strike": "212.3",
                                "nodal-plane-1-dip": "35.9",
                                "nodal-plane-1-rake": "-88.0",
                                "nodal-plane-2-strike": "30.1",
                                "nodal-plane-2-dip": "54.2",
                                "nodal-plane-2-rake": "-91.4"
                            }
                        }
                    ],
                    "origin": [
                        {
                            "source": "us",
                            "properties": { "magnitude-type": "Mww", "magnitude": "6.1" }
                        },
                        {
                            "source": "nc",
                            "properties": { "magnitude-type": "md", "magnitude": "5.9" }
                        }
                    ]
                }
            }
        }"#
        .to_string()
    }

    fn tensor_only(selection: ProductSelection) -> EnrichmentOptions {
        EnrichmentOptions {
            moment_tensor: selection,
            ..EnrichmentOptions::default()
        }
    }

    #[test]
    fn preferred_tensor_takes_only_the_head_product() {
        let record = parse_detail(&fixture(), &tensor_only(ProductSelection::Preferred)).unwrap();
        assert_eq!(record.get("us_Mww_mrr"), Some(&CellValue::Number(1.2e19)));
        assert!(record.get("nc_mwr_mrr").is_none());
        // supplement fields stay out unless asked for
        assert!(record.get("us_Mww_scalar_moment").is_none());
    }

    #[test]
    fn all_tensors_expand_every_contributed_product() {
        let record = parse_detail(&fixture(), &tensor_only(ProductSelection::All)).unwrap();
        assert_eq!(record.get("us_Mww_mrr"), Some(&CellValue::Number(1.2e19)));
        assert_eq!(record.get("nc_mwr_mrr"), Some(&CellValue::Number(9.0e16)));
    }

    #[test]
    fn supplement_fields_follow_the_tensor_prefix() {
        let options = EnrichmentOptions {
            moment_tensor: ProductSelection::Preferred,
            include_supplement: true,
            ..EnrichmentOptions::default()
        };
        let record = parse_detail(&fixture(), &options).unwrap();
        assert_eq!(
            record.get("us_Mww_scalar_moment"),
            Some(&CellValue::Number(1.4e19))
        );
        assert_eq!(
            record.get("us_Mww_percent_double_couple"),
            Some(&CellValue::Number(0.97))
        );
    }

    #[test]
    fn focal_angles_cover_both_nodal_planes() {
        let options = EnrichmentOptions {
            focal_mechanism: ProductSelection::Preferred,
            ..EnrichmentOptions::default()
        };
        let record = parse_detail(&fixture(), &options).unwrap();
        assert_eq!(
            record.get("us_Mww_np1_strike"),
            Some(&CellValue::Number(212.3))
        );
        assert_eq!(
            record.get("us_Mww_np2_rake"),
            Some(&CellValue::Number(-91.4))
        );
    }

    #[test]
    fn all_magnitudes_become_one_column_per_contributed_origin() {
        let options = EnrichmentOptions {
            include_all_magnitudes: true,
            ..EnrichmentOptions::default()
        };
        let record = parse_detail(&fixture(), &options).unwrap();
        assert_eq!(
            record.get("us_Mww_magnitude"),
            Some(&CellValue::Number(6.1))
        );
        assert_eq!(record.get("nc_md_magnitude"), Some(&CellValue::Number(5.9)));
    }

    #[test]
    fn event_without_products_yields_an_empty_record() {
        let record = parse_detail(
            r#"{"properties":{"products":{}}}"#,
            &tensor_only(ProductSelection::All),
        )
        .unwrap();
        assert!(record.is_empty());
    }
}
