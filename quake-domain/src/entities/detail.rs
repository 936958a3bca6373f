// Per-event enrichment entities

use serde::{Deserialize, Serialize};

use crate::entities::CellValue;

/// Which contributed products of a kind to expand into columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSelection {
    /// Skip this product group entirely.
    #[default]
    None,
    /// Only the authoritative (highest-weight) product.
    Preferred,
    /// Every contributed product.
    All,
}

impl ProductSelection {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ProductSelection::None)
    }
}

/// What supplemental data to fetch for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnrichmentOptions {
    pub moment_tensor: ProductSelection,
    pub focal_mechanism: ProductSelection,
    pub include_supplement: bool,
    pub include_all_magnitudes: bool,
}

impl EnrichmentOptions {
    /// Whether any per-event detail fetch is needed at all.
    pub fn any_requested(&self) -> bool {
        self.moment_tensor.is_enabled()
            || self.focal_mechanism.is_enabled()
            || self.include_all_magnitudes
    }
}

/// Enrichment fields for one event.
///
/// Field names are runtime-discovered strings such as `us_Mww_mrr`;
/// insertion order is preserved because it drives the first-seen column
/// order of the assembled table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailRecord {
    fields: Vec<(String, CellValue)>,
}

impl DetailRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, keeping the first value on duplicate names.
    pub fn push(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if self.fields.iter().any(|(existing, _)| *existing == name) {
            return;
        }
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
