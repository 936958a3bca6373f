// Event summary entity
// One row of the base catalog response; the field order here defines the
// canonical first columns of every result table.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::CellValue;
use crate::value_objects::EventId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    pub time: DateTime<Utc>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub magnitude: f64,
}

impl EventSummary {
    /// Canonical column names, in the order the catalog reports them.
    pub const COLUMNS: [&'static str; 7] = [
        "id",
        "time",
        "location",
        "latitude",
        "longitude",
        "depth",
        "magnitude",
    ];

    /// The summary rendered as one table row, matching [`Self::COLUMNS`].
    pub fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.id.0.clone()),
            CellValue::Text(self.time.to_rfc3339_opts(SecondsFormat::Millis, true)),
            CellValue::Text(self.location.clone()),
            CellValue::Number(self.latitude),
            CellValue::Number(self.longitude),
            CellValue::Number(self.depth),
            CellValue::Number(self.magnitude),
        ]
    }
}
