// Table assembler
// Outer-joins the event summaries with their sparse, schema-varying
// detail records into one rectangular table.

use std::collections::HashMap;

use crate::entities::{CellValue, DetailRecord, EventSummary, ResultTable};
use crate::value_objects::EventId;

/// Merge `events` with `details` into a [`ResultTable`].
///
/// Column order is the canonical summary fields followed by every detail
/// field name in first-encountered order, folding the records in event
/// fetch order. The schema is not known until every record has been seen,
/// which is why the whole detail set is taken at once rather than
/// streamed.
pub fn assemble(
    events: &[EventSummary],
    details: &HashMap<EventId, DetailRecord>,
) -> ResultTable {
    let mut columns: Vec<String> = EventSummary::COLUMNS
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut extra_columns: Vec<String> = Vec::new();
    for event in events {
        let Some(record) = details.get(&event.id) else {
            continue;
        };
        for name in record.field_names() {
            if !extra_columns.iter().any(|existing| existing == name) {
                extra_columns.push(name.to_string());
            }
        }
    }
    columns.extend(extra_columns.iter().cloned());

    let mut rows = Vec::with_capacity(events.len());
    for event in events {
        let mut row = event.cells();
        let record = details.get(&event.id);
        for name in &extra_columns {
            let cell = record
                .and_then(|r| r.get(name))
                .cloned()
                .unwrap_or(CellValue::Empty);
            row.push(cell);
        }
        rows.push(row);
    }

    ResultTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn event(id: &str, seconds: i64) -> EventSummary {
        EventSummary {
            id: EventId::from(id),
            time: Utc.timestamp_opt(seconds, 0).unwrap(),
            location: format!("{} km W of Somewhere", seconds),
            latitude: 35.2,
            longitude: -117.8,
            depth: 9.1,
            magnitude: 4.6,
        }
    }

    fn record(fields: &[(&str, f64)]) -> DetailRecord {
        let mut r = DetailRecord::new();
        for (name, value) in fields {
            r.push(*name, CellValue::Number(*value));
        }
        r
    }

    #[test]
    fn disjoint_detail_fields_union_into_a_rectangular_table() {
        let events = vec![event("ev1", 100), event("ev2", 200)];
        let mut details = HashMap::new();
        details.insert(EventId::from("ev1"), record(&[("us_Mww_strike", 33.0)]));
        details.insert(EventId::from("ev2"), record(&[("nc_mwr_dip", 71.0)]));

        let table = assemble(&events, &details);

        assert!(table.columns.contains(&"us_Mww_strike".to_string()));
        assert!(table.columns.contains(&"nc_mwr_dip".to_string()));
        assert_eq!(table.row_count(), 2);
        for row in &table.rows {
            assert_eq!(row.len(), table.column_count());
        }

        let strike_idx = table.columns.iter().position(|c| c == "us_Mww_strike").unwrap();
        let dip_idx = table.columns.iter().position(|c| c == "nc_mwr_dip").unwrap();
        assert_eq!(table.rows[0][dip_idx].to_string(), "nan");
        assert_eq!(table.rows[1][strike_idx].to_string(), "nan");
        assert_eq!(table.rows[0][strike_idx], CellValue::Number(33.0));
        assert_eq!(table.rows[1][dip_idx], CellValue::Number(71.0));
    }

    #[test]
    fn extra_columns_follow_first_encountered_order_not_alphabetical() {
        let events = vec![event("ev1", 100), event("ev2", 200)];
        let mut details = HashMap::new();
        details.insert(EventId::from("ev1"), record(&[("us_Mww_strike", 33.0)]));
        details.insert(EventId::from("ev2"), record(&[("nc_mwr_dip", 71.0)]));

        let table = assemble(&events, &details);

        let expected: Vec<String> = EventSummary::COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(["us_Mww_strike".to_string(), "nc_mwr_dip".to_string()])
            .collect();
        assert_eq!(table.columns, expected);
    }

    #[test]
    fn no_enrichment_degrades_to_a_pure_summary_table() {
        let events = vec![event("ev1", 100), event("ev2", 200), event("ev3", 300)];
        let table = assemble(&events, &HashMap::new());

        let canonical: Vec<String> = EventSummary::COLUMNS
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(table.columns, canonical);
        assert_eq!(table.row_count(), 3);
        for (row, event) in table.rows.iter().zip(&events) {
            assert_eq!(*row, event.cells());
        }
    }

    #[test]
    fn row_order_matches_event_order() {
        let events = vec![event("ev3", 300), event("ev1", 100), event("ev2", 200)];
        let table = assemble(&events, &HashMap::new());
        let ids: Vec<String> = table.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(ids, vec!["ev3", "ev1", "ev2"]);
    }

    #[test]
    fn assembling_no_events_yields_headers_only() {
        let table = assemble(&[], &HashMap::new());
        assert!(table.is_empty());
        assert_eq!(table.column_count(), EventSummary::COLUMNS.len());
    }
}
