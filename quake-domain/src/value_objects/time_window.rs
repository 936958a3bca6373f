// Half-open time interval used for query decomposition.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// `[start, end)`: the end instant belongs to the next window, so a
/// partition of a parent window never duplicates or drops a boundary
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the window spans more than one catalog time tick
    /// (millisecond resolution) and can still be subdivided.
    pub fn can_split(&self) -> bool {
        self.duration() > Duration::milliseconds(1)
    }

    /// Partition into `parts` contiguous half-open sub-windows covering
    /// exactly `[start, end)`. The last window absorbs rounding slack.
    pub fn split_even(&self, parts: u32) -> Vec<TimeWindow> {
        let parts = parts.max(1);
        let total_ms = self.duration().num_milliseconds().max(0);
        if parts == 1 || total_ms < i64::from(parts) {
            return vec![*self];
        }
        let step_ms = total_ms / i64::from(parts);
        let mut windows = Vec::with_capacity(parts as usize);
        let mut cursor = self.start;
        for i in 0..parts {
            let end = if i == parts - 1 {
                self.end
            } else {
                cursor + Duration::milliseconds(step_ms)
            };
            windows.push(TimeWindow::new(cursor, end));
            cursor = end;
        }
        windows
    }
}
