//! Calendar collaborator
//!
//! Supplies the events around a record's day so the ritual can suggest an
//! occasion. A denied calendar permission is reported as no events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events overlapping `start..end`
    async fn events_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<CalendarEvent>;
}

/// Calendar backed by a fixed list of events
#[derive(Debug, Clone, Default)]
pub struct FixedCalendarProvider {
    events: Vec<CalendarEvent>,
}

impl FixedCalendarProvider {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CalendarProvider for FixedCalendarProvider {
    async fn events_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.overlaps(start, end))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_events_in_range() {
        let event = |title: &str, day: u32| CalendarEvent {
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
            all_day: false,
        };
        let calendar = FixedCalendarProvider::new(vec![event("晨跑", 1), event("牙医", 2)]);

        let events = calendar
            .events_in_range(
                Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap(),
            )
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "牙医");
    }
}
