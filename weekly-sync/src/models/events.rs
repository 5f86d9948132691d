//! Venue events

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Deserialize;

/// An event listed by a venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueEvent {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
}

impl VenueEvent {
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.start_time < now
    }

    /// Starts after `now` and before `now + horizon`
    pub fn starts_within(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        self.start_time > now && self.start_time < now + horizon
    }
}

/// Graph API event as returned on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct GraphEvent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphPaging {
    pub next: Option<String>,
}

/// One page of `/{venue}/events`
#[derive(Debug, Clone, Deserialize)]
pub struct GraphEventPage {
    #[serde(default)]
    pub data: Vec<GraphEvent>,
    pub paging: Option<GraphPaging>,
}

impl GraphEventPage {
    pub fn next_url(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next.as_deref())
    }
}

/// Graph timestamps look like `2019-03-01T20:00:00-0800`
pub fn parse_start_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

impl GraphEvent {
    /// Events without a parseable start time are dropped
    pub fn into_venue_event(self) -> Option<VenueEvent> {
        let start_time = parse_start_time(self.start_time.as_deref()?)?;
        Some(VenueEvent {
            id: self.id,
            name: self.name,
            start_time,
        })
    }
}
