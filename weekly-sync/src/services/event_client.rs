//! Venue event listing client (Graph API)
//!
//! Venues list events newest first. Pages are followed until one contains an
//! event that already happened or `max_pages` is reached; only events
//! starting within the horizon are kept.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use weekly_common::config::FacebookConfig;
use weekly_common::{Error, Result};

use super::capabilities::EventSource;
use crate::models::events::{GraphEvent, GraphEventPage};
use crate::models::VenueEvent;

const USER_AGENT: &str = concat!("weekly-sync/", env!("CARGO_PKG_VERSION"));

pub struct EventClient {
    http_client: reqwest::Client,
    api_base: String,
    access_token: String,
    max_pages: usize,
    horizon: chrono::Duration,
}

impl EventClient {
    /// Fails when no access token is configured
    pub fn new(config: &FacebookConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("facebook.access_token is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token,
            max_pages: config.max_pages.max(1),
            horizon: config.horizon(),
        })
    }

    async fn fetch_page(&self, url: &str, first: bool) -> Result<GraphEventPage> {
        let mut request = self.http_client.get(url);
        // `next` links already carry the token
        if first {
            request = request.query(&[("access_token", self.access_token.as_str())]);
        }

        let response = request.send().await.map_err(|e| Error::FetchFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::FetchFailed(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        response
            .json::<GraphEventPage>()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))
    }
}

/// True when any event on the page started before `now`
pub fn contains_past(events: &[VenueEvent], now: DateTime<Utc>) -> bool {
    events.iter().any(|e| e.is_past(now))
}

/// Events starting after `now` and within `horizon`, in listing order
pub fn upcoming_within(
    events: Vec<VenueEvent>,
    now: DateTime<Utc>,
    horizon: chrono::Duration,
) -> Vec<VenueEvent> {
    events
        .into_iter()
        .filter(|e| e.starts_within(now, horizon))
        .collect()
}

#[async_trait]
impl EventSource for EventClient {
    async fn upcoming_events(&self, venue_id: &str) -> Result<Vec<VenueEvent>> {
        let now = Utc::now();
        let mut url = format!("{}/{}/events", self.api_base, venue_id);
        let mut events = Vec::new();

        for page_number in 0..self.max_pages {
            let page = self.fetch_page(&url, page_number == 0).await?;
            let next = page.next_url().map(String::from);
            let page_events: Vec<VenueEvent> = page
                .data
                .into_iter()
                .filter_map(GraphEvent::into_venue_event)
                .collect();

            let done = contains_past(&page_events, now);
            events.extend(page_events);
            if done {
                break;
            }
            match next {
                Some(next) => url = next,
                None => break,
            }
        }

        let upcoming = upcoming_within(events, now, self.horizon);
        tracing::debug!(venue = %venue_id, upcoming = upcoming.len(), "Fetched venue events");
        Ok(upcoming)
    }
}
