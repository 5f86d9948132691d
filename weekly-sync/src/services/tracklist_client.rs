//! Radio station tracklist client
//!
//! `GET {api_base}/{YYYY}/{MM}/{DD}?time={HH}:{MM}` returns what was played
//! in the show slot starting at that time.

use async_trait::async_trait;
use std::time::Duration;

use weekly_common::config::TracklistConfig;
use weekly_common::{Error, Result, ShowWindow};

use super::capabilities::WindowSource;
use crate::models::{DesiredItem, TracklistEntry};

const USER_AGENT: &str = concat!("weekly-sync/", env!("CARGO_PKG_VERSION"));

pub struct TracklistClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl TracklistClient {
    pub fn new(config: &TracklistConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Tracklist URL for the slot
    pub fn url_for(&self, window: &ShowWindow) -> String {
        format!(
            "{}/{}?time={}",
            self.api_base,
            window.start().format("%Y/%m/%d"),
            window.start().format("%H:%M")
        )
    }

    pub async fn entries_for(&self, window: &ShowWindow) -> Result<Vec<TracklistEntry>> {
        let url = self.url_for(window);
        tracing::debug!(url = %url, "Fetching tracklist");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::FetchFailed(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        response
            .json::<Vec<TracklistEntry>>()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))
    }
}

#[async_trait]
impl WindowSource for TracklistClient {
    async fn desired_items_for(&self, window: &ShowWindow) -> Result<Vec<DesiredItem>> {
        let entries = self.entries_for(window).await?;
        let items: Vec<DesiredItem> = entries
            .iter()
            .filter_map(|entry| {
                let item = entry.desired_item();
                if item.is_some() {
                    tracing::debug!(artist = %entry.artist, title = %entry.title, "Played");
                }
                item
            })
            .collect();
        tracing::info!(
            window = %window,
            entries = entries.len(),
            linked = items.len(),
            "Tracklist"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_url_for_window() {
        let client = TracklistClient::new(&TracklistConfig {
            api_base: "http://tracklist.example/Music/date/".to_string(),
        })
        .unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let window = ShowWindow::new(start, 3);
        assert_eq!(
            client.url_for(&window),
            "http://tracklist.example/Music/date/2024/03/09?time=21:00"
        );
    }
}
