//! Scripted fakes for the catalog, playlist store, tracklist and venues

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use weekly_common::{ArtistId, Error, PlaylistId, Result, ShowWindow, TrackId, MAX_BATCH_SIZE};
use weekly_sync::models::{CatalogArtist, CatalogTrack, DesiredItem, VenueEvent};
use weekly_sync::services::{
    CatalogCapability, EventSource, RemoteCollection, SearchCapability, TrackSearch, WindowSource,
};

pub fn ids(raw: &[&str]) -> Vec<TrackId> {
    raw.iter().map(|s| TrackId::new(*s)).collect()
}

pub fn item(title: &str, query: &str) -> DesiredItem {
    DesiredItem {
        display_title: title.to_string(),
        candidate_track_ref: query.to_string(),
    }
}

/// An event starting tomorrow
pub fn event(name: &str) -> VenueEvent {
    VenueEvent {
        id: name.to_string(),
        name: name.to_string(),
        start_time: (Utc::now() + chrono::Duration::days(1)).fixed_offset(),
    }
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// Catalog answering artist searches, top tracks and track searches from
/// canned data. Queries can be scripted to be throttled or to fail.
#[derive(Default)]
pub struct FakeCatalog {
    artists: HashMap<String, Vec<CatalogArtist>>,
    top_tracks: HashMap<String, Vec<TrackId>>,
    tracks: HashMap<String, Vec<CatalogTrack>>,
    throttled: Mutex<HashMap<String, u32>>,
    failing: HashSet<String>,
    searches: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `find_artist(name)` returns this artist (exact query only)
    pub fn with_artist(mut self, name: &str, id: &str) -> Self {
        self.artists
            .entry(name.to_lowercase())
            .or_default()
            .push(CatalogArtist::new(id, name));
        self
    }

    /// `find_artist(query)` returns these ranked results
    pub fn with_results(mut self, query: &str, results: &[(&str, &str)]) -> Self {
        self.artists.insert(
            query.to_lowercase(),
            results.iter().map(|(id, name)| CatalogArtist::new(*id, *name)).collect(),
        );
        self
    }

    pub fn with_top_tracks(mut self, artist_id: &str, tracks: &[&str]) -> Self {
        self.top_tracks.insert(artist_id.to_string(), ids(tracks));
        self
    }

    /// `find_tracks(query)` returns tracks named by `(id, name)`
    pub fn with_tracks(mut self, query: &str, tracks: &[(&str, &str)]) -> Self {
        self.tracks.insert(
            query.to_string(),
            tracks.iter().map(|(id, name)| CatalogTrack::new(*id, *name)).collect(),
        );
        self
    }

    /// The next `times` calls for `query` answer `RateLimited`
    pub fn throttle(self, query: &str, times: u32) -> Self {
        self.throttled
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), times);
        self
    }

    /// Calls for `query` (artist search, top tracks or track search) fail
    pub fn fail(mut self, query: &str) -> Self {
        self.failing.insert(query.to_lowercase());
        self
    }

    /// Every query received, in order, throttled attempts included
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn search_count(&self, query: &str) -> usize {
        self.searches()
            .iter()
            .filter(|q| q.as_str() == query)
            .count()
    }

    fn check(&self, query: &str) -> Result<()> {
        self.searches.lock().unwrap().push(query.to_string());
        let key = query.to_lowercase();
        let mut throttled = self.throttled.lock().unwrap();
        if let Some(remaining) = throttled.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::RateLimited);
            }
        }
        if self.failing.contains(&key) {
            return Err(Error::SearchFailed(format!("scripted failure for {}", query)));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchCapability for FakeCatalog {
    async fn find_artist(&self, name: &str) -> Result<Vec<CatalogArtist>> {
        self.check(name)?;
        Ok(self.artists.get(&name.to_lowercase()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CatalogCapability for FakeCatalog {
    async fn top_tracks(&self, artist: &ArtistId) -> Result<Vec<TrackId>> {
        self.check(artist.as_str())?;
        Ok(self.top_tracks.get(artist.as_str()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TrackSearch for FakeCatalog {
    async fn find_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        self.check(query)?;
        Ok(self.tracks.get(query).cloned().unwrap_or_default())
    }
}

/// One call made against the fake playlist store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOp {
    Create(String),
    Add(PlaylistId, Vec<TrackId>),
    Remove(PlaylistId, Vec<TrackId>),
}

struct FakePlaylist {
    id: PlaylistId,
    name: String,
    members: Vec<TrackId>,
}

/// Playlist store recording every mutation. Batches above the API limit
/// are rejected.
#[derive(Default)]
pub struct FakeCollection {
    playlists: Mutex<Vec<FakePlaylist>>,
    ops: Mutex<Vec<CollectionOp>>,
    fail_adds: bool,
    throttled: Mutex<u32>,
    throttled_calls: Mutex<u32>,
}

impl FakeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(self, name: &str, id: &str, members: &[&str]) -> Self {
        self.playlists.lock().unwrap().push(FakePlaylist {
            id: PlaylistId::new(id),
            name: name.to_string(),
            members: ids(members),
        });
        self
    }

    pub fn failing_adds(mut self) -> Self {
        self.fail_adds = true;
        self
    }

    /// The next `times` calls, of any kind, answer `RateLimited`
    pub fn throttle(self, times: u32) -> Self {
        *self.throttled.lock().unwrap() = times;
        self
    }

    /// Calls that were answered `RateLimited`
    pub fn throttled_calls(&self) -> u32 {
        *self.throttled_calls.lock().unwrap()
    }

    fn check_throttle(&self) -> Result<()> {
        let mut remaining = self.throttled.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            *self.throttled_calls.lock().unwrap() += 1;
            return Err(Error::RateLimited);
        }
        Ok(())
    }

    pub fn members(&self, id: &str) -> Vec<TrackId> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| p.members.clone())
            .unwrap_or_default()
    }

    pub fn ops(&self) -> Vec<CollectionOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| !matches!(op, CollectionOp::Create(_)))
            .count()
    }

    fn with_members<R>(
        &self,
        id: &PlaylistId,
        f: impl FnOnce(&mut Vec<TrackId>) -> R,
    ) -> Result<R> {
        let mut playlists = self.playlists.lock().unwrap();
        let playlist = playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| Error::CollectionUpdate(format!("no playlist {}", id)))?;
        Ok(f(&mut playlist.members))
    }

    fn check_batch(ids: &[TrackId]) -> Result<()> {
        if ids.is_empty() || ids.len() > MAX_BATCH_SIZE {
            return Err(Error::CollectionUpdate(format!("bad batch size {}", ids.len())));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCollection for FakeCollection {
    async fn find_by_name(&self, name: &str) -> Result<Option<PlaylistId>> {
        self.check_throttle()?;
        let wanted = name.to_lowercase();
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
            .map(|p| p.id.clone()))
    }

    async fn create(&self, name: &str) -> Result<PlaylistId> {
        self.check_throttle()?;
        let mut playlists = self.playlists.lock().unwrap();
        let id = PlaylistId::new(format!("created-{}", playlists.len() + 1));
        playlists.push(FakePlaylist {
            id: id.clone(),
            name: name.to_string(),
            members: Vec::new(),
        });
        self.ops.lock().unwrap().push(CollectionOp::Create(name.to_string()));
        Ok(id)
    }

    async fn current_members(&self, playlist: &PlaylistId) -> Result<Vec<TrackId>> {
        self.check_throttle()?;
        self.with_members(playlist, |members| members.clone())
    }

    async fn apply_add(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()> {
        self.check_throttle()?;
        if self.fail_adds {
            return Err(Error::CollectionUpdate("scripted add failure".into()));
        }
        Self::check_batch(ids)?;
        self.with_members(playlist, |members| members.extend_from_slice(ids))?;
        self.ops
            .lock()
            .unwrap()
            .push(CollectionOp::Add(playlist.clone(), ids.to_vec()));
        Ok(())
    }

    async fn apply_remove(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()> {
        self.check_throttle()?;
        Self::check_batch(ids)?;
        self.with_members(playlist, |members| members.retain(|m| !ids.contains(m)))?;
        self.ops
            .lock()
            .unwrap()
            .push(CollectionOp::Remove(playlist.clone(), ids.to_vec()));
        Ok(())
    }
}

/// Response of one scripted window fetch
pub enum ScriptedWindow {
    Items(Vec<DesiredItem>),
    Fail,
}

/// Answers window fetches in call order; empty once the script runs out
#[derive(Default)]
pub struct ScriptedWindowSource {
    script: Mutex<VecDeque<ScriptedWindow>>,
    fetched: Mutex<Vec<ShowWindow>>,
}

impl ScriptedWindowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_items(self, items: Vec<DesiredItem>) -> Self {
        self.script.lock().unwrap().push_back(ScriptedWindow::Items(items));
        self
    }

    pub fn then_fail(self) -> Self {
        self.script.lock().unwrap().push_back(ScriptedWindow::Fail);
        self
    }

    pub fn fetched(&self) -> Vec<ShowWindow> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl WindowSource for ScriptedWindowSource {
    async fn desired_items_for(&self, window: &ShowWindow) -> Result<Vec<DesiredItem>> {
        self.fetched.lock().unwrap().push(*window);
        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedWindow::Items(items)) => Ok(items),
            Some(ScriptedWindow::Fail) => {
                Err(Error::FetchFailed("scripted tracklist failure".into()))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Venue listings from canned data
#[derive(Default)]
pub struct FakeEventSource {
    venues: HashMap<String, Vec<VenueEvent>>,
    failing: HashSet<String>,
}

impl FakeEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, venue: &str, titles: &[&str]) -> Self {
        self.venues
            .insert(venue.to_string(), titles.iter().map(|t| event(t)).collect());
        self
    }

    pub fn failing(mut self, venue: &str) -> Self {
        self.failing.insert(venue.to_string());
        self
    }
}

#[async_trait]
impl EventSource for FakeEventSource {
    async fn upcoming_events(&self, venue_id: &str) -> Result<Vec<VenueEvent>> {
        if self.failing.contains(venue_id) {
            return Err(Error::FetchFailed(format!("scripted failure for venue {}", venue_id)));
        }
        Ok(self.venues.get(venue_id).cloned().unwrap_or_default())
    }
}
