//! weekly-sync - weekly playlist synchronisation
//!
//! 1. Region playlists: top tracks of the artists playing each region's
//!    venues over the coming week (skipped with `--eclectic-only`)
//! 2. Weekly radio playlist: everything the station played since Sunday
//!    (skipped with `--guess-only`)
//!
//! `--guess <TITLE>` prints the artist guess tree for one title and exits
//! without touching the network.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use weekly_common::config::{TomlConfig, CONFIG_ENV_VAR};
use weekly_common::logging::init_logging;
use weekly_common::ShowWindow;
use weekly_sync::guess_artists;
use weekly_sync::models::load_regions;
use weekly_sync::services::{
    ArtistCache, ConvergenceLoop, EventClient, RegionSync, RegionSyncOptions, SpotifyClient,
    TracklistClient,
};

#[derive(Parser, Debug)]
#[command(name = "weekly-sync", version, about = "Sync weekly venue and radio playlists")]
struct Args {
    /// Configuration file
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// JSON regions file (overrides sync.regions_file)
    #[arg(long)]
    regions_file: Option<PathBuf>,

    /// Guess and resolve artists only; change no playlists and skip the
    /// weekly radio playlist
    #[arg(long)]
    guess_only: bool,

    /// Only update the weekly radio playlist
    #[arg(long)]
    eclectic_only: bool,

    /// Print the guess tree for one event title and exit
    #[arg(long, value_name = "TITLE")]
    guess: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(title) = &args.guess {
        print!("{}", guess_artists(title).render());
        return Ok(());
    }

    let config = TomlConfig::load(args.config.as_deref())?;
    init_logging(&config.logging)?;

    info!("Starting weekly-sync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let spotify = SpotifyClient::new(&config.spotify)?;
    let backoff = config.sync.rate_limit_backoff();
    let batch_size = config.sync.effective_batch_size();

    if !args.eclectic_only {
        let events = EventClient::new(&config.facebook)?;
        let regions_file = args
            .regions_file
            .clone()
            .unwrap_or_else(|| config.sync.regions_file.clone());
        let regions = load_regions(&regions_file)
            .with_context(|| format!("Failed to load regions from {}", regions_file.display()))?;

        let options = RegionSyncOptions {
            top_tracks_per_artist: config.sync.top_tracks_per_artist,
            batch_size,
            playlist_suffix: config.sync.region_playlist_suffix.clone(),
            guess_only: args.guess_only,
            rate_limit_backoff: backoff,
        };
        let sync = RegionSync::new(&events, &spotify, &spotify, &spotify, options);
        let mut cache = ArtistCache::new();
        let reports = sync.sync_all(&regions, &mut cache).await?;

        for report in &reports {
            info!(
                region = %report.region,
                events = report.events,
                artists = report.artists,
                without_tracks = report.without_tracks.len(),
                added = report.added,
                removed = report.removed,
                "Region summary"
            );
        }
    }

    if args.guess_only {
        info!("Guess only, skipping weekly playlist");
        return Ok(());
    }

    let tracklist = TracklistClient::new(&config.tracklist)?;
    let start = ShowWindow::containing(Local::now().naive_local(), config.sync.show_hours);
    let outcome = ConvergenceLoop::new(&tracklist, &spotify, &spotify)
        .with_batch_size(batch_size)
        .with_backoff(backoff)
        .sync_weekly_playlist(&config.sync.eclectic_playlist_prefix, start)
        .await
        .context("Unable to update weekly playlist")?;

    info!(
        state = %outcome.state,
        windows = outcome.windows,
        added = outcome.tracks_added,
        "Finished"
    );

    Ok(())
}
