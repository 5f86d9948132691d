//! weekly-sync library
//!
//! Keeps two kinds of playlists in step with the outside world:
//! - one per region, holding top tracks of artists playing its venues this week
//! - one per week, holding everything the radio station played since Sunday
//!
//! Artist names are guessed from free-form event titles ([`guessing`]) and
//! resolved against the music catalog ([`services::artist_resolver`]).

pub mod guessing;
pub mod models;
pub mod services;

pub use guessing::{guess_artists, Decomposer, GuessNode, GuessStep, TitleNormalizer};
