//! External collaborators of the importer: metadata lookup, media download and
//! the track registry of the quiz backend.
//!
//! Expected failures (unknown id, download that found nothing, rejected payload)
//! come back as `Ok(None)` or `Ok(false)`. `Err` is reserved for failures the
//! caller could not anticipate, the importer records those per item.

use crate::domain::track::{Metadata, NewTrack, Track};

pub mod download;
pub mod error;
pub mod media;
pub mod omdb;
pub mod rate_limit;
pub mod registry;
pub mod retry;

use error::ProviderError;

pub trait MetadataProvider {
    /// Resolves a catalog id, `None` when the provider has nothing usable for it
    fn fetch_by_id(&self, id: &str) -> Result<Option<Metadata>, ProviderError>;
}

pub trait MediaFetcher {
    /// Finds audio matching `query` and stores it under `slug`, returning its public path
    fn fetch_audio(&self, query: &str, slug: &str) -> Result<Option<String>, ProviderError>;

    /// Stores the image at `url` under `slug`, returning its public path
    fn fetch_image(&self, url: &str, slug: &str) -> Result<Option<String>, ProviderError>;
}

pub trait TrackRegistry {
    fn list(&self) -> Result<Vec<Track>, ProviderError>;

    /// `None` when the registry refused the track
    fn create(&self, track: &NewTrack) -> Result<Option<Track>, ProviderError>;

    fn delete(&self, id: i64) -> Result<bool, ProviderError>;

    /// Whether a track titled `title` exists, ignoring case and surrounding whitespace
    fn exists(&self, title: &str) -> Result<bool, ProviderError> {
        Ok(self.list()?.iter().any(|track| track.has_title(title)))
    }
}
