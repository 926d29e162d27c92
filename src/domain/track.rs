use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;

/// One entry of a category's media list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaItem {
    /// catalog id, an IMDb id for films and series
    pub id: String,
    /// localized title override, the metadata provider never supplies one
    #[serde(rename = "titleVF", default)]
    pub localized_title: Option<String>,
}

impl MediaItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            localized_title: None,
        }
    }

    pub fn with_localized_title(mut self, title: impl Into<String>) -> Self {
        self.localized_title = Some(title.into());
        self
    }
}

/// Descriptive data of a media item, as resolved by a metadata provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub localized_title: Option<String>,
    pub year: String,
    pub poster_url: Option<String>,
    pub external_id: String,
    pub media_type: String,
    pub plot: Option<String>,
}

/// Payload submitted to the track registry.
///
/// `audio_file` is mandatory: a track without audio can't be played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrack {
    pub title: String,
    #[serde(rename = "titleVF", skip_serializing_if = "Option::is_none")]
    pub localized_title: Option<String>,
    pub accepted_answers: AnswerSet,
    pub audio_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    pub category_id: String,
    /// seconds
    pub time_limit: u32,
    /// seconds into the audio where playback starts
    pub start_time: u32,
}

/// Track record as stored by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub title: String,
    #[serde(rename = "titleVF", default)]
    pub localized_title: Option<String>,
    #[serde(default)]
    pub accepted_answers: Vec<String>,
    #[serde(default)]
    pub audio_file: Option<String>,
    #[serde(default)]
    pub image_file: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub start_time: Option<u32>,
}

impl Track {
    /// Titles are compared ignoring case and surrounding whitespace
    pub fn has_title(&self, title: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }
}
