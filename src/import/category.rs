//! Category bindings: which items to import and how to search for their theme

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    domain::track::{MediaItem, Metadata},
    providers::{MetadataProvider, error::ProviderError},
};

const FILMS_LIST: &str = include_str!("../../data/films.json");
const SERIES_LIST: &str = include_str!("../../data/series.json");

/// Names accepted by [`by_name`], in the order a full run imports them
pub const CATEGORY_NAMES: &[&str] = &["films", "series"];

/// What the importer needs to know about one category
pub trait Category {
    /// Category id as known by the quiz backend
    fn id(&self) -> &str;

    fn media_list(&self) -> anyhow::Result<Vec<MediaItem>>;

    fn build_search_query(&self, metadata: &Metadata) -> String;

    /// Resolves the item through `provider`, the item's localized title wins over the provider's
    fn fetch_metadata(
        &self,
        provider: &dyn MetadataProvider,
        item: &MediaItem,
    ) -> Result<Option<Metadata>, ProviderError> {
        let metadata = provider.fetch_by_id(&item.id)?.map(|mut metadata| {
            if let Some(title) = item.localized_title.as_ref().filter(|t| !t.trim().is_empty()) {
                metadata.localized_title = Some(title.clone());
            }
            metadata
        });
        Ok(metadata)
    }
}

#[derive(Deserialize)]
struct MediaListFile {
    items: Vec<MediaItem>,
}

/// Media list of a category: the embedded default, or `{data_dir}/{name}.json` when a directory is configured
#[derive(Debug, Clone)]
pub struct MediaList {
    name: &'static str,
    embedded: &'static str,
    data_dir: Option<PathBuf>,
}

impl MediaList {
    fn new(name: &'static str, embedded: &'static str, data_dir: Option<&Path>) -> Self {
        Self {
            name,
            embedded,
            data_dir: data_dir.map(Path::to_path_buf),
        }
    }

    pub fn load(&self) -> anyhow::Result<Vec<MediaItem>> {
        let file: MediaListFile = match &self.data_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.json", self.name));
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read media list {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse media list {}", path.display()))?
            }
            None => serde_json::from_str(self.embedded)
                .with_context(|| format!("failed to parse built-in {} list", self.name))?,
        };
        Ok(file.items)
    }
}

pub struct Films {
    list: MediaList,
}

impl Films {
    pub fn new(data_dir: Option<&Path>) -> Self {
        Self {
            list: MediaList::new("films", FILMS_LIST, data_dir),
        }
    }
}

impl Category for Films {
    fn id(&self) -> &str {
        "films"
    }

    fn media_list(&self) -> anyhow::Result<Vec<MediaItem>> {
        self.list.load()
    }

    fn build_search_query(&self, metadata: &Metadata) -> String {
        format!("{} ({}) main theme", metadata.title, metadata.year)
    }
}

pub struct Series {
    list: MediaList,
}

impl Series {
    pub fn new(data_dir: Option<&Path>) -> Self {
        Self {
            list: MediaList::new("series", SERIES_LIST, data_dir),
        }
    }
}

impl Category for Series {
    fn id(&self) -> &str {
        "series"
    }

    fn media_list(&self) -> anyhow::Result<Vec<MediaItem>> {
        self.list.load()
    }

    fn build_search_query(&self, metadata: &Metadata) -> String {
        format!("{} main theme", metadata.title)
    }
}

pub fn by_name(name: &str, data_dir: Option<&Path>) -> Option<Box<dyn Category>> {
    match name {
        "films" => Some(Box::new(Films::new(data_dir))),
        "series" => Some(Box::new(Series::new(data_dir))),
        _ => None,
    }
}
