//! Per category import run
//!
//! Items go through fetch metadata, skip-if-exists, fetch media, create, one
//! at a time in list order. Whatever happens to one item, including a panic,
//! ends up as that item's outcome and the run moves on to the next.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use crate::{
    config::TrackDefaults,
    domain::{
        answers::generate_accepted_answers,
        slug::slugify,
        text::capitalize,
        track::{MediaItem, Metadata, NewTrack},
    },
    import::{
        category::Category,
        stats::{ImportStats, ItemOutcome},
    },
    providers::{MediaFetcher, MetadataProvider, TrackRegistry, error::ProviderError},
};

pub const METADATA_FAILED: &str = "Failed to fetch metadata";
pub const AUDIO_MISSING: &str = "Cannot create track without audio file";
pub const CREATE_FAILED: &str = "Failed to create track";

pub struct Importer<'a> {
    category: &'a dyn Category,
    metadata: &'a dyn MetadataProvider,
    media: &'a dyn MediaFetcher,
    registry: &'a dyn TrackRegistry,
    defaults: TrackDefaults,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> Importer<'a> {
    pub fn new(
        category: &'a dyn Category,
        metadata: &'a dyn MetadataProvider,
        media: &'a dyn MediaFetcher,
        registry: &'a dyn TrackRegistry,
    ) -> Self {
        Self {
            category,
            metadata,
            media,
            registry,
            defaults: TrackDefaults::default(),
            interrupt: None,
        }
    }

    pub fn with_track_defaults(mut self, defaults: TrackDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Stops the run before the next item once `flag` is set
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Imports the category's whole media list, failing only when the list can't be loaded
    pub fn import_all(
        &self,
        skip_existing: bool,
        max_items: Option<usize>,
    ) -> anyhow::Result<ImportStats> {
        let items = self.category.media_list()?;
        Ok(self.import_items(items, skip_existing, max_items))
    }

    pub fn import_items(
        &self,
        mut items: Vec<MediaItem>,
        skip_existing: bool,
        max_items: Option<usize>,
    ) -> ImportStats {
        if let Some(max) = max_items {
            items.truncate(max);
        }

        let mut stats = ImportStats::new(items.len());
        let started = Instant::now();

        println!(
            "\nImporting {} ({} items)",
            capitalize(self.category.id()),
            items.len()
        );
        println!("{}", "=".repeat(60));

        for (index, item) in items.iter().enumerate() {
            if self.interrupted() {
                log::warn!("Import interrupted after {index} of {} items", items.len());
                stats.interrupt();
                break;
            }

            println!("\n[{}/{}] {}", index + 1, items.len(), item.id);
            let outcome = self.import_single(item, skip_existing);
            stats.record(&item.id, outcome);
        }

        stats.duration = started.elapsed();
        stats
    }

    pub fn import_single(&self, item: &MediaItem, skip_existing: bool) -> ItemOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_import(item, skip_existing))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                println!("  [FAIL] Error: {err}");
                ItemOutcome::Failed {
                    error: err.to_string(),
                    detail: Some(format!("{err:?}")),
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                println!("  [FAIL] Error: {message}");
                ItemOutcome::failed(format!("internal error: {message}"))
            }
        }
    }

    fn try_import(&self, item: &MediaItem, skip_existing: bool) -> Result<ItemOutcome, ProviderError> {
        log::debug!("Fetching metadata for {}", item.id);
        let Some(metadata) = self.category.fetch_metadata(self.metadata, item)? else {
            println!("  [FAIL] {METADATA_FAILED}");
            return Ok(ItemOutcome::failed(METADATA_FAILED));
        };
        println!("  Title: {}", metadata.title);

        if skip_existing && self.registry.exists(&metadata.title)? {
            println!("  -> Already exists, skipped");
            return Ok(ItemOutcome::Skipped);
        }

        let Some(slug) = slugify(&metadata.title).or_else(|| slugify(&item.id)) else {
            return Ok(ItemOutcome::failed(format!(
                "Cannot derive a file name for {}",
                metadata.title
            )));
        };

        let query = self.category.build_search_query(&metadata);
        let Some(audio_file) = self.media.fetch_audio(&query, &slug)? else {
            println!("  [FAIL] {AUDIO_MISSING}");
            return Ok(ItemOutcome::failed(AUDIO_MISSING));
        };
        let image_file = self.fetch_image(&metadata, &slug);

        let track = self.new_track(metadata, audio_file, image_file);
        match self.registry.create(&track)? {
            Some(created) => {
                println!("  [OK] Track created with ID: {}", created.id);
                Ok(ItemOutcome::Created {
                    track_id: created.id,
                })
            }
            None => {
                println!("  [FAIL] {CREATE_FAILED}");
                Ok(ItemOutcome::failed(CREATE_FAILED))
            }
        }
    }

    /// Images are optional, a failure only costs the track its picture
    fn fetch_image(&self, metadata: &Metadata, slug: &str) -> Option<String> {
        let url = metadata.poster_url.as_deref()?;
        match self.media.fetch_image(url, slug) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("No image for {}: {err}", metadata.title);
                None
            }
        }
    }

    fn new_track(&self, metadata: Metadata, audio_file: String, image_file: Option<String>) -> NewTrack {
        let accepted_answers =
            generate_accepted_answers(&metadata.title, metadata.localized_title.as_deref());

        NewTrack {
            title: metadata.title,
            localized_title: metadata.localized_title,
            accepted_answers,
            audio_file,
            image_file,
            category_id: self.category.id().to_string(),
            time_limit: self.defaults.time_limit,
            start_time: self.defaults.start_time,
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
