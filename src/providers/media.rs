//! Local media store
//!
//! Files land under deterministic names derived from a slug, so a second run
//! finds what the first one downloaded and never fetches it again. Paths handed
//! back are the public web paths the quiz frontend serves them from.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::MediaConfig,
    providers::{MediaFetcher, error::ProviderError},
};

const AUDIO_WEB_PREFIX: &str = "/audio";
const IMAGES_WEB_PREFIX: &str = "/images";
const AUDIO_EXTENSION: &str = "mp3";
const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Performs the actual transfers, writing exactly to `dest`
pub trait Downloader {
    /// Finds audio for `query` and stores it as mp3 at `dest`
    fn download_audio(&self, query: &str, dest: &Path) -> Result<(), ProviderError>;

    fn download_image(&self, url: &str, dest: &Path) -> Result<(), ProviderError>;
}

pub struct LocalMedia<D> {
    audio_dir: PathBuf,
    images_dir: PathBuf,
    downloader: D,
}

impl<D: Downloader> LocalMedia<D> {
    pub fn new(audio_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>, downloader: D) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            images_dir: images_dir.into(),
            downloader,
        }
    }

    pub fn from_config(config: &MediaConfig, downloader: D) -> Self {
        Self::new(&config.audio_dir, &config.images_dir, downloader)
    }
}

impl<D: Downloader> MediaFetcher for LocalMedia<D> {
    fn fetch_audio(&self, query: &str, slug: &str) -> Result<Option<String>, ProviderError> {
        let file_name = format!("{slug}.{AUDIO_EXTENSION}");
        let dest = self.audio_dir.join(&file_name);
        let web_path = format!("{AUDIO_WEB_PREFIX}/{file_name}");

        if dest.is_file() {
            log::info!("Audio already exists: {file_name}");
            return Ok(Some(web_path));
        }

        fs::create_dir_all(&self.audio_dir)?;
        log::info!("Searching audio: {query}");

        match self.downloader.download_audio(query, &dest) {
            Ok(()) if dest.is_file() => {
                log::info!("Audio downloaded: {file_name}");
                Ok(Some(web_path))
            }
            Ok(()) => {
                log::warn!("Audio file not created: {file_name}");
                Ok(None)
            }
            Err(err @ (ProviderError::Download(_) | ProviderError::Transport(_))) => {
                log::warn!("Audio download failed for {query}: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn fetch_image(&self, url: &str, slug: &str) -> Result<Option<String>, ProviderError> {
        let file_name = format!("{slug}.{}", image_extension(url));
        let dest = self.images_dir.join(&file_name);
        let web_path = format!("{IMAGES_WEB_PREFIX}/{file_name}");

        if dest.is_file() {
            log::info!("Image already exists: {file_name}");
            return Ok(Some(web_path));
        }

        fs::create_dir_all(&self.images_dir)?;
        let partial = dest.with_extension("part");

        match self.downloader.download_image(url, &partial) {
            Ok(()) => {
                fs::rename(&partial, &dest)?;
                log::info!("Image downloaded: {file_name}");
                Ok(Some(web_path))
            }
            Err(err) => {
                let _ = fs::remove_file(&partial);
                match err {
                    ProviderError::Download(_) | ProviderError::Transport(_) => {
                        log::warn!("Image download failed for {url}: {err}");
                        Ok(None)
                    }
                    err => Err(err),
                }
            }
        }
    }
}

/// Extension named by the url path when it is an image type, `jpg` otherwise
fn image_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| {
            mime_guess::from_ext(ext)
                .first()
                .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct CountingDownloader {
        audio_calls: AtomicUsize,
        image_calls: AtomicUsize,
        fail_with: Option<fn() -> ProviderError>,
        produce_nothing: bool,
    }

    impl Downloader for CountingDownloader {
        fn download_audio(&self, _query: &str, dest: &Path) -> Result<(), ProviderError> {
            self.audio_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            if !self.produce_nothing {
                fs::write(dest, b"ID3")?;
            }
            Ok(())
        }

        fn download_image(&self, _url: &str, dest: &Path) -> Result<(), ProviderError> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            fs::write(dest, b"\xFF\xD8\xFF")?;
            Ok(())
        }
    }

    fn store(dir: &TempDir, downloader: CountingDownloader) -> LocalMedia<CountingDownloader> {
        LocalMedia::new(
            dir.path().join("public/audio"),
            dir.path().join("public/images"),
            downloader,
        )
    }

    #[test]
    fn audio_is_downloaded_once_per_slug() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let media = store(&dir, CountingDownloader::default());

        let first = media.fetch_audio("Fight Club (1999) main theme", "fight-club")?;
        let second = media.fetch_audio("Fight Club (1999) main theme", "fight-club")?;

        assert_eq!(first.as_deref(), Some("/audio/fight-club.mp3"));
        assert_eq!(first, second);
        assert_eq!(media.downloader.audio_calls.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("public/audio/fight-club.mp3").is_file());
        Ok(())
    }

    #[test]
    fn existing_audio_is_reused_without_downloading() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let audio_dir = dir.path().join("public/audio");
        fs::create_dir_all(&audio_dir)?;
        fs::write(audio_dir.join("inception.mp3"), b"ID3")?;
        let media = store(&dir, CountingDownloader::default());

        let path = media.fetch_audio("Inception (2010) main theme", "inception")?;

        assert_eq!(path.as_deref(), Some("/audio/inception.mp3"));
        assert_eq!(media.downloader.audio_calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn failed_or_empty_audio_download_is_none() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let media = store(
            &dir,
            CountingDownloader {
                fail_with: Some(|| ProviderError::Download("no results".into())),
                ..Default::default()
            },
        );
        assert_eq!(media.fetch_audio("nothing", "nothing")?, None);

        let media = store(
            &dir,
            CountingDownloader {
                produce_nothing: true,
                ..Default::default()
            },
        );
        assert_eq!(media.fetch_audio("nothing", "nothing")?, None);
        Ok(())
    }

    #[test]
    fn unexpected_downloader_errors_propagate() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let media = store(
            &dir,
            CountingDownloader {
                fail_with: Some(|| ProviderError::Config("yt-dlp not found".into())),
                ..Default::default()
            },
        );

        let result = media.fetch_audio("Heat (1995) main theme", "heat");
        assert!(matches!(result, Err(ProviderError::Config(_))));
        Ok(())
    }

    #[test]
    fn image_keeps_url_extension_and_is_moved_into_place() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let media = store(&dir, CountingDownloader::default());

        let url = "https://m.media-amazon.com/images/M/MV5BMjA@._V1_SX300.png?v=2";
        let path = media.fetch_image(url, "the-matrix")?;

        assert_eq!(path.as_deref(), Some("/images/the-matrix.png"));
        let images_dir = dir.path().join("public/images");
        assert!(images_dir.join("the-matrix.png").is_file());
        assert!(!images_dir.join("the-matrix.part").exists());

        media.fetch_image(url, "the-matrix")?;
        assert_eq!(media.downloader.image_calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn failed_image_leaves_no_partial_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let media = store(
            &dir,
            CountingDownloader {
                fail_with: Some(|| ProviderError::Download("404".into())),
                ..Default::default()
            },
        );

        assert_eq!(media.fetch_image("https://img.example/p.jpg", "p")?, None);
        let leftovers = fs::read_dir(dir.path().join("public/images"))?.count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn image_extension_defaults_to_jpg() {
        assert_eq!(image_extension("https://img.example/poster.jpeg"), "jpeg");
        assert_eq!(image_extension("https://img.example/poster.WEBP"), "webp");
        assert_eq!(image_extension("https://img.example/poster"), "jpg");
        assert_eq!(image_extension("https://img.example/poster.php?id=3"), "jpg");
        assert_eq!(image_extension("https://img.example"), "jpg");
    }
}
