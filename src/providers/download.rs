//! Network side of the media store: yt-dlp for audio, plain HTTP for images

use std::{
    ffi::OsString,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use reqwest::blocking::Client;

use crate::{
    config::{HttpConfig, MediaConfig},
    providers::{error::ProviderError, media::Downloader, retry::RetryPolicy},
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct NetworkDownloader {
    http: Client,
    yt_dlp: PathBuf,
    ffmpeg: Option<PathBuf>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl NetworkDownloader {
    pub fn new(
        media: &MediaConfig,
        http: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(http.timeout()).build()?;
        let ffmpeg = media.resolve_ffmpeg();
        if let Some(path) = &ffmpeg {
            log::debug!("Using ffmpeg at {}", path.display());
        }

        Ok(Self {
            http: client,
            yt_dlp: media.yt_dlp_path.clone(),
            ffmpeg,
            timeout: media.download_timeout(),
            retry,
        })
    }

    fn audio_command(&self, query: &str, dest: &Path) -> Command {
        // yt-dlp picks the extension itself, the mp3 post-processor then lands on `dest`
        let mut template = OsString::from(dest.with_extension(""));
        template.push(".%(ext)s");

        let mut command = Command::new(&self.yt_dlp);
        command
            .arg(format!("ytsearch1:{query}"))
            .args(["--format", "bestaudio/best"])
            .args(["--extract-audio", "--audio-format", "mp3", "--audio-quality", "192K"])
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .arg("--socket-timeout")
            .arg(self.timeout.as_secs().to_string())
            .arg("--output")
            .arg(template);

        if let Some(dir) = self.ffmpeg.as_deref().and_then(Path::parent) {
            command.arg("--ffmpeg-location").arg(dir);
        }

        command
    }
}

impl Downloader for NetworkDownloader {
    fn download_audio(&self, query: &str, dest: &Path) -> Result<(), ProviderError> {
        let mut child = self
            .audio_command(query, dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProviderError::Config(format!(
                    "yt-dlp not found at {}",
                    self.yt_dlp.display()
                )),
                _ => ProviderError::Fs(e),
            })?;

        // drained while the process runs, a full pipe would block yt-dlp
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                if status.success() {
                    return Ok(());
                }

                let stderr = stderr
                    .and_then(|reader| reader.join().ok())
                    .unwrap_or_default();
                return Err(ProviderError::Download(format!(
                    "yt-dlp exited with {status}: {}",
                    stderr.trim()
                )));
            }

            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProviderError::Download(format!(
                    "yt-dlp timed out after {}s",
                    self.timeout.as_secs()
                )));
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn download_image(&self, url: &str, dest: &Path) -> Result<(), ProviderError> {
        let mut response = self.retry.run(&format!("download {url}"), || {
            Ok(self.http.get(url).send()?.error_for_status()?)
        })?;

        let mut file = File::create(dest)?;
        response.copy_to(&mut file)?;
        Ok(())
    }
}
