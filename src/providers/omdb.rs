//! OMDb (Open Movie Database) metadata provider
//!
//! Requests are serialized through a rate limiter, the free tier allows one
//! per second. Successful lookups are cached by IMDb id for the lifetime of
//! the client and never refetched.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{
    config::{HttpConfig, OmdbConfig},
    domain::track::Metadata,
    providers::{
        MetadataProvider, error::ProviderError, rate_limit::RateLimiter, retry::RetryPolicy,
    },
};

/// Placeholder OMDb uses for missing values
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    error: Option<String>,
    title: Option<String>,
    year: Option<String>,
    poster: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    plot: Option<String>,
    search: Option<Vec<OmdbSearchItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearchItem {
    title: String,
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type")]
    kind: Option<String>,
    poster: Option<String>,
}

/// Lightweight result of a title search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub year: Option<String>,
    pub external_id: String,
    pub media_type: Option<String>,
    pub poster_url: Option<String>,
}

/// Treats OMDb's "N/A" and blank values as absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != NOT_AVAILABLE)
}

impl OmdbResponse {
    fn into_metadata(self) -> Result<Metadata, ProviderError> {
        let title = present(self.title)
            .ok_or_else(|| ProviderError::Parse("OMDb response without title".into()))?;
        let external_id = present(self.imdb_id)
            .ok_or_else(|| ProviderError::Parse(format!("OMDb response for {title} without imdbID")))?;

        Ok(Metadata {
            title,
            localized_title: None,
            year: self.year.unwrap_or_default(),
            poster_url: present(self.poster),
            external_id,
            media_type: self.kind.unwrap_or_default(),
            plot: present(self.plot),
        })
    }
}

pub struct OmdbClient {
    http: Client,
    api_url: String,
    api_key: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
    cache: Mutex<HashMap<String, Metadata>>,
}

impl OmdbClient {
    pub fn new(
        config: &OmdbConfig,
        http: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::Config("OMDb API key not configured".into()))?;
        let client = Client::builder().timeout(http.timeout()).build()?;

        Ok(Self {
            http: client,
            api_url: config.url.clone(),
            api_key,
            limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
            retry,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn request(&self, params: &[(&str, &str)]) -> Result<OmdbResponse, ProviderError> {
        let describe = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        self.retry.run(&format!("OMDb request {describe}"), || {
            self.limiter.wait();
            log::debug!("OMDb request {describe}");

            let response = self
                .http
                .get(&self.api_url)
                .query(params)
                .query(&[("apikey", self.api_key.as_str())])
                .send()
                .and_then(|response| response.error_for_status())
                .map_err(without_key)?;

            let data: OmdbResponse = response
                .json()
                .map_err(|e| ProviderError::Parse(e.without_url().to_string()))?;

            if data.response == "False" {
                let error = data.error.unwrap_or_else(|| "Unknown error".to_string());
                return Err(ProviderError::NotFound(format!("{describe} ({error})")));
            }
            Ok(data)
        })
    }

    fn cached(&self, id: &str) -> Option<Metadata> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    fn remember(&self, metadata: &Metadata) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(metadata.external_id.clone(), metadata.clone());
    }

    /// Looks a title up, optionally narrowed to a release year
    pub fn fetch_by_title(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<Metadata>, ProviderError> {
        let year = year.map(|y| y.to_string());
        let mut params = vec![("t", title)];
        if let Some(year) = &year {
            params.push(("y", year.as_str()));
        }

        let Some(data) = none_if_expected(self.request(&params))? else {
            return Ok(None);
        };
        let metadata = data.into_metadata()?;
        self.remember(&metadata);
        Ok(Some(metadata))
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let Some(data) = none_if_expected(self.request(&[("s", query)]))? else {
            return Ok(Vec::new());
        };

        Ok(data
            .search
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                year: present(item.year),
                external_id: item.imdb_id,
                media_type: present(item.kind),
                poster_url: present(item.poster),
            })
            .collect())
    }
}

/// reqwest errors display their url, which carries the api key
fn without_key(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.without_url())
}

/// Not found and exhausted transport errors both mean "nothing usable"
fn none_if_expected<T>(result: Result<T, ProviderError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ProviderError::NotFound(what)) => {
            log::warn!("OMDb has no result for {what}");
            Ok(None)
        }
        Err(err @ (ProviderError::Transport(_) | ProviderError::Api { .. })) => {
            log::error!("OMDb request failed: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl MetadataProvider for OmdbClient {
    fn fetch_by_id(&self, id: &str) -> Result<Option<Metadata>, ProviderError> {
        if let Some(metadata) = self.cached(id) {
            log::debug!("OMDb cache hit for {id}");
            return Ok(Some(metadata));
        }

        let Some(data) = none_if_expected(self.request(&[("i", id)]))? else {
            return Ok(None);
        };
        let metadata = data.into_metadata()?;
        log::info!("Fetched {id}: {} ({})", metadata.title, metadata.year);

        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.to_string(), metadata.clone());
        Ok(Some(metadata))
    }
}
