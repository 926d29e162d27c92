//! Client for the quiz backend's import API

use reqwest::{
    Method,
    blocking::{Client, RequestBuilder, Response},
};
use serde::Deserialize;

use crate::{
    config::{ApiConfig, HttpConfig},
    domain::track::{NewTrack, Track},
    providers::{TrackRegistry, error::ProviderError, retry::RetryPolicy},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct TrackApiClient {
    http: Client,
    tracks_endpoint: String,
    categories_endpoint: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl TrackApiClient {
    pub fn new(
        config: &ApiConfig,
        http: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let base_url = config.base_url.trim_end_matches('/');
        let client = Client::builder().timeout(http.timeout()).build()?;

        Ok(Self {
            http: client,
            tracks_endpoint: format!("{base_url}/api/import/tracks"),
            categories_endpoint: format!("{base_url}/api/categories"),
            token: config.token.clone(),
            retry,
        })
    }

    fn track_url(&self, id: i64) -> String {
        format!("{}/{id}", self.tracks_endpoint)
    }

    /// Sends a request with retries, turning non success statuses into [`ProviderError::Api`]
    fn send<F>(&self, what: &str, method: Method, url: &str, build: F) -> Result<Response, ProviderError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        self.retry.run(what, || {
            let mut request = self.http.request(method.clone(), url);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = build(request).send()?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let message = response.text().unwrap_or_default();
            Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            })
        })
    }

    pub fn categories(&self) -> Result<Vec<Category>, ProviderError> {
        let response = self.send("list categories", Method::GET, &self.categories_endpoint, |r| r)?;
        response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// Whether the backend answers at all
    pub fn validate_connection(&self) -> bool {
        match self.categories() {
            Ok(_) => true,
            Err(e) => {
                log::error!("API connection failed: {e}");
                false
            }
        }
    }
}

impl TrackRegistry for TrackApiClient {
    fn list(&self) -> Result<Vec<Track>, ProviderError> {
        let response = self.send("list tracks", Method::GET, &self.tracks_endpoint, |r| r)?;
        response
            .json()
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    fn create(&self, track: &NewTrack) -> Result<Option<Track>, ProviderError> {
        let what = format!("create track {}", track.title);
        match self.send(&what, Method::POST, &self.tracks_endpoint, |r| r.json(track)) {
            Ok(response) => {
                let created: Track = response
                    .json()
                    .map_err(|e| ProviderError::Parse(e.to_string()))?;
                Ok(Some(created))
            }
            Err(ProviderError::Api { status, message }) => {
                log::error!("Backend rejected track {}: {status} {message}", track.title);
                Ok(None)
            }
            Err(err @ ProviderError::Transport(_)) => {
                log::error!("Error creating track {}: {err}", track.title);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn delete(&self, id: i64) -> Result<bool, ProviderError> {
        let url = self.track_url(id);
        match self.send(&format!("delete track {id}"), Method::DELETE, &url, |r| r) {
            Ok(_) => Ok(true),
            Err(err @ (ProviderError::Api { .. } | ProviderError::Transport(_))) => {
                log::error!("Error deleting track {id}: {err}");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
