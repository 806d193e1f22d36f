//! Cache-busted retrieval of the config document.

use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use url::Url;

use crate::error::LoaderError;
use crate::prebid_config::Config;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used to fetch the config.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status, and [`LoaderError::ConfigFetch`] for transport failures.
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, Report<LoaderError>>;
}

/// Resolve `config_url` against `base` and append the `v=<timestamp>` cache buster.
///
/// # Errors
///
/// Returns [`LoaderError::ConfigFetch`] if the URL cannot be resolved.
pub fn cache_busted_url(
    base: &Url,
    config_url: &str,
    timestamp_ms: i64,
) -> Result<Url, Report<LoaderError>> {
    let mut url = base
        .join(config_url)
        .change_context(LoaderError::ConfigFetch {
            message: format!("Invalid config URL: {config_url}"),
        })?;
    url.query_pairs_mut()
        .append_pair("v", &timestamp_ms.to_string());
    Ok(url)
}

pub struct ConfigFetcher<C> {
    client: C,
    base_url: Url,
    config_url: String,
}

impl<C: HttpClient> ConfigFetcher<C> {
    pub fn new(client: C, base_url: Url, config_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            config_url: config_url.into(),
        }
    }

    /// The config location as configured, without the cache buster.
    #[must_use]
    pub fn config_url(&self) -> &str {
        &self.config_url
    }

    /// Fetch and parse the config, cache-busted with the current time.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::ConfigFetch`] on transport failure or a non-2xx status
    /// - [`LoaderError::ConfigParse`] if the body is not a valid config document
    pub async fn fetch(&self) -> Result<Config, Report<LoaderError>> {
        self.fetch_at(chrono::Utc::now().timestamp_millis()).await
    }

    /// [`ConfigFetcher::fetch`] with an explicit cache-buster timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigFetcher::fetch`].
    pub async fn fetch_at(&self, timestamp_ms: i64) -> Result<Config, Report<LoaderError>> {
        let url = cache_busted_url(&self.base_url, &self.config_url, timestamp_ms)?;
        log::info!("Fetching configuration from {}", url);

        let response = self.client.get(&url).await?;
        if !response.is_success() {
            return Err(Report::new(LoaderError::ConfigFetch {
                message: format!("HTTP error! status: {}", response.status),
            }));
        }

        let config = Config::from_slice(&response.body)?;
        log::debug!(
            "Fetched configuration ({} bytes, version {:?})",
            response.body.len(),
            config.version
        );
        Ok(config)
    }
}
