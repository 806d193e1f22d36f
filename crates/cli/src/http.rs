//! Blocking HTTP transport for config fetches.

use std::fs;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use prebid_loader_common::error::LoaderError;
use prebid_loader_common::fetch::{HttpClient, HttpResponse};
use url::Url;

/// [`HttpClient`] backed by a `ureq` agent.
///
/// `file:` URLs are read from disk so pages can be rendered without a server.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Client whose requests are abandoned after `timeout_ms`.
    #[must_use]
    pub fn new(timeout_ms: u64) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(timeout_ms)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }

    fn read_file(url: &Url) -> Result<HttpResponse, Report<LoaderError>> {
        let path = url.to_file_path().map_err(|()| {
            Report::new(LoaderError::ConfigFetch {
                message: format!("Invalid file URL: {}", url),
            })
        })?;

        match fs::read(&path) {
            Ok(body) => Ok(HttpResponse { status: 200, body }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            }),
            Err(e) => Err(Report::new(LoaderError::ConfigFetch {
                message: format!("Failed to read {}: {}", path.display(), e),
            })),
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for UreqClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, Report<LoaderError>> {
        if url.scheme() == "file" {
            return Self::read_file(url);
        }

        let mut response = self.agent.get(url.as_str()).call().map_err(|e| {
            Report::new(LoaderError::ConfigFetch {
                message: format!("Failed to send request: {}", e),
            })
        })?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec().map_err(|e| {
            Report::new(LoaderError::ConfigFetch {
                message: format!("Failed to read response: {}", e),
            })
        })?;

        log::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_reads_file_urls() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("prebid-config.json");
        let mut file = fs::File::create(&path).expect("should create file");
        file.write_all(br#"{"version": "1"}"#)
            .expect("should write file");

        let mut url = Url::from_file_path(&path).expect("should build file URL");
        url.set_query(Some("v=1"));

        let client = UreqClient::new(5000);
        let response = futures::executor::block_on(client.get(&url)).expect("should read file");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"version": "1"}"#);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().expect("should create temp dir");
        let url = Url::from_file_path(dir.path().join("missing.json"))
            .expect("should build file URL");

        let client = UreqClient::new(5000);
        let response = futures::executor::block_on(client.get(&url)).expect("should respond");
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }
}
