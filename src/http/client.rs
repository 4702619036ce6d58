//! HTTP client with status checking and a default request timeout.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::status::UnexpectedStatus;

/// Request timeout applied when the configuration does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build a reqwest client with the tool's user agent and a request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("modpack-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// HTTP client for registry queries and archive downloads.
///
/// Every request is attempted exactly once; any status other than `200 OK`
/// becomes an [`UnexpectedStatus`] error.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and returns the response body as text.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}...", url);
        let response = self.send(url).await?;
        response
            .text()
            .await
            .context("Failed to read response body")
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);
        let response = self.send(url).await?;
        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// Downloads the whole response body into memory.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}...", url);
        let response = self.send(url).await?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read download stream")?;

        debug!("Downloaded {:.2} MB", bytes.len() as f64 / (1024.0 * 1024.0));

        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        UnexpectedStatus::check(url, response.status())?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap())
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/package/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let result: TestResponse = client()
            .get_json(&format!("{}/package/", url))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_text_not_found_carries_status() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/package/")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = client()
            .get_text(&format!("{}/package/", url))
            .await
            .unwrap_err();

        // Exactly one attempt, no retry
        mock.assert_async().await;
        let status = err.downcast_ref::<UnexpectedStatus>().unwrap();
        assert_eq!(status.status, 404);
    }

    #[tokio::test]
    async fn test_get_bytes_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/download/mod.zip")
            .with_status(200)
            .with_body("archive bytes")
            .create_async()
            .await;

        let bytes = client()
            .get_bytes(&format!("{}/download/mod.zip", url))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"archive bytes");
    }

    #[tokio::test]
    async fn test_get_bytes_server_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/download/mod.zip")
            .with_status(500)
            .create_async()
            .await;

        let result = client()
            .get_bytes(&format!("{}/download/mod.zip", url))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_ok_success_status_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/package/")
            .with_status(204)
            .create_async()
            .await;

        let result = client().get_text(&format!("{}/package/", url)).await;
        assert!(result.is_err());
    }
}
