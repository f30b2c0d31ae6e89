//! Client for the GoFile hosting API.
//!
//! The provider contract is fixed: `GET {api}/servers` advertises upload
//! servers, and each server takes a multipart POST at
//! `https://{server}.gofile.io/uploadFile` whose response carries the
//! shareable download page.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use reqwest::{Body, Client, multipart};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use url::Url;

use crate::core::{ProgressStream, ProgressTracker, RelayError, Result};

const GOFILE_API_BASE: &str = "https://api.gofile.io";
const UPLOAD_DOMAIN: &str = "gofile.io";
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Deserialize)]
struct ServersResponse {
    data: ServerList,
}

#[derive(Deserialize)]
struct ServerList {
    servers: Vec<ServerEntry>,
}

#[derive(Deserialize)]
struct ServerEntry {
    name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    #[serde(rename = "downloadPage")]
    download_page: String,
}

#[derive(Clone)]
pub struct GofileClient {
    client: Client,
    api_base: String,
}

impl GofileClient {
    pub fn new() -> Self {
        Self::with_api_base(GOFILE_API_BASE)
    }

    /// The API base is injectable so tests can point discovery at a local
    /// mock server.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// One discovery call, one uniformly random pick. No retry; the caller
    /// treats any failure as terminal for this upload attempt.
    pub async fn pick_server(&self) -> Result<String> {
        let url = format!("{}/servers", self.api_base);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::server_error(status.as_u16(), message));
        }

        let body = response.text().await?;
        let parsed: ServersResponse = serde_json::from_str(&body)
            .map_err(|err| RelayError::protocol(format!("invalid server list: {err}")))?;

        let servers = parsed.data.servers;
        if servers.is_empty() {
            return Err(RelayError::protocol("server list is empty"));
        }

        let index = rand::rng().random_range(0..servers.len());
        let name = servers[index].name.clone();
        debug!(server = %name, "picked upload server");

        Ok(name)
    }

    fn upload_endpoint(&self, server: &str) -> String {
        format!("https://{server}.{UPLOAD_DOMAIN}/uploadFile")
    }

    /// Relay a local file to the provider and return its download page.
    pub async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        progress: Option<Arc<ProgressTracker>>,
    ) -> Result<Url> {
        let server = self.pick_server().await?;
        let endpoint = self.upload_endpoint(&server);
        self.upload_to(&endpoint, path, file_name, progress).await
    }

    /// Upload against an explicit endpoint. Kept public so tests can target
    /// a mock server without subdomain DNS.
    pub async fn upload_to(
        &self,
        endpoint: &str,
        path: &Path,
        file_name: &str,
        progress: Option<Arc<ProgressTracker>>,
    ) -> Result<Url> {
        let file = File::open(path).await?;
        let file_size = file.metadata().await?.len();

        let stream = ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE);
        let body = match progress {
            Some(tracker) => Body::wrap_stream(ProgressStream::new(stream, tracker)),
            None => Body::wrap_stream(stream),
        };

        let part = multipart::Part::stream_with_length(body, file_size)
            .file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RelayError::server_error(status.as_u16(), message));
        }

        let body = response.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|err| RelayError::protocol(format!("invalid upload response: {err}")))?;

        let link = Url::parse(&parsed.data.download_page).map_err(|err| {
            RelayError::protocol(format!(
                "invalid download page {:?}: {err}",
                parsed.data.download_page
            ))
        })?;
        info!(%link, "upload accepted");

        Ok(link)
    }
}

impl Default for GofileClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_follows_the_subdomain_scheme() {
        let client = GofileClient::new();
        assert_eq!(
            client.upload_endpoint("store4"),
            "https://store4.gofile.io/uploadFile"
        );
    }

    #[test]
    fn api_base_is_normalized() {
        let client = GofileClient::with_api_base("http://127.0.0.1:9999/");
        assert_eq!(client.api_base, "http://127.0.0.1:9999");
    }
}
