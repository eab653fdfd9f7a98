//! Thin HTTP layer over `reqwest` with per-request timeouts and
//! idempotent file downloads.

use crate::error::{CoreError, Result};
use bytes::Bytes;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Outcome of [`HttpClient::download_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Destination already existed; nothing was requested.
    Cached,
    Downloaded { bytes: u64 },
}

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(CoreError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Performs a GET and returns the body of a successful response.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| CoreError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| CoreError::http(url, e))
    }

    /// Downloads `url` into `dest` unless `dest` already exists.
    ///
    /// The body is streamed into a `.part` sibling which is renamed into
    /// place only after the transfer completes, so a file at `dest` is always
    /// complete.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        timeout: Duration,
    ) -> Result<FetchStatus> {
        if tokio::fs::try_exists(dest).await? {
            tracing::debug!(path = %dest.display(), "already downloaded");
            return Ok(FetchStatus::Cached);
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = partial_path(dest);
        match self.stream_to(url, &part, timeout).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest).await?;
                tracing::debug!(url = %url, path = %dest.display(), bytes, "downloaded");
                Ok(FetchStatus::Downloaded { bytes })
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part).await
                    && cleanup.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::debug!(path = %part.display(), error = %cleanup, "failed to remove partial download");
                }
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, part: &Path, timeout: Duration) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| CoreError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(part).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| CoreError::http(url, e))? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    dest.with_file_name(name)
}
