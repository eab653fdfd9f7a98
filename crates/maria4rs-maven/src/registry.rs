//! Maven Central registry client.
//!
//! Two endpoints are involved:
//! - the Solr search API, asked for the latest version of a coordinate when a
//!   descriptor leaves it unspecified;
//! - the repository itself, laid out as
//!   `base/groupPath/artifactId/version/artifactId-version.ext`.

use crate::error::{MavenError, Result};
use crate::types::{ArtifactKind, artifact_file_name};
use async_trait::async_trait;
use maria4rs_core::{FetchStatus, HttpClient, ResolverConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Source of Maven artifacts and version metadata.
///
/// Implementations never fail the caller: lookups that cannot be answered
/// yield `None` and downloads that cannot complete yield `false`, with the
/// cause logged.
#[async_trait]
pub trait MavenRepository: Send + Sync {
    /// Latest version of `groupId:artifactId`, if the registry knows one.
    async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Option<String>;

    fn artifact_url(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        kind: ArtifactKind,
    ) -> String;

    /// Downloads `url` to `dest`. An existing `dest` counts as success and
    /// is not re-fetched.
    async fn fetch(&self, url: &str, dest: &Path) -> bool;
}

/// Builds the repository URL of an artifact file.
///
/// Every `.` in the group id becomes a path separator.
pub fn artifact_url(
    base: &str,
    group_id: &str,
    artifact_id: &str,
    version: &str,
    kind: ArtifactKind,
) -> String {
    let group_path = group_id.replace('.', "/");
    format!(
        "{}/{group_path}/{artifact_id}/{version}/{}",
        base.trim_end_matches('/'),
        artifact_file_name(artifact_id, version, kind)
    )
}

/// Builds the Solr query URL for the newest `groupId:artifactId` release.
pub fn latest_version_query_url(search_url: &str, group_id: &str, artifact_id: &str) -> String {
    let query = format!("g:\"{group_id}\" AND a:\"{artifact_id}\"");
    format!(
        "{search_url}?q={q}&rows=1&wt=json&core=gav",
        q = urlencoding::encode(&query),
    )
}

#[derive(Clone)]
pub struct MavenCentralRegistry {
    http: HttpClient,
    repository_url: String,
    search_url: String,
    registry_timeout: Duration,
    download_timeout: Duration,
}

impl MavenCentralRegistry {
    pub fn new(http: HttpClient, config: &ResolverConfig) -> Self {
        Self {
            http,
            repository_url: config.repository_url.clone(),
            search_url: config.search_url.clone(),
            registry_timeout: config.registry_timeout(),
            download_timeout: config.download_timeout(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let http = HttpClient::new(&config.user_agent)?;
        Ok(Self::new(http, config))
    }

    /// Queries the search API, reporting failures as errors.
    pub async fn query_latest_version(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<String>> {
        let url = latest_version_query_url(&self.search_url, group_id, artifact_id);
        let package = format!("{group_id}:{artifact_id}");

        let data = self
            .http
            .get_bytes(&url, self.registry_timeout)
            .await
            .map_err(|source| MavenError::RegistryError {
                package: package.clone(),
                source,
            })?;

        parse_latest_version_response(&data)
            .map_err(|source| MavenError::ApiResponseError { package, source })
    }
}

#[async_trait]
impl MavenRepository for MavenCentralRegistry {
    async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        match self.query_latest_version(group_id, artifact_id).await {
            Ok(Some(version)) => Some(version),
            Ok(None) => {
                tracing::warn!(
                    group_id = %group_id,
                    artifact_id = %artifact_id,
                    "no versions found on Maven Central"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "latest version lookup failed");
                None
            }
        }
    }

    fn artifact_url(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        kind: ArtifactKind,
    ) -> String {
        artifact_url(&self.repository_url, group_id, artifact_id, version, kind)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> bool {
        match self
            .http
            .download_file(url, dest, self.download_timeout)
            .await
        {
            Ok(FetchStatus::Cached) => {
                tracing::info!(path = %dest.display(), "already downloaded");
                true
            }
            Ok(FetchStatus::Downloaded { bytes }) => {
                tracing::info!(url = %url, path = %dest.display(), bytes, "downloaded");
                true
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "failed to download");
                false
            }
        }
    }
}

#[derive(Deserialize)]
struct SolrVersionResponse {
    response: SolrVersionBody,
}

#[derive(Deserialize)]
struct SolrVersionBody {
    #[serde(default)]
    docs: Vec<VersionDoc>,
}

#[derive(Deserialize)]
struct VersionDoc {
    #[serde(rename = "v")]
    version: Option<String>,
}

/// Extracts `response.docs[0].v`, the highest-ranked match.
fn parse_latest_version_response(
    data: &[u8],
) -> std::result::Result<Option<String>, serde_json::Error> {
    let response: SolrVersionResponse = serde_json::from_slice(data)?;
    Ok(response
        .response
        .docs
        .into_iter()
        .next()
        .and_then(|doc| doc.version))
}
