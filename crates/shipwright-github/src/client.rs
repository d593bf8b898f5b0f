//! Release service REST client
//!
//! A thin client over the release service's repository releases API. Both
//! the API base URL and the upload base URL are configurable so tests can
//! point at a mock server.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use shipwright_core::Asset;
use tracing::{debug, info};

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

/// Coordinates and credentials for one repository
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub upload_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl GitHubConfig {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    /// Point both endpoints at a different base URL (mock servers)
    pub fn with_endpoints(mut self, api_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.upload_url = upload_url.into();
        self
    }
}

/// A release record as the service reports it. Never cached across runs.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub name: Option<String>,
    pub tag_name: String,
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<RemoteAsset>,
}

/// An asset already uploaded to a release
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAsset {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct CreateRelease<'a> {
    tag_name: String,
    name: &'a str,
    draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_commitish: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// Client for release CRUD and asset upload
pub struct ReleaseClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl ReleaseClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// List every release in the repository
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.config.api_url, self.config.owner, self.config.repo
        );
        debug!("Listing releases from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .context("Failed to list releases")?;
        if !response.status().is_success() {
            return Err(anyhow!("Failed to list releases: {}", response.status()));
        }

        response
            .json::<Vec<Release>>()
            .await
            .context("Failed to parse release list")
    }

    /// Create a draft release named after the version, tagged `v<version>`
    pub async fn create_draft(
        &self,
        version: &str,
        target_commitish: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.config.api_url, self.config.owner, self.config.repo
        );
        let payload = CreateRelease {
            tag_name: format!("v{version}"),
            name: version,
            draft: true,
            target_commitish,
            body: notes,
        };
        info!("Creating draft release {} (tag {})", version, payload.tag_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .await
            .context("Failed to create release")?;
        if !response.status().is_success() {
            return Err(anyhow!("Failed to create release: {}", response.status()));
        }

        response
            .json::<Release>()
            .await
            .context("Failed to parse created release")
    }

    /// Find the release whose display name equals the version, then fall
    /// back to creating a draft. Drafts are intentional: a retried run of
    /// the same pipeline should still see a mutable release.
    pub async fn get_or_create(
        &self,
        version: &str,
        target_commitish: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Release> {
        let releases = self.list_releases().await?;
        if let Some(existing) = releases
            .into_iter()
            .find(|r| r.name.as_deref() == Some(version))
        {
            debug!("Found existing release for {}", version);
            return Ok(existing);
        }
        self.create_draft(version, target_commitish, notes).await
    }

    /// Delete an uploaded asset by id
    pub async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/releases/assets/{}",
            self.config.api_url, self.config.owner, self.config.repo, asset_id
        );
        debug!("Deleting remote asset {}", asset_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .context("Failed to delete asset")?;
        if !response.status().is_success() {
            return Err(anyhow!("Failed to delete asset: {}", response.status()));
        }
        Ok(())
    }

    /// Upload a local file as a release asset
    pub async fn upload_asset(&self, release_id: u64, asset: &Asset) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.config.upload_url, self.config.owner, self.config.repo, release_id
        );
        debug!("Uploading {} to release {}", asset.name, release_id);

        let contents = tokio::fs::read(&asset.path)
            .await
            .with_context(|| format!("Failed to read {}", asset.path.display()))?;

        let response = self
            .client
            .post(&url)
            .query(&[("name", asset.name.as_str())])
            .bearer_auth(&self.config.token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(contents)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", asset.name))?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to upload {}: {}",
                asset.name,
                response.status()
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReleaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseClient")
            .field("owner", &self.config.owner)
            .field("repo", &self.config.repo)
            .finish_non_exhaustive()
    }
}
