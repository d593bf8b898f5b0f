//! Signing service client
//!
//! Uploads a file to the notary service as a multipart request, then fetches
//! the signed result from the returned permalink and replaces the original
//! file in place. The replacement is staged through a temporary file in the
//! same directory and only renamed over the original once the download
//! stream has completed, so a failure mid-transfer leaves the input
//! untouched.

use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use shipwright_core::{Environment, Error, NotarySettings};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::token::current_auth_token;

/// Client for the remote signing service
pub struct NotaryClient {
    client: reqwest::Client,
    settings: NotarySettings,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    permalink: Option<String>,
}

impl NotaryClient {
    pub fn new(settings: NotarySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Build a client from the environment snapshot.
    ///
    /// Returns `Ok(None)` when no notary URL is configured: signing is
    /// optional infrastructure and its absence is a deliberate skip, not an
    /// error. A partially configured notary is a configuration error.
    pub fn from_environment(env: &Environment) -> shipwright_core::Result<Option<Self>> {
        Ok(env.notary()?.map(Self::new))
    }

    /// Sign a file in place.
    ///
    /// The file is uploaded together with the key name, comment and a
    /// freshly derived auth token; the service response must carry a
    /// `permalink` for the signed artifact, which is then downloaded over
    /// the original path.
    pub async fn sign(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::file_not_found(path.display().to_string()).into());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        debug!("Requesting signature for {}", path.display());
        let contents = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let form = Form::new()
            .text("key", self.settings.signing_key.clone())
            .text("comment", self.settings.comment.clone())
            .text("auth_token", current_auth_token(&self.settings.secret))
            .part("file", Part::bytes(contents).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/api/sign", self.base_url()))
            .multipart(form)
            .send()
            .await
            .context("Failed to reach signing service")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Signing service returned status: {}",
                response.status()
            ));
        }

        let body: SignResponse = response
            .json()
            .await
            .context("Failed to parse signing service response")?;
        let permalink = body
            .permalink
            .filter(|p| !p.is_empty())
            .ok_or(Error::missing_response_field("permalink"))?;

        self.download_signed(&permalink, path).await?;
        info!("Signed {}", path.display());
        Ok(())
    }

    /// Stream the signed artifact over the original file
    async fn download_signed(&self, permalink: &str, path: &Path) -> Result<()> {
        let url = format!("{}/{}", self.base_url(), permalink.trim_start_matches('/'));
        debug!("Fetching signed artifact from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch signed artifact")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Signed artifact fetch returned status: {}",
                response.status()
            ));
        }

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged =
            NamedTempFile::new_in(parent).context("Failed to create staging file")?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read signed artifact chunk")?;
            staged
                .write_all(&chunk)
                .context("Failed to write signed artifact")?;
        }
        staged.flush().context("Failed to flush signed artifact")?;

        // Only now does the original get replaced.
        staged
            .persist(path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.settings.url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for NotaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotaryClient")
            .field("url", &self.settings.url)
            .field("signing_key", &self.settings.signing_key)
            .finish_non_exhaustive()
    }
}
