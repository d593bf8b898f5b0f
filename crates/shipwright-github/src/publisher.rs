//! Release publishing entry point

use anyhow::Result;
use serde::Serialize;
use shipwright_core::ReleaseConfig;
use tracing::{debug, info};

use crate::client::{GitHubConfig, ReleaseClient};
use crate::reconciler::{reconcile, AssetOutcome};

/// Why a publish call was deliberately skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Development builds are never published to the release service
    DevChannel,
    /// No API token configured
    NoToken,
}

/// Result of one publish run
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PublishOutcome {
    Skipped { reason: SkipReason },
    Published {
        release_id: u64,
        tag: String,
        assets: Vec<AssetOutcome>,
    },
}

/// Publishes a configured build to the release service
pub struct GitHubReleasePublisher {
    owner: String,
    repo: String,
    token: Option<String>,
    target_commitish: Option<String>,
    notes: Option<String>,
    endpoints: Option<(String, String)>,
}

impl GitHubReleasePublisher {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token,
            target_commitish: None,
            notes: None,
            endpoints: None,
        }
    }

    /// Commit the generated release tag should point at
    pub fn with_target_commitish(mut self, commitish: impl Into<String>) -> Self {
        self.target_commitish = Some(commitish.into());
        self
    }

    /// Release notes body for a newly created draft
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Override API and upload base URLs (mock servers)
    pub fn with_endpoints(mut self, api_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        self.endpoints = Some((api_url.into(), upload_url.into()));
        self
    }

    /// Get-or-create the release for this version and reconcile its assets.
    ///
    /// Returns a non-error skip for dev-channel builds and for runs without
    /// a token; both are expected states, not failures.
    pub async fn publish(&self, config: &ReleaseConfig) -> Result<PublishOutcome> {
        let channel = config.channel()?;
        if channel.is_dev() {
            debug!("Skipping release service publish for dev channel");
            return Ok(PublishOutcome::Skipped {
                reason: SkipReason::DevChannel,
            });
        }
        let Some(token) = &self.token else {
            debug!("Skipping release service publish because no token is set");
            return Ok(PublishOutcome::Skipped {
                reason: SkipReason::NoToken,
            });
        };

        let mut gh = GitHubConfig::new(&self.owner, &self.repo, token);
        if let Some((api, upload)) = &self.endpoints {
            gh = gh.with_endpoints(api, upload);
        }
        let client = ReleaseClient::new(gh)?;

        let release = client
            .get_or_create(
                config.version(),
                self.target_commitish.as_deref(),
                self.notes.as_deref(),
            )
            .await?;

        let assets = config.assets()?;
        let outcomes = reconcile(&client, &release, &assets).await;

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        info!(
            "Release {}: {} asset(s) reconciled, {} failed",
            config.version(),
            outcomes.len(),
            failed
        );

        Ok(PublishOutcome::Published {
            release_id: release.id,
            tag: release.tag_name.clone(),
            assets: outcomes,
        })
    }
}
