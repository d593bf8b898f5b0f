//! Manifest link verification
//!
//! After a manifest is published, every download link and metadata link in
//! it should resolve. Checks are HEAD requests issued concurrently; each
//! link reports its own outcome so one dead link doesn't mask the rest.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::manifest::Manifest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    Ok,
    /// Link field is empty; nothing to check
    SkippedEmpty,
    Failed { message: String },
}

/// Outcome for one checked link
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub status: LinkStatus,
}

impl LinkOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, LinkStatus::Failed { .. })
    }
}

/// HEAD every link in the manifest and report per-link outcomes
pub async fn verify_links(manifest: &Manifest) -> Result<Vec<LinkOutcome>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let mut targets: Vec<(String, String)> = manifest
        .platform
        .iter()
        .map(|p| (format!("{} installer", p.name), p.download_link.clone()))
        .collect();
    targets.extend(
        manifest
            .metadata_links()
            .into_iter()
            .map(|(name, url)| (name.to_string(), url.to_string())),
    );

    Ok(join_all(
        targets
            .into_iter()
            .map(|(name, url)| check_link(&client, name, url)),
    )
    .await)
}

async fn check_link(client: &reqwest::Client, name: String, url: String) -> LinkOutcome {
    if url.is_empty() {
        return LinkOutcome {
            name,
            url,
            status: LinkStatus::SkippedEmpty,
        };
    }

    debug!("Checking {}: {}", name, url);
    let status = match client.head(&url).send().await {
        Ok(response) if response.status().is_success() => LinkStatus::Ok,
        Ok(response) => LinkStatus::Failed {
            message: format!("status {}", response.status()),
        },
        Err(err) => LinkStatus::Failed {
            message: format!("{err:#}"),
        },
    };

    LinkOutcome { name, url, status }
}
