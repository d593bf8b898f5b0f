//! Asset reconciliation against a release record
//!
//! Reconciliation is name-keyed and order-independent. Draft releases are
//! mutable: any remote asset with the same name is removed before the local
//! file is uploaded, so re-running a partially failed publish converges on
//! "remote set equals local set". Published releases are append-only: an
//! existing name is never overwritten.
//!
//! Per-asset actions run concurrently; one asset's failure does not cancel
//! its siblings, and every asset's outcome is reported to the caller.

use futures::future::join_all;
use serde::Serialize;
use shipwright_core::Asset;
use tracing::{debug, warn};

use crate::client::{Release, ReleaseClient};

/// What happened to a single asset during reconciliation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AssetAction {
    /// Uploaded; `replaced` is set when a draft's existing asset was removed first
    Uploaded { replaced: bool },
    /// Release is published and already carries this name
    SkippedExisting,
    /// Local file does not exist; dropped with a warning
    MissingLocal,
    Failed { message: String },
}

/// Per-asset reconciliation outcome
#[derive(Debug, Clone, Serialize)]
pub struct AssetOutcome {
    pub name: String,
    #[serde(flatten)]
    pub action: AssetAction,
}

impl AssetOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.action, AssetAction::Failed { .. })
    }
}

/// Reconcile the local asset list against the release's remote assets
pub async fn reconcile(
    client: &ReleaseClient,
    release: &Release,
    assets: &[Asset],
) -> Vec<AssetOutcome> {
    join_all(
        assets
            .iter()
            .map(|asset| reconcile_one(client, release, asset)),
    )
    .await
}

async fn reconcile_one(client: &ReleaseClient, release: &Release, asset: &Asset) -> AssetOutcome {
    let outcome = |action| AssetOutcome {
        name: asset.name.clone(),
        action,
    };

    if !asset.exists() {
        warn!(
            "Excluding {} from upload because {} does not exist",
            asset.name,
            asset.path.display()
        );
        return outcome(AssetAction::MissingLocal);
    }

    let existing = release.assets.iter().find(|a| a.name == asset.name);

    if release.draft {
        if let Some(remote) = existing {
            debug!("Removing existing draft asset {}", asset.name);
            if let Err(err) = client.delete_asset(remote.id).await {
                return outcome(AssetAction::Failed {
                    message: format!("{err:#}"),
                });
            }
        }
        return match client.upload_asset(release.id, asset).await {
            Ok(()) => outcome(AssetAction::Uploaded {
                replaced: existing.is_some(),
            }),
            Err(err) => outcome(AssetAction::Failed {
                message: format!("{err:#}"),
            }),
        };
    }

    if existing.is_some() {
        debug!(
            "{} already exists and the release is published, skipping",
            asset.name
        );
        return outcome(AssetAction::SkippedExisting);
    }

    match client.upload_asset(release.id, asset).await {
        Ok(()) => outcome(AssetAction::Uploaded { replaced: false }),
        Err(err) => outcome(AssetAction::Failed {
            message: format!("{err:#}"),
        }),
    }
}
