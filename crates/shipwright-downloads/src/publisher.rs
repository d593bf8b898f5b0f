//! Download center publishing
//!
//! `publish` is check-then-write: a manifest that already exists for the
//! version is returned as-is and never overwritten. `promote` copies the
//! version manifest to the channel's "latest" pointer, and refuses for dev
//! builds. Asset uploads run concurrently with per-asset outcomes.

use anyhow::{anyhow, Result};
use futures::future::join_all;
use serde::Serialize;
use shipwright_core::{Asset, Channel, ReleaseConfig};
use tracing::{debug, info};

use crate::keys::{asset_key, latest_key, manifest_key};
use crate::manifest::{DownloadCenterConfig, Manifest};
use crate::store::ObjectStore;

/// Whether `publish` wrote the manifest or found it already there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestDisposition {
    Created,
    AlreadyPublished,
}

/// Result of a manifest publish
#[derive(Debug, Serialize)]
pub struct PublishedManifest {
    pub key: String,
    pub disposition: ManifestDisposition,
    pub manifest: Manifest,
}

/// Result of a promote call
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PromoteOutcome {
    Promoted { source_key: String, latest_key: String },
    /// Dev builds are never advertised as latest on any channel
    SkippedDev,
}

/// Per-asset upload outcome
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { key: String },
    MissingLocal,
    Failed { message: String },
}

/// Per-asset upload report
#[derive(Debug, Clone, Serialize)]
pub struct AssetUpload {
    pub name: String,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

/// Publishes manifests and assets to the download center
pub struct DownloadCenterPublisher {
    manifest_store: Box<dyn ObjectStore>,
    asset_store: Box<dyn ObjectStore>,
    settings: DownloadCenterConfig,
}

impl DownloadCenterPublisher {
    pub fn new(
        manifest_store: Box<dyn ObjectStore>,
        asset_store: Box<dyn ObjectStore>,
        settings: DownloadCenterConfig,
    ) -> Self {
        Self {
            manifest_store,
            asset_store,
            settings,
        }
    }

    pub fn settings(&self) -> &DownloadCenterConfig {
        &self.settings
    }

    /// Publish the version manifest, idempotently.
    ///
    /// An existing manifest for this version is treated as already published
    /// and returned unchanged; manifests are immutable once created.
    pub async fn publish(&self, config: &ReleaseConfig) -> Result<PublishedManifest> {
        let key = manifest_key(&self.settings.product_id, config.version());

        if self.manifest_store.exists(&key).await? {
            info!("Manifest for {} already exists", config.version());
            let existing = self.manifest_store.get(&key).await?;
            let manifest: Manifest = serde_json::from_slice(&existing)?;
            return Ok(PublishedManifest {
                key,
                disposition: ManifestDisposition::AlreadyPublished,
                manifest,
            });
        }

        let manifest = Manifest::for_release(config, &self.settings)?;
        debug!("Uploading manifest for {} to {}", config.version(), key);
        self.manifest_store
            .put(
                &key,
                serde_json::to_vec_pretty(&manifest)?,
                "application/json",
            )
            .await?;
        info!("Published manifest for {}", config.version());

        Ok(PublishedManifest {
            key,
            disposition: ManifestDisposition::Created,
            manifest,
        })
    }

    /// Upload the release assets under the channel-aware key prefix
    pub async fn upload_assets(&self, config: &ReleaseConfig) -> Result<Vec<AssetUpload>> {
        let channel = config.channel()?;
        let assets = config.assets()?;

        Ok(join_all(
            assets
                .iter()
                .map(|asset| self.upload_one(&channel, asset)),
        )
        .await)
    }

    async fn upload_one(&self, channel: &Channel, asset: &Asset) -> AssetUpload {
        let report = |outcome| AssetUpload {
            name: asset.name.clone(),
            outcome,
        };

        if !asset.exists() {
            tracing::warn!(
                "Excluding {} from upload because {} does not exist",
                asset.name,
                asset.path.display()
            );
            return report(UploadOutcome::MissingLocal);
        }

        let key = asset_key(&self.settings.product_id, channel, &asset.name);
        match self.asset_store.put_file(&key, &asset.path).await {
            Ok(()) => report(UploadOutcome::Uploaded { key }),
            Err(err) => report(UploadOutcome::Failed {
                message: format!("{err:#}"),
            }),
        }
    }

    /// Promote a version's manifest to its channel's "latest" pointer
    pub async fn promote(&self, version: &str) -> Result<PromoteOutcome> {
        let channel = Channel::from_version(version);
        if channel.is_dev() {
            info!("Dev channel releases are not promoted to the download center");
            return Ok(PromoteOutcome::SkippedDev);
        }

        let source_key = manifest_key(&self.settings.product_id, version);
        if !self.manifest_store.exists(&source_key).await? {
            return Err(anyhow!(
                "No manifest found for {}@{}",
                self.settings.product_id,
                version
            ));
        }

        let latest = latest_key(&self.settings.product_id, &channel);
        debug!("Copying {} -> {}", source_key, latest);
        self.manifest_store.copy(&source_key, &latest).await?;
        info!(
            "{}@{} is now the latest {} release",
            self.settings.product_id, version, channel
        );

        Ok(PromoteOutcome::Promoted {
            source_key,
            latest_key: latest,
        })
    }
}
