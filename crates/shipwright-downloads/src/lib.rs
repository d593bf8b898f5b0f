//! Download center publishing
//!
//! Provides:
//! - An object-store seam with an S3 backend
//! - The per-version manifest document and its key layout
//! - Idempotent manifest publishing and channel-gated promotion
//! - Concurrent asset uploads with per-asset outcomes
//! - Post-publish link verification

pub mod keys;
pub mod manifest;
pub mod publisher;
pub mod store;
pub mod verify;

pub use manifest::{DownloadCenterConfig, Manifest, PlatformDownload};
pub use publisher::{
    AssetUpload, DownloadCenterPublisher, ManifestDisposition, PromoteOutcome, PublishedManifest,
    UploadOutcome,
};
pub use store::{s3_client, ObjectStore, S3Store};
pub use verify::{verify_links, LinkOutcome, LinkStatus};
