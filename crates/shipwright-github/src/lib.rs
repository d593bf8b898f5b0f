//! Release service publishing
//!
//! Provides:
//! - A REST client for repository releases and their assets
//! - Get-or-create draft release semantics keyed on the version name
//! - Name-keyed asset reconciliation that is safe to re-run

pub mod client;
pub mod publisher;
pub mod reconciler;

pub use client::{GitHubConfig, Release, ReleaseClient, RemoteAsset};
pub use publisher::{GitHubReleasePublisher, PublishOutcome, SkipReason};
pub use reconciler::{reconcile, AssetAction, AssetOutcome};
