//! # shipwright-core
//!
//! Core library for the Shipwright release pipeline providing:
//! - A lazy computed-property graph with declared dependencies
//! - The per-platform release configuration model built on it
//! - Release channel derivation from version pre-release tags
//! - The asset model with streaming checksums
//! - A read-once snapshot of the process environment

pub mod asset;
pub mod channel;
pub mod config;
pub mod env;
pub mod error;
pub mod graph;
pub mod package;
pub mod platform;

pub use asset::Asset;
pub use channel::Channel;
pub use config::{ReleaseConfig, ReleaseOptions};
pub use env::{DownloadCenterCredentials, Environment, NotarySettings};
pub use error::{Error, Result};
pub use graph::PropertyGraph;
pub use package::PackageInfo;
pub use platform::Platform;
