//! Command implementations

pub mod completions;
pub mod config;
pub mod promote;
pub mod publish;
pub mod sign;
pub mod verify;

use anyhow::Result;
use shipwright_core::{PackageInfo, Platform, ReleaseConfig, ReleaseOptions};
use shipwright_downloads::DownloadCenterConfig;

use crate::cli::{DownloadCenterArgs, TargetArgs};

/// Build the release configuration for the targeted build, keeping the
/// package metadata around for settings that live outside the config
pub(crate) fn load_target(target: &TargetArgs) -> Result<(ReleaseConfig, PackageInfo)> {
    let pkg = PackageInfo::load(&target.dir)?;
    let platform = target
        .platform
        .as_deref()
        .map(Platform::parse)
        .unwrap_or_else(host_platform);
    let arch = target.arch.clone().unwrap_or_else(host_arch);

    let config = ReleaseConfig::new(ReleaseOptions {
        sourcedir: target.dir.clone(),
        platform,
        arch,
        version: target.version.clone(),
        pkg: pkg.clone(),
    })?;
    Ok((config, pkg))
}

/// Build just the release configuration
pub(crate) fn build_config(target: &TargetArgs) -> Result<ReleaseConfig> {
    load_target(target).map(|(config, _)| config)
}

/// Resolve download center settings, filling the product id from a fallback
pub(crate) fn download_center_settings(
    args: &DownloadCenterArgs,
    fallback_product_id: Option<&str>,
) -> Result<DownloadCenterConfig> {
    let product_id = args
        .product_id
        .clone()
        .or_else(|| fallback_product_id.map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("No download center product id configured"))?;

    Ok(DownloadCenterConfig {
        product_id,
        manifest_bucket: args.manifest_bucket.clone(),
        asset_bucket: args.asset_bucket.clone(),
        download_base_url: args.download_base_url.clone(),
        site_base_url: args.site_url.clone(),
    })
}

/// Platform of the machine we are running on, in packager terms
fn host_platform() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::Darwin,
        "windows" => Platform::Win32,
        other => Platform::parse(other),
    }
}

/// Architecture of the machine we are running on, in packager terms
fn host_arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "x64".to_string(),
        "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}
