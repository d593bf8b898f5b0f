//! Download center manifest
//!
//! One manifest document exists per `(product, version)`, describing the
//! download links a storefront renders. The document is immutable once
//! published; promotion copies it to the channel's "latest" pointer key.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use shipwright_core::{Channel, ReleaseConfig};

use crate::keys::asset_prefix;

/// Download center settings for one product
#[derive(Debug, Clone)]
pub struct DownloadCenterConfig {
    /// Product identifier used in object keys and URLs
    pub product_id: String,

    /// Bucket holding version manifests and latest pointers
    pub manifest_bucket: String,

    /// Bucket assets are uploaded to
    pub asset_bucket: String,

    /// Public base URL assets are served from
    pub download_base_url: String,

    /// Product site base URL, for the manifest's metadata links
    pub site_base_url: String,
}

/// One downloadable platform build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDownload {
    pub name: String,
    pub download_link: String,
}

/// The manifest document published per version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub channel: String,
    pub platform: Vec<PlatformDownload>,
    pub development_releases_link: String,
    pub manual_link: String,
    pub release_notes_link: String,
    pub previous_releases_link: String,
    pub supported_browsers_link: String,
    pub tutorial_link: String,
}

impl Manifest {
    /// Build the manifest for a configured release
    pub fn for_release(config: &ReleaseConfig, settings: &DownloadCenterConfig) -> Result<Self> {
        let channel = config.channel()?;
        let version = config.version();
        let name = config.name();
        let site = settings.site_base_url.trim_end_matches('/');

        // Download links share the key prefix assets are uploaded under, so
        // the channel appears in both or in neither.
        let prefix = format!(
            "{}/{}",
            settings.download_base_url.trim_end_matches('/'),
            asset_prefix(&settings.product_id, &channel)
        );

        Ok(Self {
            version: version.to_string(),
            channel: channel.name().to_string(),
            platform: vec![
                PlatformDownload {
                    name: "macOS 64-bit".to_string(),
                    download_link: format!("{prefix}/{name}-{version}-darwin-x64.dmg"),
                },
                PlatformDownload {
                    name: "Windows 64-bit".to_string(),
                    download_link: format!("{prefix}/{name}-{version}-win32-x64.exe"),
                },
            ],
            development_releases_link: format!("{site}/beta"),
            manual_link: format!("{site}/docs"),
            release_notes_link: format!("{site}/releases/{version}"),
            previous_releases_link: format!("{site}/releases"),
            supported_browsers_link: String::new(),
            tutorial_link: String::new(),
        })
    }

    /// Named metadata links, in render order
    pub fn metadata_links(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Development Releases", self.development_releases_link.as_str()),
            ("Manual", self.manual_link.as_str()),
            ("Release Notes", self.release_notes_link.as_str()),
            ("Previous Releases", self.previous_releases_link.as_str()),
            ("Supported Browsers", self.supported_browsers_link.as_str()),
            ("Tutorial", self.tutorial_link.as_str()),
        ]
    }

    /// Channel parsed back out of the document
    pub fn parsed_channel(&self) -> Channel {
        match self.channel.as_str() {
            "stable" => Channel::Stable,
            "beta" => Channel::Beta,
            "dev" => Channel::Dev,
            tag => Channel::Custom {
                tag: tag.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipwright_core::{PackageInfo, Platform, ReleaseOptions};
    use std::path::PathBuf;

    fn settings() -> DownloadCenterConfig {
        DownloadCenterConfig {
            product_id: "vessel".to_string(),
            manifest_bucket: "manifests".to_string(),
            asset_bucket: "downloads".to_string(),
            download_base_url: "https://downloads.acme.io".to_string(),
            site_base_url: "https://vessel.acme.io".to_string(),
        }
    }

    fn config(version: &str) -> ReleaseConfig {
        ReleaseConfig::new(ReleaseOptions {
            sourcedir: PathBuf::from("/tmp/vessel"),
            platform: Platform::Darwin,
            arch: "x64".to_string(),
            version: Some(version.to_string()),
            pkg: PackageInfo {
                name: "vessel".to_string(),
                product_name: Some("Vessel".to_string()),
                version: version.to_string(),
                ..Default::default()
            },
        })
        .unwrap()
    }

    #[test]
    fn test_stable_manifest_links() {
        let manifest = Manifest::for_release(&config("1.2.0"), &settings()).unwrap();
        assert_eq!(manifest.channel, "stable");
        assert_eq!(
            manifest.platform[0].download_link,
            "https://downloads.acme.io/vessel/vessel-1.2.0-darwin-x64.dmg"
        );
        assert_eq!(
            manifest.release_notes_link,
            "https://vessel.acme.io/releases/1.2.0"
        );
    }

    #[test]
    fn test_beta_manifest_carries_channel_in_links() {
        let manifest = Manifest::for_release(&config("1.2.0-beta.1"), &settings()).unwrap();
        assert_eq!(manifest.channel, "beta");
        assert_eq!(
            manifest.platform[1].download_link,
            "https://downloads.acme.io/vessel/beta/vessel-1.2.0-beta.1-win32-x64.exe"
        );
    }

    #[test]
    fn test_wire_shape_round_trip() {
        let manifest = Manifest::for_release(&config("1.2.0"), &settings()).unwrap();
        let json = serde_json::to_value(&manifest).unwrap();
        for field in [
            "version",
            "channel",
            "platform",
            "development_releases_link",
            "manual_link",
            "release_notes_link",
            "previous_releases_link",
            "supported_browsers_link",
            "tutorial_link",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        let back: Manifest = serde_json::from_value(json).unwrap();
        assert_eq!(back, manifest);
    }
}
