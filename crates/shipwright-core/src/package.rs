//! Package metadata for the application being released
//!
//! The desktop application's `package.json` is the single metadata input the
//! pipeline trusts: name, display name, version, author and platform build
//! settings all come from here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application metadata handed to [`crate::config::ReleaseConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageInfo {
    /// Package name, used in filenames and object keys
    pub name: String,

    /// Human-facing product name; falls back to `name`
    pub product_name: Option<String>,

    /// Semver version of the build
    pub version: String,

    pub author: Option<String>,
    pub description: Option<String>,

    /// Reverse-DNS bundle identifier (darwin)
    pub app_bundle_id: Option<String>,

    /// Application icon, relative to the source directory
    pub icon: Option<String>,

    /// Release service coordinates
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
}

impl PackageInfo {
    /// Load `package.json` from the application source directory
    pub fn load(sourcedir: &Path) -> Result<Self> {
        let path = sourcedir.join("package.json");
        if !path.is_file() {
            return Err(Error::file_not_found(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(&path)?;
        let pkg: PackageInfo = serde_json::from_str(&contents)?;
        Ok(pkg)
    }

    /// Display name, defaulting to the package name
    pub fn product_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.name)
    }
}
