//! Builders for release service wire payloads and test configurations

use serde_json::{json, Value};
use shipwright_core::{PackageInfo, Platform, ReleaseConfig, ReleaseOptions};
use std::path::Path;

/// Builder for the release JSON a mock server hands back
#[derive(Debug, Clone)]
pub struct ReleaseJson {
    id: u64,
    name: Option<String>,
    tag_name: String,
    draft: bool,
    assets: Vec<(u64, String)>,
}

impl ReleaseJson {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: None,
            tag_name: "v0.0.0".to_string(),
            draft: false,
            assets: Vec::new(),
        }
    }

    /// Set the release name and tag from a version
    pub fn version(mut self, version: &str) -> Self {
        self.name = Some(version.to_string());
        self.tag_name = format!("v{version}");
        self
    }

    pub fn draft(mut self) -> Self {
        self.draft = true;
        self
    }

    pub fn asset(mut self, id: u64, name: &str) -> Self {
        self.assets.push((id, name.to_string()));
        self
    }

    pub fn build(self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "tag_name": self.tag_name,
            "draft": self.draft,
            "assets": self
                .assets
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect::<Vec<_>>(),
        })
    }
}

/// A darwin configuration rooted at `sourcedir`, with its dist files written
pub fn darwin_config(sourcedir: &Path, version: &str) -> ReleaseConfig {
    let dist = sourcedir.join("dist");
    std::fs::create_dir_all(&dist).unwrap();
    std::fs::write(dist.join("vessel.dmg"), b"dmg bytes").unwrap();
    std::fs::write(dist.join("vessel-mac.zip"), b"zip bytes").unwrap();

    ReleaseConfig::new(ReleaseOptions {
        sourcedir: sourcedir.to_path_buf(),
        platform: Platform::Darwin,
        arch: "x64".to_string(),
        version: Some(version.to_string()),
        pkg: PackageInfo {
            name: "vessel".to_string(),
            product_name: Some("Vessel".to_string()),
            version: version.to_string(),
            author: Some("Acme Inc".to_string()),
            ..Default::default()
        },
    })
    .unwrap()
}
