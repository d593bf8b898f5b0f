//! Release channels derived from a version's pre-release tag

use serde::{Deserialize, Serialize};

/// Release maturity tier for a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Beta,
    Dev,
    /// Any other pre-release tag, e.g. `1.2.0-alpha.1` -> `alpha`
    Custom { tag: String },
}

impl Channel {
    /// Derive the channel from a version string.
    ///
    /// `-beta` anywhere in the version wins over any other tag, then `-dev`;
    /// a version without a pre-release tag is stable; any other `-<tag>`
    /// becomes a custom channel named after the first pre-release identifier.
    pub fn from_version(version: &str) -> Self {
        if version.contains("-beta") {
            return Channel::Beta;
        }
        if version.contains("-dev") {
            return Channel::Dev;
        }
        match version.split_once('-') {
            Some((_, pre)) if !pre.is_empty() => {
                let tag = pre.split('.').next().unwrap_or(pre).to_string();
                Channel::Custom { tag }
            }
            _ => Channel::Stable,
        }
    }

    /// Short lowercase channel name used in object keys and log lines
    pub fn name(&self) -> &str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Dev => "dev",
            Channel::Custom { tag } => tag.as_str(),
        }
    }

    /// Display suffix appended to the product name, `None` on stable
    pub fn product_suffix(&self) -> Option<String> {
        match self {
            Channel::Stable => None,
            Channel::Beta => Some(" (Beta)".to_string()),
            Channel::Dev => Some(" (Development)".to_string()),
            Channel::Custom { tag } => Some(format!(" {}", capitalize(tag))),
        }
    }

    /// Suffix appended to reverse-DNS bundle identifiers, `None` on stable
    pub fn identifier_suffix(&self) -> Option<String> {
        match self {
            Channel::Stable => None,
            other => Some(format!(".{}", other.name())),
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, Channel::Stable)
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Channel::Dev)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
