//! Object key layout for the download center
//!
//! Version manifests are immutable once written; the per-channel "latest"
//! pointer is the only key that gets overwritten, and only during promotion.

use shipwright_core::Channel;

/// Prefix every manifest object lives under
pub const MANIFEST_PREFIX: &str = "com-download-center";

/// Key of the immutable manifest for one `(product, version)`
pub fn manifest_key(product_id: &str, version: &str) -> String {
    format!("{MANIFEST_PREFIX}/{product_id}/{version}.json")
}

/// Key of the channel-scoped "latest" pointer
pub fn latest_key(product_id: &str, channel: &Channel) -> String {
    match channel {
        Channel::Stable => format!("{MANIFEST_PREFIX}/{product_id}_latest.json"),
        other => format!("{MANIFEST_PREFIX}/{product_id}_{}_latest.json", other.name()),
    }
}

/// Key prefix assets are uploaded under; includes the channel off stable
pub fn asset_prefix(product_id: &str, channel: &Channel) -> String {
    match channel {
        Channel::Stable => product_id.to_string(),
        other => format!("{product_id}/{}", other.name()),
    }
}

/// Full key for one uploaded asset
pub fn asset_key(product_id: &str, channel: &Channel, asset_name: &str) -> String {
    format!("{}/{asset_name}", asset_prefix(product_id, channel))
}
