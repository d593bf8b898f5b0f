//! Process environment snapshot
//!
//! All environment variables the pipeline consumes are read exactly once,
//! here, and threaded through constructors as an explicit value. Nothing
//! else in the workspace reads `std::env::var` mid-pipeline.

use crate::error::{Error, Result};

/// Access key id for the download center object store
pub const DOWNLOAD_CENTER_ACCESS_KEY_ID: &str = "DOWNLOAD_CENTER_AWS_ACCESS_KEY_ID";
/// Secret access key for the download center object store
pub const DOWNLOAD_CENTER_SECRET_ACCESS_KEY: &str = "DOWNLOAD_CENTER_AWS_SECRET_ACCESS_KEY";
/// Token for the release service API
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Base URL of the notary service; absent means signing is not configured
pub const NOTARY_URL: &str = "NOTARY_URL";
/// Name of the notary signing key
pub const NOTARY_SIGNING_KEY: &str = "NOTARY_SIGNING_KEY";
/// Comment recorded in the notary log for each signing operation
pub const NOTARY_SIGNING_COMMENT: &str = "NOTARY_SIGNING_COMMENT";
/// Shared secret the notary auth token is derived from
pub const NOTARY_AUTH_TOKEN: &str = "NOTARY_AUTH_TOKEN";

/// Immutable snapshot of every environment variable the pipeline uses
#[derive(Debug, Clone, Default)]
pub struct Environment {
    github_token: Option<String>,
    dc_access_key_id: Option<String>,
    dc_secret_access_key: Option<String>,
    notary_url: Option<String>,
    notary_signing_key: Option<String>,
    notary_comment: Option<String>,
    notary_secret: Option<String>,
}

/// Credentials required for any download center operation
#[derive(Debug, Clone)]
pub struct DownloadCenterCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Fully resolved notary settings; only present when `NOTARY_URL` is set
#[derive(Debug, Clone)]
pub struct NotarySettings {
    pub url: String,
    pub signing_key: String,
    pub comment: String,
    pub secret: String,
}

impl Environment {
    /// Snapshot the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Empty values are treated the same as unset ones.
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            github_token: get(GITHUB_TOKEN),
            dc_access_key_id: get(DOWNLOAD_CENTER_ACCESS_KEY_ID),
            dc_secret_access_key: get(DOWNLOAD_CENTER_SECRET_ACCESS_KEY),
            notary_url: get(NOTARY_URL),
            notary_signing_key: get(NOTARY_SIGNING_KEY),
            notary_comment: get(NOTARY_SIGNING_COMMENT),
            notary_secret: get(NOTARY_AUTH_TOKEN),
        }
    }

    /// Release service token, if configured
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    /// Download center credentials; both variables are required
    pub fn download_center_credentials(&self) -> Result<DownloadCenterCredentials> {
        let access_key_id = self
            .dc_access_key_id
            .clone()
            .ok_or_else(|| Error::missing_env(DOWNLOAD_CENTER_ACCESS_KEY_ID))?;
        let secret_access_key = self
            .dc_secret_access_key
            .clone()
            .ok_or_else(|| Error::missing_env(DOWNLOAD_CENTER_SECRET_ACCESS_KEY))?;

        Ok(DownloadCenterCredentials {
            access_key_id,
            secret_access_key,
        })
    }

    /// Notary settings.
    ///
    /// An absent `NOTARY_URL` means signing infrastructure is simply not
    /// configured and returns `Ok(None)`. When the URL is present, the three
    /// remaining variables become required.
    pub fn notary(&self) -> Result<Option<NotarySettings>> {
        let url = match &self.notary_url {
            Some(url) => url.clone(),
            None => return Ok(None),
        };

        let signing_key = self
            .notary_signing_key
            .clone()
            .ok_or_else(|| Error::missing_env(NOTARY_SIGNING_KEY))?;
        let comment = self
            .notary_comment
            .clone()
            .ok_or_else(|| Error::missing_env(NOTARY_SIGNING_COMMENT))?;
        let secret = self
            .notary_secret
            .clone()
            .ok_or_else(|| Error::missing_env(NOTARY_AUTH_TOKEN))?;

        Ok(Some(NotarySettings {
            url,
            signing_key,
            comment,
            secret,
        }))
    }
}
