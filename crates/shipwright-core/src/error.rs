//! Error types for shipwright-core

use thiserror::Error;

/// Result type alias using shipwright-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Shipwright
#[derive(Error, Debug)]
pub enum Error {
    /// Required environment variable is not set
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: String },

    /// Version string is not valid semver
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// A derived property's dependency chain reaches itself
    #[error("Dependency cycle detected at property: {property}")]
    PropertyCycle { property: String },

    /// Property name was never declared on the graph
    #[error("Unknown property: {name}")]
    UnknownProperty { name: String },

    /// Attempted to set a derived property directly
    #[error("Property is not a stored property: {name}")]
    NotStored { name: String },

    /// A property value did not have the expected shape
    #[error("Property {name} has unexpected type (expected {expected})")]
    PropertyType { name: String, expected: &'static str },

    /// No installer pipeline exists for this platform
    #[error("Installers are not supported for platform: {platform}")]
    InstallerUnsupported { platform: String },

    /// Remote response was missing a field the protocol requires
    #[error("Response missing expected field: {field}")]
    MissingResponseField { field: String },

    /// Expected local file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing environment variable error
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnv { name: name.into() }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a property cycle error
    pub fn property_cycle(property: impl Into<String>) -> Self {
        Self::PropertyCycle {
            property: property.into(),
        }
    }

    /// Create an unknown property error
    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty { name: name.into() }
    }

    /// Create a property type error
    pub fn property_type(name: impl Into<String>, expected: &'static str) -> Self {
        Self::PropertyType {
            name: name.into(),
            expected,
        }
    }

    /// Create a missing response field error
    pub fn missing_response_field(field: impl Into<String>) -> Self {
        Self::MissingResponseField {
            field: field.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}
