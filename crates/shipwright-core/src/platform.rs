//! Target platform identifiers

/// Build target platform, as reported by the packaging toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Win32,
    Linux,
    /// A platform we can still configure, but cannot package installers for
    Other(String),
}

impl Platform {
    pub fn parse(value: &str) -> Self {
        match value {
            "darwin" => Platform::Darwin,
            "win32" => Platform::Win32,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Win32 => "win32",
            Platform::Linux => "linux",
            Platform::Other(name) => name.as_str(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Platform::parse(s))
    }
}
