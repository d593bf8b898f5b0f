//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Shipwright - release configuration and publishing for desktop apps
#[derive(Parser, Debug)]
#[command(name = "shipwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved release configuration
    Config(ConfigArgs),

    /// Publish release assets and the download manifest
    Publish(PublishArgs),

    /// Promote a published version to its channel's latest pointer
    Promote(PromoteArgs),

    /// Sign files through the notary service
    Sign(SignArgs),

    /// Verify a published manifest's links
    Verify(VerifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Which build the configuration describes
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Application source directory (contains package.json)
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Target platform (darwin, win32, linux); defaults to the host
    #[arg(long)]
    pub platform: Option<String>,

    /// Target architecture; defaults to the host
    #[arg(long)]
    pub arch: Option<String>,

    /// Override the package version
    #[arg(long)]
    pub version: Option<String>,
}

/// Release service coordinates
#[derive(Args, Debug, Clone)]
pub struct GitHubArgs {
    /// Repository owner; falls back to package.json
    #[arg(long, env = "GITHUB_OWNER")]
    pub github_owner: Option<String>,

    /// Repository name; falls back to package.json
    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// Commit the release tag should point at
    #[arg(long)]
    pub target_commitish: Option<String>,
}

/// Download center buckets and URLs
#[derive(Args, Debug, Clone)]
pub struct DownloadCenterArgs {
    /// Product identifier; falls back to the package name
    #[arg(long, env = "DOWNLOAD_CENTER_PRODUCT_ID")]
    pub product_id: Option<String>,

    /// Bucket holding manifests and latest pointers
    #[arg(long, env = "DOWNLOAD_CENTER_MANIFEST_BUCKET")]
    pub manifest_bucket: String,

    /// Bucket assets are uploaded to
    #[arg(long, env = "DOWNLOAD_CENTER_ASSET_BUCKET", default_value = "")]
    pub asset_bucket: String,

    /// Public base URL assets are served from
    #[arg(long, env = "DOWNLOAD_CENTER_BASE_URL", default_value = "")]
    pub download_base_url: String,

    /// Product site base URL for manifest metadata links
    #[arg(long, env = "PRODUCT_SITE_URL", default_value = "")]
    pub site_url: String,

    /// Object store region
    #[arg(long, env = "DOWNLOAD_CENTER_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom object store endpoint (S3-compatible services)
    #[arg(long, env = "DOWNLOAD_CENTER_ENDPOINT")]
    pub endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub github: GitHubArgs,

    #[command(flatten)]
    pub download_center: DownloadCenterArgs,

    /// Skip the release service stage
    #[arg(long)]
    pub skip_github: bool,

    /// Skip the download center stage
    #[arg(long)]
    pub skip_download_center: bool,
}

#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Version whose manifest becomes the channel's latest
    pub version: String,

    #[command(flatten)]
    pub download_center: DownloadCenterArgs,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Files to sign in place
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Version whose manifest should be verified
    pub version: String,

    #[command(flatten)]
    pub download_center: DownloadCenterArgs,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
