//! The full publish pipeline
//!
//! Order of operations: configuration is resolved once, every present asset
//! is signed (when a notary is configured), then the release service and the
//! download center stages run concurrently. Each stage reports structured
//! per-asset outcomes; partial failures are printed and turn into a non-zero
//! exit, never silently swallowed.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use shipwright_core::{Environment, PackageInfo, ReleaseConfig};
use shipwright_downloads::{
    s3_client, AssetUpload, DownloadCenterPublisher, PublishedManifest, S3Store, UploadOutcome,
};
use shipwright_github::{GitHubReleasePublisher, PublishOutcome};
use shipwright_notary::NotaryClient;
use tracing::{debug, info, warn};

use crate::cli::PublishArgs;
use crate::commands::{download_center_settings, load_target};

#[derive(Debug, Serialize)]
struct DownloadCenterReport {
    manifest: PublishedManifest,
    uploads: Vec<AssetUpload>,
}

#[derive(Debug, Serialize)]
struct PublishReport {
    github: Option<PublishOutcome>,
    download_center: Option<DownloadCenterReport>,
}

pub async fn run(args: PublishArgs) -> Result<()> {
    let env = Environment::from_env();
    let (config, pkg) = load_target(&args.target)?;
    info!(
        "Publishing {} {} ({}-{})",
        config.name(),
        config.version(),
        config.platform(),
        config.arch()
    );

    // Signing runs strictly before either publisher sees the files.
    sign_assets(&env, &config).await?;

    let github_publisher = if args.skip_github {
        debug!("Release service stage skipped by flag");
        None
    } else {
        github_publisher(&args, &pkg, &env)
    };

    // Credential checks happen before any network call.
    let download_center = if args.skip_download_center {
        debug!("Download center stage skipped by flag");
        None
    } else {
        let credentials = env.download_center_credentials()?;
        let settings = download_center_settings(&args.download_center, Some(config.name()))?;
        if settings.download_base_url.is_empty() || settings.site_base_url.is_empty() {
            bail!("Download center base URLs are not configured");
        }
        let client = s3_client(
            &credentials,
            &args.download_center.region,
            args.download_center.endpoint.as_deref(),
        )
        .await;
        let manifest_store = S3Store::new(client.clone(), &settings.manifest_bucket);
        let asset_store = S3Store::new(client, &settings.asset_bucket);
        Some(DownloadCenterPublisher::new(
            Box::new(manifest_store),
            Box::new(asset_store),
            settings,
        ))
    };

    // The two surfaces have no data dependency on each other.
    let github_stage = async {
        match &github_publisher {
            Some(publisher) => publisher.publish(&config).await.map(Some),
            None => Ok(None),
        }
    };
    let download_stage = async {
        match &download_center {
            Some(publisher) => {
                let manifest = publisher.publish(&config).await?;
                let uploads = publisher.upload_assets(&config).await?;
                Ok(Some(DownloadCenterReport { manifest, uploads }))
            }
            None => Ok::<_, anyhow::Error>(None),
        }
    };
    let (github_outcome, download_outcome) = tokio::join!(github_stage, download_stage);

    let report = PublishReport {
        github: github_outcome.context("Release service publish failed")?,
        download_center: download_outcome.context("Download center publish failed")?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    let failures = count_failures(&report);
    if failures > 0 {
        bail!("{failures} asset operation(s) failed");
    }
    Ok(())
}

/// Sign every present asset through the notary, when one is configured
async fn sign_assets(env: &Environment, config: &ReleaseConfig) -> Result<()> {
    let Some(notary) = NotaryClient::from_environment(env)? else {
        debug!("Notary service not configured, skipping signing");
        return Ok(());
    };

    for asset in config.present_assets()? {
        notary
            .sign(&asset.path)
            .await
            .with_context(|| format!("Failed to sign {}", asset.name))?;
    }
    Ok(())
}

fn github_publisher(
    args: &PublishArgs,
    pkg: &PackageInfo,
    env: &Environment,
) -> Option<GitHubReleasePublisher> {
    let owner = args
        .github
        .github_owner
        .clone()
        .or_else(|| pkg.github_owner.clone());
    let repo = args
        .github
        .github_repo
        .clone()
        .or_else(|| pkg.github_repo.clone());
    let (Some(owner), Some(repo)) = (owner, repo) else {
        warn!("No release repository configured, skipping release service stage");
        return None;
    };

    let mut publisher =
        GitHubReleasePublisher::new(owner, repo, env.github_token().map(str::to_string));
    if let Some(commitish) = &args.github.target_commitish {
        publisher = publisher.with_target_commitish(commitish);
    }
    Some(publisher)
}

fn count_failures(report: &PublishReport) -> usize {
    let mut failures = 0;
    if let Some(PublishOutcome::Published { assets, .. }) = &report.github {
        failures += assets.iter().filter(|a| a.is_failure()).count();
    }
    if let Some(dc) = &report.download_center {
        failures += dc
            .uploads
            .iter()
            .filter(|u| matches!(u.outcome, UploadOutcome::Failed { .. }))
            .count();
    }
    failures
}
