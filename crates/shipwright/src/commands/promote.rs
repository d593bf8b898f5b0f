//! Promote a version manifest to its channel's latest pointer

use anyhow::Result;
use shipwright_core::Environment;
use shipwright_downloads::{s3_client, DownloadCenterPublisher, S3Store};

use crate::cli::PromoteArgs;
use crate::commands::download_center_settings;

pub async fn run(args: PromoteArgs) -> Result<()> {
    let env = Environment::from_env();
    let credentials = env.download_center_credentials()?;
    let settings = download_center_settings(&args.download_center, None)?;

    let client = s3_client(
        &credentials,
        &args.download_center.region,
        args.download_center.endpoint.as_deref(),
    )
    .await;
    let manifest_store = S3Store::new(client.clone(), &settings.manifest_bucket);
    let asset_store = S3Store::new(client, &settings.asset_bucket);
    let publisher =
        DownloadCenterPublisher::new(Box::new(manifest_store), Box::new(asset_store), settings);

    let outcome = publisher.promote(&args.version).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
