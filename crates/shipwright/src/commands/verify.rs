//! Verify a published manifest's links

use anyhow::{bail, Context, Result};
use shipwright_core::Environment;
use shipwright_downloads::keys::manifest_key;
use shipwright_downloads::{s3_client, verify_links, Manifest, ObjectStore, S3Store};
use tracing::info;

use crate::cli::VerifyArgs;
use crate::commands::download_center_settings;

pub async fn run(args: VerifyArgs) -> Result<()> {
    let env = Environment::from_env();
    let credentials = env.download_center_credentials()?;
    let settings = download_center_settings(&args.download_center, None)?;

    let client = s3_client(
        &credentials,
        &args.download_center.region,
        args.download_center.endpoint.as_deref(),
    )
    .await;
    let store = S3Store::new(client, &settings.manifest_bucket);

    let key = manifest_key(&settings.product_id, &args.version);
    let bytes = store
        .get(&key)
        .await
        .with_context(|| format!("No manifest published for {}", args.version))?;
    let manifest: Manifest = serde_json::from_slice(&bytes)?;
    info!(
        "Checking links for {}@{} ({} channel)",
        settings.product_id,
        manifest.version,
        manifest.parsed_channel()
    );

    let outcomes = verify_links(&manifest).await?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    let failures = outcomes.iter().filter(|o| o.is_failure()).count();
    if failures > 0 {
        bail!("{failures} link(s) failed verification");
    }
    info!("All manifest links for {} resolve", args.version);
    Ok(())
}
