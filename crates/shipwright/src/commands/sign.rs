//! Sign files through the notary service

use anyhow::{Context, Result};
use shipwright_core::Environment;
use shipwright_notary::NotaryClient;
use tracing::info;

use crate::cli::SignArgs;

pub async fn run(args: SignArgs) -> Result<()> {
    let env = Environment::from_env();
    let Some(notary) = NotaryClient::from_environment(&env)? else {
        info!("Notary service not configured, nothing to sign");
        return Ok(());
    };

    for file in &args.files {
        notary
            .sign(file)
            .await
            .with_context(|| format!("Failed to sign {}", file.display()))?;
    }
    Ok(())
}
