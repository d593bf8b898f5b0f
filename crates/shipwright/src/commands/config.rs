//! Show the resolved release configuration

use anyhow::Result;

use crate::cli::ConfigArgs;
use crate::commands::build_config;

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = build_config(&args.target)?;
    println!("{}", serde_json::to_string_pretty(&config.to_value())?);
    Ok(())
}
