//! `estate probe`

use anyhow::{Context, Result};
use clap::Args;
use estate_core::effects::HealthProbe;
use estate_core::EstateConfig;
use estate_effects::HttpHealthProbe;

#[derive(Args)]
pub struct ProbeArgs {
    /// Liveness endpoint; defaults to `network.health_endpoint`
    #[arg(long)]
    url: Option<String>,
}

/// Run the subcommand.
pub async fn run(args: ProbeArgs, config: &EstateConfig) -> Result<()> {
    let url = args
        .url
        .or_else(|| config.network.health_endpoint.clone())
        .context("no liveness endpoint: pass --url or set network.health_endpoint")?;
    let probe = HttpHealthProbe::new(url, config.network.request_timeout())?;

    match probe.check().await {
        Ok(()) => println!("online"),
        Err(e) => println!("offline: {e}"),
    }
    Ok(())
}
