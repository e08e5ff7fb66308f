//! `estate config`

use anyhow::Result;
use estate_core::EstateConfig;

/// Run the subcommand.
pub fn run(config: &EstateConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
