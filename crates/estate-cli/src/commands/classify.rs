//! `estate classify`

use super::parse_category;
use anyhow::Result;
use clap::Args;
use estate_core::{ErrorCategory, ErrorFactory, ErrorOptions};
use estate_effects::SystemClock;
use std::sync::Arc;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Raw failure message
    message: String,

    /// Category to force; inferred as `unknown` when omitted
    #[arg(short = 'C', long, value_parser = parse_category)]
    category: Option<ErrorCategory>,

    /// Technical details to attach
    #[arg(long)]
    details: Option<String>,
}

/// Run the subcommand.
pub fn run(args: ClassifyArgs) -> Result<()> {
    let factory = ErrorFactory::new(Arc::new(SystemClock::new()));
    let mut options = ErrorOptions::new();
    if let Some(details) = args.details {
        options = options.technical_details(details);
    }
    let record = factory.from_message(args.message, args.category, options);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
