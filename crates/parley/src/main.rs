use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use parley_models::Bid;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "parley",
    about = "Replay opponent offers against an automated negotiation agent"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/parley.toml")]
    config: String,

    /// Path to our own preference profile (JSON)
    #[arg(short, long)]
    profile: String,

    /// Read the opponent's offers (JSON array of bids) from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = parley::load_config(&cli.config)?;
    let profile = parley::load_profile(&cli.profile)?;

    let offers_json = if let Some(input_path) = &cli.input {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input: {input_path}"))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };
    let offers: Vec<Bid> =
        serde_json::from_str(&offers_json).context("Failed to parse offers JSON")?;

    let outcome = parley::replay(&config, profile, offers)?;

    // Output the outcome as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{output}");

    Ok(())
}
