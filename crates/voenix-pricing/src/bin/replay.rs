//! # Edit Replay
//!
//! Applies a recorded list of edits to a cost calculation and prints the
//! result in its wire form. Handy for reproducing what the admin UI showed.
//!
//! ## Usage
//! ```bash
//! # Replay edits on a fresh calculation with built-in defaults
//! cargo run -p voenix-pricing --bin voenix-pricing-replay -- edits.json
//!
//! # Use a pricing config and a specific article id
//! cargo run -p voenix-pricing --bin voenix-pricing-replay -- --config pricing.toml --article 42 edits.json
//!
//! # Start from a stored calculation instead of a fresh one
//! cargo run -p voenix-pricing --bin voenix-pricing-replay -- --from stored.json edits.json
//! ```
//!
//! ## Edits File
//! ```json
//! [
//!   { "op": "purchasePrice", "side": "NET", "amount": 1000 },
//!   { "op": "purchaseCostPercent", "percent": 10 },
//!   { "op": "salesMarginPercent", "percent": 20 }
//! ]
//! ```
//!
//! Logs go to stderr (`RUST_LOG` controls the level); the resulting JSON is
//! the only thing written to stdout.

use std::env;
use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;
use voenix_pricing::dto::{calculation_to_json, parse_calculation, parse_edits};
use voenix_pricing::PricingConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<String> = None;
    let mut from_path: Option<String> = None;
    let mut article_id: i64 = 1;
    let mut edits_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--article" | "-a" => {
                if i + 1 < args.len() {
                    article_id = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--from" | "-f" => {
                if i + 1 < args.len() {
                    from_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => edits_path = Some(other.to_string()),
        }
        i += 1;
    }

    let Some(edits_path) = edits_path else {
        print_help();
        return Err("missing edits file".into());
    };

    init_tracing();

    let mut config = match &config_path {
        Some(path) => {
            info!(path = %path, "Loading pricing config from file");
            PricingConfig::from_toml_str(&fs::read_to_string(path)?)?
        }
        None => PricingConfig::default(),
    };
    config.apply_env(|key| env::var(key).ok());
    config.validate()?;

    let calculation = match &from_path {
        Some(path) => {
            info!(path = %path, "Loading stored calculation");
            parse_calculation(&fs::read_to_string(path)?)?
        }
        None => config.new_calculation(article_id),
    };

    let edits = parse_edits(&fs::read_to_string(&edits_path)?)?;
    info!(
        article_id = calculation.article_id(),
        edits = edits.len(),
        "Replaying edits"
    );

    let calculation = calculation.apply_all(edits);
    println!("{}", calculation_to_json(&calculation)?);

    Ok(())
}

fn print_help() {
    println!("Voenix Pricing Edit Replay");
    println!();
    println!("Usage: voenix-pricing-replay [OPTIONS] <EDITS_FILE>");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>   Pricing config TOML (default: built-in defaults)");
    println!("  -a, --article <ID>    Article id for a fresh calculation (default: 1)");
    println!("  -f, --from <PATH>     Start from a stored calculation JSON");
    println!("  -h, --help            Show this help message");
}

/// Initializes logging to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show every applied edit
/// - `RUST_LOG=voenix_pricing=trace` - Include zero-base percentage notes
/// - Default: INFO, DEBUG for this crate
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,voenix_pricing=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
