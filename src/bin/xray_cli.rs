//! One-shot policy analysis from the command line
//!
//! Usage:
//!   cargo run --bin xray_cli --features cli -- <POLICY_ID>
//!   cargo run --bin xray_cli --features cli -- <POLICY_ID> --pretty

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use policy_xray::{validate_policy_id, InMemoryVerdictStore, PolicyAnalyzer, XrayConfig};

#[derive(Parser)]
#[command(name = "xray_cli")]
#[command(about = "Classify an on-chain minting policy and print the verdict as JSON")]
struct Args {
    /// Policy id (56 hex characters)
    policy_id: String,

    /// Pretty-print the verdict JSON
    #[arg(short, long)]
    pretty: bool,

    /// Provider credential (overrides BLOCKFROST_PROJECT_ID)
    #[arg(long, env = "BLOCKFROST_PROJECT_ID", hide_env_values = true)]
    project_id: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = validate_policy_id(&args.policy_id) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut config = match XrayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if args.project_id.is_some() {
        config.project_id = args.project_id.filter(|p| !p.trim().is_empty());
    }

    let analyzer = match PolicyAnalyzer::from_config(&config, Arc::new(InMemoryVerdictStore::new()))
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let verdict = analyzer.analyze(&args.policy_id).await;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&verdict)
    } else {
        serde_json::to_string(&verdict)
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            if verdict.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error serializing verdict: {}", e);
            ExitCode::FAILURE
        }
    }
}
