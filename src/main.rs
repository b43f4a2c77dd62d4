use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hd_keysmith::{server, Config, WalletService};

#[derive(Parser, Debug)]
#[command(
    name = "hd-keysmith",
    about = "BIP39 mnemonics, BIP32/BIP44 keys and P2SH multisig addresses",
    version
)]
struct Cli {
    /// Path to a TOML config file; defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Start {
        /// Overrides `server.listen`
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Generate a 24-word mnemonic and its seed
    Mnemonic {
        #[arg(long, default_value = "")]
        passphrase: String,
    },

    /// Derive keys and addresses from a hex seed
    HdWallet {
        #[arg(long)]
        seed: String,

        #[arg(long, default_value = "m/44'/0'/0'/0/0")]
        path: String,
    },

    /// Build an M-of-N P2SH multisig address
    Multisig {
        #[arg(short)]
        m: i64,

        #[arg(short)]
        n: i64,

        /// WIF private keys, in script order
        #[arg(long = "wif", required = true)]
        wifs: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let service = WalletService::from_config(&config);

    match cli.command {
        Command::Start { listen } => {
            let addr = listen.unwrap_or(config.server.listen);
            tracing::info!(network = %config.network, "starting keysmith server");
            server::serve(addr, Arc::new(service)).await?;
        }
        Command::Mnemonic { passphrase } => {
            print_json(&service.generate_mnemonic(&passphrase)?)?;
        }
        Command::HdWallet { seed, path } => {
            print_json(&service.generate_hd_wallet(&seed, &path)?)?;
        }
        Command::Multisig { m, n, wifs } => {
            print_json(&service.generate_multisig(m, n, &wifs)?)?;
        }
    }

    Ok(())
}
