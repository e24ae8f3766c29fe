use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ledger_core::constants::{DEFAULT_CHAIN_FILE, DEFAULT_DIFFICULTY};
use ledger_storage::{ChainStore, FileStore};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_NODE: &str = "http://127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work demo node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the node to run one mining cycle
    Mine {
        /// Node base URL (e.g. http://127.0.0.1:8080)
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    /// Show the node's stored chain
    Chain {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    /// List the simulated nodes
    Nodes {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    /// Check that the node is up
    Health {
        #[arg(long, default_value = DEFAULT_NODE)]
        node: String,
    },
    /// Validate a chain file on disk without contacting a node
    Verify {
        #[arg(long, default_value = DEFAULT_CHAIN_FILE)]
        chain_file: PathBuf,
        /// Difficulty every mined block must meet
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: u32,
    },
}

async fn request(client: &reqwest::Client, method: reqwest::Method, url: String) -> Result<()> {
    debug!("{method} {url}");
    let res = client.request(method, url).send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}

/// Load `path` and validate it, returning the number of blocks.
fn verify(path: &Path, difficulty: u32) -> Result<usize> {
    let chain = FileStore::new(path).load()?;
    if let Err(e) = chain.validate(difficulty) {
        bail!("{} is invalid: {e}", path.display());
    }
    Ok(chain.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    match cli.cmd {
        Command::Mine { node } => {
            request(&client, reqwest::Method::POST, format!("{node}/mine")).await?
        }
        Command::Chain { node } => {
            request(&client, reqwest::Method::GET, format!("{node}/chain")).await?
        }
        Command::Nodes { node } => {
            request(&client, reqwest::Method::GET, format!("{node}/nodes")).await?
        }
        Command::Health { node } => {
            request(&client, reqwest::Method::GET, format!("{node}/health")).await?
        }
        Command::Verify {
            chain_file,
            difficulty,
        } => {
            let blocks = verify(&chain_file, difficulty)?;
            println!(
                "{}: {} blocks, valid at difficulty {}",
                chain_file.display(),
                blocks,
                difficulty
            );
        }
    }
    Ok(())
}
