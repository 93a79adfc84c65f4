#![forbid(unsafe_code)]
//! HTTP mining node for hashledger

use clap::Parser;
use hashledger::config::{load_config_from, DEFAULT_CONFIG_PATH};
use hashledger::node::Node;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Address to bind the HTTP API to (overrides network.api_host)
    #[arg(long)]
    host: Option<String>,
    /// Port to bind the HTTP API to (overrides network.api_port)
    #[arg(short, long)]
    port: Option<u16>,
    /// Identifier credited with mining rewards (overrides miner.node_identifier)
    #[arg(long)]
    node_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = load_config_from(&cli.config)?;

    if let Some(host) = cli.host {
        config.network.api_host = host;
    }
    if let Some(port) = cli.port {
        config.network.api_port = port;
    }
    if let Some(node_id) = cli.node_id {
        config.miner.node_identifier = Some(node_id);
    }
    config.validate()?;

    let node = Arc::new(Node::init(config));
    node.start().await
}
