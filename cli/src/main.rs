//! blockvision CLI: query BlockVision endpoints from the terminal.
//!
//! Usage:
//! ```bash
//! # Resolve and print the chain id
//! blockvision chain-id --network homestead
//!
//! # Send a raw JSON-RPC call
//! blockvision call --method eth_blockNumber
//!
//! # Watch an event stream
//! blockvision watch --stream newHeads --network homestead
//!
//! # List supported networks
//! blockvision networks
//! ```

use std::env;
use std::process;

use blockvision_core::network::Network;
use blockvision_provider::BlockVisionProvider;
use blockvision_ws::{BlockVisionWsProvider, SubscriptionEvent, SubscriptionKind};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "chain-id" => cmd_chain_id(&args[2..]).await,
        "call" => cmd_call(&args[2..]).await,
        "watch" => cmd_watch(&args[2..]).await,
        "networks" => {
            cmd_networks();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("blockvision {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("blockvision {}", env!("CARGO_PKG_VERSION"));
    println!("Query BlockVision endpoints and watch event streams\n");
    println!("USAGE:");
    println!("    blockvision <COMMAND>\n");
    println!("COMMANDS:");
    println!("    chain-id   Resolve and print the network identity");
    println!("    call       Send a raw JSON-RPC call");
    println!("    watch      Stream events over WebSocket");
    println!("    networks   List supported networks");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("COMMON FLAGS:");
    println!("    --network <NAME>   Network name (default: homestead)");
    println!("    --key <KEY>        API key (default: shared community key)\n");
    println!("CALL FLAGS:");
    println!("    --method <METHOD>  JSON-RPC method  [required]");
    println!("    --params <JSON>    Positional params as a JSON array\n");
    println!("WATCH FLAGS:");
    println!("    --stream <TAG>     newHeads | logs | newPendingTransactions |");
    println!("                       pendingTransactionsExtended  [required]");
}

fn provider_from(args: &[String]) -> Result<BlockVisionProvider, String> {
    let key = parse_flag(args, "--key");
    match parse_flag(args, "--network") {
        Some(name) => {
            BlockVisionProvider::for_name(&name, key.as_deref()).map_err(|e| e.to_string())
        }
        None => Ok(BlockVisionProvider::new(None, key.as_deref())),
    }
}

async fn cmd_chain_id(args: &[String]) -> Result<(), String> {
    let provider = provider_from(args)?;
    println!("Endpoint: {}", provider.url());

    let descriptor = provider
        .ensure_network()
        .await
        .map_err(|e| e.to_string())?;
    println!("Network:  {}", descriptor.name);
    println!("Chain id: {}", descriptor.chain_id);
    Ok(())
}

async fn cmd_call(args: &[String]) -> Result<(), String> {
    let method = parse_flag(args, "--method").ok_or("--method is required")?;
    let params: Vec<serde_json::Value> = match parse_flag(args, "--params") {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| format!("bad --params: {e}"))?,
        None => Vec::new(),
    };

    let provider = provider_from(args)?;
    let result: serde_json::Value = provider
        .dispatcher()
        .call(&method, params)
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    Ok(())
}

async fn cmd_watch(args: &[String]) -> Result<(), String> {
    let tag = parse_flag(args, "--stream").ok_or("--stream is required")?;
    let kind = match tag.as_str() {
        "newHeads" => SubscriptionKind::NewHeads,
        "logs" => SubscriptionKind::Logs,
        "newPendingTransactions" => SubscriptionKind::NewPendingTransactions,
        "pendingTransactionsExtended" => SubscriptionKind::PendingTransactionsExtended,
        other => return Err(format!("unknown stream: {other}")),
    };

    let key = parse_flag(args, "--key");
    let provider = match parse_flag(args, "--network") {
        Some(name) => {
            BlockVisionWsProvider::for_name(&name, key.as_deref()).map_err(|e| e.to_string())?
        }
        None => BlockVisionWsProvider::new(None, key.as_deref()),
    };

    println!("Watching {tag} on {}", provider.url());
    let mut subscription = provider.subscribe(kind, None).map_err(|e| e.to_string())?;

    while let Some(event) = subscription.next_event().await {
        match event {
            SubscriptionEvent::Open => println!("-- channel open --"),
            SubscriptionEvent::Message(value) => {
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default())
            }
            SubscriptionEvent::Error(message) => eprintln!("stream error: {message}"),
        }
    }
    Ok(())
}

fn cmd_networks() {
    println!("Supported networks:\n");
    println!("  {:<18} {:>9}  {}", "NAME", "CHAIN ID", "ENDPOINT");
    for network in Network::ALL {
        println!(
            "  {:<18} {:>9}  https://{}",
            network.name(),
            network.chain_id(),
            network.host(),
        );
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
