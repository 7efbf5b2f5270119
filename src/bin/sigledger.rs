#![forbid(unsafe_code)]
//! Command-line front end for a local sigledger database

use clap::{Parser, Subcommand};
use colored::*;
use sigledger::address::{address_from_hex, key_for};
use sigledger::config::{load_config, DEFAULT_CONFIG_PATH};
use sigledger::crypto::KeyPair;
use sigledger::dispatch::{
    BalanceRequest, Dispatcher, RegisterRequest, Request, Response, SendRequest,
};
use sigledger::persistence::SqliteStore;
use sigledger::{Balance, Ledger, Transaction};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a new key pair and prints its secret key and address
    Keygen,
    /// Registers an address with the genesis balance
    Register {
        /// Address as hex (uncompressed public key)
        address: String,
    },
    /// Shows the balance and chain token of an address
    Balance {
        /// Address as hex (uncompressed public key)
        address: String,
    },
    /// Signs and submits a transfer
    Send {
        /// Sender secret key as hex
        #[arg(long)]
        secret: String,
        /// Receiver address as hex
        #[arg(long)]
        to: String,
        /// Amount to transfer
        #[arg(long)]
        amount: u64,
    },
}

type LocalDispatcher = Dispatcher<SqliteStore>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Register { address } => {
            let dispatcher = open_dispatcher(&cli.config)?;
            let request = Request::Register(RegisterRequest {
                address: address_from_hex(&address)?,
            });
            submit(&dispatcher, request)
        }
        Commands::Balance { address } => {
            let dispatcher = open_dispatcher(&cli.config)?;
            let request = Request::Balance(BalanceRequest {
                address: address_from_hex(&address)?,
            });
            submit(&dispatcher, request)
        }
        Commands::Send { secret, to, amount } => {
            let dispatcher = open_dispatcher(&cli.config)?;
            let keypair = KeyPair::from_secret_hex(&secret)?;
            // Sign against the sender's current chain token.
            let token = dispatcher.ledger().balance(&keypair.address())?.chain_token;
            let tx = Transaction::signed(&keypair, address_from_hex(&to)?, amount, &token)?;
            submit(&dispatcher, Request::Send(SendRequest { tx }))
        }
    }
}

fn keygen() -> Result<(), Box<dyn std::error::Error>> {
    let keypair = KeyPair::generate();
    println!("{}", "🔑 New key pair".bright_cyan().bold());
    println!("secret:  {}", keypair.secret_key_hex().yellow());
    println!("address: {}", key_for(&keypair.address()).green());
    Ok(())
}

fn open_dispatcher(config_path: &str) -> Result<LocalDispatcher, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteStore::open(&config.database.path)?;
    Ok(Dispatcher::new(Ledger::with_policy(store, config.ledger)))
}

fn submit(
    dispatcher: &LocalDispatcher,
    request: Request,
) -> Result<(), Box<dyn std::error::Error>> {
    let function = request.function();
    let response: Response = dispatcher.invoke(function, &request.encode_args()?);
    match response.into_balance() {
        Ok(balance) => print_balance(function, &balance),
        Err(message) => {
            eprintln!("{} {}", "❌".red(), message.red());
            Err(message.into())
        }
    }
}

fn print_balance(function: &str, balance: &Balance) -> Result<(), Box<dyn std::error::Error>> {
    let view = serde_json::json!({
        "amount": balance.amount,
        "chain_token": hex::encode(&balance.chain_token),
    });
    println!("{} {}", "✅".green(), function.bright_cyan().bold());
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
