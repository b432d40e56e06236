use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Which view of the chain to print after a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Chain,
    Headers,
    Values,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chain" => Ok(OutputFormat::Chain),
            "headers" => Ok(OutputFormat::Headers),
            "values" => Ok(OutputFormat::Values),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid output: {s}. Valid options: chain, headers, values, json"
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Chain => write!(f, "chain"),
            OutputFormat::Headers => write!(f, "headers"),
            OutputFormat::Values => write!(f, "values"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "batch-ledger")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "simulate",
        about = "Build an in-memory chain, submit transactions and print it"
    )]
    Simulate {
        #[arg(long, help = "Chain name (defaults to the configured name)")]
        name: Option<String>,
        #[arg(long, default_value = "Bob", help = "Sender of every transaction")]
        sender: String,
        #[arg(long, default_value = "Alice", help = "Receiver of every transaction")]
        receiver: String,
        #[arg(long, default_value_t = 25, help = "Number of transactions to submit")]
        count: usize,
        #[arg(
            long,
            default_value_t = 50.0,
            allow_negative_numbers = true,
            help = "Value of the first transaction"
        )]
        value: f64,
        #[arg(long, help = "Seed for the block nonce generator")]
        seed: Option<u64>,
        #[arg(long, help = "Reject empty identifiers and non-positive values")]
        strict: bool,
        #[arg(
            long,
            default_value = "chain",
            help = "What to print (chain, headers, values, json)"
        )]
        output: OutputFormat,
    },
    #[command(name = "demo", about = "Replay the reference session and display the chain")]
    Demo,
    #[command(name = "hash", about = "Print the SHA-256 hex digest of INPUT")]
    Hash {
        #[arg(help = "Text to hash")]
        input: String,
    },
}
