// Entry point for the ledger CLI. The ledger only lives in memory, so every command
// builds its chain from scratch, drives it, prints what was asked for and exits.
use batch_ledger::{
    sha256_hex, Chain, Command, Opt, OutputFormat, RandomNonce, Settings, TransactionPolicy,
};
use clap::Parser;
use log::{error, info, LevelFilter};
use std::process;

// Values submitted by the reference session, in order
const DEMO_ROUND: [f64; 11] = [
    50.0, 51.0, 52.0, 53.0, 53.0, 53.0, 53.0, 53.0, 53.0, 53.0, 53.0,
];
const DEMO_TAIL: usize = 7;

fn main() {
    let opt = Opt::parse();

    let settings = Settings::load(opt.config.as_deref());
    let level = settings
        .as_ref()
        .ok()
        .and_then(|s| s.level_filter().ok())
        .unwrap_or(LevelFilter::Info);
    env_logger::builder().filter_level(level).init();

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(opt.command, &settings) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Simulate {
            name,
            sender,
            receiver,
            count,
            value,
            seed,
            strict,
            output,
        } => {
            let name = name.unwrap_or_else(|| settings.chain_name.clone());
            let policy = if strict {
                TransactionPolicy::Strict
            } else {
                settings.policy
            };
            let nonce_source = match seed.or(settings.nonce_seed) {
                Some(seed) => RandomNonce::seeded(seed),
                None => RandomNonce::new(),
            };

            let mut chain = Chain::builder(&name)
                .policy(policy)
                .nonce_source(nonce_source)
                .build();
            for step in 0..count {
                chain.add_transaction(&sender, &receiver, value + step as f64)?;
            }
            info!(
                "Submitted {count} transactions across {} blocks",
                chain.block_count()
            );

            match output {
                OutputFormat::Chain => chain.display_chain(),
                OutputFormat::Headers => chain.display_block_headers(),
                OutputFormat::Values => {
                    for (sequence, values) in chain.values().iter().enumerate() {
                        println!("{sequence}: {values:?}");
                    }
                }
                OutputFormat::Json => println!("{}", chain.headers_json()?),
            }

            chain.verify_integrity()?;
            println!("Integrity check passed for {} ({})", chain.name(), chain.id());
        }
        Command::Demo => {
            let mut chain = Chain::builder("donald").policy(settings.policy).build();
            let values = DEMO_ROUND
                .iter()
                .chain(DEMO_ROUND.iter())
                .chain(DEMO_ROUND.iter().take(DEMO_TAIL));
            for value in values {
                chain.add_transaction("Bob", "Alice", *value)?;
            }
            chain.display_chain();
        }
        Command::Hash { input } => {
            println!("{}", sha256_hex(&input));
        }
    }
    Ok(())
}
