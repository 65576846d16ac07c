mod prover;

use anyhow::Context;
use serde::Serialize;
use shade_account::AccountId;
use shade_core::config::ShadeConfig;
use shade_privacy::{CommitmentScheme, NullifierKey, TransitionKind};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let cmd = &args[1];

    let result = match cmd.as_str() {
        "gensecret" => prover::random_secret().and_then(|s| print_json(&s)),
        "commit" => commit(&args[2..]),
        "nullifier" => nullifier(&args[2..]),
        "burn-input" => prover::ShiftArgs::parse(&args[2..])
            .and_then(|a| prover::burn(&a))
            .and_then(|p| print_json(&p)),
        "mint-input" => prover::ShiftArgs::parse(&args[2..])
            .and_then(|a| prover::mint(&a))
            .and_then(|p| print_json(&p)),
        "sample-config" => {
            print!("{}", ShadeConfig::generate_sample());
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            println!("❌ Unknown command: {}", cmd);
            println!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Shade CLI - Shielded Balance Prover Helper");
    println!();
    println!("USAGE:");
    println!("  shade <command> [args]");
    println!();
    println!("PROVER COMMANDS:");
    println!("  gensecret                                  Generate a random commitment secret");
    println!("  commit <secret> <balance>                  Poseidon commitment to a private balance");
    println!("  nullifier <account> <secret> <public> <prior> <burn|mint>");
    println!("                                             Nullifier for the next transition");
    println!("  burn-input <account> <secret> <private> <public> <amount>");
    println!("                                             Circuit inputs for a burn");
    println!("  mint-input <account> <secret> <private> <public> <amount>");
    println!("                                             Circuit inputs for a mint");
    println!();
    println!("NODE COMMANDS:");
    println!("  sample-config                              Print a sample config.toml");
    println!();
    println!("OTHER COMMANDS:");
    println!("  help                                       Show this help message");
    println!();
    println!("Field values accept decimal or 0x-prefixed hex. Output is JSON.");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("  RUST_LOG             Log level (debug/info/warn/error)");
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn commit(args: &[String]) -> anyhow::Result<()> {
    let [secret, balance] = args else {
        anyhow::bail!("Usage: commit <secret> <balance>");
    };
    let secret = prover::parse_field("secret", secret)?;
    let balance = prover::parse_amount("balance", balance)?;
    print_json(&CommitmentScheme::new().commit_balance(&secret, balance))
}

fn nullifier(args: &[String]) -> anyhow::Result<()> {
    let [account, secret, public, prior, kind] = args else {
        anyhow::bail!("Usage: nullifier <account> <secret> <public> <prior> <burn|mint>");
    };
    let account: AccountId = account
        .parse()
        .with_context(|| format!("invalid account id: {}", account))?;
    let kind = match kind.as_str() {
        "burn" => TransitionKind::Burn,
        "mint" => TransitionKind::Mint,
        other => anyhow::bail!("unknown transition kind: {}", other),
    };
    let key = NullifierKey::new(prover::parse_field("secret", secret)?);
    let public = prover::parse_amount("public", public)?;
    let prior = prover::parse_field("prior", prior)?;
    print_json(&key.derive(&account, public, &prior, kind))
}
