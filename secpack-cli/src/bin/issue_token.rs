//! Issues a signed vendor license token.
//!
//! Usage:
//!   issue-token --priv vendor_private.pem --expiry 2026-12-31 \
//!       --company "Acme Corp" --email ops@acme.example --out token.txt

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use secpack_core::issue_token;

#[derive(Parser, Debug)]
#[command(name = "issue-token")]
#[command(about = "Sign a license token with the vendor private key")]
struct Args {
    /// Vendor RSA private key (PEM)
    #[arg(long = "priv")]
    private_key: PathBuf,

    /// Expiry date, YYYY-MM-DD
    #[arg(long)]
    expiry: String,

    /// Licensed company name
    #[arg(long)]
    company: String,

    /// Licensee contact email
    #[arg(long)]
    email: String,

    /// Output token path
    #[arg(long, default_value = "token.txt")]
    out: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    secpack_cli::init_tracing(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => secpack_cli::fail(&e),
    }
}

fn run(args: &Args) -> Result<()> {
    let path = issue_token(
        &args.private_key,
        &args.expiry,
        &args.company,
        &args.email,
        &args.out,
    )
    .context("issuing token failed")?;
    println!("Token written to {}", path.display());
    Ok(())
}
