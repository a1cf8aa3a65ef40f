//! Spyglass command-line entry point.

use anyhow::Context as _;
use clap::Parser;
use spyglass::cli::{Cli, Commands, Context};
use spyglass::output;
use spyglass::sweep::cancel_pair;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let ctx = Context::load(&cli).context("failed to load settings")?;

    let result = match &cli.command {
        Commands::Sweep(cmd) => {
            let (handle, signal) = cancel_pair();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping sweep");
                    handle.cancel();
                }
            });
            cmd.execute(&ctx, signal).await
        }
        Commands::Catalog(cmd) => cmd.execute(&ctx),
        Commands::Config(cmd) => cmd.execute(&ctx),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON and CSV output.
fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,spyglass={}", log_level)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
