use clap::Parser;
use tracing_subscriber::EnvFilter;

mod classify;
mod cli;
mod core;
mod download;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("taxa_consensus=debug,info")
    } else {
        EnvFilter::new("taxa_consensus=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Classify(args) => {
            cli::classify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::BuildTaxonomy(args) => {
            cli::build_taxonomy::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Download(args) => {
            cli::download::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
