use bulk_loadgen::cli::{Cli, Commands};
use bulk_loadgen::commands;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => commands::run::run(args).await,
        Commands::Mapping { config, apply } => commands::mapping::run_mapping(config, apply).await,
        Commands::Sample {
            config,
            count,
            index_no,
        } => commands::sample::run_sample(config, count, index_no).await,
    }
}
