mod cli;
mod config;
mod http;
mod pipeline;
mod serve;
mod upstream;

use clap::Parser;
use cli::{Cli, Commands};
use config::FarescopeConfig;
use pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve => serve::run(FarescopeConfig::resolve(&cli)?).await,
        Commands::Fetch(args) => cli::fetch::run(args, &pipeline(&cli)?).await,
        Commands::Chart(args) => cli::chart::run(args, &pipeline(&cli)?).await,
        Commands::Insights(args) => cli::insights::run(args, &pipeline(&cli)?).await,
        Commands::Routes => cli::routes::run().await,
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli).await,
    }
}

fn pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    Pipeline::from_config(&FarescopeConfig::resolve(cli)?)
}
