pub mod chart;
pub mod config_cmd;
pub mod fetch;
pub mod insights;
pub mod routes;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "farescope")]
#[command(version, about = "Airline fare analytics: route data, summaries, charts and insights")]
pub struct Cli {
    /// Path to farescope.toml
    #[arg(
        long,
        global = true,
        env = "FARESCOPE_CONFIG",
        default_value = "farescope.toml"
    )]
    pub config: PathBuf,

    /// HTTP listen address (overrides config file)
    #[arg(long, global = true, env = "FARESCOPE_HTTP_ADDR")]
    pub http_addr: Option<SocketAddr>,

    /// Flight-data provider key (overrides config file)
    #[arg(long, global = true, env = "AVIATION_STACK_API_KEY", hide_env_values = true)]
    pub aviation_stack_api_key: Option<String>,

    /// Language-model key (overrides config file)
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Outbound call timeout in seconds (overrides config file)
    #[arg(long, global = true, env = "FARESCOPE_API_TIMEOUT")]
    pub api_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Fetch a route table and print the full analysis as JSON
    Fetch(FetchArgs),
    /// Build one chart payload for a route
    Chart(ChartArgs),
    /// Print narrative insights for a route
    Insights(InsightsArgs),
    /// List known airports and routes
    Routes,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Validate,
    Show,
}

/// Route selection shared by the data commands. Defaults match the HTTP API.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Origin airport code (default SYD)
    #[arg(long)]
    pub origin: Option<String>,

    /// Destination airport code (default MEL)
    #[arg(long)]
    pub destination: Option<String>,

    /// First departure date, YYYY-MM-DD (default today + 7)
    #[arg(long)]
    pub date_from: Option<String>,

    /// Last departure date, YYYY-MM-DD (default today + 30)
    #[arg(long)]
    pub date_to: Option<String>,
}

impl RouteArgs {
    pub fn query(&self) -> farescope_core::Result<farescope_core::RouteQuery> {
        crate::pipeline::route_query(
            self.origin.as_deref(),
            self.destination.as_deref(),
            self.date_from.as_deref(),
            self.date_to.as_deref(),
            chrono::Local::now().date_naive(),
        )
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub route: RouteArgs,

    /// Target table size for generated data
    #[arg(long)]
    pub rows: Option<usize>,

    /// Print only the summary instead of the whole analysis
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Args, Debug)]
pub struct ChartArgs {
    /// price_trend, airline_distribution, route_popularity or demand_heatmap
    pub chart_type: String,

    /// Heatmap view for demand_heatmap: flight_count, price_heatmap,
    /// demand_score, route_airline, route_day_price or weekend_analysis
    #[arg(long)]
    pub view: Option<String>,

    #[command(flatten)]
    pub route: RouteArgs,
}

#[derive(Args, Debug)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub route: RouteArgs,

    /// Skip the language model and use templated insights
    #[arg(long)]
    pub template: bool,
}
