use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "nyc311-etl")]
#[command(about = "Fetch recent NYC 311 service requests into a CSV file")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Lookback window in hours (default 24)
    #[arg(long)]
    pub hours: Option<i64>,

    /// Write the cleaned table to this CSV path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the Socrata resource endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the single-request row limit
    #[arg(long)]
    pub limit: Option<usize>,

    /// Override the origin timezone (IANA name)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Suffix of the local timestamp column (`created_date_<label>`).
    /// Derived from --timezone when omitted.
    #[arg(long)]
    pub origin_label: Option<String>,

    /// Socrata application token
    #[arg(long, env = "SOCRATA_APP_TOKEN")]
    pub app_token: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log process CPU and memory after each stage")]
    pub monitor: bool,

    /// Show the window and request URL without fetching
    #[arg(long)]
    pub dry_run: bool,
}
