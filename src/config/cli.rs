use crate::config::{ReportConfig, DEFAULT_CONFIG_PATH};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "report-etl")]
#[command(about = "Load Appfigures sales and Zendesk ticket metrics into SQLite report tables")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override [reports].appfigures from config
    #[arg(long)]
    pub appfigures: Option<bool>,

    /// Override [reports].zendesk from config
    #[arg(long)]
    pub zendesk: Option<bool>,

    /// Log process CPU and memory after each report
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(enabled) = self.appfigures {
            config.reports.appfigures = enabled;
            tracing::debug!("🔧 Appfigures report overridden to: {}", enabled);
        }
        if let Some(enabled) = self.zendesk {
            config.reports.zendesk = enabled;
            tracing::debug!("🔧 Zendesk report overridden to: {}", enabled);
        }
    }
}
