pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use crate::adapters::{BasicAuthFetcher, OAuth1Fetcher, SqliteStore};
pub use crate::app::ReportRunner;
pub use crate::config::ReportConfig;
pub use crate::core::driver::ReportDriver;
pub use crate::utils::error::{EtlError, Result};
