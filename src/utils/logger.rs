use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 進度與錯誤寫到 stderr；stdout 保留給 OAuth 授權提示
pub fn init_cli_logger(verbose: bool) {
    let default_directives = if verbose {
        "report_etl=debug,warn"
    } else {
        "report_etl=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose)
                .without_time()
                .compact(),
        )
        .init();
}
