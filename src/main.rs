use clap::Parser;
use report_etl::utils::{logger, validation::Validate};
use report_etl::{CliArgs, EtlError, ReportConfig, ReportRunner, SqliteStore};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);
    tracing::debug!("CLI args: {:?}", args);

    if let Err(e) = run(&args).await {
        exit_with(e);
    }
}

async fn run(args: &CliArgs) -> Result<(), EtlError> {
    let mut config = ReportConfig::from_file(&args.config)?;
    args.apply_overrides(&mut config);

    // 驗證配置：在碰到網路或資料庫之前
    config.validate()?;

    let store = SqliteStore::connect(&config.database.path).await?;
    tracing::debug!("🗄️ Connected to {}", config.database.path.display());

    let mut runner = ReportRunner::new_with_monitoring(store, args.monitor);
    let summary = runner.run(&config).await?;
    for report in &summary.completed {
        tracing::debug!("📁 {}: {} rows in {}", report.kind, report.rows, report.table);
    }

    runner.into_sink().close().await?;
    Ok(())
}

fn exit_with(e: EtlError) -> ! {
    // 記錄詳細錯誤信息
    tracing::debug!(
        "ETL run stopped: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
