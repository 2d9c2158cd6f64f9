use crate::adapters::oauth;
use crate::adapters::{BasicAuthFetcher, OAuth1Fetcher};
use crate::config::ReportConfig;
use crate::core::driver::{ReportDriver, SalesReportJob, TicketReportJob};
use crate::domain::model::{ReportKind, ReportSummary, RunSummary};
use crate::domain::ports::ReportSink;
use crate::utils::error::Result;
use chrono::NaiveDate;
use reqwest::Client;

/// 依設定依序產生各報表；建表失敗只跳過該報表，其他錯誤中止整個執行
pub struct ReportRunner<S: ReportSink> {
    driver: ReportDriver<S>,
    client: Client,
    today: NaiveDate,
}

impl<S: ReportSink> ReportRunner<S> {
    pub fn new(sink: S) -> Self {
        Self::new_with_monitoring(sink, false)
    }

    pub fn new_with_monitoring(sink: S, monitor_enabled: bool) -> Self {
        Self {
            driver: ReportDriver::new_with_monitoring(sink, monitor_enabled),
            client: Client::new(),
            today: chrono::Local::now().date_naive(),
        }
    }

    /// 固定「今天」的日期，決定 Appfigures 最後一個年度區間
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.driver.sink_mut()
    }

    pub fn into_sink(self) -> S {
        self.driver.into_sink()
    }

    pub async fn run(&mut self, config: &ReportConfig) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        if !config.any_report_enabled() {
            tracing::debug!("No reports enabled");
            return Ok(summary);
        }

        if config.reports.appfigures {
            let credentials = oauth::obtain_credentials(&self.client, &config.appfigures).await?;
            let fetcher = OAuth1Fetcher::new(self.client.clone(), credentials);
            let job = SalesReportJob {
                table: config.database.appfigures_table.clone(),
                base_url: config.appfigures.base_url.clone(),
                starting_year: config.appfigures.starting_year,
                today: self.today,
            };
            let outcome = self.driver.generate_sales_report(&fetcher, &job).await;
            record(ReportKind::Appfigures, outcome, &mut summary)?;
        }

        if config.reports.zendesk {
            let fetcher = BasicAuthFetcher::new(
                self.client.clone(),
                &config.zendesk.email,
                config.zendesk.api_token.clone(),
            );
            let job = TicketReportJob {
                table: config.database.zendesk_table.clone(),
                url: config.zendesk.url.clone(),
            };
            let outcome = self.driver.generate_ticket_report(&fetcher, &job).await;
            record(ReportKind::Zendesk, outcome, &mut summary)?;
        }

        Ok(summary)
    }
}

fn record(kind: ReportKind, outcome: Result<ReportSummary>, summary: &mut RunSummary) -> Result<()> {
    match outcome {
        Ok(report) => {
            tracing::debug!("✅ {} report: {} rows from {} pages", kind, report.rows, report.pages);
            summary.completed.push(report);
            Ok(())
        }
        Err(e) if e.skips_report() => {
            tracing::error!("❌ {} ({})", e.user_friendly_message(), e);
            summary.skipped.push(kind);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
