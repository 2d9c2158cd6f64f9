use crate::core::mapper::{
    build_product_catalog, map_sales_page, map_ticket, ticket_fields, RowLayout, SALES_FIELDS,
};
use crate::core::paginator::{ticket_items, total_count, NextPageCursor, Paginator, YearCursor};
use crate::domain::model::{PageRequest, ReportKind, ReportSummary, SequencedRow};
use crate::domain::ports::{Fetcher, ReportSink};
use crate::domain::schema::TableSchema;
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct SalesReportJob {
    pub table: String,
    pub base_url: String,
    pub starting_year: i32,
    pub today: NaiveDate,
}

impl SalesReportJob {
    pub fn sales_url(&self) -> String {
        format!("{}/reports/sales/", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct TicketReportJob {
    pub table: String,
    pub url: String,
}

/// 報表產生流程：重建表格 → 分頁抓取 → 轉換成列 → 寫入
pub struct ReportDriver<S: ReportSink> {
    sink: S,
    monitor: SystemMonitor,
}

impl<S: ReportSink> ReportDriver<S> {
    pub fn new(sink: S) -> Self {
        Self::new_with_monitoring(sink, false)
    }

    pub fn new_with_monitoring(sink: S, monitor_enabled: bool) -> Self {
        Self {
            sink,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub async fn generate_sales_report<F: Fetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        job: &SalesReportJob,
    ) -> Result<ReportSummary> {
        tracing::info!("Generating Appfigures report...");
        let schema = TableSchema::appfigures(job.table.clone());
        self.sink.reset_table(&schema).await?;
        let columns = self.sink.columns(&job.table).await?;
        let layout = RowLayout::resolve(&job.table, &columns, SALES_FIELDS)?;

        // 產品名稱與平台需要另外一次 API 呼叫
        let listing = PageRequest::new(job.sales_url())
            .with_param("group_by", "product")
            .with_param("format", "json");
        let response = fetcher.fetch(&listing).await?;
        if !response.is_success() {
            return Err(EtlError::TransportError {
                status: response.status,
                url: listing.url,
            });
        }
        let catalog = build_product_catalog(&response.body)?;
        tracing::debug!("📦 Product catalog has {} products", catalog.len());

        let mut paginator = Paginator::new(
            fetcher,
            YearCursor::new(job.sales_url(), job.starting_year, job.today),
        );
        let mut current_row: i64 = 1;

        while let Some(page) = paginator.next_page().await? {
            let year = page.request.period.unwrap_or(job.starting_year);
            let batch: Vec<SequencedRow> = map_sales_page(&page.body, &catalog, year)?
                .iter()
                .map(|values| {
                    let row = SequencedRow {
                        seq: current_row,
                        row: layout.project(values),
                    };
                    current_row += 1;
                    row
                })
                .collect();

            let inserted = self
                .sink
                .insert_batch(&job.table, layout.columns(), &batch)
                .await?;
            tracing::debug!("📥 {}: {} rows committed", year, inserted);
        }

        let summary = ReportSummary {
            kind: ReportKind::Appfigures,
            table: job.table.clone(),
            pages: paginator.pages_fetched(),
            rows: current_row - 1,
        };
        tracing::info!("Finished generating Appfigures report");
        self.monitor.log_stats("Appfigures report");
        Ok(summary)
    }

    pub async fn generate_ticket_report<F: Fetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        job: &TicketReportJob,
    ) -> Result<ReportSummary> {
        tracing::info!("Generating Zendesk report...");
        let schema = TableSchema::zendesk(job.table.clone());
        self.sink.reset_table(&schema).await?;

        let columns = self.sink.columns(&job.table).await?;
        let fields = ticket_fields();
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        let layout = RowLayout::resolve(&job.table, &columns, &field_refs)?;

        let mut paginator = Paginator::new(fetcher, NextPageCursor::new(job.url.clone()));
        let mut total: Option<u64> = None;
        let mut processed: u64 = 0;

        while let Some(page) = paginator.next_page().await? {
            // 以第一頁回報的 count 為整次執行的上限；沒有 count 就一路跟著 next_page
            if paginator.pages_fetched() == 1 {
                total = total_count(&page.body);
            }

            let mut batch = Vec::new();
            for ticket in ticket_items(&page.body)? {
                if total == Some(processed) {
                    break;
                }
                processed += 1;
                batch.push(SequencedRow {
                    seq: processed as i64,
                    row: layout.project(&map_ticket(ticket)),
                });
            }

            if batch.is_empty() {
                continue;
            }
            self.sink
                .insert_batch(&job.table, layout.columns(), &batch)
                .await?;
            match total {
                Some(total) => tracing::debug!("📥 {}/{} tickets committed", processed, total),
                None => tracing::debug!("📥 {} tickets committed", processed),
            }

            if total == Some(processed) {
                paginator.stop();
            }
        }

        let summary = ReportSummary {
            kind: ReportKind::Zendesk,
            table: job.table.clone(),
            pages: paginator.pages_fetched(),
            rows: processed as i64,
        };
        tracing::info!("Finished generating Zendesk report");
        self.monitor.log_stats("Zendesk report");
        Ok(summary)
    }
}
