use crate::domain::model::{FetchResponse, PageRequest, SequencedRow};
use crate::domain::schema::TableSchema;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 已驗證身分的 HTTP client；非 2xx 狀態碼原樣回傳，由呼叫端決定如何處理
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchResponse>;
}

#[async_trait]
pub trait ReportSink: Send {
    /// 刪除同名舊表後重新建立
    async fn reset_table(&mut self, schema: &TableSchema) -> Result<()>;

    /// 目前表格的欄位名稱，依表格順序
    async fn columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// 一個批次一次 commit，逐列 insert
    async fn insert_batch(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[SequencedRow],
    ) -> Result<usize>;
}
