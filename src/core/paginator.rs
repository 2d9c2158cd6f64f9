use crate::domain::model::{Page, PageRequest};
use crate::domain::ports::Fetcher;
use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, NaiveDate};

/// 分頁游標：描述下一個請求，並根據回應決定是否還有下一頁
pub trait Cursor: Sized + Send {
    fn request(&self) -> PageRequest;

    /// `None` 表示集合已走完
    fn advance(self, page: &Page) -> Result<Option<Self>>;
}

/// 走訪整個遠端集合的惰性頁面序列；走完後不可重新開始
pub struct Paginator<'a, F: Fetcher + ?Sized, C: Cursor> {
    fetcher: &'a F,
    cursor: Option<C>,
    pages_fetched: usize,
}

impl<'a, F: Fetcher + ?Sized, C: Cursor> Paginator<'a, F, C> {
    pub fn new(fetcher: &'a F, start: C) -> Self {
        Self {
            fetcher,
            cursor: Some(start),
            pages_fetched: 0,
        }
    }

    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        let Some(cursor) = self.cursor.take() else {
            return Ok(None);
        };

        let request = cursor.request();
        tracing::debug!("📡 GET {} {:?}", request.url, request.query);
        let response = self.fetcher.fetch(&request).await?;

        if !response.is_success() {
            tracing::error!("❌ Status: {} Problem with the request to {}", response.status, request.url);
            return Err(EtlError::TransportError {
                status: response.status,
                url: request.url,
            });
        }

        let page = Page {
            request,
            body: response.body,
        };
        self.cursor = cursor.advance(&page)?;
        self.pages_fetched += 1;
        Ok(Some(page))
    }

    /// 不再取下一頁（例如已達到伺服器回報的總數）
    pub fn stop(&mut self) {
        self.cursor = None;
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Appfigures 以年度為單位分頁：每年一個請求，直到今年為止
#[derive(Debug, Clone)]
pub struct YearCursor {
    url: String,
    year: i32,
    today: NaiveDate,
}

impl YearCursor {
    pub fn new(url: impl Into<String>, starting_year: i32, today: NaiveDate) -> Self {
        Self {
            url: url.into(),
            year: starting_year,
            today,
        }
    }

    fn end_date(&self) -> String {
        if self.year >= self.today.year() {
            self.today.format("%Y-%m-%d").to_string()
        } else {
            format!("{}-12-31", self.year)
        }
    }
}

impl Cursor for YearCursor {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.url.clone())
            .with_param("group_by", "date,product")
            .with_param("granularity", "weekly")
            .with_param("start_date", format!("{}-01-01", self.year))
            .with_param("end_date", self.end_date())
            .with_param("format", "json")
            .with_period(self.year)
    }

    fn advance(self, _page: &Page) -> Result<Option<Self>> {
        if self.year >= self.today.year() {
            return Ok(None);
        }
        Ok(Some(Self {
            year: self.year + 1,
            ..self
        }))
    }
}

pub const TICKET_ITEMS_KEY: &str = "ticket_metrics";
pub const NEXT_PAGE_KEY: &str = "next_page";
pub const TOTAL_COUNT_KEY: &str = "count";

/// Zendesk 以 next_page URL 分頁；總數以第一頁回報的 count 為準，沒有 count 時只看 next_page
#[derive(Debug, Clone)]
pub struct NextPageCursor {
    url: String,
    total: Option<u64>,
    seen: u64,
    started: bool,
}

impl NextPageCursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            total: None,
            seen: 0,
            started: false,
        }
    }
}

impl Cursor for NextPageCursor {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.url.clone())
    }

    fn advance(self, page: &Page) -> Result<Option<Self>> {
        let total = if self.started {
            self.total
        } else {
            total_count(&page.body)
        };
        let items = ticket_items(&page.body)?.len() as u64;
        let Some(next) = next_page_url(&page.body) else {
            return Ok(None);
        };

        let seen = self.seen + items;
        // 空白頁仍要跟著 next_page 走一次
        if items > 0 && total.is_some_and(|total| seen >= total) {
            return Ok(None);
        }

        Ok(Some(Self {
            url: next.to_string(),
            total,
            seen,
            started: true,
        }))
    }
}

pub fn ticket_items(body: &serde_json::Value) -> Result<&Vec<serde_json::Value>> {
    body.get(TICKET_ITEMS_KEY)
        .and_then(|v| v.as_array())
        .ok_or_else(|| EtlError::DecodeError {
            message: format!("response has no '{}' array", TICKET_ITEMS_KEY),
        })
}

pub fn total_count(body: &serde_json::Value) -> Option<u64> {
    body.get(TOTAL_COUNT_KEY).and_then(|v| v.as_u64())
}

pub fn next_page_url(body: &serde_json::Value) -> Option<&str> {
    body.get(NEXT_PAGE_KEY)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
