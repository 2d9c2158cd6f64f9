use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 單次 HTTP 請求的描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    /// 依日期區間分頁時，此請求涵蓋的年度
    pub period: Option<i32>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            period: None,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_period(mut self, year: i32) -> Self {
        self.period = Some(year);
        self
    }
}

/// Authenticated client 回傳的原始結果
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub request: PageRequest,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub const ZERO: SqlValue = SqlValue::Integer(0);

    /// null 或缺欄位一律轉成 0，不寫入真正的 NULL
    pub fn from_json_or_zero(value: Option<&serde_json::Value>) -> SqlValue {
        match value {
            None | Some(serde_json::Value::Null) => SqlValue::ZERO,
            Some(serde_json::Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
            Some(serde_json::Value::Number(n)) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Integer(n.as_f64().map(|f| f.round() as i64).unwrap_or(0)),
            },
            Some(serde_json::Value::String(s)) => SqlValue::Text(s.clone()),
            Some(other) => SqlValue::Text(other.to_string()),
        }
    }

    /// 數值欄位：數字或可解析的數字字串
    pub fn integer_or_zero(value: Option<&serde_json::Value>) -> SqlValue {
        match value {
            Some(serde_json::Value::String(s)) => {
                SqlValue::Integer(s.trim().parse::<i64>().unwrap_or(0))
            }
            other => match SqlValue::from_json_or_zero(other) {
                SqlValue::Text(_) => SqlValue::ZERO,
                integer => integer,
            },
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 依目標表欄位順序排列的一列資料，不含代理主鍵
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<SqlValue>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 帶有執行序號的列；序號寫入代理主鍵欄位
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedRow {
    pub seq: i64,
    pub row: Row,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    pub name: String,
    pub platform: String,
}

/// product id → (name, platform)，每次產生 Appfigures 報表時建立一次
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<i64, ProductInfo>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i64, name: impl Into<String>, platform: impl Into<String>) {
        self.products.insert(
            id,
            ProductInfo {
                name: name.into(),
                platform: platform.into(),
            },
        );
    }

    pub fn get(&self, id: i64) -> Option<&ProductInfo> {
        self.products.get(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Appfigures,
    Zendesk,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Appfigures => write!(f, "Appfigures"),
            ReportKind::Zendesk => write!(f, "Zendesk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub kind: ReportKind,
    pub table: String,
    pub pages: usize,
    pub rows: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<ReportSummary>,
    pub skipped: Vec<ReportKind>,
}
