pub mod driver;
pub mod mapper;
pub mod paginator;

pub use crate::domain::model::{Page, PageRequest, ProductCatalog, Row, SqlValue};
pub use crate::domain::ports::{Fetcher, ReportSink};
pub use crate::utils::error::Result;
