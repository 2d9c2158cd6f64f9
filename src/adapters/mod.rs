// Adapters layer: concrete implementations of the domain ports (http clients, sqlite store).

pub mod http;
pub mod oauth;
pub mod sqlite;

pub use http::{BasicAuthFetcher, OAuth1Fetcher};
pub use sqlite::SqliteStore;
