//! newsgate - News aggregation gateway
//!
//! Polls a configured set of feeds, stores every fetched item and serves
//! them through paginated and searchable JSON APIs, together with threaded
//! comments gated by a content filter.

#[cfg(all(feature = "sqlite", feature = "postgres"))]
compile_error!("features `sqlite` and `postgres` are mutually exclusive");

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("one of the features `sqlite` or `postgres` must be enabled");

pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod news;
pub mod shutdown;
pub mod web;

pub use config::Config;
pub use db::{Database, DbPool};
pub use error::{NewsError, Result};
pub use news::{configure, IngestPipeline, Item, Pagination, QueryEngine, Source};
