pub mod charts;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod http_client;
pub mod logging;
pub mod pipeline;
pub mod raw;
pub mod schema;
pub mod store;
pub mod summary;
pub mod tabular;
pub mod workbook;
