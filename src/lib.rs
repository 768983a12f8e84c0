pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod http_client;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod normalizer;
pub mod positions;
pub mod reference;
pub mod services;
pub mod sheet;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{AppError, AppResult};
