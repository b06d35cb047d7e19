pub mod access;
pub mod args;
mod backup;
pub mod calc;
pub mod commands;
mod config;
mod db;
mod error;
pub mod migrate;
pub mod model;
pub mod ocr;
pub mod report;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use db::SqliteStore;
pub use error::Error;
pub use error::Result;
