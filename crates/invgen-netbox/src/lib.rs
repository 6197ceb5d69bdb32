//! Invgen NetBox - Device sources for the inventory projection
//!
//! This crate provides the inventory sources:
//! - A NetBox REST client that pages through devices and platforms
//! - A file loader for device record dumps (JSON or YAML)

pub mod client;
pub mod file;
pub mod model;

use thiserror::Error;

pub use client::{NetboxClient, NetboxConfig};
pub use file::load_records;
pub use model::{NetboxDevice, Page, PlatformCommands};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Invalid NetBox URL {0}")]
    InvalidUrl(String),
    #[error("NetBox API token is not set")]
    MissingToken,
    #[error("NetBox API token contains characters not allowed in a header")]
    InvalidToken,
    #[error("Failed to read device file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
