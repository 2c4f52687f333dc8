pub mod app_config;
pub mod catalog;
pub mod comparison;
pub mod config;

pub use app_config::{AppConfig, DelayRange, WindowSize};
pub use catalog::{load_catalog, Catalog, Product};
pub use comparison::{CheaperSite, ComparisonResult, Site, Verdict};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown site: {0} (expected \"amazon\" or \"flipkart\")")]
    UnknownSite(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[source] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
