//! eSIM Store Suite Common Library
//!
//! Shared wire types and configuration for the regression suite.

pub mod config;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, ExpectedPackage, SuiteConfig, WebConfig};
pub use types::{
    OrderRequest, OrderResponse, PageLinks, PageMeta, SimRecord, SimsPage, TokenResponse,
    ValidationErrors,
};

/// Suite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
