//! eSIM Store Regression Suite
//!
//! This crate automates two independent flows against the eSIM store:
//! a browser-based purchase journey and the partner REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Regression Suite (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Web flow (tests/web_purchase.rs)                           │
//! │    StorePage ── named purchase actions                      │
//! │      └── BrowserHandle ── Playwright sidecar, JSON lines    │
//! │    SoftAssertions ── check() per field, finalize() once     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  API flow (tests/orders_api.rs, tests/sims_api.rs)          │
//! │    ApiClient::authenticate() ── client-credentials grant    │
//! │      └── ApiSession ── bearer-injected orders / listings    │
//! │    hard assertions, fail-fast per case                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The web flow recovers per-field mismatches locally and surfaces them in
//! aggregate; the API flow aborts a case on its first mismatch. Element and
//! network failures are never recovered in either flow.

pub mod api;
pub mod browser;
pub mod error;
pub mod page;
pub mod softassert;

pub use api::{ApiClient, ApiSession, HttpReply};
pub use browser::{Browser, BrowserConfig, BrowserHandle, Locator};
pub use error::{E2eError, E2eResult};
pub use page::{PackageDetails, StorePage};
pub use softassert::SoftAssertions;
