//! Error types for the regression suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Node.js not found. The browser driver needs node and `npm install playwright`")]
    NodeNotFound,

    #[error("Driver failed to start: {0}")]
    DriverStartup(String),

    #[error("Driver protocol error: {0}")]
    Driver(String),

    #[error("Timed out locating {0} within the driver's default timeout")]
    ElementTimeout(String),

    #[error("Token exchange failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("Assertion failed:\n{0}")]
    AssertionFailed(String),

    #[error("Unexpected status {got} (expected {expected}) for {context}")]
    UnexpectedStatus {
        expected: u16,
        got: u16,
        context: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
