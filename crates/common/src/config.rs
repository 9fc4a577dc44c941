//! Suite configuration
//!
//! A read-only configuration struct passed explicitly into scenario setup.
//! Values come from defaults, an optional TOML file, and `ESIMSTORE_*`
//! environment overrides, in that order. Credentials are never defaulted.

use serde::{Deserialize, Serialize};

/// Top-level configuration for both suites
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Partner API settings (token exchange, orders, listings)
    #[serde(default)]
    pub api: ApiConfig,

    /// Storefront settings for the browser flow
    #[serde(default)]
    pub web: WebConfig,
}

/// Partner API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version prefix
    pub base_url: String,

    /// OAuth client id for the client-credentials grant
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.partners-api.esimstore.example/v2".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Whether credentials are present. Live API suites skip when this is
    /// false.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Storefront configuration for the web purchase flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Storefront root URL
    pub store_url: String,

    /// Country typed into the destination search box
    pub country: String,

    /// Visible text of the package offer to purchase
    pub package: String,

    /// Golden fixture the displayed package panel is compared against
    pub expected: ExpectedPackage,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            store_url: "https://shop.esimstore.example".to_string(),
            country: "Turkey".to_string(),
            package: "Merhaba 1 GB - 7 Days".to_string(),
            expected: ExpectedPackage::default(),
        }
    }
}

/// Expected package-detail fields, one per displayed panel row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedPackage {
    pub title: String,
    pub coverage: String,
    pub data: String,
    pub validity: String,
    pub price: String,
}

impl Default for ExpectedPackage {
    fn default() -> Self {
        Self {
            title: "Merhaba".to_string(),
            coverage: "Turkey".to_string(),
            data: "1 GB".to_string(),
            validity: "7 Days".to_string(),
            price: "$9.50".to_string(),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Defaults with `ESIMSTORE_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(std::env::vars());
        config
    }

    /// Apply overrides from `(key, value)` pairs. Split out of [`from_env`]
    /// so it stays testable without mutating process environment.
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "ESIMSTORE_API_URL" => self.api.base_url = value,
                "ESIMSTORE_CLIENT_ID" => self.api.client_id = value,
                "ESIMSTORE_CLIENT_SECRET" => self.api.client_secret = value,
                "ESIMSTORE_STORE_URL" => self.web.store_url = value,
                "ESIMSTORE_COUNTRY" => self.web.country = value,
                "ESIMSTORE_PACKAGE" => self.web.package = value,
                _ => {}
            }
        }
    }
}
