//! Storefront page abstraction
//!
//! One named operation per user-visible action, decoupling the purchase
//! scenario from selector details. Every operation is blocking-sequential
//! over the driver and either completes or fails with the driver's own
//! timeout error.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::browser::{BrowserHandle, Locator};
use crate::error::{E2eError, E2eResult};

/// The five text fields read back from the displayed package panel.
///
/// Produced once per run and discarded with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDetails {
    pub title: String,
    pub coverage: String,
    pub data: String,
    pub validity: String,
    pub price: String,
}

/// Purchase-flow actions against the storefront.
pub struct StorePage<'a> {
    browser: &'a mut BrowserHandle,
    store_url: String,
}

impl<'a> StorePage<'a> {
    pub fn new(browser: &'a mut BrowserHandle, store_url: impl Into<String>) -> Self {
        Self {
            browser,
            store_url: store_url.into(),
        }
    }

    /// Navigate to the storefront root.
    pub async fn open(&mut self) -> E2eResult<()> {
        info!("Opening storefront");
        self.browser.goto(&self.store_url).await
    }

    /// Dismiss the cookie-consent banner.
    pub async fn accept_cookies(&mut self) -> E2eResult<()> {
        self.browser
            .click(Locator::test_id("cookie-consent-accept"))
            .await
    }

    /// Decline the push-notification permission prompt.
    ///
    /// Headless sessions often never show the prompt; its absence is not a
    /// failure of the flow under test.
    pub async fn dismiss_push_prompt(&mut self) -> E2eResult<()> {
        match self
            .browser
            .click(Locator::test_id("push-prompt-dismiss"))
            .await
        {
            Ok(()) => Ok(()),
            Err(E2eError::ElementTimeout(_)) => {
                debug!("Push prompt not shown; continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Switch the displayed currency from EUR to USD: open the currency
    /// menu, pick USD, confirm.
    pub async fn change_currency_to_usd(&mut self) -> E2eResult<()> {
        info!("Changing display currency to USD");
        self.browser
            .click(Locator::test_id("currency-selector"))
            .await?;
        self.browser
            .select_option(Locator::test_id("currency-select"), "USD")
            .await?;
        self.browser
            .click(Locator::role("button", "Update"))
            .await
    }

    /// Type a destination into the search box, then select the entry of the
    /// filtered list whose label contains the query.
    pub async fn search_country(&mut self, country: &str) -> E2eResult<()> {
        info!("Searching destination: {country}");
        self.browser
            .fill(Locator::test_id("search-input"), country)
            .await?;
        self.browser
            .click(Locator::xpath(format!(
                "//li[@data-testid='destination-item'][contains(., '{country}')]"
            )))
            .await
    }

    /// Select a package offer by its exact visible text.
    pub async fn select_package(&mut self, package: &str) -> E2eResult<()> {
        info!("Selecting package: {package}");
        self.browser.click(Locator::text(package, true)).await
    }

    /// Read the five fields of the displayed package panel, cleaned up for
    /// comparison.
    pub async fn package_details(&mut self) -> E2eResult<PackageDetails> {
        self.browser
            .wait_for(Locator::test_id("package-detail"))
            .await?;

        let title = self.read_field("package-title").await?;
        let coverage = self.read_field("package-coverage").await?;
        let data = self.read_field("package-data").await?;
        let validity = self.read_field("package-validity").await?;
        let price = self.read_field("package-price").await?;

        Ok(PackageDetails {
            title,
            coverage,
            data: normalize_amount(&data),
            validity: normalize_amount(&validity),
            price,
        })
    }

    async fn read_field(&mut self, test_id: &str) -> E2eResult<String> {
        let raw = self.browser.inner_text(Locator::test_id(test_id)).await?;
        Ok(normalize_ws(&raw))
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_ws(text: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    ws.replace_all(text.trim(), " ").into_owned()
}

/// Reformat a numeric-unit field to `"<number> <unit>"`.
///
/// Panels render these with irregular spacing ("1  GB", "7\nDays"); anything
/// that does not look like a number-unit pair is left whitespace-normalized.
pub fn normalize_amount(text: &str) -> String {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    let amount = AMOUNT
        .get_or_init(|| Regex::new(r"^([\d.,]+)\s*([A-Za-z]+)$").expect("static pattern"));

    let collapsed = normalize_ws(text);
    match amount.captures(&collapsed) {
        Some(caps) => format!("{} {}", &caps[1], &caps[2]),
        None => collapsed,
    }
}
