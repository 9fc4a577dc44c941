//! Playwright browser automation
//!
//! The browser driver is an external capability: a `node` sidecar running a
//! generated Playwright script. The sidecar reads one JSON command per line
//! on stdin and answers one JSON line per command on stdout, so a single
//! page survives across the whole purchase journey. Element waiting and
//! retry-until-visible semantics come from Playwright's own default timeout.

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Browser type
#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// How to find an element on the page.
///
/// The storefront markup is reachable through three strategies: test ids,
/// ARIA role plus accessible name, and XPath. `Text` covers list entries
/// that only expose their visible label.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    TestId { value: String },
    Role { role: String, name: String },
    #[serde(rename = "xpath")]
    XPath { value: String },
    Text { value: String, exact: bool },
}

impl Locator {
    pub fn test_id(value: impl Into<String>) -> Self {
        Self::TestId { value: value.into() }
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath { value: value.into() }
    }

    pub fn text(value: impl Into<String>, exact: bool) -> Self {
        Self::Text {
            value: value.into(),
            exact,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::TestId { value } => write!(f, "test-id:{value}"),
            Locator::Role { role, name } => write!(f, "role:{role}[name={name}]"),
            Locator::XPath { value } => write!(f, "xpath:{value}"),
            Locator::Text { value, .. } => write!(f, "text:{value}"),
        }
    }
}

/// One command sent to the sidecar
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum DriverOp {
    Goto { url: String },
    Click { locator: Locator },
    Fill { locator: Locator, value: String },
    Select { locator: Locator, value: String },
    Wait { locator: Locator },
    Text { locator: Locator },
    Close,
}

#[derive(Debug, Serialize)]
struct DriverCommand {
    id: u64,
    #[serde(flatten)]
    op: DriverOp,
}

/// One line back from the sidecar
#[derive(Debug, Deserialize)]
struct DriverReply {
    ok: bool,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Configuration for the browser driver
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Playwright's per-action default timeout
    pub default_timeout: Duration,
    /// How long to wait for the sidecar's ready line
    pub startup_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            default_timeout: Duration::from_secs(10),
            startup_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle to a running browser sidecar
pub struct BrowserHandle {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    reply_timeout: Duration,
    // Keeps the generated script alive for the sidecar's lifetime
    _script_dir: tempfile::TempDir,
}

impl BrowserHandle {
    /// Spawn the sidecar and wait until it reports ready.
    pub async fn launch(config: BrowserConfig) -> E2eResult<Self> {
        Self::check_node_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, driver_script(&config))?;

        info!(
            "Launching {} driver (headless: {})",
            config.browser.as_str(),
            config.headless
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| E2eError::DriverStartup(format!("failed to spawn node: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdout unavailable".to_string()))?;

        let mut handle = Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            next_id: 0,
            reply_timeout: config.default_timeout + Duration::from_secs(5),
            _script_dir: script_dir,
        };

        handle.wait_for_ready(config.startup_timeout).await?;
        Ok(handle)
    }

    /// Check that node is available before spawning anything.
    fn check_node_installed() -> E2eResult<()> {
        let status = std::process::Command::new("node")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::NodeNotFound),
        }
    }

    async fn wait_for_ready(&mut self, timeout: Duration) -> E2eResult<()> {
        let line = tokio::time::timeout(timeout, self.lines.next_line())
            .await
            .map_err(|_| E2eError::DriverStartup("timed out waiting for ready line".to_string()))?
            .map_err(E2eError::Io)?
            .ok_or_else(|| E2eError::DriverStartup("driver exited before ready".to_string()))?;

        let reply: DriverReply = serde_json::from_str(&line)
            .map_err(|e| E2eError::DriverStartup(format!("bad ready line {line:?}: {e}")))?;

        if reply.ok && reply.event.as_deref() == Some("ready") {
            debug!("Driver ready");
            Ok(())
        } else {
            Err(E2eError::DriverStartup(
                reply.error.unwrap_or_else(|| "driver reported failure".to_string()),
            ))
        }
    }

    /// Navigate to an absolute URL.
    pub async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.request(DriverOp::Goto { url: url.to_string() }).await.map(drop)
    }

    /// Click the first element matching the locator.
    pub async fn click(&mut self, locator: Locator) -> E2eResult<()> {
        self.request(DriverOp::Click { locator }).await.map(drop)
    }

    /// Replace the value of an input.
    pub async fn fill(&mut self, locator: Locator, value: &str) -> E2eResult<()> {
        self.request(DriverOp::Fill {
            locator,
            value: value.to_string(),
        })
        .await
        .map(drop)
    }

    /// Pick an option from a `<select>` by visible label or value.
    pub async fn select_option(&mut self, locator: Locator, value: &str) -> E2eResult<()> {
        self.request(DriverOp::Select {
            locator,
            value: value.to_string(),
        })
        .await
        .map(drop)
    }

    /// Wait until the first matching element is visible.
    pub async fn wait_for(&mut self, locator: Locator) -> E2eResult<()> {
        self.request(DriverOp::Wait { locator }).await.map(drop)
    }

    /// Read the rendered text of the first matching element.
    pub async fn inner_text(&mut self, locator: Locator) -> E2eResult<String> {
        let reply = self.request(DriverOp::Text { locator }).await?;
        Ok(reply.text.unwrap_or_default())
    }

    /// Ask the sidecar to close the browser and exit, then reap it.
    pub async fn close(mut self) -> E2eResult<()> {
        let id = self.send(DriverOp::Close).await?;
        // Best effort: the sidecar acknowledges and exits on its own
        let _ = tokio::time::timeout(Duration::from_secs(5), self.read_reply(id)).await;
        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(status) => {
                debug!("Driver exited: {:?}", status?);
            }
            Err(_) => {
                warn!("Driver did not exit after close; killing");
                let _ = self.child.start_kill();
            }
        }
        Ok(())
    }

    async fn request(&mut self, op: DriverOp) -> E2eResult<DriverReply> {
        let what = match &op {
            DriverOp::Click { locator }
            | DriverOp::Fill { locator, .. }
            | DriverOp::Select { locator, .. }
            | DriverOp::Wait { locator }
            | DriverOp::Text { locator } => locator.to_string(),
            DriverOp::Goto { url } => url.clone(),
            DriverOp::Close => "close".to_string(),
        };

        let id = self.send(op).await?;
        let reply = tokio::time::timeout(self.reply_timeout, self.read_reply(id))
            .await
            .map_err(|_| E2eError::Driver(format!("no reply from driver for {what}")))??;

        if reply.ok {
            return Ok(reply);
        }

        let message = reply.error.unwrap_or_else(|| "unknown driver error".to_string());
        if message.contains("Timeout") {
            Err(E2eError::ElementTimeout(what))
        } else {
            Err(E2eError::Driver(message))
        }
    }

    async fn send(&mut self, op: DriverOp) -> E2eResult<u64> {
        self.next_id += 1;
        let command = DriverCommand { id: self.next_id, op };
        let mut line = serde_json::to_string(&command)?;
        debug!("driver <- {line}");
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(self.next_id)
    }

    async fn read_reply(&mut self, id: u64) -> E2eResult<DriverReply> {
        loop {
            let line = self
                .lines
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Driver("driver exited unexpectedly".to_string()))?;
            debug!("driver -> {line}");

            let reply: DriverReply = serde_json::from_str(&line)
                .map_err(|e| E2eError::Driver(format!("bad driver line {line:?}: {e}")))?;

            // Unsolicited events (console noise, page errors) are skipped
            if reply.id == Some(id) {
                return Ok(reply);
            }
        }
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Generate the sidecar script for a configuration.
fn driver_script(config: &BrowserConfig) -> String {
    format!(
        r#"const {{ chromium, firefox, webkit }} = require('playwright');
const readline = require('readline');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout_ms});

  const locate = (l) => {{
    switch (l.kind) {{
      case 'test_id': return page.getByTestId(l.value);
      case 'role': return page.getByRole(l.role, {{ name: l.name }});
      case 'xpath': return page.locator('xpath=' + l.value);
      case 'text': return page.getByText(l.value, {{ exact: l.exact === true }});
      default: throw new Error('unknown locator kind: ' + l.kind);
    }}
  }};

  console.log(JSON.stringify({{ ok: true, event: 'ready' }}));

  const rl = readline.createInterface({{ input: process.stdin }});
  for await (const line of rl) {{
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {{
      const extra = {{}};
      switch (cmd.op) {{
        case 'goto': await page.goto(cmd.url); break;
        case 'click': await locate(cmd.locator).first().click(); break;
        case 'fill': await locate(cmd.locator).first().fill(cmd.value); break;
        case 'select': await locate(cmd.locator).first().selectOption(cmd.value); break;
        case 'wait': await locate(cmd.locator).first().waitFor({{ state: 'visible' }}); break;
        case 'text': extra.text = await locate(cmd.locator).first().innerText(); break;
        case 'close':
          console.log(JSON.stringify({{ ok: true, id: cmd.id }}));
          await browser.close();
          process.exit(0);
        default: throw new Error('unknown op: ' + cmd.op);
      }}
      console.log(JSON.stringify({{ ok: true, id: cmd.id, ...extra }}));
    }} catch (error) {{
      console.log(JSON.stringify({{ ok: false, id: cmd.id, error: error.message }}));
    }}
  }}
  await browser.close();
}})();
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        timeout_ms = config.default_timeout.as_millis(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_bakes_in_browser_and_viewport() {
        let script = driver_script(&BrowserConfig {
            browser: Browser::Firefox,
            viewport_width: 1920,
            viewport_height: 1080,
            ..Default::default()
        });
        assert!(script.contains("firefox.launch"));
        assert!(script.contains("width: 1920"));
        assert!(script.contains("height: 1080"));
        assert!(script.contains("page.setDefaultTimeout(10000)"));
    }

    #[test]
    fn script_handles_every_locator_kind() {
        let script = driver_script(&BrowserConfig::default());
        for marker in ["getByTestId", "getByRole", "xpath=", "getByText"] {
            assert!(script.contains(marker), "missing {marker}");
        }
    }

    #[test]
    fn locators_serialize_with_kind_tag() {
        let json = serde_json::to_value(Locator::test_id("currency-menu")).unwrap();
        assert_eq!(json["kind"], "test_id");
        assert_eq!(json["value"], "currency-menu");

        let json = serde_json::to_value(Locator::role("button", "Update")).unwrap();
        assert_eq!(json["kind"], "role");
        assert_eq!(json["name"], "Update");

        let json = serde_json::to_value(Locator::xpath("//div[@id='price']")).unwrap();
        assert_eq!(json["kind"], "xpath");
    }

    #[test]
    fn commands_flatten_op_tag() {
        let command = DriverCommand {
            id: 7,
            op: DriverOp::Fill {
                locator: Locator::test_id("search-input"),
                value: "Turkey".to_string(),
            },
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["op"], "fill");
        assert_eq!(json["locator"]["kind"], "test_id");
        assert_eq!(json["value"], "Turkey");
    }

    #[test]
    fn replies_parse_with_optional_fields() {
        let reply: DriverReply =
            serde_json::from_str(r#"{"ok":true,"event":"ready"}"#).unwrap();
        assert!(reply.ok);
        assert_eq!(reply.event.as_deref(), Some("ready"));
        assert!(reply.id.is_none());

        let reply: DriverReply =
            serde_json::from_str(r#"{"ok":false,"id":3,"error":"Timeout 10000ms exceeded"}"#)
                .unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.id, Some(3));
    }
}
