use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::constants::*;

/// Waits and attempt budgets for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Upper bound on loading the converter page
    pub navigation_timeout: Duration,
    /// Upper bound on the input field becoming visible
    pub selector_timeout: Duration,
    /// Pause between typing the URL and pressing Enter
    pub submit_settle: Duration,
    pub capture_interval: Duration,
    pub capture_iterations: u32,
    pub poll_pending_delay: Duration,
    pub poll_failure_delay: Duration,
    pub poll_max_attempts: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(NAVIGATION_TIMEOUT_MS),
            selector_timeout: Duration::from_millis(SELECTOR_TIMEOUT_MS),
            submit_settle: Duration::from_millis(SUBMIT_SETTLE_MS),
            capture_interval: Duration::from_millis(CAPTURE_INTERVAL_MS),
            capture_iterations: CAPTURE_ITERATIONS,
            poll_pending_delay: Duration::from_millis(POLL_PENDING_DELAY_MS),
            poll_failure_delay: Duration::from_millis(POLL_FAILURE_DELAY_MS),
            poll_max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

/// How the headless browser is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Browser binary; `None` lets the automation engine detect one
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub args: Vec<String>,
    pub window_size: (u32, u32),
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            args: BROWSER_ARGS.iter().map(|a| a.to_string()).collect(),
            window_size: WINDOW_SIZE,
        }
    }
}

/// Configuration for the download-link service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Converter page; also sent as the Referer while polling
    pub converter_url: String,
    pub browser: BrowserSettings,
    pub poll_user_agent: String,
    pub poll_request_timeout: Duration,
    pub timings: Timings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            converter_url: CONVERTER_URL.to_string(),
            browser: BrowserSettings::default(),
            poll_user_agent: POLL_USER_AGENT.to_string(),
            poll_request_timeout: Duration::from_secs(POLL_REQUEST_TIMEOUT_SECS),
            timings: Timings::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if let Some(addr) = lookup("SCRIBD_API_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("Invalid SCRIBD_API_ADDR: {}", addr))?;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
            config.bind_addr.set_port(port);
        }

        if let Some(url) = lookup("CONVERTER_URL") {
            config.converter_url = url;
        }

        config.browser.executable = lookup("CHROME_EXECUTABLE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Some(headless) = lookup("CHROME_HEADLESS") {
            config.browser.headless = parse_flag(&headless)
                .with_context(|| format!("Invalid CHROME_HEADLESS: {}", headless))?;
        }

        if let Some(secs) = lookup("POLL_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid POLL_REQUEST_TIMEOUT_SECS: {}", secs))?;
            config.poll_request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
