use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::core::config::ServiceConfig;
use shared::types::CapturedMetadata;

use scraper_chromiumoxide::{capture_metadata, ChromiumLauncher};

#[derive(Debug, Deserialize)]
struct Input {
    url: String,
    #[serde(default = "default_headless")] headless: bool,
}
fn default_headless() -> bool { true }

#[derive(Debug, Serialize)]
struct Output {
    status: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<CapturedMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON result, logs go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut buf = String::new();
    use tokio::io::{AsyncReadExt, stdin};
    stdin().read_to_string(&mut buf).await?;
    let inp: Input = serde_json::from_str(&buf)?;

    let mut config = ServiceConfig::from_env()?;
    config.browser.headless = inp.headless;
    let launcher = ChromiumLauncher::new(config.browser.clone());

    let out = match capture_metadata(&launcher, &config.converter_url, &inp.url, &config.timings).await {
        Ok(meta) => Output { status: "ok".into(), url: inp.url, metadata: Some(meta), error: None },
        Err(e) => Output { status: "error".into(), url: inp.url, metadata: None, error: Some(e.to_string()) },
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}
