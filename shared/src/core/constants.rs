// Converter site and the document pages it accepts
pub const CONVERTER_URL: &str = "https://scribd-downloader.co/";
pub const SCRIBD_DOCUMENT_MARKER: &str = "scribd.com/document/";

/// Path fragment of the converter's internal metadata endpoint.
pub const METADATA_PATH_MARKER: &str = "/document/";

pub const INPUT_SELECTOR: &str = r#"input[type="text"], input[type="url"], input.form-control"#;

pub const POLL_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

// Response payload literals
pub const CREATOR: &str = "ScraperAPI";
pub const DEFAULT_TITLE: &str = "No Title";
pub const TIMEOUT_SENTINEL: &str = "Process timeout";

// Automation budgets (milliseconds unless noted)
pub const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
/// Page load counts as settled once at most this many requests stay open...
pub const NETWORK_IDLE_MAX_IN_FLIGHT: usize = 2;
/// ...for this long.
pub const NETWORK_IDLE_QUIET_MS: u64 = 500;
pub const SELECTOR_TIMEOUT_MS: u64 = 30_000;
pub const SUBMIT_SETTLE_MS: u64 = 500;
pub const CAPTURE_INTERVAL_MS: u64 = 500;
pub const CAPTURE_ITERATIONS: u32 = 30;

// Completion poller budgets
pub const POLL_PENDING_DELAY_MS: u64 = 3_000;
pub const POLL_FAILURE_DELAY_MS: u64 = 2_000;
pub const POLL_MAX_ATTEMPTS: u32 = 20;
pub const POLL_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Launch flags for a headless browser in a constrained container.
/// `--no-sandbox` and `--disable-setuid-sandbox` are added by the launcher itself.
pub const BROWSER_ARGS: &[&str] = &[
    "--allow-running-insecure-content",
    "--autoplay-policy=user-gesture-required",
    "--disable-component-update",
    "--disable-domain-reliability",
    "--disable-features=AudioServiceOutOfProcess,IsolateOrigins,site-per-process",
    "--disable-print-preview",
    "--disable-site-isolation-trials",
    "--disable-speech-api",
    "--disable-dev-shm-usage",
    "--disk-cache-size=33554432",
    "--enable-features=SharedArrayBuffer",
    "--ignore-gpu-blocklist",
    "--in-process-gpu",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-pings",
    "--use-gl=swiftshader",
    "--hide-scrollbars",
    "--disable-web-security",
];
