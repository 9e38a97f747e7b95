//! knowledge-file: state store for a knowledge-base document listing page.
//!
//! The crate keeps the UI state of one document list page (dialogs, search,
//! pagination, the current page of documents, thumbnails) and synchronizes it
//! with a remote knowledge-base REST API:
//! - Named state patches, each applied atomically
//! - Remote operations that inspect `retcode` and patch or notify on success
//! - A throttled list refresh and a polling list refresh with explicit handles
//! - A view model derived from state for whatever renders the list
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Runner binary (main.rs)                            │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - ListStateStore: state + operations               │
//! │  - handler: request shaping, retcode → actions      │
//! │  - refresh: throttle / poll                         │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ service/      │   │ notify/       │   │ observability/│
//! │ - KbService   │   │ - Notifier    │   │ - tracing     │
//! │ - HTTP client │   │               │   │ - span export │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/): Document, errors                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Page state, operations, refresh triggers, view model
//! - [`domain`]: Document model and error types
//! - [`service`]: Remote service trait and its HTTP implementation
//! - [`notify`]: Success notification sink
//! - [`observability`]: Tracing subscriber and file span export
//!
//! # Configuration
//!
//! ```toml
//! api_base_url = "http://127.0.0.1:9380"
//! api_token = "..."
//! page_size = 10
//! throttle_ms = 1000
//! poll_interval_ms = 5000
//! trace_level = "debug"
//! trace_file = "/tmp/knowledge-file-spans.jsonl"
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use knowledge_file::{mount, Config};
//! use knowledge_file::notify::TracingNotifier;
//! use knowledge_file::service::HttpKbService;
//!
//! # async fn run() -> knowledge_file::Result<()> {
//! let config = Config::from_file("knowledge-file.toml")?;
//! let store = mount(HttpKbService::new(&config)?, TracingNotifier, &config);
//!
//! let poll = store.start_poll("kb-1", config.poll_interval());
//! // ... page is open ...
//! poll.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod notify;
pub mod observability;
pub mod service;

pub use app::{Action, ListStateStore, ListViewModel, Modal, Operation, PageState, PaginationPatch, StatePatch};
pub use domain::{Document, KnowledgeFileError, Result};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:9380";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_THROTTLE_MS: u64 = 1000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Runtime configuration.
///
/// Loaded from a TOML file ([`Config::from_file`]) or a flat string map
/// ([`Config::from_map`]). Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the knowledge-base API. Default: `http://127.0.0.1:9380`
    pub api_base_url: String,

    /// Bearer token sent with every request.
    pub api_token: Option<String>,

    /// Per-request timeout. Default: 30
    pub request_timeout_secs: u64,

    /// Documents per page on mount. Default: 10
    pub page_size: NonZeroU32,

    /// Throttle window of the throttled list refresh. Default: 1000
    ///
    /// The runner applies it to refreshes requested from stdin; embedders
    /// pass [`Config::throttle_window`] to
    /// [`ListStateStore::throttled_refresh`].
    pub throttle_ms: u64,

    /// Period of the polling list refresh. Default: 5000
    pub poll_interval_ms: u64,

    /// Tracing filter directive, e.g. `debug` or `knowledge_file=trace`.
    ///
    /// Falls back to `RUST_LOG`, then `info`.
    pub trace_level: Option<String>,

    /// When set, finished spans are exported as JSON lines to this file.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: app::state::DEFAULT_PAGE_SIZE,
            throttle_ms: DEFAULT_THROTTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeFileError::Config`] if the document is not valid
    /// TOML or a value has the wrong type (a zero `page_size` included).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| KnowledgeFileError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Builds configuration from a flat key/value map, e.g. environment-style
    /// settings handed over by an embedding host.
    ///
    /// # Parsing Rules
    ///
    /// - Numbers that do not parse (or a zero `page_size`) fall back to defaults
    /// - Empty strings count as unset
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use knowledge_file::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("api_base_url".to_string(), "http://kb.local".to_string());
    /// map.insert("page_size".to_string(), "25".to_string());
    /// map.insert("poll_interval_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.api_base_url, "http://kb.local");
    /// assert_eq!(config.page_size.get(), 25);
    /// assert_eq!(config.poll_interval_ms, 5000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| map_text(map, key);
        let number = |key: &str, fallback: u64| text(key).and_then(|s| s.parse::<u64>().ok()).unwrap_or(fallback);

        Self {
            api_base_url: text("api_base_url").map_or(defaults.api_base_url, String::from),
            api_token: text("api_token").map(String::from),
            request_timeout_secs: number("request_timeout_secs", defaults.request_timeout_secs),
            page_size: text("page_size")
                .and_then(|s| s.parse::<NonZeroU32>().ok())
                .unwrap_or(defaults.page_size),
            throttle_ms: number("throttle_ms", defaults.throttle_ms),
            poll_interval_ms: number("poll_interval_ms", defaults.poll_interval_ms),
            trace_level: text("trace_level").map(String::from),
            trace_file: text("trace_file").map(PathBuf::from),
        }
    }

    #[must_use]
    pub const fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn map_text<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Mounts a store for a freshly opened list page.
///
/// The returned `Arc` is what the refresh triggers hold on to; the page
/// drops its last clone on unmount.
pub fn mount<S, N>(service: S, notifier: N, config: &Config) -> Arc<ListStateStore<S, N>>
where
    S: service::KbService,
    N: notify::Notifier,
{
    Arc::new(ListStateStore::mount(service, notifier, config))
}
