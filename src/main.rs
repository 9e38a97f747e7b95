//! Command-line runner for the document list store.
//!
//! Mounts a store against a live knowledge-base API and either prints one
//! page as JSON (`--once`) or keeps the page polled, logging every state
//! change, until interrupted. While polling, pressing Enter requests an
//! immediate refresh, throttled by `throttle_ms`.
//!
//! ```text
//! knowledge-file --config kb.toml kb-1 --once --search invoice --page 2
//! knowledge-file --config kb.toml kb-1
//! ```

use clap::Parser;
use knowledge_file::notify::TracingNotifier;
use knowledge_file::observability::init_tracing;
use knowledge_file::service::HttpKbService;
use knowledge_file::{mount, Config, ListViewModel, PaginationPatch, Result};
use std::num::NonZeroU32;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "knowledge-file", version, about = "Browse and poll a knowledge-base document list")]
struct Cli {
    /// Knowledge base whose documents are listed.
    kb_id: String,

    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `api_base_url` from the configuration.
    #[arg(long)]
    base_url: Option<String>,

    /// Fetch a single page, print it and exit.
    #[arg(long)]
    once: bool,

    /// Search keywords applied to the listing.
    #[arg(short, long)]
    search: Option<String>,

    /// 1-based page to show.
    #[arg(long)]
    page: Option<NonZeroU32>,

    /// Documents per page; overrides `page_size` from the configuration.
    #[arg(long)]
    page_size: Option<NonZeroU32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(url) = cli.base_url.clone() {
        config.api_base_url = url;
    }
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }

    init_tracing(&config)?;

    let store = mount(HttpKbService::new(&config)?, TracingNotifier, &config);
    if let Some(search) = &cli.search {
        store.set_search_string(search.as_str());
    }
    if let Some(page) = cli.page {
        store.merge_pagination(PaginationPatch::default().current(page));
    }

    if cli.once {
        let retcode = store.fetch_list(&cli.kb_id).await?;
        if retcode != 0 {
            tracing::warn!(kb_id = %cli.kb_id, retcode, "document list request was rejected");
        }
        println!("{}", serde_json::to_string_pretty(&store.view_model())?);
        return Ok(());
    }

    let mut changes = store.subscribe();
    let watcher = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let view = ListViewModel::from_state(&changes.borrow_and_update());
            tracing::info!(
                total = view.total,
                page = view.page,
                page_count = view.page_count,
                rows = view.rows.len(),
                "document list updated"
            );
        }
    });

    let poll = store.start_poll(cli.kb_id.clone(), config.poll_interval());
    let refresh = store.throttled_refresh(config.throttle_window());
    tracing::info!(
        kb_id = %cli.kb_id,
        interval = ?config.poll_interval(),
        "polling; press Enter to refresh, Ctrl-C to stop"
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            line = input.next_line(), if stdin_open => match line? {
                Some(_) => {
                    match refresh.trigger(&cli.kb_id).await {
                        Ok(Some(retcode)) => tracing::debug!(retcode, "manual refresh finished"),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "manual refresh failed"),
                    }
                }
                None => stdin_open = false,
            },
        }
    }

    refresh.stop();
    poll.stop().await;
    watcher.abort();
    tracing::info!("stopped");

    Ok(())
}
