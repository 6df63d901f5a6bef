pub mod assemble;
pub mod cache;
pub mod extract;
pub mod index;
pub mod locate;
pub mod table;

pub use assemble::{ScrapeOptions, scrape_all};
pub use cache::PageCache;
pub use index::discover_weapons;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use scraper::ElementRef;
use scraper::node::Node;
use std::time::Duration;
use tokio::time::sleep;

pub const WIKI_ROOT_URL: &str = "https://eldenring.wiki.fextralife.com";

/// Index pages listing every weapon, relative to the wiki root.
pub const INDEX_PATHS: [&str; 1] = ["/Weapons+Comparison+Tables"];

/// How hard to try before giving up on a URL. A single attempt is the default:
/// a failed page aborts the run and the cache makes re-running cheap.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    pub max_attempts: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self { max_attempts: 1 }
    }
}

impl FetchPolicy {
    pub fn with_retries(retries: usize) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
        }
    }
}

pub async fn fetch_text(client: &Client, url: &str, policy: FetchPolicy) -> Result<String> {
    send_with_retry(client, url, policy)
        .await?
        .text()
        .await
        .with_context(|| format!("failed to read response body from {url}"))
}

async fn send_with_retry(client: &Client, url: &str, policy: FetchPolicy) -> Result<Response> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 1..=max_attempts {
        match client.get(url).send().await {
            Ok(response) => match response.error_for_status() {
                Ok(success) => return Ok(success),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }

        if attempt < max_attempts {
            tracing::warn!(url, attempt, "request failed, retrying");
            sleep(calculate_backoff(attempt)).await;
        }
    }

    let detail = last_err
        .as_ref()
        .map_or_else(|| "unknown error".to_string(), describe_error);
    Err(anyhow!(
        "failed to fetch {url} after {max_attempts} attempt(s): {detail}"
    ))
}

fn calculate_backoff(attempt: usize) -> Duration {
    const MAX_BACKOFF_EXPONENT: u32 = 10;
    let exponent = u32::try_from(attempt)
        .unwrap_or(MAX_BACKOFF_EXPONENT)
        .min(MAX_BACKOFF_EXPONENT);
    let seconds = 2_u64.saturating_pow(exponent);
    Duration::from_secs(seconds)
}

fn describe_error(error: &anyhow::Error) -> String {
    let mut pieces: Vec<String> = Vec::new();
    for (idx, cause) in error.chain().enumerate() {
        let text = cause.to_string();
        if text.is_empty() {
            continue;
        }
        if idx == 0 {
            pieces.push(text);
        } else {
            pieces.push(format!("caused by {text}"));
        }
    }

    if pieces.is_empty() {
        format!("{error:?}")
    } else {
        pieces.join(" | ")
    }
}

/// Turns non-breaking spaces into plain ones and trims.
pub fn normalize_text(input: &str) -> String {
    input.replace('\u{00a0}', " ").trim().to_string()
}

/// All text of an element, concatenated as-is and then normalized.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Element text with `<br>` rendered as a newline, for multi-line cells.
pub fn text_with_breaks(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

pub fn parse_u32(value: &str) -> Option<u32> {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse::<u32>()
        .ok()
}
