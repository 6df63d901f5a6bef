use crate::cli::{Cli, Commands, FlattenArgs, MapArgs, ScrapeArgs};
use crate::model::{InfusedWeapon, Weapon};
use crate::progress::{ProgressState, Stage, run_with_spinner};
use crate::report::{HtmlReportContext, HtmlReportPaths, save_html_report};
use crate::summary::{StageCounts, SummaryContext, SummaryPaths, print_summary};
use crate::wiki::{FetchPolicy, PageCache, ScrapeOptions, discover_weapons, scrape_all};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::Level;

mod cli;
mod flatten;
mod formatting;
mod lookup;
mod model;
mod normalize;
mod progress;
mod report;
mod summary;
mod wiki;

const HTTP_TIMEOUT_SECONDS: u64 = 30;
const USER_AGENT: &str = concat!("erdtable/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> Result<()> {
    colored::control::set_override(true);

    let cli = Cli::parse();
    let progress = ProgressState::new(!cli.no_progress);
    init_logging(cli.verbose, &progress);

    let result = match cli.command {
        Commands::Scrape(args) => run_scrape(&progress, args).await,
        Commands::Map(args) => run_map(&progress, args).await,
        Commands::Flatten(args) => run_flatten(&progress, args).await,
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => crate::cli::generate_completions(shell, output_dir, install),
    };
    progress.clear();
    result
}

fn init_logging(verbose: bool, progress: &ProgressState) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer({
            let writer = progress.log_writer();
            move || writer.clone()
        })
        .init();
}

async fn run_scrape(progress: &ProgressState, args: ScrapeArgs) -> Result<()> {
    let run_started_at = Local::now();
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .build()
        .context("failed to build HTTP client")?;
    let cache = PageCache::new(client, &args.cache_dir, FetchPolicy::with_retries(args.retries));
    let wiki_url = args.wiki_url.trim_end_matches('/');

    let links = run_with_spinner(
        progress,
        Stage::Fetch,
        "weapon index",
        discover_weapons(&cache, wiki_url, &args.names, args.limit),
    )
    .await?;

    let options = ScrapeOptions {
        keep_going: args.keep_going,
    };
    let label = format!("{} weapon pages", links.len());
    let weapons = run_with_spinner(
        progress,
        Stage::Transform,
        &label,
        scrape_all(&cache, &links, options),
    )
    .await?;

    run_with_spinner(
        progress,
        Stage::Write,
        "scraped weapons",
        write_json(&args.output, &weapons),
    )
    .await?;

    print_summary(&SummaryContext {
        title: "scrape",
        run_started_at: &run_started_at,
        counts: StageCounts::Scrape {
            discovered: links.len(),
            scraped: weapons.len(),
            cache_dir: cache.dir(),
        },
        paths: SummaryPaths {
            output: &args.output,
            csv: None,
            html: None,
        },
    });
    Ok(())
}

async fn run_map(progress: &ProgressState, args: MapArgs) -> Result<()> {
    let run_started_at = Local::now();
    let raw = run_with_spinner(
        progress,
        Stage::Fetch,
        "scraped weapons",
        normalize::load_raw_weapons(&args.input),
    )
    .await?;

    let weapons = run_with_spinner(progress, Stage::Transform, "normalize", async {
        normalize::normalize_weapons(&raw)
    })
    .await?;

    run_with_spinner(
        progress,
        Stage::Write,
        "weapons",
        write_json(&args.output, &weapons),
    )
    .await?;

    print_summary(&SummaryContext {
        title: "map",
        run_started_at: &run_started_at,
        counts: StageCounts::Map { weapons: &weapons },
        paths: SummaryPaths {
            output: &args.output,
            csv: None,
            html: None,
        },
    });
    Ok(())
}

async fn run_flatten(progress: &ProgressState, args: FlattenArgs) -> Result<()> {
    let run_started_at = Local::now();
    let weapons: Vec<Weapon> = run_with_spinner(
        progress,
        Stage::Fetch,
        "weapons",
        read_json(&args.input, "run `erdtable map` first"),
    )
    .await?;

    let rows: Vec<InfusedWeapon> = run_with_spinner(progress, Stage::Transform, "flatten", async {
        Ok(flatten::flatten_weapons(&weapons))
    })
    .await?;

    run_with_spinner(progress, Stage::Write, "infused weapons", async {
        write_json(&args.output, &rows).await?;
        if let Some(path) = args.save_csv.as_deref() {
            let bytes = flatten::serialize_infused_csv(&rows)?;
            write_output_file(path, &bytes).await?;
        }
        if let Some(path) = args.save_html.as_deref() {
            let context = HtmlReportContext {
                weapon_count: weapons.len(),
                run_started_at: &run_started_at,
                rows: &rows,
                paths: HtmlReportPaths {
                    json: &args.output,
                    csv: args.save_csv.as_deref(),
                },
                output_path: path,
            };
            save_html_report(path, &context).await?;
        }
        Ok(())
    })
    .await?;

    print_summary(&SummaryContext {
        title: "flatten",
        run_started_at: &run_started_at,
        counts: StageCounts::Flatten {
            weapons: weapons.len(),
            rows: &rows,
        },
        paths: SummaryPaths {
            output: &args.output,
            csv: args.save_csv.as_deref(),
            html: args.save_html.as_deref(),
        },
    });
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path, hint: &str) -> Result<T> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("failed to check {}", path.display()))?;
    if !exists {
        anyhow::bail!("{} does not exist; {hint}", path.display());
    }
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    bytes.push(b'\n');
    write_output_file(path, &bytes).await
}

pub(crate) async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
