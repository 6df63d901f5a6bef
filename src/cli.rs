use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};

use crate::wiki::WIKI_ROOT_URL;

pub const DEFAULT_SCRAPED_PATH: &str = "data/scraped/weapons.json";
pub const DEFAULT_WEAPONS_PATH: &str = "data/output/weapons.json";
pub const DEFAULT_INFUSED_PATH: &str = "data/output/infusedWeapons.json";
pub const DEFAULT_CSV_PATH: &str = "data/output/infusedWeapons.csv";
pub const DEFAULT_HTML_PATH: &str = "data/output/report.html";
pub const DEFAULT_CACHE_DIR: &str = "data/cache";

pub const SAVE_CSV_HELP: &str = "Also save the infused weapon rows as CSV (defaults to data/output/infusedWeapons.csv when no path is provided).";
pub const SAVE_HTML_HELP: &str = "Save a static HTML table of the infused weapon rows (defaults to data/output/report.html when no path is provided).";
pub const KEEP_GOING_HELP: &str = "Log weapons that fail to scrape and leave them out instead of aborting the run.";

#[derive(Debug, Parser)]
#[command(
    name = "erdtable",
    about = "Scrape Elden Ring weapon stats from the community wiki and normalize them into JSON.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(long, global = true, help = "Log debug details (RUST_LOG takes precedence).")]
    pub verbose: bool,
    #[arg(long, global = true, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download weapon pages (through the page cache) and save the raw scraped records.
    Scrape(ScrapeArgs),
    /// Normalize raw scraped records into the typed weapon schema.
    Map(MapArgs),
    /// Derive one row per weapon and infusion at its highest upgrade level.
    Flatten(FlattenArgs),
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    #[arg(
        value_name = "NAME",
        help = "Only scrape weapons with these exact names (default: every weapon on the index)."
    )]
    pub names: Vec<String>,
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SCRAPED_PATH)]
    pub output: PathBuf,
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,
    #[arg(long, value_name = "URL", default_value = WIKI_ROOT_URL)]
    pub wiki_url: String,
    #[arg(long, value_name = "N", help = "Stop after the first N discovered weapons.")]
    pub limit: Option<usize>,
    #[arg(long, help = KEEP_GOING_HELP)]
    pub keep_going: bool,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        help = "Retry failed requests up to N times with exponential backoff."
    )]
    pub retries: usize,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SCRAPED_PATH)]
    pub input: PathBuf,
    #[arg(long, value_name = "FILE", default_value = DEFAULT_WEAPONS_PATH)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct FlattenArgs {
    #[arg(long, value_name = "FILE", default_value = DEFAULT_WEAPONS_PATH)]
    pub input: PathBuf,
    #[arg(long, value_name = "FILE", default_value = DEFAULT_INFUSED_PATH)]
    pub output: PathBuf,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CSV_PATH,
        help = SAVE_CSV_HELP
    )]
    pub save_csv: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_HTML_PATH,
        help = SAVE_HTML_HELP
    )]
    pub save_html: Option<PathBuf>,
}

pub fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = if let Some(dir) = output_dir {
        Some(dir)
    } else if install {
        Some(default_install_dir(shell)?)
    } else {
        None
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let mut path = PathBuf::from(home);

    match shell {
        Shell::Bash => {
            path.push(".local/share/bash-completion/completions");
            Ok(path)
        }
        Shell::Elvish => {
            path.push(".elvish/lib/completions");
            Ok(path)
        }
        Shell::Fish => {
            path.push(".config/fish/completions");
            Ok(path)
        }
        Shell::PowerShell => {
            path.push(".local/share/powershell/Scripts");
            Ok(path)
        }
        Shell::Zsh => {
            path.push(".local/share/zsh/site-functions");
            Ok(path)
        }
        other => Err(anyhow!(
            "no default install location for {other:?}; specify --output-dir"
        )),
    }
}
