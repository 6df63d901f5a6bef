use crate::formatting::{format_elapsed, format_ratio};
use crate::model::{InfusedWeapon, UpgradeType, Weapon};
use chrono::{DateTime, Local};
use colored::Colorize;
use rustc_hash::FxHashMap;
use std::path::Path;

pub struct SummaryPaths<'a> {
    pub(crate) output: &'a Path,
    pub(crate) csv: Option<&'a Path>,
    pub(crate) html: Option<&'a Path>,
}

pub enum StageCounts<'a> {
    Scrape {
        discovered: usize,
        scraped: usize,
        cache_dir: &'a Path,
    },
    Map {
        weapons: &'a [Weapon],
    },
    Flatten {
        weapons: usize,
        rows: &'a [InfusedWeapon],
    },
}

pub struct SummaryContext<'a> {
    pub(crate) title: &'a str,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) counts: StageCounts<'a>,
    pub(crate) paths: SummaryPaths<'a>,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_counts(&context.counts);
    print_summary_paths(
        &context.paths,
        matches!(context.counts, StageCounts::Flatten { .. }),
    );
    println!("{}", "=".repeat(HEADER_WIDTH).bright_cyan());
}

const HEADER_WIDTH: usize = 60;

fn print_summary_header(context: &SummaryContext<'_>) {
    let title = format!(" erdtable {} ", context.title);
    println!(
        "{}",
        format!("{title:=^width$}", width = HEADER_WIDTH).bold().bright_cyan()
    );
    let finished_at = Local::now();
    println!(
        "{} {} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white(),
        format!("({})", format_elapsed(context.run_started_at, &finished_at)).bright_black()
    );
}

fn print_summary_counts(counts: &StageCounts<'_>) {
    match counts {
        StageCounts::Scrape {
            discovered,
            scraped,
            cache_dir,
        } => {
            print_count_line("Weapons discovered", discovered.to_string());
            print_count_line("Weapons scraped", format_ratio(*scraped, *discovered));
            print_count_line("Page cache", cache_dir.display().to_string());
        }
        StageCounts::Map { weapons } => {
            let standard = weapons
                .iter()
                .filter(|weapon| weapon.profile.upgrade_type == UpgradeType::Standard)
                .count();
            let infusable = weapons.iter().filter(|weapon| weapon.profile.infusable).count();
            print_count_line("Weapons", weapons.len().to_string());
            print_count_line("Standard upgrades", format_ratio(standard, weapons.len()));
            print_count_line(
                "Somber upgrades",
                format_ratio(weapons.len() - standard, weapons.len()),
            );
            print_count_line("Infusable", format_ratio(infusable, weapons.len()));
        }
        StageCounts::Flatten { weapons, rows } => {
            print_count_line("Weapons", weapons.to_string());
            print_count_line("Infused rows", rows.len().to_string());
            print_category_table(rows);
        }
    }
}

fn print_count_line(label: &str, value: String) {
    println!("{} {}", label.bright_yellow().bold(), value.bright_white());
}

fn print_category_table(rows: &[InfusedWeapon]) {
    let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
    for row in rows {
        *counts.entry(row.profile.category.name()).or_default() += 1;
    }
    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if counts.is_empty() {
        println!("{}", "No rows to show.".bright_black());
        return;
    }
    println!("{}", format!("{:<24} | {:>5}", "Category", "Rows").bold().bright_white());
    println!("{}", "-------------------------+------".bright_black());
    for (category, count) in counts {
        println!("{}", format!("{category:<24} | {count:>5}").bright_green());
    }
}

fn print_summary_paths(paths: &SummaryPaths<'_>, show_hints: bool) {
    print_path_line("Output JSON", Some(paths.output), "");
    if show_hints || paths.csv.is_some() {
        print_path_line("CSV", paths.csv, "not saved (use --save-csv)");
    }
    if show_hints || paths.html.is_some() {
        print_path_line("HTML Report", paths.html, "not saved (use --save-html)");
    }
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}
