//! Upgrade tables to per-level rows.
//!
//! Wiki upgrade tables have two header rows (a section such as "Attack Power"
//! spanning several columns, then a field code such as "Phy") followed by one
//! row per upgrade level. Which columns exist and in what order differs from
//! page to page, so every field is resolved by its header text.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{normalize_text, parse_u32};
use crate::lookup::{Attribute, DamageType, EffectKey};
use crate::model::{PerAttribute, PerDamage, RawInfusionRow};

static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static SELECTOR_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Deadly poison must be tried before poison; the first match wins.
static EFFECT_PATTERNS: LazyLock<Vec<(EffectKey, Regex)>> = LazyLock::new(|| {
    [
        (EffectKey::DeadlyPoison, r"(?i)deadly[_+ ]?poison"),
        (EffectKey::Bleed, r"(?i)hemorrhage|blood[_+ ]?loss"),
        (EffectKey::Frost, r"(?i)frostbite"),
        (EffectKey::Poison, r"(?i)poison"),
        (EffectKey::Rot, r"(?i)scarlet[_+ ]?rot"),
        (EffectKey::Sleep, r"(?i)sleep"),
        (EffectKey::Madness, r"(?i)madness"),
        (EffectKey::Death, r"(?i)death[_+ ]?blight"),
    ]
    .into_iter()
    .map(|(effect, pattern)| (effect, Regex::new(pattern).expect("valid regex")))
    .collect()
});

const HEADER_ROWS: usize = 2;
const MAX_SPAN: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridCell {
    pub text: String,
    pub html: String,
}

/// A table with row and column spans expanded, stored column by column.
#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    columns: Vec<Vec<GridCell>>,
}

impl TableGrid {
    pub fn from_table(table: ElementRef<'_>) -> Self {
        let rows: Vec<ElementRef<'_>> = table
            .select(&SELECTOR_TR)
            .filter(|row| owning_table(*row).is_some_and(|owner| owner.id() == table.id()))
            .collect();

        let mut slots: Vec<Vec<Option<GridCell>>> = vec![Vec::new(); rows.len()];
        for (row_idx, row) in rows.iter().enumerate() {
            let mut col_idx = 0;
            for cell in row.children().filter_map(ElementRef::wrap) {
                if !matches!(cell.value().name(), "td" | "th") {
                    continue;
                }
                while slots[row_idx].get(col_idx).is_some_and(Option::is_some) {
                    col_idx += 1;
                }
                let colspan = span_attr(cell, "colspan");
                let rowspan = span_attr(cell, "rowspan");
                let grid_cell = GridCell {
                    text: normalize_text(&cell.text().collect::<String>()),
                    html: cell.inner_html(),
                };
                for target_row in slots.iter_mut().skip(row_idx).take(rowspan) {
                    if target_row.len() < col_idx + colspan {
                        target_row.resize(col_idx + colspan, None);
                    }
                    for slot in &mut target_row[col_idx..col_idx + colspan] {
                        *slot = Some(grid_cell.clone());
                    }
                }
                col_idx += colspan;
            }
        }

        let width = slots.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width)
            .map(|col| {
                slots
                    .iter()
                    .map(|row| row.get(col).cloned().flatten().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns }
    }

    /// Parses the first table found in an HTML fragment.
    #[cfg(test)]
    pub fn parse(html: &str) -> Option<Self> {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse("table").ok()?;
        fragment.select(&selector).next().map(Self::from_table)
    }

    pub fn columns(&self) -> &[Vec<GridCell>] {
        &self.columns
    }

    pub fn level_count(&self) -> usize {
        self.columns
            .first()
            .map_or(0, |column| column.len().saturating_sub(HEADER_ROWS))
    }

    fn find_column(&self, matches: impl Fn(&str, &str) -> bool) -> Option<usize> {
        self.columns.iter().position(|column| {
            let (section, code) = column_header(column);
            matches(section, code)
        })
    }

    fn cell(&self, column: usize, level: usize) -> Option<&GridCell> {
        self.columns.get(column)?.get(level + HEADER_ROWS)
    }

    fn text(&self, column: Option<usize>, level: usize) -> String {
        column
            .and_then(|column| self.cell(column, level))
            .map_or_else(String::new, |cell| cell.text.clone())
    }
}

fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn column_header(column: &[GridCell]) -> (&str, &str) {
    let section = column.first().map_or("", |cell| cell.text.as_str());
    let code = column.get(1).map_or("", |cell| cell.text.as_str());
    (section, code)
}

/// Column positions of every known field; `None` when the page lacks it.
struct ColumnIndex {
    guard_boost: Option<usize>,
    casting_scaling: Option<usize>,
    scaling: PerAttribute<Option<usize>>,
    attack: PerDamage<Option<usize>>,
    guard: PerDamage<Option<usize>>,
    effects: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(grid: &TableGrid) -> Self {
        Self {
            guard_boost: grid.find_column(|section, code| {
                section.contains("Damage Reduction") && code == "Bst"
            }),
            casting_scaling: grid.find_column(|section, code| {
                section.contains("Attack Power")
                    && (code.contains("Sor Scaling") || code.contains("Inc Scaling"))
            }),
            scaling: PerAttribute::from_fn(|attribute: Attribute| {
                grid.find_column(|section, code| section == "Stat Scaling" && code == attribute.code())
            }),
            attack: PerDamage::from_fn(|damage: DamageType| {
                grid.find_column(|section, code| {
                    section.contains("Attack Power") && code == damage.code()
                })
            }),
            guard: PerDamage::from_fn(|damage: DamageType| {
                grid.find_column(|section, code| {
                    section.contains("Damage Reduction") && code == damage.code()
                })
            }),
            effects: grid
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, column)| column_header(column).0.contains("Passive"))
                .map(|(idx, _)| idx)
                .collect(),
        }
    }
}

/// One row per upgrade level, level 0 first.
pub fn map_rows(grid: &TableGrid) -> Vec<RawInfusionRow> {
    let columns = ColumnIndex::resolve(grid);
    (0..grid.level_count())
        .map(|level| RawInfusionRow {
            guard_boost: grid.text(columns.guard_boost, level),
            casting_scaling: columns
                .casting_scaling
                .map(|column| split_casting_scaling(&grid.text(Some(column), level))),
            scaling: columns.scaling.map(|column| grid.text(*column, level)),
            attack: columns.attack.map(|column| grid.text(*column, level)),
            guard: columns.guard.map(|column| grid.text(*column, level)),
            effects: Some(level_effects(grid, &columns.effects, level)),
        })
        .collect()
}

fn split_casting_scaling(text: &str) -> [String; 2] {
    match text.split_once(" - ") {
        Some((first, second)) => [first.trim().to_string(), second.trim().to_string()],
        None => [text.trim().to_string(), String::new()],
    }
}

fn level_effects(grid: &TableGrid, columns: &[usize], level: usize) -> BTreeMap<EffectKey, String> {
    let mut strongest: BTreeMap<EffectKey, u32> = BTreeMap::new();
    for cell in columns.iter().filter_map(|&column| grid.cell(column, level)) {
        for (effect, magnitude) in parse_effect_links(&cell.html) {
            let entry = strongest.entry(effect).or_insert(magnitude);
            *entry = (*entry).max(magnitude);
        }
    }
    strongest
        .into_iter()
        .map(|(effect, magnitude)| (effect, magnitude.to_string()))
        .collect()
}

/// Reads status effect links out of a cell's markup. The link target decides
/// the effect; the number comes from the link text, or from the text right
/// after the link when the link text carries none.
pub fn parse_effect_links(html: &str) -> Vec<(EffectKey, u32)> {
    let fragment = Html::parse_fragment(html);
    let mut found = Vec::new();
    for link in fragment.select(&SELECTOR_LINK) {
        let Some(effect) = link.value().attr("href").and_then(effect_for_target) else {
            continue;
        };
        let magnitude = parse_u32(&link.text().collect::<String>()).or_else(|| {
            link.next_sibling()
                .and_then(|node| node.value().as_text().map(|text| parse_u32(text)))
                .flatten()
        });
        if let Some(magnitude) = magnitude {
            found.push((effect, magnitude));
        }
    }
    found
}

fn effect_for_target(href: &str) -> Option<EffectKey> {
    EFFECT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(href))
        .map(|(effect, _)| *effect)
}
