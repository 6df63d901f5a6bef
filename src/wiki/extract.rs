//! Single-field extractors for a weapon page.
//!
//! Each one reads a fixed position of the `#infobox` table. Missing elements
//! produce empty values; deciding whether that is acceptable is left to the
//! normalizer.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{element_text, normalize_text, text_with_breaks};

static CRIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Crit (?<crit>[0-9]{1,3})").expect("valid regex"));

#[derive(Clone, Copy)]
enum CellPick {
    First,
    Last,
}

fn infobox_cell(document: &Html, row: usize, pick: CellPick) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(&format!("#infobox tbody tr:nth-child({row}) td"))
        .expect("valid selector");
    let mut cells = document.select(&selector);
    match pick {
        CellPick::First => cells.next(),
        CellPick::Last => cells.last(),
    }
}

fn infobox_text(document: &Html, row: usize, pick: CellPick) -> String {
    infobox_cell(document, row, pick).map_or_else(String::new, element_text)
}

pub fn scrape_name(document: &Html) -> String {
    let selector = Selector::parse("#infobox h2").expect("valid selector");
    document
        .select(&selector)
        .next()
        .map_or_else(String::new, element_text)
}

pub fn scrape_category(document: &Html) -> String {
    let selector = Selector::parse("#breadcrumbs-container > a").expect("valid selector");
    document
        .select(&selector)
        .last()
        .map_or_else(String::new, element_text)
}

pub fn scrape_physical_damage_types(document: &Html) -> Vec<String> {
    infobox_text(document, 5, CellPick::Last)
        .split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.eq_ignore_ascii_case("none"))
        .map(str::to_string)
        .collect()
}

pub fn scrape_required_attributes(document: &Html) -> BTreeMap<String, String> {
    let Some(cell) = infobox_cell(document, 4, CellPick::Last) else {
        return BTreeMap::new();
    };
    let selector = Selector::parse(".lineleft").expect("valid selector");
    let blob = cell
        .select(&selector)
        .map(text_with_breaks)
        .collect::<Vec<_>>()
        .join("\n");
    parse_required_attributes(&blob)
}

/// Splits `"Str 10\nDex 12"` into code/value pairs. Each line is expected to
/// hold exactly one space between code and value.
pub fn parse_required_attributes(blob: &str) -> BTreeMap<String, String> {
    blob.trim()
        .split('\n')
        .map(normalize_text)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split(' ');
            let code = parts.next().unwrap_or_default().to_string();
            let value = parts.next().unwrap_or_default().to_string();
            (code, value)
        })
        .collect()
}

pub fn scrape_weapon_art(document: &Html) -> String {
    infobox_text(document, 6, CellPick::First)
}

pub fn scrape_weight(document: &Html) -> String {
    infobox_text(document, 7, CellPick::First).replace("Wgt. ", "")
}

pub fn scrape_critical(document: &Html) -> String {
    parse_critical(&infobox_text(document, 3, CellPick::First))
}

pub fn parse_critical(text: &str) -> String {
    CRIT_PATTERN
        .captures(text)
        .and_then(|captures| captures.name("crit"))
        .map_or_else(String::new, |value| value.as_str().to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A minimal weapon page with the infobox rows the extractors read.
    pub fn infobox_page(name: &str, category: &str, requirements: &str, crit_cell: &str) -> String {
        format!(
            r#"<html><body>
<div id="breadcrumbs-container"><a href="/">Elden Ring Wiki</a> / <a href="/Equipment">Equipment</a> / <a href="/Category">{category}</a></div>
<div id="infobox"><h2>{name}</h2>
<table><tbody>
<tr><td>image</td></tr>
<tr><td>Phy 110</td><td>Phy 55</td></tr>
<tr><td>{crit_cell}</td><td>Bst 25</td></tr>
<tr><td>Scaling</td><td><div class="lineleft">{requirements}</div></td></tr>
<tr><td>Type</td><td>Slash / Pierce</td></tr>
<tr><td>Quickstep</td><td>FP 3</td></tr>
<tr><td>Wgt.&nbsp;1.5</td><td>Passive -</td></tr>
</tbody></table></div>
</body></html>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::infobox_page;
    use super::*;

    fn page(crit_cell: &str) -> Html {
        Html::parse_document(&infobox_page("Dagger", "Daggers", "Str 5\nDex 9", crit_cell))
    }

    #[test]
    fn infobox_fields_come_from_fixed_rows() {
        let document = page("Crit 130");
        assert_eq!(scrape_name(&document), "Dagger");
        assert_eq!(scrape_category(&document), "Daggers");
        assert_eq!(scrape_physical_damage_types(&document), ["Slash", "Pierce"]);
        assert_eq!(scrape_weapon_art(&document), "Quickstep");
        assert_eq!(scrape_weight(&document), "1.5");
        assert_eq!(scrape_critical(&document), "130");

        let attributes = scrape_required_attributes(&document);
        assert_eq!(attributes.get("Str").map(String::as_str), Some("5"));
        assert_eq!(attributes.get("Dex").map(String::as_str), Some("9"));
    }

    #[test]
    fn critical_without_token_is_empty() {
        assert_eq!(scrape_critical(&page("Critical")), "");
        assert_eq!(parse_critical("Crit 100"), "100");
        assert_eq!(parse_critical("Bst 10 Crit 1000"), "100");
    }

    #[test]
    fn absent_infobox_yields_empty_values() {
        let document = Html::parse_document("<html><body><p>nothing</p></body></html>");
        assert_eq!(scrape_name(&document), "");
        assert!(scrape_physical_damage_types(&document).is_empty());
        assert!(scrape_required_attributes(&document).is_empty());
        assert_eq!(scrape_weight(&document), "");
    }

    #[test]
    fn none_damage_type_is_dropped() {
        let html = infobox_page("Torch", "Torches", "Str 5", "Crit 100").replace(
            "<td>Slash / Pierce</td>",
            "<td>None</td>",
        );
        let document = Html::parse_document(&html);
        assert!(scrape_physical_damage_types(&document).is_empty());
    }

    #[test]
    fn extra_space_corrupts_the_pair() {
        let parsed = parse_required_attributes("Str  10");
        assert_eq!(parsed.get("Str").map(String::as_str), Some(""));
    }
}
