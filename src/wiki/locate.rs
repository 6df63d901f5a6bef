use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::element_text;

static SELECTOR_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static SELECTOR_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));

type Probe = for<'a> fn(&'a Html, &str) -> Option<ElementRef<'a>>;

/// Wiki pages introduce upgrade tables in at least two ways. Table markers
/// are more reliable than heading text, so they are tried first.
const PROBES: [(&str, Probe); 2] = [
    ("level header", find_by_level_header),
    ("upgrades heading", find_by_upgrades_heading),
];

/// Finds the upgrade table of one infusion, e.g. `"Heavy"`. `None` means the
/// weapon has no such infusion.
pub fn locate_infusion_table<'a>(document: &'a Html, infusion: &str) -> Option<ElementRef<'a>> {
    PROBES.iter().find_map(|(strategy, probe)| {
        let table = probe(document, infusion);
        if table.is_some() {
            tracing::debug!(infusion, strategy, "located upgrade table");
        }
        table
    })
}

/// A `th` reading `"<infusion>+1"` (or with a space before `+1`) sits in the
/// row of the first upgrade level.
fn find_by_level_header<'a>(document: &'a Html, infusion: &str) -> Option<ElementRef<'a>> {
    let candidates = [format!("{infusion}+1"), format!("{infusion} +1")];
    candidates.iter().find_map(|candidate| {
        document
            .select(&SELECTOR_TH)
            .filter(|th| element_text(*th) == *candidate)
            .find_map(enclosing_table)
    })
}

/// A heading reading `"<infusion> Upgrades"` (optionally prefixed by the
/// weapon name) followed somewhere by the table.
fn find_by_upgrades_heading<'a>(document: &'a Html, infusion: &str) -> Option<ElementRef<'a>> {
    let title = format!("{infusion} Upgrades");
    let headings: Vec<(ElementRef<'a>, String)> = document
        .select(&SELECTOR_HEADING)
        .map(|heading| (heading, element_text(heading)))
        .collect();

    let exact = headings
        .iter()
        .find(|(_, text)| heading_matches(text, &title, false));
    let heading = exact.or_else(|| {
        headings
            .iter()
            .find(|(_, text)| heading_matches(text, &title, true))
    })?;

    heading
        .0
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find_map(table_within)
}

fn heading_matches(text: &str, title: &str, ignore_case: bool) -> bool {
    let (text, title) = if ignore_case {
        (text.to_ascii_lowercase(), title.to_ascii_lowercase())
    } else {
        (text.to_string(), title.to_string())
    };
    text == title || text.ends_with(&format!(" {title}"))
}

fn enclosing_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn table_within(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if element.value().name() == "table" {
        return Some(element);
    }
    element.select(&SELECTOR_TABLE).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::table::fixtures::upgrade_table;

    fn table_id(table: ElementRef<'_>) -> Option<&str> {
        table.value().attr("id")
    }

    #[test]
    fn level_header_finds_enclosing_table() {
        let html = format!(
            "<div class=\"table-responsive\">{}</div>",
            upgrade_table("Heavy", 3, false, "-").replace("<table", "<table id=\"heavy\"")
        );
        let document = Html::parse_document(&html);
        let table = locate_infusion_table(&document, "Heavy").unwrap();
        assert_eq!(table_id(table), Some("heavy"));
        assert!(locate_infusion_table(&document, "Keen").is_none());
    }

    #[test]
    fn compact_level_header_is_accepted() {
        let html = "<table id=\"fire\"><tr><th>Name</th></tr><tr><th>Fire+1</th></tr></table>";
        let document = Html::parse_document(html);
        let table = locate_infusion_table(&document, "Fire").unwrap();
        assert_eq!(table_id(table), Some("fire"));
    }

    #[test]
    fn upgrades_heading_walks_to_the_next_table() {
        let html = "<h3>Uchigatana Blood Upgrades</h3><p>intro</p>\
                    <div class=\"table-responsive\"><table id=\"blood\"><tr><td>x</td></tr></table></div>";
        let document = Html::parse_document(html);
        let table = locate_infusion_table(&document, "Blood").unwrap();
        assert_eq!(table_id(table), Some("blood"));
    }

    #[test]
    fn upgrades_heading_falls_back_to_case_insensitive() {
        let html = "<h3>cold upgrades</h3><table id=\"cold\"><tr><td>x</td></tr></table>";
        let document = Html::parse_document(html);
        let table = locate_infusion_table(&document, "Cold").unwrap();
        assert_eq!(table_id(table), Some("cold"));
    }

    #[test]
    fn level_header_wins_over_heading() {
        let html = format!(
            "<h3>Heavy Upgrades</h3><table id=\"by-heading\"><tr><td>x</td></tr></table>{}",
            upgrade_table("Heavy", 2, false, "-").replace("<table", "<table id=\"by-header\"")
        );
        let document = Html::parse_document(&html);
        let table = locate_infusion_table(&document, "Heavy").unwrap();
        assert_eq!(table_id(table), Some("by-header"));
    }

    #[test]
    fn level_ten_header_does_not_match_level_one() {
        let html = "<table id=\"t\"><tr><th>Name</th></tr><tr><th>Keen +10</th></tr></table>";
        let document = Html::parse_document(html);
        assert!(locate_infusion_table(&document, "Keen").is_none());
    }
}
