use anyhow::{Context, Result};
use reqwest::Url;
use rustc_hash::FxHashSet;
use scraper::{Html, Selector};

use super::{INDEX_PATHS, PageCache, element_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponLink {
    pub name: String,
    pub url: String,
}

/// Collects weapon links from every index page, in document order.
pub async fn discover_weapons(
    cache: &PageCache,
    root_url: &str,
    allow_list: &[String],
    limit: Option<usize>,
) -> Result<Vec<WeaponLink>> {
    let mut links = Vec::new();
    for path in INDEX_PATHS {
        let url = format!("{root_url}{path}");
        let html = cache
            .load(&url)
            .await
            .with_context(|| format!("failed to load weapon index {url}"))?;
        links.extend(parse_weapon_links(&html, root_url));
    }
    tracing::info!(count = links.len(), "discovered weapon links");
    Ok(select_links(links, allow_list, limit))
}

/// The first cell of every `.wiki_table` body row holds the weapon links.
pub fn parse_weapon_links(html: &str, root_url: &str) -> Vec<WeaponLink> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse(".wiki_table tbody tr").expect("valid selector");
    let cell_selector = Selector::parse("td").expect("valid selector");
    let link_selector = Selector::parse("a[href]").expect("valid selector");

    let mut links = Vec::new();
    for row in document.select(&row_selector) {
        let Some(cell) = row.select(&cell_selector).next() else {
            continue;
        };
        for anchor in cell.select(&link_selector) {
            let name = element_text(anchor);
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            links.push(WeaponLink {
                name,
                url: resolve_wiki_url(root_url, href),
            });
        }
    }
    links
}

/// Drops repeated URLs (keeping the first), applies the allow-list, then the limit.
pub fn select_links(
    links: Vec<WeaponLink>,
    allow_list: &[String],
    limit: Option<usize>,
) -> Vec<WeaponLink> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut selected: Vec<WeaponLink> = links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .filter(|link| allow_list.is_empty() || allow_list.contains(&link.name))
        .collect();

    for wanted in allow_list {
        if !selected.iter().any(|link| &link.name == wanted) {
            tracing::warn!(weapon = %wanted, "requested weapon not found on the index pages");
        }
    }

    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

fn resolve_wiki_url(root_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Ok(base) = Url::parse(root_url)
        && let Ok(joined) = base.join(href)
    {
        return joined.to_string();
    }
    if href.starts_with('/') {
        format!("{root_url}{href}")
    } else {
        format!("{root_url}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://eldenring.wiki.fextralife.com";

    fn index_page() -> String {
        r#"<html><body>
<table class="wiki_table"><thead><tr><th>Name</th><th>Attack</th></tr></thead><tbody>
<tr><td><a href="/Dagger">Dagger</a> <a href="/Black+Knife">Black&nbsp;Knife</a></td><td><a href="/Slash">Slash</a></td></tr>
<tr><td><a href="/Uchigatana">Uchigatana</a></td><td>115</td></tr>
</tbody></table>
<table class="wiki_table"><tbody>
<tr><td><a href="/Dagger">Dagger</a></td></tr>
<tr><td><a href="https://eldenring.wiki.fextralife.com/Claymore">Claymore</a></td></tr>
</tbody></table>
</body></html>"#
            .to_string()
    }

    #[test]
    fn links_keep_document_order() {
        let links = parse_weapon_links(&index_page(), ROOT);
        let names: Vec<&str> = links.iter().map(|link| link.name.as_str()).collect();
        assert_eq!(
            names,
            ["Dagger", "Black Knife", "Uchigatana", "Dagger", "Claymore"]
        );
        assert_eq!(links[1].url, format!("{ROOT}/Black+Knife"));
        assert_eq!(links[4].url, format!("{ROOT}/Claymore"));
    }

    #[test]
    fn selection_dedupes_and_filters() {
        let links = parse_weapon_links(&index_page(), ROOT);
        let all = select_links(links.clone(), &[], None);
        assert_eq!(all.len(), 4);

        let allowed = select_links(
            links.clone(),
            &["Claymore".to_string(), "Dagger".to_string()],
            None,
        );
        let names: Vec<&str> = allowed.iter().map(|link| link.name.as_str()).collect();
        assert_eq!(names, ["Dagger", "Claymore"]);

        let limited = select_links(links, &[], Some(2));
        assert_eq!(limited.len(), 2);
    }
}
