use anyhow::{Context, Result, bail};
use futures::future::{join_all, try_join_all};
use scraper::Html;
use std::collections::BTreeMap;

use super::extract::{
    scrape_category, scrape_critical, scrape_name, scrape_physical_damage_types,
    scrape_required_attributes, scrape_weapon_art, scrape_weight,
};
use super::index::WeaponLink;
use super::locate::locate_infusion_table;
use super::table::{TableGrid, map_rows};
use super::PageCache;
use crate::lookup::InfusionKey;
use crate::model::{RawInfusionRow, RawWeapon};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    /// Log failed pages and leave them out instead of aborting the run.
    pub keep_going: bool,
}

/// Builds the raw record of one weapon page.
pub fn scrape_weapon(url: &str, html: &str) -> Result<RawWeapon> {
    let document = Html::parse_document(html);
    let name = scrape_name(&document);
    tracing::debug!(weapon = %name, "scraping");

    build_weapon(url, &name, &document).inspect_err(|err| {
        tracing::error!(weapon = %name, url, "failed to scrape weapon: {err:#}");
    })
}

fn build_weapon(url: &str, name: &str, document: &Html) -> Result<RawWeapon> {
    let infusions = scrape_infusions(document);
    match infusions.get(&InfusionKey::Standard) {
        None => bail!("{name}: no Standard upgrade table at {url}"),
        Some(rows) if rows.is_empty() => {
            bail!("{name}: Standard upgrade table at {url} has no levels")
        }
        Some(_) => {}
    }

    Ok(RawWeapon {
        name: name.to_string(),
        category: scrape_category(document),
        wiki_url: url.to_string(),
        physical_damage_types: scrape_physical_damage_types(document),
        required_attributes: scrape_required_attributes(document),
        weapon_art: scrape_weapon_art(document),
        weight: scrape_weight(document),
        critical: scrape_critical(document),
        infusions,
    })
}

fn scrape_infusions(document: &Html) -> BTreeMap<InfusionKey, Vec<RawInfusionRow>> {
    let mut infusions = BTreeMap::new();
    for key in InfusionKey::ALL {
        let Some(table) = locate_infusion_table(document, key.wiki_name()) else {
            tracing::debug!(infusion = %key, "no upgrade table");
            continue;
        };
        let grid = TableGrid::from_table(table);
        infusions.insert(key, map_rows(&grid));
    }
    infusions
}

async fn scrape_link(cache: &PageCache, link: &WeaponLink) -> Result<RawWeapon> {
    let html = cache
        .load(&link.url)
        .await
        .with_context(|| format!("failed to load page of {}", link.name))?;
    scrape_weapon(&link.url, &html).with_context(|| format!("failed to scrape {}", link.name))
}

/// Scrapes every link concurrently. Results keep the order of `links`.
pub async fn scrape_all(
    cache: &PageCache,
    links: &[WeaponLink],
    options: ScrapeOptions,
) -> Result<Vec<RawWeapon>> {
    let tasks = links.iter().map(|link| scrape_link(cache, link));
    if !options.keep_going {
        return try_join_all(tasks).await;
    }

    let mut weapons = Vec::with_capacity(links.len());
    for (link, result) in links.iter().zip(join_all(tasks).await) {
        match result {
            Ok(weapon) => weapons.push(weapon),
            Err(err) => tracing::warn!(weapon = %link.name, "skipping weapon: {err:#}"),
        }
    }
    Ok(weapons)
}
