//! Raw scrape records to the typed weapon schema.
//!
//! Labels go through the closed tables in [`crate::lookup`] and an unknown
//! label fails the whole run. Numbers are lenient: whatever does not parse
//! becomes 0.

use anyhow::{Context, Result, anyhow, bail};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use crate::lookup::{Attribute, EffectKey, InfusionKey, PhysicalDamageType, ScalingGrade, WeaponCategory};
use crate::model::{
    InfusionStats, PerEffect, RawInfusionRow, RawWeapon, UpgradeType, Weapon, WeaponProfile,
};

pub async fn load_raw_weapons(path: &Path) -> Result<Vec<RawWeapon>> {
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("failed to check {}", path.display()))?;
    if !exists {
        bail!(
            "scraped data file {} does not exist; run `erdtable scrape` first",
            path.display()
        );
    }
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse scraped weapons from {}", path.display()))
}

/// Normalizes every weapon, keeping input order. The first failure aborts.
pub fn normalize_weapons(raw: &[RawWeapon]) -> Result<Vec<Weapon>> {
    raw.iter()
        .map(|weapon| {
            normalize_weapon(weapon).inspect_err(|err| {
                tracing::error!(weapon = %weapon.name, "failed to normalize: {err:#}");
            })
        })
        .collect()
}

pub fn normalize_weapon(raw: &RawWeapon) -> Result<Weapon> {
    let name = &raw.name;
    let category = WeaponCategory::from_label(&raw.category)
        .ok_or_else(|| anyhow!("{name}: unknown weapon category {:?}", raw.category))?;

    let physical_damage_types = raw
        .physical_damage_types
        .iter()
        .map(|label| {
            PhysicalDamageType::from_label(label)
                .ok_or_else(|| anyhow!("{name}: unknown physical damage type {label:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let required_attributes = raw
        .required_attributes
        .iter()
        .map(|(code, value)| {
            let attribute = Attribute::from_code(code)
                .ok_or_else(|| anyhow!("{name}: unknown attribute code {code:?}"))?;
            Ok((attribute, coerce_number(value)))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let standard = raw
        .infusions
        .get(&InfusionKey::Standard)
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| anyhow!("{name}: missing Standard infusion"))?;

    let infusions: BTreeMap<InfusionKey, Vec<InfusionStats>> = raw
        .infusions
        .iter()
        .map(|(key, rows)| (*key, normalize_rows(rows)))
        .collect();

    Ok(Weapon {
        profile: WeaponProfile {
            name: name.clone(),
            category,
            wiki_url: raw.wiki_url.clone(),
            physical_damage_types,
            upgrade_type: UpgradeType::from_max_level(standard.len() - 1),
            infusable: infusions.len() > 1,
            weapon_art: raw.weapon_art.clone(),
            weight: coerce_number(&raw.weight),
            critical: coerce_number(&raw.critical),
            required_attributes,
        },
        infusions,
    })
}

/// Casting scaling is all-or-nothing per array: if any level has a pair,
/// every level gets one.
fn normalize_rows(rows: &[RawInfusionRow]) -> Vec<InfusionStats> {
    let has_casting = rows.iter().any(|row| row.casting_scaling.is_some());
    rows.iter()
        .map(|row| {
            let mut stats = normalize_stats(row);
            if has_casting && stats.casting_scaling.is_none() {
                stats.casting_scaling = Some([0.0, 0.0]);
            }
            stats
        })
        .collect()
}

pub fn normalize_stats(row: &RawInfusionRow) -> InfusionStats {
    InfusionStats {
        guard_boost: coerce_number(&row.guard_boost),
        casting_scaling: row
            .casting_scaling
            .as_ref()
            .map(|[first, second]| [coerce_number(first), coerce_number(second)]),
        scaling: row.scaling.map(|label| coerce_scaling(label)),
        attack: row.attack.map(|value| coerce_number(value)),
        guard: row.guard.map(|value| coerce_number(value)),
        effects: PerEffect::from_fn(|effect: EffectKey| {
            row.effects
                .as_ref()
                .and_then(|effects| effects.get(&effect))
                .map_or(0.0, |value| coerce_number(value))
        }),
    }
}

/// Parses trimmed text as a number. Empty, unparseable or non-finite input
/// is 0.
pub fn coerce_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Grade letters map to their table value. A numeric label maps to the value
/// of the grade it falls in. Anything else, `-` included, is 0.
pub fn coerce_scaling(label: &str) -> f64 {
    let label = label.trim();
    if let Some(grade) = ScalingGrade::from_letter(label) {
        return f64::from(grade.value());
    }
    label
        .parse::<f64>()
        .ok()
        .and_then(ScalingGrade::from_value)
        .map_or(0.0, |grade| f64::from(grade.value()))
}
