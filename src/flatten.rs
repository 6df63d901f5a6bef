use anyhow::{Context, Result};
use csv::Writer;

use crate::lookup::{Attribute, DamageType, EffectKey};
use crate::model::{InfusedWeapon, Weapon};

/// One row per weapon and infusion, taken at that infusion's highest level.
/// Rows follow weapon order, then infusion key order.
pub fn flatten_weapons(weapons: &[Weapon]) -> Vec<InfusedWeapon> {
    weapons.iter().flat_map(flatten_weapon).collect()
}

fn flatten_weapon(weapon: &Weapon) -> impl Iterator<Item = InfusedWeapon> + '_ {
    weapon.infusions.iter().filter_map(|(key, levels)| {
        let level = weapon.max_level(*key)?;
        Some(InfusedWeapon {
            profile: weapon.profile.clone(),
            infusion: *key,
            level,
            stats: levels.get(level)?.clone(),
        })
    })
}

pub fn csv_header() -> Vec<String> {
    let mut header: Vec<String> = [
        "name",
        "category",
        "infusion",
        "level",
        "upgrade_type",
        "infusable",
        "physical_damage_types",
        "weapon_art",
        "weight",
        "critical",
        "guard_boost",
        "casting_scaling_min",
        "casting_scaling_max",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    header.extend(Attribute::ALL.iter().map(|attr| format!("required_{}", attr.key())));
    header.extend(Attribute::ALL.iter().map(|attr| format!("scaling_{}", attr.key())));
    header.extend(DamageType::ALL.iter().map(|damage| format!("attack_{}", damage.key())));
    header.extend(DamageType::ALL.iter().map(|damage| format!("guard_{}", damage.key())));
    header.extend(EffectKey::ALL.iter().map(|effect| format!("effect_{}", effect.key())));
    header
}

fn csv_record(row: &InfusedWeapon) -> Vec<String> {
    let profile = &row.profile;
    let stats = &row.stats;
    let casting = stats.casting_scaling;
    let mut record = vec![
        profile.name.clone(),
        profile.category.name().to_string(),
        row.infusion.wiki_name().to_string(),
        row.level.to_string(),
        profile.upgrade_type.label().to_string(),
        profile.infusable.to_string(),
        profile
            .physical_damage_types
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join("/"),
        profile.weapon_art.clone(),
        profile.weight.to_string(),
        profile.critical.to_string(),
        stats.guard_boost.to_string(),
        casting.map_or_else(String::new, |[min, _]| min.to_string()),
        casting.map_or_else(String::new, |[_, max]| max.to_string()),
    ];
    record.extend(Attribute::ALL.iter().map(|attr| {
        profile
            .required_attributes
            .get(attr)
            .map_or_else(String::new, ToString::to_string)
    }));
    record.extend(Attribute::ALL.iter().map(|attr| stats.scaling.get(*attr).to_string()));
    record.extend(DamageType::ALL.iter().map(|damage| stats.attack.get(*damage).to_string()));
    record.extend(DamageType::ALL.iter().map(|damage| stats.guard.get(*damage).to_string()));
    record.extend(EffectKey::ALL.iter().map(|effect| stats.effects.get(*effect).to_string()));
    record
}

pub fn serialize_infused_csv(rows: &[InfusedWeapon]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(csv_header())
        .context("failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(csv_record(row))
            .with_context(|| format!("failed to serialize {} ({})", row.profile.name, row.infusion))?;
    }
    finalize_writer(writer, "infused weapons CSV writer")
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::lookup::{InfusionKey, PhysicalDamageType, WeaponCategory};
    use crate::model::{InfusionStats, PerDamage, UpgradeType, Weapon, WeaponProfile};
    use std::collections::BTreeMap;

    /// A weapon whose attack power at each level is `100 + level`.
    pub fn weapon(name: &str, infusions: &[(InfusionKey, usize)]) -> Weapon {
        let levels = |count: usize| {
            (0..count)
                .map(|level| InfusionStats {
                    attack: PerDamage {
                        physical: 100.0 + level as f64,
                        ..PerDamage::default()
                    },
                    ..InfusionStats::default()
                })
                .collect::<Vec<_>>()
        };
        Weapon {
            profile: WeaponProfile {
                name: name.to_string(),
                category: WeaponCategory::Katana,
                wiki_url: format!("https://wiki.test/{name}"),
                physical_damage_types: vec![PhysicalDamageType::Slash, PhysicalDamageType::Pierce],
                upgrade_type: UpgradeType::Standard,
                infusable: infusions.len() > 1,
                weapon_art: "Unsheathe".to_string(),
                weight: 5.5,
                critical: 100.0,
                required_attributes: BTreeMap::new(),
            },
            infusions: infusions
                .iter()
                .map(|(key, count)| (*key, levels(*count)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::weapon;
    use super::*;
    use crate::lookup::InfusionKey;

    #[test]
    fn one_row_per_infusion_at_max_level() {
        let weapons = [
            weapon("Uchigatana", &[(InfusionKey::Standard, 26), (InfusionKey::Keen, 26)]),
            weapon("Moonveil", &[(InfusionKey::Standard, 11)]),
        ];
        let rows = flatten_weapons(&weapons);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].profile.name, "Uchigatana");
        assert_eq!(rows[0].infusion, InfusionKey::Standard);
        assert_eq!(rows[1].infusion, InfusionKey::Keen);
        assert_eq!(rows[1].level, 25);
        assert_eq!(rows[1].stats.attack.physical, 125.0);
        assert_eq!(rows[2].level, 10);
        assert_eq!(rows[2].stats.attack.physical, 110.0);
    }

    #[test]
    fn empty_infusion_arrays_are_skipped() {
        let rows = flatten_weapons(&[weapon("Odd", &[(InfusionKey::Standard, 26), (InfusionKey::Heavy, 0)])]);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn csv_has_one_column_per_scalar() {
        let rows = flatten_weapons(&[weapon("Uchigatana", &[(InfusionKey::Standard, 26)])]);
        let bytes = serialize_infused_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let record: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header.len(), record.len());
        assert_eq!(header.len(), csv_header().len());

        let column = |name: &str| header.iter().position(|h| *h == name).unwrap();
        assert_eq!(record[column("attack_physical")], "125");
        assert_eq!(record[column("physical_damage_types")], "Slash/Pierce");
        assert_eq!(record[column("casting_scaling_min")], "");
        assert_eq!(record[column("effect_deadly_poison")], "0");
        assert_eq!(record[column("required_strength")], "");
        assert!(lines.next().is_none());
    }
}
