use crate::lookup::{
    Attribute, DamageType, EffectKey, InfusionKey, PhysicalDamageType, WeaponCategory,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest reinforcement level reachable with somber smithing stones.
pub const SOMBER_MAX_LEVEL: usize = 10;

/// One weapon as it was read off its wiki page, before any translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWeapon {
    pub name: String,
    #[serde(alias = "weaponType")]
    pub category: String,
    pub wiki_url: String,
    pub physical_damage_types: Vec<String>,
    pub required_attributes: BTreeMap<String, String>,
    pub weapon_art: String,
    pub weight: String,
    pub critical: String,
    pub infusions: BTreeMap<InfusionKey, Vec<RawInfusionRow>>,
}

/// One upgrade level of one infusion, cell text as scraped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInfusionRow {
    pub guard_boost: String,
    pub casting_scaling: Option<[String; 2]>,
    pub scaling: PerAttribute<String>,
    pub attack: PerDamage<String>,
    pub guard: PerDamage<String>,
    /// `None` for files written before the effect breakdown was scraped.
    #[serde(default)]
    pub effects: Option<BTreeMap<EffectKey, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeType {
    Standard,
    Somber,
}

impl UpgradeType {
    pub const fn from_max_level(max_level: usize) -> Self {
        if max_level > SOMBER_MAX_LEVEL {
            Self::Standard
        } else {
            Self::Somber
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Somber => "Somber",
        }
    }
}

/// Everything about a weapon that does not depend on infusion or level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponProfile {
    pub name: String,
    pub category: WeaponCategory,
    pub wiki_url: String,
    pub physical_damage_types: Vec<PhysicalDamageType>,
    pub upgrade_type: UpgradeType,
    pub infusable: bool,
    pub weapon_art: String,
    pub weight: f64,
    pub critical: f64,
    pub required_attributes: BTreeMap<Attribute, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    #[serde(flatten)]
    pub profile: WeaponProfile,
    pub infusions: BTreeMap<InfusionKey, Vec<InfusionStats>>,
}

impl Weapon {
    /// Upgrade level of the last row of the given infusion.
    pub fn max_level(&self, infusion: InfusionKey) -> Option<usize> {
        self.infusions
            .get(&infusion)
            .and_then(|levels| levels.len().checked_sub(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfusionStats {
    pub guard_boost: f64,
    pub casting_scaling: Option<[f64; 2]>,
    pub scaling: PerAttribute<f64>,
    pub attack: PerDamage<f64>,
    pub guard: PerDamage<f64>,
    pub effects: PerEffect<f64>,
}

/// A weapon at the highest level of one infusion, as shown in the table view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfusedWeapon {
    #[serde(flatten)]
    pub profile: WeaponProfile,
    pub infusion: InfusionKey,
    pub level: usize,
    #[serde(flatten)]
    pub stats: InfusionStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerAttribute<T> {
    pub strength: T,
    pub dexterity: T,
    pub intelligence: T,
    pub faith: T,
    pub arcane: T,
}

impl<T> PerAttribute<T> {
    pub fn from_fn(mut f: impl FnMut(Attribute) -> T) -> Self {
        Self {
            strength: f(Attribute::Strength),
            dexterity: f(Attribute::Dexterity),
            intelligence: f(Attribute::Intelligence),
            faith: f(Attribute::Faith),
            arcane: f(Attribute::Arcane),
        }
    }

    pub const fn get(&self, attribute: Attribute) -> &T {
        match attribute {
            Attribute::Strength => &self.strength,
            Attribute::Dexterity => &self.dexterity,
            Attribute::Intelligence => &self.intelligence,
            Attribute::Faith => &self.faith,
            Attribute::Arcane => &self.arcane,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerAttribute<U> {
        PerAttribute::from_fn(|attribute| f(self.get(attribute)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerDamage<T> {
    pub physical: T,
    pub magic: T,
    pub fire: T,
    pub lightning: T,
    pub holy: T,
}

impl<T> PerDamage<T> {
    pub fn from_fn(mut f: impl FnMut(DamageType) -> T) -> Self {
        Self {
            physical: f(DamageType::Physical),
            magic: f(DamageType::Magic),
            fire: f(DamageType::Fire),
            lightning: f(DamageType::Lightning),
            holy: f(DamageType::Holy),
        }
    }

    pub const fn get(&self, damage: DamageType) -> &T {
        match damage {
            DamageType::Physical => &self.physical,
            DamageType::Magic => &self.magic,
            DamageType::Fire => &self.fire,
            DamageType::Lightning => &self.lightning,
            DamageType::Holy => &self.holy,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerDamage<U> {
        PerDamage::from_fn(|damage| f(self.get(damage)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerEffect<T> {
    pub bleed: T,
    pub frost: T,
    pub poison: T,
    pub deadly_poison: T,
    pub rot: T,
    pub sleep: T,
    pub madness: T,
    pub death: T,
}

impl<T> PerEffect<T> {
    pub fn from_fn(mut f: impl FnMut(EffectKey) -> T) -> Self {
        Self {
            bleed: f(EffectKey::Bleed),
            frost: f(EffectKey::Frost),
            poison: f(EffectKey::Poison),
            deadly_poison: f(EffectKey::DeadlyPoison),
            rot: f(EffectKey::Rot),
            sleep: f(EffectKey::Sleep),
            madness: f(EffectKey::Madness),
            death: f(EffectKey::Death),
        }
    }

    pub const fn get(&self, effect: EffectKey) -> &T {
        match effect {
            EffectKey::Bleed => &self.bleed,
            EffectKey::Frost => &self.frost,
            EffectKey::Poison => &self.poison,
            EffectKey::DeadlyPoison => &self.deadly_poison,
            EffectKey::Rot => &self.rot,
            EffectKey::Sleep => &self.sleep,
            EffectKey::Madness => &self.madness,
            EffectKey::Death => &self.death,
        }
    }
}
