use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InfusionKey {
    Standard,
    Heavy,
    Keen,
    Quality,
    Fire,
    Flame,
    Lightning,
    Sacred,
    Magic,
    Cold,
    Poison,
    Blood,
    Occult,
}

impl InfusionKey {
    pub const ALL: [Self; 13] = [
        Self::Standard,
        Self::Heavy,
        Self::Keen,
        Self::Quality,
        Self::Fire,
        Self::Flame,
        Self::Lightning,
        Self::Sacred,
        Self::Magic,
        Self::Cold,
        Self::Poison,
        Self::Blood,
        Self::Occult,
    ];

    /// Name used by the wiki in table headers and headings.
    pub const fn wiki_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Heavy => "Heavy",
            Self::Keen => "Keen",
            Self::Quality => "Quality",
            Self::Fire => "Fire",
            Self::Flame => "Flame",
            Self::Lightning => "Lightning",
            Self::Sacred => "Sacred",
            Self::Magic => "Magic",
            Self::Cold => "Cold",
            Self::Poison => "Poison",
            Self::Blood => "Blood",
            Self::Occult => "Occult",
        }
    }
}

impl fmt::Display for InfusionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wiki_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
    Faith,
    Arcane,
}

impl Attribute {
    pub const ALL: [Self; 5] = [
        Self::Strength,
        Self::Dexterity,
        Self::Intelligence,
        Self::Faith,
        Self::Arcane,
    ];

    /// Abbreviation used in the wiki's requirement box and scaling headers.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Strength => "Str",
            Self::Dexterity => "Dex",
            Self::Intelligence => "Int",
            Self::Faith => "Fai",
            Self::Arcane => "Arc",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.code() == code)
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Intelligence => "intelligence",
            Self::Faith => "faith",
            Self::Arcane => "arcane",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    Physical,
    Magic,
    Fire,
    Lightning,
    Holy,
}

impl DamageType {
    pub const ALL: [Self; 5] = [
        Self::Physical,
        Self::Magic,
        Self::Fire,
        Self::Lightning,
        Self::Holy,
    ];

    /// Column code in the upgrade tables.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Physical => "Phy",
            Self::Magic => "Mag",
            Self::Fire => "Fir",
            Self::Lightning => "Lit",
            Self::Holy => "Hol",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Magic => "magic",
            Self::Fire => "fire",
            Self::Lightning => "lightning",
            Self::Holy => "holy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhysicalDamageType {
    Standard,
    Strike,
    Slash,
    Pierce,
}

impl PhysicalDamageType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Standard" => Some(Self::Standard),
            "Strike" => Some(Self::Strike),
            "Slash" => Some(Self::Slash),
            "Pierce" => Some(Self::Pierce),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Strike => "Strike",
            Self::Slash => "Slash",
            Self::Pierce => "Pierce",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKey {
    Bleed,
    Frost,
    Poison,
    DeadlyPoison,
    Rot,
    Sleep,
    Madness,
    Death,
}

impl EffectKey {
    pub const ALL: [Self; 8] = [
        Self::Bleed,
        Self::Frost,
        Self::Poison,
        Self::DeadlyPoison,
        Self::Rot,
        Self::Sleep,
        Self::Madness,
        Self::Death,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Bleed => "bleed",
            Self::Frost => "frost",
            Self::Poison => "poison",
            Self::DeadlyPoison => "deadly_poison",
            Self::Rot => "rot",
            Self::Sleep => "sleep",
            Self::Madness => "madness",
            Self::Death => "death",
        }
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Bleed => "Bleed",
            Self::Frost => "Frost",
            Self::Poison => "Poison",
            Self::DeadlyPoison => "Deadly Poison",
            Self::Rot => "Rot",
            Self::Sleep => "Sleep",
            Self::Madness => "Madness",
            Self::Death => "Death",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponCategory {
    Dagger,
    StraightSword,
    Greatsword,
    ColossalSword,
    ThrustingSword,
    HeavyThrustingSword,
    CurvedSword,
    CurvedGreatsword,
    Katana,
    Twinblade,
    Axe,
    Greataxe,
    Hammer,
    Flail,
    GreatHammer,
    ColossalWeapon,
    Spear,
    GreatSpear,
    Halberd,
    Reaper,
    Whip,
    Fist,
    Claw,
    LightBow,
    Bow,
    Greatbow,
    Crossbow,
    Ballista,
    GlintstoneStaff,
    SacredSeal,
    Torch,
    SmallShield,
    MediumShield,
    Greatshield,
}

impl WeaponCategory {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dagger => "Dagger",
            Self::StraightSword => "Straight Sword",
            Self::Greatsword => "Greatsword",
            Self::ColossalSword => "Colossal Sword",
            Self::ThrustingSword => "Thrusting Sword",
            Self::HeavyThrustingSword => "Heavy Thrusting Sword",
            Self::CurvedSword => "Curved Sword",
            Self::CurvedGreatsword => "Curved Greatsword",
            Self::Katana => "Katana",
            Self::Twinblade => "Twinblade",
            Self::Axe => "Axe",
            Self::Greataxe => "Greataxe",
            Self::Hammer => "Hammer",
            Self::Flail => "Flail",
            Self::GreatHammer => "Great Hammer",
            Self::ColossalWeapon => "Colossal Weapon",
            Self::Spear => "Spear",
            Self::GreatSpear => "Great Spear",
            Self::Halberd => "Halberd",
            Self::Reaper => "Reaper",
            Self::Whip => "Whip",
            Self::Fist => "Fist",
            Self::Claw => "Claw",
            Self::LightBow => "Light Bow",
            Self::Bow => "Bow",
            Self::Greatbow => "Greatbow",
            Self::Crossbow => "Crossbow",
            Self::Ballista => "Ballista",
            Self::GlintstoneStaff => "Glintstone Staff",
            Self::SacredSeal => "Sacred Seal",
            Self::Torch => "Torch",
            Self::SmallShield => "Small Shield",
            Self::MediumShield => "Medium Shield",
            Self::Greatshield => "Greatshield",
        }
    }

    /// Translates a breadcrumb label from the wiki. Both singular and plural
    /// spellings are accepted; anything else is unknown.
    pub fn from_label(label: &str) -> Option<Self> {
        category_aliases().get(label.trim()).copied()
    }
}

impl fmt::Display for WeaponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn category_aliases() -> &'static FxHashMap<&'static str, WeaponCategory> {
    static CATEGORY_ALIASES: OnceLock<FxHashMap<&'static str, WeaponCategory>> = OnceLock::new();
    CATEGORY_ALIASES.get_or_init(|| {
        use WeaponCategory::{
            Axe, Ballista, Bow, Claw, ColossalSword, ColossalWeapon, Crossbow, CurvedGreatsword,
            CurvedSword, Dagger, Fist, Flail, GlintstoneStaff, GreatHammer, GreatSpear, Greataxe,
            Greatbow, Greatshield, Greatsword, Halberd, Hammer, HeavyThrustingSword, Katana,
            LightBow, MediumShield, Reaper, SacredSeal, SmallShield, Spear, StraightSword,
            ThrustingSword, Torch, Twinblade, Whip,
        };
        [
            ("Dagger", Dagger),
            ("Daggers", Dagger),
            ("Straight Sword", StraightSword),
            ("Straight Swords", StraightSword),
            ("Greatsword", Greatsword),
            ("Greatswords", Greatsword),
            ("Colossal Sword", ColossalSword),
            ("Colossal Swords", ColossalSword),
            ("Thrusting Sword", ThrustingSword),
            ("Thrusting Swords", ThrustingSword),
            ("Heavy Thrusting Sword", HeavyThrustingSword),
            ("Heavy Thrusting Swords", HeavyThrustingSword),
            ("Curved Sword", CurvedSword),
            ("Curved Swords", CurvedSword),
            ("Curved Greatsword", CurvedGreatsword),
            ("Curved Greatswords", CurvedGreatsword),
            ("Katana", Katana),
            ("Katanas", Katana),
            ("Twinblade", Twinblade),
            ("Twinblades", Twinblade),
            ("Axe", Axe),
            ("Axes", Axe),
            ("Greataxe", Greataxe),
            ("Greataxes", Greataxe),
            ("Hammer", Hammer),
            ("Hammers", Hammer),
            ("Flail", Flail),
            ("Flails", Flail),
            ("Great Hammer", GreatHammer),
            ("Great Hammers", GreatHammer),
            ("Colossal Weapon", ColossalWeapon),
            ("Colossal Weapons", ColossalWeapon),
            ("Spear", Spear),
            ("Spears", Spear),
            ("Great Spear", GreatSpear),
            ("Great Spears", GreatSpear),
            ("Halberd", Halberd),
            ("Halberds", Halberd),
            ("Reaper", Reaper),
            ("Reapers", Reaper),
            ("Whip", Whip),
            ("Whips", Whip),
            ("Fist", Fist),
            ("Fists", Fist),
            ("Claw", Claw),
            ("Claws", Claw),
            ("Light Bow", LightBow),
            ("Light Bows", LightBow),
            ("Bow", Bow),
            ("Bows", Bow),
            ("Greatbow", Greatbow),
            ("Greatbows", Greatbow),
            ("Crossbow", Crossbow),
            ("Crossbows", Crossbow),
            ("Ballista", Ballista),
            ("Ballistae", Ballista),
            ("Ballistas", Ballista),
            ("Glintstone Staff", GlintstoneStaff),
            ("Glintstone Staffs", GlintstoneStaff),
            ("Glintstone Staves", GlintstoneStaff),
            ("Sacred Seal", SacredSeal),
            ("Sacred Seals", SacredSeal),
            // The plain torch is filed under key items on the wiki.
            ("Key Items", Torch),
            ("Torch", Torch),
            ("Torches", Torch),
            ("Small Shield", SmallShield),
            ("Small Shields", SmallShield),
            ("Medium Shield", MediumShield),
            ("Medium Shields", MediumShield),
            ("Greatshield", Greatshield),
            ("Greatshields", Greatshield),
        ]
        .into_iter()
        .collect()
    })
}

/// Letter grade summarizing how strongly an attribute boosts attack power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScalingGrade {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl ScalingGrade {
    /// Lowest grade first; thresholds must stay ascending.
    const TABLE: [(u32, Self); 6] = [
        (100, Self::E),
        (200, Self::D),
        (300, Self::C),
        (400, Self::B),
        (500, Self::A),
        (600, Self::S),
    ];

    pub const fn value(self) -> u32 {
        match self {
            Self::E => 100,
            Self::D => 200,
            Self::C => 300,
            Self::B => 400,
            Self::A => 500,
            Self::S => 600,
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::D => "D",
            Self::C => "C",
            Self::B => "B",
            Self::A => "A",
            Self::S => "S",
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        Self::TABLE
            .into_iter()
            .map(|(_, grade)| grade)
            .find(|grade| grade.letter() == letter)
    }

    /// Highest grade whose threshold does not exceed `value`. Values below the
    /// lowest threshold have no grade.
    pub fn from_value(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::TABLE
            .into_iter()
            .rev()
            .find(|(threshold, _)| value >= f64::from(*threshold))
            .map(|(_, grade)| grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_accept_singular_and_plural() {
        assert_eq!(
            WeaponCategory::from_label("Straight Swords"),
            Some(WeaponCategory::StraightSword)
        );
        assert_eq!(
            WeaponCategory::from_label(" Katana "),
            Some(WeaponCategory::Katana)
        );
        assert_eq!(
            WeaponCategory::from_label("Key Items"),
            Some(WeaponCategory::Torch)
        );
        assert_eq!(WeaponCategory::from_label("Spell Tools"), None);
    }

    #[test]
    fn attribute_codes_are_closed() {
        assert_eq!(Attribute::from_code("Str"), Some(Attribute::Strength));
        assert_eq!(Attribute::from_code("Arc"), Some(Attribute::Arcane));
        assert_eq!(Attribute::from_code("str"), None);
        assert_eq!(Attribute::from_code("Luck"), None);
    }

    #[test]
    fn scaling_grade_thresholds() {
        assert_eq!(ScalingGrade::from_letter("D").map(ScalingGrade::value), Some(200));
        assert_eq!(ScalingGrade::from_letter("-"), None);
        assert_eq!(ScalingGrade::from_value(99.0), None);
        assert_eq!(ScalingGrade::from_value(100.0), Some(ScalingGrade::E));
        assert_eq!(ScalingGrade::from_value(450.0), Some(ScalingGrade::B));
        assert_eq!(ScalingGrade::from_value(900.0), Some(ScalingGrade::S));
        assert_eq!(ScalingGrade::from_value(f64::NAN), None);
    }

    #[test]
    fn infusion_keys_serialize_as_camel_case() {
        let json = serde_json::to_string(&InfusionKey::Standard).unwrap();
        assert_eq!(json, "\"standard\"");
        let json = serde_json::to_string(&EffectKey::DeadlyPoison).unwrap();
        assert_eq!(json, "\"deadlyPoison\"");
    }
}
