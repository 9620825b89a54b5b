//! Upgrade catalog
//!
//! Each upgrade's effect is a pure function of its installed tier. Applying
//! an upgrade overwrites the stat fields it owns with the value for the new
//! tier, so re-applying never compounds and the install order never matters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::StatBundle;
use crate::consts::SHIELD_RECHARGE_TICKS;

/// Offer buckets; normal play offers one of each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeCategory {
    Tech,
    Combat,
    Addons,
}

impl UpgradeCategory {
    pub const ALL: [UpgradeCategory; 3] = [
        UpgradeCategory::Tech,
        UpgradeCategory::Combat,
        UpgradeCategory::Addons,
    ];
}

/// Upgrade identifiers, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    Thrusters,
    HullPlating,
    NaniteRegen,
    Magnet,
    Shield,
    ShieldCapacitor,
    RapidFire,
    HeavyRounds,
    LongBarrel,
    Multishot,
    Ricochet,
    DroneBay,
    DroneOverclock,
    DroneMunitions,
    DroneSensors,
    Scavenger,
}

impl UpgradeId {
    /// Catalog entry for this id
    pub fn def(self) -> &'static UpgradeDef {
        &CATALOG[self as usize]
    }
}

/// One catalog entry
#[derive(Debug)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    /// Only offerable once the parent is installed at tier >= 1
    pub parent: Option<UpgradeId>,
    pub category: UpgradeCategory,
    pub name: &'static str,
    pub max_tier: u32,
    describe: fn(u32) -> String,
    effect: fn(u32, &mut StatBundle),
}

impl UpgradeDef {
    /// Player-facing text for what `tier` does
    pub fn describe(&self, tier: u32) -> String {
        (self.describe)(tier)
    }

    /// Overwrite the owned stat fields with the values for `tier`
    pub fn apply(&self, tier: u32, stats: &mut StatBundle) {
        (self.effect)(tier, stats);
    }
}

fn pct(step: f32, tier: u32) -> f32 {
    1.0 + step * tier as f32
}

fn thrusters(t: u32, s: &mut StatBundle) {
    s.thrust_mult = pct(0.2, t);
    s.speed_mult = pct(0.1, t);
}
fn hull_plating(t: u32, s: &mut StatBundle) {
    s.hull_bonus_mult = pct(0.25, t);
}
fn nanite_regen(t: u32, s: &mut StatBundle) {
    s.hull_regen = 0.02 * t as f32;
}
fn magnet(t: u32, s: &mut StatBundle) {
    s.pickup_range_mult = pct(0.35, t);
}
fn shield(t: u32, s: &mut StatBundle) {
    s.shield_max = t;
    s.shield_charges = s.shield_charges.max(t).min(s.shield_max);
}
fn shield_capacitor(t: u32, s: &mut StatBundle) {
    s.shield_recharge_ticks = (SHIELD_RECHARGE_TICKS as f32 / pct(0.3, t)).round() as u32;
}
fn rapid_fire(t: u32, s: &mut StatBundle) {
    s.fire_rate_mult = pct(0.2, t);
}
fn heavy_rounds(t: u32, s: &mut StatBundle) {
    s.damage_mult = pct(0.25, t);
}
fn long_barrel(t: u32, s: &mut StatBundle) {
    s.range_mult = pct(0.2, t);
}
fn multishot(t: u32, s: &mut StatBundle) {
    s.multishot = t;
}
fn ricochet(t: u32, s: &mut StatBundle) {
    s.ricochet = t;
}
fn drone_bay(t: u32, s: &mut StatBundle) {
    s.drone_count = t;
}
fn drone_overclock(t: u32, s: &mut StatBundle) {
    s.drone_fire_rate_mult = pct(0.25, t);
}
fn drone_munitions(t: u32, s: &mut StatBundle) {
    s.drone_damage_mult = pct(0.3, t);
}
fn drone_sensors(t: u32, s: &mut StatBundle) {
    s.drone_range_mult = pct(0.25, t);
}
fn scavenger(t: u32, s: &mut StatBundle) {
    s.xp_mult = pct(0.15, t);
}

/// Every upgrade, indexed by `UpgradeId as usize`
pub static CATALOG: [UpgradeDef; 16] = [
    UpgradeDef {
        id: UpgradeId::Thrusters,
        parent: None,
        category: UpgradeCategory::Tech,
        name: "Thrusters",
        max_tier: 5,
        describe: |t| format!("+{}% thrust, +{}% top speed", 20 * t, 10 * t),
        effect: thrusters,
    },
    UpgradeDef {
        id: UpgradeId::HullPlating,
        parent: None,
        category: UpgradeCategory::Tech,
        name: "Hull Plating",
        max_tier: 5,
        describe: |t| format!("+{}% max hull", 25 * t),
        effect: hull_plating,
    },
    UpgradeDef {
        id: UpgradeId::NaniteRegen,
        parent: Some(UpgradeId::HullPlating),
        category: UpgradeCategory::Tech,
        name: "Nanite Regen",
        max_tier: 5,
        describe: |t| format!("Regenerate {:.1} hull/s", 0.02 * t as f32 * 60.0),
        effect: nanite_regen,
    },
    UpgradeDef {
        id: UpgradeId::Magnet,
        parent: None,
        category: UpgradeCategory::Tech,
        name: "Tractor Magnet",
        max_tier: 5,
        describe: |t| format!("+{}% pickup range", 35 * t),
        effect: magnet,
    },
    UpgradeDef {
        id: UpgradeId::Shield,
        parent: None,
        category: UpgradeCategory::Tech,
        name: "Shield Module",
        max_tier: 3,
        describe: |t| format!("{t} shield charge(s) absorb lethal hits"),
        effect: shield,
    },
    UpgradeDef {
        id: UpgradeId::ShieldCapacitor,
        parent: Some(UpgradeId::Shield),
        category: UpgradeCategory::Tech,
        name: "Shield Capacitor",
        max_tier: 4,
        describe: |t| format!("Shields recharge {}% faster", 30 * t),
        effect: shield_capacitor,
    },
    UpgradeDef {
        id: UpgradeId::RapidFire,
        parent: None,
        category: UpgradeCategory::Combat,
        name: "Rapid Fire",
        max_tier: 6,
        describe: |t| format!("+{}% fire rate", 20 * t),
        effect: rapid_fire,
    },
    UpgradeDef {
        id: UpgradeId::HeavyRounds,
        parent: None,
        category: UpgradeCategory::Combat,
        name: "Heavy Rounds",
        max_tier: 6,
        describe: |t| format!("+{}% bullet damage", 25 * t),
        effect: heavy_rounds,
    },
    UpgradeDef {
        id: UpgradeId::LongBarrel,
        parent: None,
        category: UpgradeCategory::Combat,
        name: "Long Barrel",
        max_tier: 4,
        describe: |t| format!("+{}% bullet range", 20 * t),
        effect: long_barrel,
    },
    UpgradeDef {
        id: UpgradeId::Multishot,
        parent: None,
        category: UpgradeCategory::Combat,
        name: "Multishot",
        max_tier: 4,
        describe: |t| format!("Fire {} bullets per volley", t + 1),
        effect: multishot,
    },
    UpgradeDef {
        id: UpgradeId::Ricochet,
        parent: None,
        category: UpgradeCategory::Combat,
        name: "Ricochet",
        max_tier: 3,
        describe: |t| format!("Bullets bounce to {t} more target(s)"),
        effect: ricochet,
    },
    UpgradeDef {
        id: UpgradeId::DroneBay,
        parent: None,
        category: UpgradeCategory::Addons,
        name: "Drone Bay",
        max_tier: 4,
        describe: |t| format!("{t} escort drone(s)"),
        effect: drone_bay,
    },
    UpgradeDef {
        id: UpgradeId::DroneOverclock,
        parent: Some(UpgradeId::DroneBay),
        category: UpgradeCategory::Addons,
        name: "Drone Overclock",
        max_tier: 4,
        describe: |t| format!("Drones fire {}% faster", 25 * t),
        effect: drone_overclock,
    },
    UpgradeDef {
        id: UpgradeId::DroneMunitions,
        parent: Some(UpgradeId::DroneBay),
        category: UpgradeCategory::Addons,
        name: "Drone Munitions",
        max_tier: 4,
        describe: |t| format!("+{}% drone damage", 30 * t),
        effect: drone_munitions,
    },
    UpgradeDef {
        id: UpgradeId::DroneSensors,
        parent: Some(UpgradeId::DroneBay),
        category: UpgradeCategory::Addons,
        name: "Drone Sensors",
        max_tier: 3,
        describe: |t| format!("+{}% drone targeting range", 25 * t),
        effect: drone_sensors,
    },
    UpgradeDef {
        id: UpgradeId::Scavenger,
        parent: None,
        category: UpgradeCategory::Addons,
        name: "Scavenger",
        max_tier: 5,
        describe: |t| format!("+{}% XP from kills and orbs", 15 * t),
        effect: scavenger,
    },
];

/// Whether `def` may be offered given the installed tiers
pub fn is_offerable(def: &UpgradeDef, active: &BTreeMap<UpgradeId, u32>) -> bool {
    let tier = active.get(&def.id).copied().unwrap_or(0);
    let parent_ok = def
        .parent
        .is_none_or(|parent| active.get(&parent).copied().unwrap_or(0) >= 1);
    tier < def.max_tier && parent_ok
}

/// Stat bundle from scratch for a set of installed tiers
#[cfg(test)]
pub fn derive_stats(active: &BTreeMap<UpgradeId, u32>) -> StatBundle {
    let mut stats = StatBundle::default();
    for (id, &tier) in active {
        id.def().apply(tier, &mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_id_order() {
        for (i, def) in CATALOG.iter().enumerate() {
            assert_eq!(def.id as usize, i, "{} out of place", def.name);
        }
    }

    #[test]
    fn test_parents_are_root_upgrades() {
        for def in &CATALOG {
            if let Some(parent) = def.parent {
                assert!(parent.def().parent.is_none());
                assert_eq!(parent.def().category, def.category);
            }
        }
    }

    #[test]
    fn test_reapply_does_not_compound() {
        let def = UpgradeId::RapidFire.def();
        let mut stats = StatBundle::default();
        def.apply(1, &mut stats);
        def.apply(2, &mut stats);
        let mut fresh = StatBundle::default();
        def.apply(2, &mut fresh);
        assert_eq!(stats.fire_rate_mult, fresh.fire_rate_mult);
        assert!((stats.fire_rate_mult - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_parent_gating() {
        let mut active = BTreeMap::new();
        assert!(!is_offerable(UpgradeId::DroneOverclock.def(), &active));
        active.insert(UpgradeId::DroneBay, 1);
        assert!(is_offerable(UpgradeId::DroneOverclock.def(), &active));
    }

    #[test]
    fn test_max_tier_not_offerable() {
        let mut active = BTreeMap::new();
        active.insert(UpgradeId::Ricochet, UpgradeId::Ricochet.def().max_tier);
        assert!(!is_offerable(UpgradeId::Ricochet.def(), &active));
    }

    #[test]
    fn test_every_category_has_roots() {
        for category in UpgradeCategory::ALL {
            assert!(
                CATALOG
                    .iter()
                    .any(|d| d.category == category && d.parent.is_none())
            );
        }
    }

    #[test]
    fn test_descriptions_mention_tier_values() {
        assert_eq!(UpgradeId::Multishot.def().describe(2), "Fire 3 bullets per volley");
        assert_eq!(UpgradeId::HeavyRounds.def().describe(1), "+25% bullet damage");
    }
}
