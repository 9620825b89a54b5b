//! Data-driven game balance
//!
//! Spawn pacing and loot tables. Defaults are the shipped balance; a JSON
//! file can override any subset.

use serde::{Deserialize, Serialize};

use crate::error::SimResult;

/// Cooldown and gate settings for one special-threat family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatFamily {
    /// Family stays inert below this level
    pub min_level: u32,
    /// Cooldown at the gate level (ticks)
    pub start_cooldown: f32,
    /// Cooldown reduction per level (ticks)
    pub decrease_per_level: f32,
    /// Floor before variance is added (ticks)
    pub min_cooldown: f32,
    /// Random extra cooldown in [0, variance) (ticks)
    pub variance: f32,
}

impl ThreatFamily {
    /// Cooldown to use after a spawn at `level`
    pub fn base_cooldown(&self, level: u32) -> f32 {
        (self.start_cooldown - level as f32 * self.decrease_per_level).max(self.min_cooldown)
    }
}

/// Balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Density ===
    pub density_base: u32,
    pub density_cap: u32,
    /// Ticks between single spawns
    pub single_cooldown: f32,
    /// Ticks after a formation spawn
    pub formation_cooldown: f32,
    pub formation_chance: f32,
    pub formation_min_level: u32,

    // === Size weighting ===
    pub size_gate_level: u32,
    pub small_chance_early: f32,
    pub medium_chance: f32,
    pub large_per_level: f32,
    pub large_cap: f32,

    // === Special threats ===
    pub elemental: ThreatFamily,
    pub behemoth: ThreatFamily,
    pub swarm: ThreatFamily,
    /// Share of elemental spawns that are frost instead of comets
    pub frost_share: f32,

    // === Loot ===
    pub hull_drop_chance: f32,
    pub xp_drop_chance: f32,
    pub freebie_drop_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            density_base: 4,
            density_cap: 10,
            single_cooldown: 45.0,
            formation_cooldown: 240.0,
            formation_chance: 0.2,
            formation_min_level: 2,

            size_gate_level: 4,
            small_chance_early: 0.7,
            medium_chance: 0.35,
            large_per_level: 0.05,
            large_cap: 0.35,

            elemental: ThreatFamily {
                min_level: 3,
                start_cooldown: 900.0,
                decrease_per_level: 40.0,
                min_cooldown: 300.0,
                variance: 180.0,
            },
            behemoth: ThreatFamily {
                min_level: 6,
                start_cooldown: 2400.0,
                decrease_per_level: 60.0,
                min_cooldown: 1200.0,
                variance: 600.0,
            },
            swarm: ThreatFamily {
                min_level: 5,
                start_cooldown: 1500.0,
                decrease_per_level: 50.0,
                min_cooldown: 600.0,
                variance: 300.0,
            },
            frost_share: 0.35,

            hull_drop_chance: 0.06,
            xp_drop_chance: 0.3,
            freebie_drop_chance: 0.01,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance file
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Desired live standard-asteroid count at `level`
    pub fn density_target(&self, level: u32) -> usize {
        (self.density_base + level.min(self.density_cap)) as usize
    }

    /// Probability of a large (size 3) spawn at `level`
    pub fn large_chance(&self, level: u32) -> f32 {
        if level < self.size_gate_level {
            0.0
        } else {
            ((level - self.size_gate_level + 1) as f32 * self.large_per_level).min(self.large_cap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_target_caps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.density_target(1), 5);
        assert_eq!(tuning.density_target(10), 14);
        assert_eq!(tuning.density_target(50), 14);
    }

    #[test]
    fn test_large_chance_grows_then_caps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.large_chance(3), 0.0);
        assert!((tuning.large_chance(4) - 0.05).abs() < 1e-6);
        assert!(tuning.large_chance(6) > tuning.large_chance(5));
        assert!((tuning.large_chance(40) - tuning.large_cap).abs() < 1e-6);
    }

    #[test]
    fn test_family_cooldown_has_floor() {
        let family = Tuning::default().elemental;
        assert!(family.base_cooldown(5) > family.base_cooldown(10));
        assert_eq!(family.base_cooldown(100), family.min_cooldown);
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{ "density_base": 9 }"#).unwrap();
        assert_eq!(tuning.density_base, 9);
        assert_eq!(tuning.density_cap, Tuning::default().density_cap);
    }
}
