//! Match tuning
//!
//! Every number that shapes a match but is not part of an ability table lives
//! here. Defaults reproduce the stock arena; a JSON document can override any
//! subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading an [`ArenaConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
    #[error("{field} must be within 0..=1, got {value}")]
    NotAFraction { field: &'static str, value: f32 },
}

/// Arena and match tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // === Map & zone ===
    /// Square map side length; the zone is centred on the map
    pub map_size: f32,
    /// Zone radius at t=0
    pub initial_zone_radius: f32,
    /// Zone radius lost per second
    pub zone_shrink_speed: f32,
    /// Hit points per second lost outside the zone
    pub zone_damage_per_sec: f32,

    // === Regeneration ===
    /// Seconds without combat before out-of-combat regen starts
    pub regen_delay: f32,
    /// Fraction of max hp regenerated per second out of combat
    pub regen_rate: f32,

    // === Rival cohort ===
    pub bot_count: u32,
    /// Bots move slightly slower than the archetype base speed
    pub bot_speed_factor: f32,
    pub bot_spawn_min_dist: f32,
    pub bot_spawn_max_dist: f32,

    // === Hostile spawner ===
    /// Mean seconds between spawns at t=0
    pub spawn_interval: f32,
    pub spawn_min_dist: f32,
    pub spawn_max_dist: f32,
    /// Elite probability before the quantity factor is applied
    pub elite_chance: f32,
    /// Keeps spawns this far inside the map edge
    pub spawn_edge_margin: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            map_size: 3000.0,
            initial_zone_radius: 2500.0,
            zone_shrink_speed: 5.0,
            zone_damage_per_sec: 20.0,

            regen_delay: 4.0,
            regen_rate: 0.10,

            bot_count: 14,
            bot_speed_factor: 0.95,
            bot_spawn_min_dist: 800.0,
            bot_spawn_max_dist: 2000.0,

            spawn_interval: 0.8,
            spawn_min_dist: 600.0,
            spawn_max_dist: 800.0,
            elite_chance: 0.05,
            spawn_edge_margin: 50.0,
        }
    }
}

impl ArenaConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("map_size", self.map_size),
            ("initial_zone_radius", self.initial_zone_radius),
            ("spawn_interval", self.spawn_interval),
            ("bot_speed_factor", self.bot_speed_factor),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negatives = [
            ("zone_shrink_speed", self.zone_shrink_speed),
            ("zone_damage_per_sec", self.zone_damage_per_sec),
            ("regen_delay", self.regen_delay),
        ];
        for (field, value) in non_negatives {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let ranges = [
            ("bot_spawn_dist", self.bot_spawn_min_dist, self.bot_spawn_max_dist),
            ("spawn_dist", self.spawn_min_dist, self.spawn_max_dist),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }

        let fractions = [
            ("regen_rate", self.regen_rate),
            ("elite_chance", self.elite_chance),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::NotAFraction { field, value });
            }
        }

        Ok(())
    }

    /// Centre of the map (and of the zone)
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::splat(self.map_size / 2.0)
    }
}
