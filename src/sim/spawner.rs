//! Hostile spawner
//!
//! Hostiles appear around a random living combatant. Spawn rate and elite
//! odds climb with elapsed time, and hit points scale with it.

use rand::Rng;

use super::entity::{Entity, Hostile};
use super::state::World;
use crate::polar_to_cartesian;

/// Stat block for a spawned hostile tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileTier {
    pub radius: f32,
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub exp_reward: f32,
}

pub const REGULAR: HostileTier = HostileTier {
    radius: 16.0,
    hp: 50.0,
    damage: 12.0,
    speed: 80.0,
    exp_reward: 20.0,
};

pub const ELITE: HostileTier = HostileTier {
    radius: 24.0,
    hp: 400.0,
    damage: 25.0,
    speed: 100.0,
    exp_reward: 100.0,
};

/// Spawn-rate multiplier, 1 at t=0 rising to 3 at three minutes
pub fn quantity_factor(time: f32) -> f32 {
    1.0 + (time / 180.0).min(2.0)
}

/// Hit-point multiplier, +1 every two minutes
pub fn difficulty_factor(time: f32) -> f32 {
    1.0 + time / 120.0
}

impl HostileTier {
    /// A hostile of this tier with hp scaled for `time`
    pub fn build(&self, id: u32, pos: glam::Vec2, time: f32, elite: bool) -> Entity {
        let hostile = Hostile {
            damage: self.damage,
            speed: self.speed,
            exp_reward: self.exp_reward,
            elite,
        };
        Entity::new_hostile(id, pos, self.radius, self.hp * difficulty_factor(time), hostile)
    }
}

/// Roll for at most one spawn this tick
pub fn spawn_hostiles(world: &mut World, dt: f32) {
    let q = quantity_factor(world.time);
    let chance = dt / world.config.spawn_interval * q;
    if world.rng.random::<f32>() >= chance {
        return;
    }

    let anchors: Vec<glam::Vec2> = world
        .entities
        .iter()
        .filter(|e| e.is_alive() && e.is_combatant())
        .map(|e| e.pos)
        .collect();
    if anchors.is_empty() {
        return;
    }

    let cfg = &world.config;
    let (min_dist, max_dist, margin, map) =
        (cfg.spawn_min_dist, cfg.spawn_max_dist, cfg.spawn_edge_margin, cfg.map_size);
    let elite_chance = cfg.elite_chance * q;

    let anchor = anchors[world.rng.random_range(0..anchors.len())];
    let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
    let dist = world.rng.random_range(min_dist..=max_dist);
    let pos = (anchor + polar_to_cartesian(dist, angle)).clamp(
        glam::Vec2::splat(margin),
        glam::Vec2::splat(map - margin),
    );

    let elite = world.rng.random::<f32>() < elite_chance;
    let tier = if elite { ELITE } else { REGULAR };
    let id = world.next_entity_id();
    let hostile = tier.build(id, pos, world.time, elite);
    world.spawn(hostile);
}
