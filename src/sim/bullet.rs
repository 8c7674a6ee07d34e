//! Projectiles and effect volumes

use glam::Vec2;
use serde::Serialize;

use super::catalog::SkillId;
use super::entity::EntityId;

/// Seconds between damage pulses of a persistent volume
pub const VOLUME_HIT_INTERVAL: f32 = 0.5;

/// Rendering hint, opaque to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VisualTag {
    #[default]
    Default,
    Blade,
    Orb,
    Spear,
    Fire,
    Meteor,
    Wave,
    Spark,
    Ice,
    Dagger,
    Poison,
    Totem,
}

/// Movement behaviour; exactly one per bullet
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Motion {
    /// Straight line at constant velocity
    Linear,
    /// Steers toward a locked target; flies straight once the target is gone
    Homing {
        target: EntityId,
        turn_rate: f32,
        speed: f32,
    },
    /// Circles the owner at a fixed distance
    Orbit {
        angle: f32,
        radius: f32,
        angular_speed: f32,
    },
    /// Sits on the owner (barrier wave)
    Aura,
    /// Stationary damage-over-time area
    Pool,
    /// Warning marker that detonates once its lifetime runs out
    Fuse { blast_radius: f32 },
}

impl Motion {
    /// Volumes pulse damage on a timer instead of spending pierce
    pub fn is_volume(&self) -> bool {
        matches!(self, Motion::Orbit { .. } | Motion::Aura | Motion::Pool)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub id: EntityId,
    /// Combatant credited for hits (summon shots credit the summon's owner)
    pub owner: EntityId,
    /// Ability that produced this bullet (None for basic attacks and breath)
    pub source: Option<SkillId>,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Damage per hit, rolled at creation
    pub damage: f32,
    pub crit: bool,
    /// Seconds left
    pub lifetime: f32,
    /// Extra targets allowed; removed when it drops below zero
    pub pierce: i32,
    pub motion: Motion,
    pub visual: VisualTag,
    /// Countdown to the next damage pulse (volumes only)
    pub hit_timer: f32,
    /// Entities already struck (standard bullets only)
    #[serde(skip)]
    pub struck: Vec<EntityId>,
    #[serde(skip)]
    pub dead: bool,
}

impl Bullet {
    /// A straight-flying bullet; adjust the remaining fields per ability
    pub fn new(id: EntityId, owner: EntityId, pos: Vec2, vel: Vec2, radius: f32, damage: f32) -> Self {
        Self {
            id,
            owner,
            source: None,
            pos,
            vel,
            radius,
            damage,
            crit: false,
            lifetime: 2.0,
            pierce: 0,
            motion: Motion::Linear,
            visual: VisualTag::Default,
            hit_timer: 0.0,
            struck: Vec::new(),
            dead: false,
        }
    }

    pub fn is_orbit_from(&self, owner: EntityId, source: SkillId) -> bool {
        !self.dead
            && self.owner == owner
            && self.source == Some(source)
            && matches!(self.motion, Motion::Orbit { .. })
    }
}
