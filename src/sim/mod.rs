//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities ascending by id, skills in a BTreeMap)
//! - No rendering or platform dependencies

pub mod ai;
pub mod bullet;
pub mod catalog;
pub mod combat;
pub mod entity;
pub mod progression;
pub mod projectiles;
pub mod skills;
pub mod spawner;
pub mod state;
pub mod tick;

pub use bullet::{Bullet, Motion, VisualTag};
pub use catalog::{
    Archetype, MAX_SKILL_LEVEL, Rarity, SkillCategory, SkillId, UnknownArchetype, Upgrade, apply_upgrade,
};
pub use entity::{BuildStats, Combatant, Entity, EntityId, EntityKind, Kind, Status};
pub use progression::UpgradeError;
pub use state::{GameEvent, GamePhase, Particle, ParticleKind, PlayerView, Snapshot, World};
pub use tick::{TickInput, tick};
