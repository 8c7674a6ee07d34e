//! Derived HUD summary
//!
//! Rebuilt from the world every few frames; the HUD never reads entities
//! directly.

use serde::Serialize;

use crate::sim::catalog::{SkillCategory, SkillId, descriptor};
use crate::sim::{GamePhase, World};

/// Cooldown state of one acquired weapon or active
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AbilityStatus {
    pub id: SkillId,
    pub key: &'static str,
    pub level: u8,
    pub category: SkillCategory,
    /// Remaining cooldown in seconds (0 when ready)
    pub cooldown: f32,
    /// Full cooldown at the current level
    pub max_cooldown: f32,
    pub ready: bool,
}

/// Everything the HUD shows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HudSummary {
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub level: u32,
    pub exp: f32,
    pub exp_to_next_level: f32,
    /// Fraction of the way to the next level, 0..=1
    pub exp_progress: f32,
    pub kills: u32,
    /// Living players and bots
    pub survivors: usize,
    pub time: f32,
    pub zone_radius: f32,
    pub phase: GamePhase,
    pub abilities: Vec<AbilityStatus>,
}

impl HudSummary {
    /// Summarize the player's state; `None` once the player is gone
    pub fn from_world(world: &World) -> Option<Self> {
        let view = world.player_view()?;
        let (e, c) = (view.entity, view.combatant);

        let abilities = c
            .skills
            .iter()
            .filter_map(|(&id, &level)| {
                let desc = descriptor(id)?;
                let cooldown = c.cooldown(id).max(0.0);
                Some(AbilityStatus {
                    id,
                    key: id.key(),
                    level,
                    category: desc.category,
                    cooldown,
                    max_cooldown: desc.cooldown_at(level),
                    ready: cooldown <= 0.0,
                })
            })
            .collect();

        let exp_progress = if c.exp_to_next_level > 0.0 {
            (c.exp / c.exp_to_next_level).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(Self {
            hp: e.hp.max(0.0).floor(),
            max_hp: e.max_hp,
            shield: c.shield.floor(),
            max_shield: c.max_shield,
            level: c.level,
            exp: c.exp,
            exp_to_next_level: c.exp_to_next_level,
            exp_progress,
            kills: c.kills,
            survivors: world.survivors(),
            time: world.time,
            zone_radius: world.zone_radius,
            phase: world.phase,
            abilities,
        })
    }

    /// Acquired abilities of one category
    pub fn abilities_in(&self, category: SkillCategory) -> impl Iterator<Item = &AbilityStatus> {
        self.abilities.iter().filter(move |a| a.category == category)
    }
}
