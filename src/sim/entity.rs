//! Entity model
//!
//! Every simulated object shares a core record (id, position, velocity,
//! radius, hit points, dead flag, timed status) and carries a kind-specific
//! payload. Projectiles live in their own list, see [`super::bullet`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use super::catalog::{Archetype, SkillId};

/// Stable entity identifier, shared by entities and bullets
pub type EntityId = u32;

/// Discriminant of a simulated object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Kind {
    Player,
    Bot,
    Hostile,
    Bullet,
    Pickup,
    Summon,
}

/// Timed status stamps, all absolute sim-time
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Status {
    pub invulnerable_until: f32,
    pub frozen_until: f32,
    /// Last time this entity took damage or fired (suppresses regen)
    pub last_combat_time: f32,
}

impl Status {
    #[inline]
    pub fn is_invulnerable(&self, now: f32) -> bool {
        self.invulnerable_until > now
    }

    #[inline]
    pub fn is_frozen(&self, now: f32) -> bool {
        self.frozen_until > now
    }
}

/// Build stats shaped by upgrades
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    pub projectile_count: u32,
    pub pierce: i32,
    /// Fractional damage reduction (0-1)
    pub armor: f32,
    pub flat_damage_reduction: f32,
    /// Fraction of a victim's max hp returned on kill
    pub lifesteal: f32,
    /// Pickup attraction radius
    pub magnet: f32,
    pub xp_mult: f32,
    pub area_scale: f32,
    /// Passive hp per second, always active
    pub regen: f32,
    pub crit_rate: f32,
    /// Multiplier applied on a critical hit
    pub crit_damage: f32,
}

impl Default for BuildStats {
    fn default() -> Self {
        Self {
            projectile_count: 1,
            pierce: 0,
            armor: 0.0,
            flat_damage_reduction: 0.0,
            lifesteal: 0.0,
            magnet: 100.0,
            xp_mult: 1.0,
            area_scale: 1.0,
            regen: 0.0,
            crit_rate: 0.05,
            crit_damage: 1.5,
        }
    }
}

/// Player or rival payload
#[derive(Debug, Clone, Serialize)]
pub struct Combatant {
    pub name: String,
    pub archetype: Archetype,
    pub damage: f32,
    pub attack_cooldown: f32,
    pub max_attack_cooldown: f32,
    pub range: f32,
    pub speed: f32,
    pub level: u32,
    pub exp: f32,
    pub exp_to_next_level: f32,
    pub build: BuildStats,
    pub shield: f32,
    pub max_shield: f32,
    /// Acquired skill levels (1-3)
    pub skills: BTreeMap<SkillId, u8>,
    /// Remaining cooldown per skill, seconds
    pub cooldowns: BTreeMap<SkillId, f32>,
    /// Current engagement target (AI and meteor aiming)
    pub target: Option<EntityId>,
    pub kills: u32,
    /// Fractional contact damage not yet applied
    #[serde(skip)]
    pub contact_carry: f32,
}

impl Combatant {
    pub fn new(name: impl Into<String>, archetype: Archetype) -> Self {
        let stats = archetype.stats();
        Self {
            name: name.into(),
            archetype,
            damage: stats.damage,
            attack_cooldown: 0.0,
            max_attack_cooldown: stats.cooldown,
            range: stats.range,
            speed: stats.speed,
            level: 1,
            exp: 0.0,
            exp_to_next_level: 100.0,
            build: BuildStats {
                projectile_count: stats.projectile_count,
                ..BuildStats::default()
            },
            shield: 0.0,
            max_shield: 0.0,
            skills: BTreeMap::new(),
            cooldowns: BTreeMap::new(),
            target: None,
            kills: 0,
            contact_carry: 0.0,
        }
    }

    /// Acquired level of a skill (0 when absent)
    pub fn skill_level(&self, id: SkillId) -> u8 {
        self.skills.get(&id).copied().unwrap_or(0)
    }

    /// Remaining cooldown of a skill (0 when never used)
    pub fn cooldown(&self, id: SkillId) -> f32 {
        self.cooldowns.get(&id).copied().unwrap_or(0.0)
    }

    /// Skill acquired and off cooldown
    pub fn is_ready(&self, id: SkillId) -> bool {
        self.skill_level(id) > 0 && self.cooldown(id) <= 0.0
    }

    pub fn offense(&self) -> Offense {
        Offense {
            damage: self.damage,
            crit_rate: self.build.crit_rate,
            crit_damage: self.build.crit_damage,
        }
    }
}

/// Spawned adversary payload
#[derive(Debug, Clone, Serialize)]
pub struct Hostile {
    /// Contact damage per second is `damage * 2`
    pub damage: f32,
    pub speed: f32,
    pub exp_reward: f32,
    pub elite: bool,
}

/// Experience pickup payload
#[derive(Debug, Clone, Serialize)]
pub struct Pickup {
    pub value: f32,
}

/// Summon behaviour
#[derive(Debug, Clone, Serialize)]
pub enum SummonRole {
    /// Follows its owner and breathes fire at hostiles
    Companion,
    /// Stationary, zaps hostiles until its lifetime runs out
    Totem { lifetime: f32 },
}

/// Combatant-owned summon payload
#[derive(Debug, Clone, Serialize)]
pub struct Summon {
    pub owner: EntityId,
    pub role: SummonRole,
    /// Damage value taken from the ability table at spawn
    pub power: f32,
    pub attack_cooldown: f32,
    pub max_attack_cooldown: f32,
    pub range: f32,
    pub speed: f32,
    pub level: u8,
}

impl Summon {
    pub fn is_static(&self) -> bool {
        matches!(self.role, SummonRole::Totem { .. })
    }
}

/// Kind-specific payload
#[derive(Debug, Clone, Serialize)]
pub enum EntityKind {
    Player(Combatant),
    Bot(Combatant),
    Hostile(Hostile),
    Pickup(Pickup),
    Summon(Summon),
}

/// Attacker stats consumed by damage calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offense {
    pub damage: f32,
    pub crit_rate: f32,
    pub crit_damage: f32,
}

/// Target stats consumed by the mitigation pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Defense {
    pub armor: f32,
    pub flat_reduction: f32,
}

/// A simulated object
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Soft-delete marker, swept at the end of the tick
    pub dead: bool,
    pub status: Status,
    pub kind: EntityKind,
}

impl Entity {
    /// Player or rival at full health
    pub fn new_combatant(id: EntityId, pos: Vec2, combatant: Combatant, is_player: bool) -> Self {
        let hp = combatant.archetype.stats().hp;
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: 18.0,
            hp,
            max_hp: hp,
            dead: false,
            status: Status {
                last_combat_time: -10.0,
                ..Status::default()
            },
            kind: if is_player {
                EntityKind::Player(combatant)
            } else {
                EntityKind::Bot(combatant)
            },
        }
    }

    pub fn new_hostile(id: EntityId, pos: Vec2, radius: f32, hp: f32, hostile: Hostile) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            hp,
            max_hp: hp,
            dead: false,
            status: Status::default(),
            kind: EntityKind::Hostile(hostile),
        }
    }

    pub fn new_pickup(id: EntityId, pos: Vec2, value: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: 8.0,
            hp: 1.0,
            max_hp: 1.0,
            dead: false,
            status: Status::default(),
            kind: EntityKind::Pickup(Pickup { value }),
        }
    }

    pub fn new_summon(id: EntityId, pos: Vec2, radius: f32, hp: f32, summon: Summon) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            hp,
            max_hp: hp,
            dead: false,
            status: Status::default(),
            kind: EntityKind::Summon(summon),
        }
    }

    pub fn kind(&self) -> Kind {
        match self.kind {
            EntityKind::Player(_) => Kind::Player,
            EntityKind::Bot(_) => Kind::Bot,
            EntityKind::Hostile(_) => Kind::Hostile,
            EntityKind::Pickup(_) => Kind::Pickup,
            EntityKind::Summon(_) => Kind::Summon,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Player or bot
    pub fn is_combatant(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_) | EntityKind::Bot(_))
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, EntityKind::Hostile(_))
    }

    pub fn combatant(&self) -> Option<&Combatant> {
        match &self.kind {
            EntityKind::Player(c) | EntityKind::Bot(c) => Some(c),
            _ => None,
        }
    }

    pub fn combatant_mut(&mut self) -> Option<&mut Combatant> {
        match &mut self.kind {
            EntityKind::Player(c) | EntityKind::Bot(c) => Some(c),
            _ => None,
        }
    }

    pub fn summon(&self) -> Option<&Summon> {
        match &self.kind {
            EntityKind::Summon(s) => Some(s),
            _ => None,
        }
    }

    /// Whether effects owned by `owner` may damage this entity.
    ///
    /// Hostiles are fair game for everyone; players and bots are fair game
    /// for everyone except themselves. Pickups and summons are never hit.
    pub fn is_enemy_of(&self, owner: EntityId) -> bool {
        match self.kind {
            EntityKind::Hostile(_) => true,
            EntityKind::Player(_) | EntityKind::Bot(_) => self.id != owner,
            EntityKind::Pickup(_) | EntityKind::Summon(_) => false,
        }
    }

    pub fn offense(&self) -> Option<Offense> {
        self.combatant().map(Combatant::offense)
    }

    pub fn defense(&self) -> Defense {
        match &self.kind {
            EntityKind::Player(c) | EntityKind::Bot(c) => Defense {
                armor: c.build.armor,
                flat_reduction: c.build.flat_damage_reduction,
            },
            EntityKind::Hostile(_) | EntityKind::Pickup(_) | EntityKind::Summon(_) => {
                Defense::default()
            }
        }
    }

    /// Shield pool, when this kind carries one
    pub fn shield_mut(&mut self) -> Option<&mut f32> {
        self.combatant_mut().map(|c| &mut c.shield)
    }

    /// Experience dropped when this entity is killed
    pub fn kill_reward(&self) -> f32 {
        match &self.kind {
            EntityKind::Hostile(h) => h.exp_reward,
            EntityKind::Player(c) | EntityKind::Bot(c) => c.exp,
            EntityKind::Pickup(_) | EntityKind::Summon(_) => 0.0,
        }
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp > 0.0 { self.hp / self.max_hp } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targeting_rules() {
        let player = Entity::new_combatant(1, Vec2::ZERO, Combatant::new("YOU", Archetype::Warrior), true);
        let bot = Entity::new_combatant(2, Vec2::ZERO, Combatant::new("Viper", Archetype::Mage), false);
        let pickup = Entity::new_pickup(3, Vec2::ZERO, 20.0);

        assert!(!player.is_enemy_of(1));
        assert!(player.is_enemy_of(2));
        assert!(bot.is_enemy_of(1));
        assert!(!pickup.is_enemy_of(1));
    }

    #[test]
    fn test_combatant_presets() {
        let e = Entity::new_combatant(1, Vec2::ZERO, Combatant::new("YOU", Archetype::Warrior), true);
        assert_eq!(e.hp, 250.0);
        assert_eq!(e.kind(), Kind::Player);
        let c = e.combatant().unwrap();
        assert_eq!(c.damage, 30.0);
        assert_eq!(c.exp_to_next_level, 100.0);
        assert!(!c.is_ready(SkillId::VoidDash));
    }
}
