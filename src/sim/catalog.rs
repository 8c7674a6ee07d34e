//! Static game data: ability descriptors, archetypes and the upgrade catalog
//!
//! Ability parameters are data; the per-ability behaviour lives in
//! [`super::skills`], selected by matching on [`Behavior`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bullet::VisualTag;
use super::entity::Entity;

/// Highest tier any skill can reach
pub const MAX_SKILL_LEVEL: u8 = 3;

/// Manual actives never recharge faster than this
pub const ACTIVE_MIN_COOLDOWN: f32 = 0.5;

/// Damage tables are tuned for an attacker with this much base damage
pub const DAMAGE_NORMALIZATION: f32 = 30.0;

/// Every acquirable skill: abilities with a descriptor, plus passives
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    // Automatic weapons
    WhirlingBlades,
    ArcaneOrbs,
    ChainLightning,
    BoneSpear,
    DragonScion,
    PhantomDaggers,
    ThunderTotem,
    ToxicGas,
    // Manual actives
    VoidDash,
    MeteorShower,
    HolyBarrier,
    FrostNova,
    // Passives
    Bloodthirst,
    HardenedBody,
    QuickCooldown,
    ProjectileMastery,
    HunterInstinct,
    WeakeningCurse,
    LethalPrecision,
}

impl SkillId {
    pub const ALL: [SkillId; 19] = [
        SkillId::WhirlingBlades,
        SkillId::ArcaneOrbs,
        SkillId::ChainLightning,
        SkillId::BoneSpear,
        SkillId::DragonScion,
        SkillId::PhantomDaggers,
        SkillId::ThunderTotem,
        SkillId::ToxicGas,
        SkillId::VoidDash,
        SkillId::MeteorShower,
        SkillId::HolyBarrier,
        SkillId::FrostNova,
        SkillId::Bloodthirst,
        SkillId::HardenedBody,
        SkillId::QuickCooldown,
        SkillId::ProjectileMastery,
        SkillId::HunterInstinct,
        SkillId::WeakeningCurse,
        SkillId::LethalPrecision,
    ];

    /// Skills that carry an ability descriptor
    pub const ABILITIES: [SkillId; 12] = [
        SkillId::WhirlingBlades,
        SkillId::ArcaneOrbs,
        SkillId::ChainLightning,
        SkillId::BoneSpear,
        SkillId::DragonScion,
        SkillId::PhantomDaggers,
        SkillId::ThunderTotem,
        SkillId::ToxicGas,
        SkillId::VoidDash,
        SkillId::MeteorShower,
        SkillId::HolyBarrier,
        SkillId::FrostNova,
    ];

    /// Primary-active trigger priority
    pub const PRIMARY_ACTIVES: [SkillId; 3] =
        [SkillId::MeteorShower, SkillId::HolyBarrier, SkillId::FrostNova];

    /// Stable string key, as used by the UI collaborator
    pub fn key(&self) -> &'static str {
        match self {
            SkillId::WhirlingBlades => "whirling_blades",
            SkillId::ArcaneOrbs => "arcane_orbs",
            SkillId::ChainLightning => "chain_lightning",
            SkillId::BoneSpear => "bone_spear",
            SkillId::DragonScion => "dragon_scion",
            SkillId::PhantomDaggers => "phantom_daggers",
            SkillId::ThunderTotem => "thunder_totem",
            SkillId::ToxicGas => "toxic_gas",
            SkillId::VoidDash => "void_dash",
            SkillId::MeteorShower => "meteor_shower",
            SkillId::HolyBarrier => "holy_barrier",
            SkillId::FrostNova => "frost_nova",
            SkillId::Bloodthirst => "bloodthirst",
            SkillId::HardenedBody => "hardened_body",
            SkillId::QuickCooldown => "quick_cooldown",
            SkillId::ProjectileMastery => "projectile_mastery",
            SkillId::HunterInstinct => "hunter_instinct",
            SkillId::WeakeningCurse => "weakening_curse",
            SkillId::LethalPrecision => "lethal_precision",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn category(&self) -> SkillCategory {
        match descriptor(*self) {
            Some(d) => d.category,
            None => SkillCategory::Passive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkillCategory {
    /// Fires automatically whenever its cooldown elapses
    Weapon,
    /// Triggered by input or AI decision
    Active,
    /// One live instance kept per owner
    Summon,
    /// Stat mutation only
    Passive,
}

/// Per-ability behaviour and its bespoke parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Orbit {
        orbit_radius: &'static [f32],
        rotation_time: f32,
    },
    Homing {
        speed: f32,
        turn_rate: f32,
        search_radius: f32,
    },
    Chain {
        jumps: &'static [u32],
        search_radius: f32,
        jump_radius: f32,
        decay: f32,
        overload_radius: f32,
        overload_damage: f32,
    },
    Lance {
        pierce: &'static [i32],
        speed: f32,
        search_radius: f32,
        lifetime: f32,
    },
    Companion {
        attack_cooldown: f32,
        attack_cooldown_per_level: f32,
        range: f32,
        projectile_speed: f32,
        follow_speed: f32,
        hp: f32,
    },
    Cone {
        speed: f32,
        spread: f32,
        lifetime: f32,
        frozen_search_radius: f32,
        frozen_multiplier: f32,
    },
    Totem {
        duration: f32,
        attack_interval: f32,
        range: f32,
        max_active: usize,
        hp: f32,
    },
    Canister {
        duration: f32,
        radius: f32,
        search_radius: f32,
        min_throw: f32,
        max_throw: f32,
    },
    Dash {
        distance: f32,
        invulnerable_for: f32,
    },
    Meteor {
        radius: f32,
        blast_radius: f32,
        fuse: f32,
        fuse_jitter: f32,
    },
    Barrier {
        duration: f32,
        shield_pct: f32,
        shield_per_level: f32,
        radius: f32,
    },
    Nova {
        radius: f32,
        freeze_for: f32,
    },
}

/// Immutable per-ability parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityDescriptor {
    pub id: SkillId,
    pub category: SkillCategory,
    pub cooldown: f32,
    pub cooldown_per_level: f32,
    pub damage_base: f32,
    pub damage_per_level: f32,
    /// Level-indexed projectile/meteor counts (empty when unused)
    pub counts: &'static [u32],
    pub visual: VisualTag,
    pub behavior: Behavior,
}

impl AbilityDescriptor {
    /// Cooldown after a trigger at the given level
    pub fn cooldown_at(&self, level: u8) -> f32 {
        let cd = self.cooldown + self.cooldown_per_level * level as f32;
        match self.category {
            SkillCategory::Active => cd.max(ACTIVE_MIN_COOLDOWN),
            _ => cd,
        }
    }

    /// Table damage at the given level (before attacker scaling)
    pub fn damage_at(&self, level: u8) -> f32 {
        self.damage_base + self.damage_per_level * level as f32
    }

    pub fn count_at(&self, level: u8) -> u32 {
        level_value(self.counts, level)
    }
}

/// Look up a level-scaled table entry: index `level - 1`, clamped to the table
pub fn level_value<T: Copy + Default>(table: &[T], level: u8) -> T {
    let idx = (level.max(1) - 1) as usize;
    table
        .get(idx.min(table.len().saturating_sub(1)))
        .copied()
        .unwrap_or_default()
}

const WHIRLING_BLADES: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::WhirlingBlades,
    category: SkillCategory::Weapon,
    cooldown: 0.0,
    cooldown_per_level: 0.0,
    damage_base: 12.0,
    damage_per_level: 6.0,
    counts: &[2, 3, 4],
    visual: VisualTag::Blade,
    behavior: Behavior::Orbit {
        orbit_radius: &[90.0, 110.0, 130.0],
        rotation_time: 2.2,
    },
};

const ARCANE_ORBS: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::ArcaneOrbs,
    category: SkillCategory::Weapon,
    cooldown: 1.3,
    cooldown_per_level: -0.1,
    damage_base: 22.0,
    damage_per_level: 8.0,
    counts: &[1, 2, 3],
    visual: VisualTag::Orb,
    behavior: Behavior::Homing {
        speed: 400.0,
        turn_rate: 4.0,
        search_radius: 800.0,
    },
};

const CHAIN_LIGHTNING: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::ChainLightning,
    category: SkillCategory::Weapon,
    cooldown: 1.8,
    cooldown_per_level: 0.0,
    damage_base: 28.0,
    damage_per_level: 8.0,
    counts: &[],
    visual: VisualTag::Spark,
    behavior: Behavior::Chain {
        jumps: &[3, 4, 5],
        search_radius: 600.0,
        jump_radius: 260.0,
        decay: 0.85,
        overload_radius: 250.0,
        overload_damage: 300.0,
    },
};

const BONE_SPEAR: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::BoneSpear,
    category: SkillCategory::Weapon,
    cooldown: 1.0,
    cooldown_per_level: 0.0,
    damage_base: 22.0,
    damage_per_level: 6.0,
    counts: &[],
    visual: VisualTag::Spear,
    behavior: Behavior::Lance {
        pierce: &[3, 4, 5],
        speed: 650.0,
        search_radius: 800.0,
        lifetime: 3.0,
    },
};

const DRAGON_SCION: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::DragonScion,
    category: SkillCategory::Summon,
    cooldown: 0.0,
    cooldown_per_level: 0.0,
    damage_base: 25.0,
    damage_per_level: 5.0,
    counts: &[],
    visual: VisualTag::Fire,
    behavior: Behavior::Companion {
        attack_cooldown: 1.8,
        attack_cooldown_per_level: -0.1,
        range: 400.0,
        projectile_speed: 500.0,
        follow_speed: 160.0,
        hp: 1000.0,
    },
};

const PHANTOM_DAGGERS: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::PhantomDaggers,
    category: SkillCategory::Weapon,
    cooldown: 0.9,
    cooldown_per_level: -0.1,
    damage_base: 28.0,
    damage_per_level: 8.0,
    counts: &[2, 3, 4],
    visual: VisualTag::Dagger,
    behavior: Behavior::Cone {
        speed: 750.0,
        spread: 0.5,
        lifetime: 1.5,
        frozen_search_radius: 600.0,
        frozen_multiplier: 3.0,
    },
};

const THUNDER_TOTEM: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::ThunderTotem,
    category: SkillCategory::Weapon,
    cooldown: 12.0,
    cooldown_per_level: 0.0,
    damage_base: 18.0,
    damage_per_level: 6.0,
    counts: &[],
    visual: VisualTag::Totem,
    behavior: Behavior::Totem {
        duration: 10.0,
        attack_interval: 0.6,
        range: 320.0,
        max_active: 2,
        hp: 500.0,
    },
};

const TOXIC_GAS: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::ToxicGas,
    category: SkillCategory::Weapon,
    cooldown: 3.8,
    cooldown_per_level: 0.0,
    damage_base: 9.0,
    damage_per_level: 3.0,
    counts: &[],
    visual: VisualTag::Poison,
    behavior: Behavior::Canister {
        duration: 6.0,
        radius: 140.0,
        search_radius: 400.0,
        min_throw: 100.0,
        max_throw: 250.0,
    },
};

const VOID_DASH: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::VoidDash,
    category: SkillCategory::Active,
    cooldown: 7.0,
    cooldown_per_level: -0.5,
    damage_base: 0.0,
    damage_per_level: 0.0,
    counts: &[],
    visual: VisualTag::Default,
    behavior: Behavior::Dash {
        distance: 250.0,
        invulnerable_for: 0.45,
    },
};

const METEOR_SHOWER: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::MeteorShower,
    category: SkillCategory::Active,
    cooldown: 16.0,
    cooldown_per_level: -0.5,
    damage_base: 45.0,
    damage_per_level: 12.0,
    counts: &[5, 8, 12],
    visual: VisualTag::Meteor,
    behavior: Behavior::Meteor {
        radius: 260.0,
        blast_radius: 90.0,
        fuse: 0.7,
        fuse_jitter: 0.5,
    },
};

const HOLY_BARRIER: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::HolyBarrier,
    category: SkillCategory::Active,
    cooldown: 20.0,
    cooldown_per_level: -0.5,
    damage_base: 8.0,
    damage_per_level: 0.0,
    counts: &[],
    visual: VisualTag::Wave,
    behavior: Behavior::Barrier {
        duration: 6.0,
        shield_pct: 0.12,
        shield_per_level: 0.03,
        radius: 160.0,
    },
};

const FROST_NOVA: AbilityDescriptor = AbilityDescriptor {
    id: SkillId::FrostNova,
    category: SkillCategory::Active,
    cooldown: 12.0,
    cooldown_per_level: -0.5,
    damage_base: 15.0,
    damage_per_level: 0.0,
    counts: &[],
    visual: VisualTag::Ice,
    behavior: Behavior::Nova {
        radius: 360.0,
        freeze_for: 2.5,
    },
};

/// Ability descriptor for a skill; passives have none
pub fn descriptor(id: SkillId) -> Option<&'static AbilityDescriptor> {
    match id {
        SkillId::WhirlingBlades => Some(&WHIRLING_BLADES),
        SkillId::ArcaneOrbs => Some(&ARCANE_ORBS),
        SkillId::ChainLightning => Some(&CHAIN_LIGHTNING),
        SkillId::BoneSpear => Some(&BONE_SPEAR),
        SkillId::DragonScion => Some(&DRAGON_SCION),
        SkillId::PhantomDaggers => Some(&PHANTOM_DAGGERS),
        SkillId::ThunderTotem => Some(&THUNDER_TOTEM),
        SkillId::ToxicGas => Some(&TOXIC_GAS),
        SkillId::VoidDash => Some(&VOID_DASH),
        SkillId::MeteorShower => Some(&METEOR_SHOWER),
        SkillId::HolyBarrier => Some(&HOLY_BARRIER),
        SkillId::FrostNova => Some(&FROST_NOVA),
        SkillId::Bloodthirst
        | SkillId::HardenedBody
        | SkillId::QuickCooldown
        | SkillId::ProjectileMastery
        | SkillId::HunterInstinct
        | SkillId::WeakeningCurse
        | SkillId::LethalPrecision => None,
    }
}

// ============================================================================
// Archetypes
// ============================================================================

/// Selectable starting archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    Warrior,
    Mage,
    Ranger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub range: f32,
    pub cooldown: f32,
    pub projectile_count: u32,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Warrior, Archetype::Mage, Archetype::Ranger];

    pub fn stats(&self) -> ArchetypeStats {
        match self {
            // High HP, short range cleave
            Archetype::Warrior => ArchetypeStats {
                hp: 250.0,
                speed: 190.0,
                damage: 30.0,
                range: 160.0,
                cooldown: 0.6,
                projectile_count: 1,
            },
            // High damage, long range
            Archetype::Mage => ArchetypeStats {
                hp: 120.0,
                speed: 180.0,
                damage: 45.0,
                range: 550.0,
                cooldown: 1.1,
                projectile_count: 1,
            },
            // Fast, rapid fire
            Archetype::Ranger => ArchetypeStats {
                hp: 150.0,
                speed: 220.0,
                damage: 18.0,
                range: 450.0,
                cooldown: 0.25,
                projectile_count: 1,
            },
        }
    }
}

/// Archetype name that matches none of [`Archetype::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown archetype: {0}")]
pub struct UnknownArchetype(pub String);

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    /// Case-insensitive archetype name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warrior" => Ok(Archetype::Warrior),
            "mage" => Ok(Archetype::Mage),
            "ranger" => Ok(Archetype::Ranger),
            _ => Err(UnknownArchetype(s.to_string())),
        }
    }
}

pub const BOT_NAMES: [&str; 15] = [
    "ShadowSlayer",
    "NoobMaster69",
    "TheLegend27",
    "GladiatorX",
    "CyberPunk",
    "Viper",
    "Ghost",
    "Kratos",
    "Jinx",
    "YasuoMain",
    "DragonBorn",
    "Slayer",
    "Hunter",
    "Predator",
    "Terminator",
];

// ============================================================================
// Upgrades
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Display metadata for an offerable upgrade
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Upgrade {
    pub id: SkillId,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
}

impl Upgrade {
    pub fn category(&self) -> SkillCategory {
        self.id.category()
    }
}

const fn upgrade(id: SkillId, name: &'static str, description: &'static str, rarity: Rarity) -> Upgrade {
    Upgrade { id, name, description, rarity }
}

pub const UPGRADES: [Upgrade; 19] = [
    upgrade(SkillId::WhirlingBlades, "Whirling Blades", "Orbiting blades cleave nearby foes.", Rarity::Common),
    upgrade(SkillId::ArcaneOrbs, "Arcane Orbs", "Homing orbs seek the nearest foe.", Rarity::Rare),
    upgrade(
        SkillId::ChainLightning,
        "Chain Lightning",
        "Bounces between enemies. Hitting your Totems triggers an overload.",
        Rarity::Epic,
    ),
    upgrade(SkillId::BoneSpear, "Bone Spear", "Piercing spear at the nearest foe.", Rarity::Common),
    upgrade(SkillId::DragonScion, "Dragon Scion", "Summons a dragon ally with ranged attacks.", Rarity::Legendary),
    upgrade(
        SkillId::PhantomDaggers,
        "Phantom Daggers",
        "Throw daggers backward. Triple damage and auto crit against frozen foes.",
        Rarity::Rare,
    ),
    upgrade(
        SkillId::ThunderTotem,
        "Thunder Totem",
        "Summon a totem. Lightning on it triggers an overload blast.",
        Rarity::Epic,
    ),
    upgrade(SkillId::ToxicGas, "Toxic Canister", "Create poison pools that deal damage over time.", Rarity::Common),
    upgrade(SkillId::VoidDash, "Void Dash", "Dash with brief invulnerability.", Rarity::Rare),
    upgrade(SkillId::MeteorShower, "Meteor Shower", "Call down meteors that explode in an area.", Rarity::Epic),
    upgrade(SkillId::HolyBarrier, "Holy Barrier", "Gain a shield and a damaging aura.", Rarity::Rare),
    upgrade(SkillId::FrostNova, "Frost Nova", "Freeze nearby enemies.", Rarity::Epic),
    upgrade(SkillId::Bloodthirst, "Bloodthirst", "Heal on kills.", Rarity::Epic),
    upgrade(SkillId::HardenedBody, "Hardened Body", "Max HP +10%, damage taken -5.", Rarity::Common),
    upgrade(SkillId::QuickCooldown, "Quick Cooldown", "Attack cooldown -10%.", Rarity::Rare),
    upgrade(SkillId::ProjectileMastery, "Projectile Mastery", "+1 projectile.", Rarity::Legendary),
    upgrade(SkillId::HunterInstinct, "Hunter Instinct", "+15% EXP, +50 pickup range.", Rarity::Common),
    upgrade(SkillId::WeakeningCurse, "Weakening Curse", "Enemies touching you deal 10% less damage.", Rarity::Rare),
    upgrade(SkillId::LethalPrecision, "Lethal Precision", "+8% crit rate, +30% crit damage.", Rarity::Epic),
];

/// Catalog entry for a skill
pub fn upgrade_for(id: SkillId) -> Option<&'static Upgrade> {
    UPGRADES.iter().find(|u| u.id == id)
}

/// Raise a skill by one level on a combatant and apply its stat mutation.
///
/// Returns false (and changes nothing) when the entity is not a combatant or
/// the skill is already at [`MAX_SKILL_LEVEL`].
pub fn apply_upgrade(entity: &mut Entity, id: SkillId) -> bool {
    let Some(c) = entity.combatant_mut() else {
        return false;
    };
    let current = c.skill_level(id);
    if current >= MAX_SKILL_LEVEL {
        return false;
    }
    c.skills.insert(id, current + 1);

    match id {
        SkillId::Bloodthirst => c.build.lifesteal += 0.04,
        SkillId::HardenedBody => {
            c.build.flat_damage_reduction += 5.0;
            entity.max_hp = (entity.max_hp * 1.1).floor();
            entity.hp = (entity.hp * 1.1).floor();
        }
        SkillId::QuickCooldown => c.max_attack_cooldown *= 0.9,
        SkillId::ProjectileMastery => c.build.projectile_count += 1,
        SkillId::HunterInstinct => {
            c.build.xp_mult += 0.15;
            c.build.magnet += 50.0;
        }
        SkillId::LethalPrecision => {
            c.build.crit_rate += 0.08;
            c.build.crit_damage += 0.3;
        }
        // Abilities and the curse act through their level alone
        _ => {}
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Combatant;
    use glam::Vec2;

    #[test]
    fn test_level_value_clamps() {
        let table = [2u32, 3, 4];
        assert_eq!(level_value(&table, 0), 2);
        assert_eq!(level_value(&table, 1), 2);
        assert_eq!(level_value(&table, 3), 4);
        assert_eq!(level_value(&table, 9), 4);
        assert_eq!(level_value::<u32>(&[], 2), 0);
    }

    #[test]
    fn test_cooldowns() {
        let dash = descriptor(SkillId::VoidDash).unwrap();
        assert!((dash.cooldown_at(1) - 6.5).abs() < 1e-5);
        let daggers = descriptor(SkillId::PhantomDaggers).unwrap();
        assert!((daggers.cooldown_at(3) - 0.6).abs() < 1e-5);
        assert!(descriptor(SkillId::Bloodthirst).is_none());
        assert_eq!(SkillId::HardenedBody.category(), SkillCategory::Passive);
    }

    #[test]
    fn test_keys_roundtrip() {
        for id in SkillId::ALL {
            assert_eq!(SkillId::from_key(id.key()), Some(id));
            assert!(upgrade_for(id).is_some());
        }
        assert_eq!(SkillId::from_key("nope"), None);
    }

    #[test]
    fn test_archetype_parse() {
        assert_eq!("Mage".parse::<Archetype>(), Ok(Archetype::Mage));
        assert_eq!("RANGER".parse::<Archetype>(), Ok(Archetype::Ranger));
        let err = "paladin".parse::<Archetype>().unwrap_err();
        assert_eq!(err.to_string(), "unknown archetype: paladin");
    }

    #[test]
    fn test_upgrade_caps_at_three() {
        let mut e = Entity::new_combatant(1, Vec2::ZERO, Combatant::new("YOU", Archetype::Warrior), true);
        for _ in 0..3 {
            assert!(apply_upgrade(&mut e, SkillId::Bloodthirst));
        }
        assert!(!apply_upgrade(&mut e, SkillId::Bloodthirst));
        let c = e.combatant().unwrap();
        assert_eq!(c.skill_level(SkillId::Bloodthirst), 3);
        assert!((c.build.lifesteal - 0.12).abs() < 1e-5);
    }

    #[test]
    fn test_hardened_body_scales_hp() {
        let mut e = Entity::new_combatant(1, Vec2::ZERO, Combatant::new("YOU", Archetype::Mage), true);
        e.hp = 100.0;
        apply_upgrade(&mut e, SkillId::HardenedBody);
        assert_eq!(e.max_hp, 132.0);
        assert_eq!(e.hp, 110.0);
        assert_eq!(e.defense().flat_reduction, 5.0);
    }
}
