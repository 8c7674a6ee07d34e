//! Combat resolver: damage rolls, the mitigation pipeline and kill handling

use glam::Vec2;
use log::debug;
use rand::Rng;

use super::catalog::DAMAGE_NORMALIZATION;
use super::entity::{Defense, Entity, EntityId, Offense};
use super::state::{Particle, ParticleKind, World};

/// Damage taken by frozen targets is multiplied by this
pub const FROZEN_DAMAGE_MULT: f32 = 1.3;

/// Result of an attacker's damage roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRoll {
    pub amount: f32,
    pub crit: bool,
}

/// Scale a table value by the attacker's damage and roll a critical hit
pub fn calculate_damage(offense: &Offense, base: f32, rng: &mut impl Rng) -> DamageRoll {
    let mut amount = base * (offense.damage / DAMAGE_NORMALIZATION);
    let crit = rng.random::<f32>() < offense.crit_rate;
    if crit {
        amount *= offense.crit_damage;
    }
    DamageRoll {
        amount: amount.floor(),
        crit,
    }
}

/// Damage left after the frozen bonus, armor and flat reduction (never below 1)
pub fn mitigate(amount: f32, defense: Defense, frozen: bool) -> f32 {
    let mut x = amount;
    if frozen {
        x *= FROZEN_DAMAGE_MULT;
    }
    x *= 1.0 - defense.armor;
    (x - defense.flat_reduction).max(1.0)
}

/// Split `amount` between a shield pool and hp; returns the hp part
pub fn absorb(shield: &mut f32, amount: f32) -> f32 {
    if *shield >= amount {
        *shield -= amount;
        0.0
    } else {
        let rest = amount - *shield;
        *shield = 0.0;
        rest
    }
}

/// Apply a hit to `entities[idx]`; returns the hp actually lost.
///
/// Invulnerable and already-dead targets are left untouched. A lethal hit
/// runs kill handling, crediting `attacker` (or the target itself).
pub fn apply_damage(
    world: &mut World,
    idx: usize,
    amount: f32,
    attacker: Option<EntityId>,
    crit: bool,
) -> f32 {
    let now = world.time;
    let target = &mut world.entities[idx];
    if target.dead || target.status.is_invulnerable(now) {
        return 0.0;
    }

    let final_amount = mitigate(amount, target.defense(), target.status.is_frozen(now));
    let to_hp = match target.shield_mut() {
        Some(shield) => absorb(shield, final_amount),
        None => final_amount,
    };
    target.hp -= to_hp;
    target.status.last_combat_time = now;

    let pos = target.pos - Vec2::new(0.0, target.radius);
    let killed = target.hp <= 0.0;
    let victim_id = target.id;

    let kind = if to_hp <= 0.0 {
        ParticleKind::Absorbed
    } else {
        ParticleKind::Damage { amount: to_hp, crit }
    };
    world.emit(Particle::text(pos, kind));

    if killed {
        handle_kill(world, attacker.unwrap_or(victim_id), idx);
    }
    to_hp
}

/// Mark `entities[victim_idx]` dead, drop its experience and credit the killer
pub fn handle_kill(world: &mut World, killer: EntityId, victim_idx: usize) {
    let victim = &mut world.entities[victim_idx];
    if victim.dead {
        return;
    }
    victim.dead = true;
    let (victim_id, pos, reward, victim_max_hp) =
        (victim.id, victim.pos, victim.kill_reward(), victim.max_hp);
    if let Some(c) = victim.combatant() {
        debug!("{} eliminated at t={:.1}", c.name, world.time);
    }

    let pickup_id = world.next_entity_id();
    world.spawn(Entity::new_pickup(pickup_id, pos, reward));

    for _ in 0..5 {
        let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
        let speed = world.rng.random_range(40.0..160.0);
        let mut spark = Particle::new(pos, ParticleKind::Spark).with_decay(2.0);
        spark.vel = crate::polar_to_cartesian(speed, angle);
        world.emit(spark);
    }

    if killer == victim_id {
        return;
    }
    let Some(killer_entity) = world.get_mut(killer).filter(|e| e.is_alive()) else {
        return;
    };
    let Some(c) = killer_entity.combatant_mut() else {
        return;
    };
    c.kills += 1;
    let lifesteal = c.build.lifesteal;
    if lifesteal > 0.0 && killer_entity.hp < killer_entity.max_hp {
        let heal = lifesteal * victim_max_hp * 0.1 + 1.0;
        killer_entity.hp = (killer_entity.hp + heal).min(killer_entity.max_hp);
        let at = killer_entity.pos;
        world.emit(Particle::text(at, ParticleKind::Heal { amount: heal.floor() }));
    }
}
