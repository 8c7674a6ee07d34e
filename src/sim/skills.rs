//! Ability activation and the per-tick skill processor
//!
//! Weapons fire on their own cooldown, actives fire on request (input or AI),
//! summons are kept alive one per owner. Every ability is a [`Behavior`]
//! variant; the synergy hooks (frozen daggers, totem overload) live next to
//! the behaviours they modify.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use log::debug;
use rand::Rng;

use super::bullet::{Bullet, Motion, VisualTag};
use super::catalog::{AbilityDescriptor, Behavior, SkillCategory, SkillId, descriptor, level_value};
use super::combat::{apply_damage, calculate_damage};
use super::entity::{Entity, EntityId, EntityKind, Offense, Summon, SummonRole};
use super::state::{Particle, ParticleKind, World};
use crate::{direction_to, heading_angle, polar_to_cartesian};

/// Bullet radius before area scaling
pub const DEFAULT_BULLET_RADIUS: f32 = 5.0;

// Basic attack
const BASIC_SPREAD: f32 = 0.2;
const BASIC_SPEED: f32 = 600.0;
const BASIC_LIFETIME: f32 = 1.5;
const BASIC_RADIUS: f32 = 4.0;
/// Auto-attack acquires targets this far beyond the attacker's range
pub const TARGET_RANGE_BONUS: f32 = 200.0;

/// Daggers locked onto a frozen target steer this hard
const DAGGER_TURN_RATE: f32 = 6.0;

/// Lifetime of anything that should outlive its owner's interest in it
const PERSISTENT: f32 = 9999.0;

// Summon bodies
const COMPANION_RADIUS: f32 = 12.0;
const COMPANION_OFFSET: Vec2 = Vec2::new(40.0, -40.0);
const COMPANION_SPAWN_OFFSET: Vec2 = Vec2::new(-30.0, -30.0);
const COMPANION_BREATH_RADIUS: f32 = 8.0;
const COMPANION_BREATH_LIFETIME: f32 = 2.0;
const TOTEM_RADIUS: f32 = 15.0;

/// Caster fields captured once per activation
#[derive(Debug, Clone, Copy)]
struct Caster {
    id: EntityId,
    pos: Vec2,
    vel: Vec2,
    max_hp: f32,
    offense: Offense,
    area_scale: f32,
    pierce: i32,
    target: Option<EntityId>,
}

impl Caster {
    fn read(world: &World, idx: usize) -> Option<Self> {
        let e = &world.entities[idx];
        let c = e.combatant()?;
        Some(Self {
            id: e.id,
            pos: e.pos,
            vel: e.vel,
            max_hp: e.max_hp,
            offense: c.offense(),
            area_scale: c.build.area_scale,
            pierce: c.build.pierce,
            target: c.target,
        })
    }
}

fn set_cooldown(world: &mut World, idx: usize, id: SkillId, value: f32) {
    if let Some(c) = world.entities[idx].combatant_mut() {
        c.cooldowns.insert(id, value);
    }
}

/// A bullet owned by `caster` carrying a fresh damage roll for `desc` at `level`
fn ability_bullet(
    world: &mut World,
    caster: &Caster,
    desc: &AbilityDescriptor,
    level: u8,
    pos: Vec2,
    vel: Vec2,
) -> Bullet {
    let roll = calculate_damage(&caster.offense, desc.damage_at(level), &mut world.rng);
    let id = world.next_entity_id();
    let mut bullet = Bullet::new(
        id,
        caster.id,
        pos,
        vel,
        DEFAULT_BULLET_RADIUS * caster.area_scale,
        roll.amount,
    );
    bullet.crit = roll.crit;
    bullet.source = Some(desc.id);
    bullet.visual = desc.visual;
    bullet.pierce = caster.pierce;
    bullet
}

fn is_own_totem(e: &Entity, owner: EntityId) -> bool {
    matches!(&e.kind, EntityKind::Summon(s) if s.owner == owner && s.is_static())
}

fn lightning(world: &mut World, from: Vec2, to: Vec2) {
    world.emit(Particle::new(from, ParticleKind::Lightning { to }).with_decay(5.0));
}

fn ring(world: &mut World, at: Vec2, radius: f32) {
    world.emit(Particle::new(at, ParticleKind::Ring { radius }).with_decay(2.5));
}

// ============================================================================
// Per-tick processing
// ============================================================================

/// Tick a combatant's abilities: cooldowns, summon upkeep and ready weapons.
///
/// Cooldowns keep running while frozen, but a frozen combatant fires nothing.
pub fn process_skills(world: &mut World, idx: usize, dt: f32) {
    let now = world.time;
    let e = &mut world.entities[idx];
    let frozen = e.status.is_frozen(now);
    let Some(c) = e.combatant_mut() else {
        return;
    };
    for cd in c.cooldowns.values_mut() {
        if *cd > 0.0 {
            *cd -= dt;
        }
    }
    let skills: Vec<(SkillId, u8)> = c.skills.iter().map(|(id, lvl)| (*id, *lvl)).collect();

    for (id, level) in skills {
        // Passives have no descriptor
        let Some(desc) = descriptor(id) else {
            continue;
        };
        match desc.category {
            SkillCategory::Summon => ensure_companion(world, idx, desc, level),
            SkillCategory::Weapon if !frozen => {
                let ready = world.entities[idx]
                    .combatant()
                    .is_some_and(|c| c.cooldown(id) <= 0.0);
                if ready && trigger_weapon(world, idx, desc, level) {
                    set_cooldown(world, idx, id, desc.cooldown_at(level));
                }
            }
            _ => {}
        }
    }
}

/// Fire a weapon; returns whether anything was produced
fn trigger_weapon(world: &mut World, idx: usize, desc: &AbilityDescriptor, level: u8) -> bool {
    let Some(caster) = Caster::read(world, idx) else {
        return false;
    };
    match desc.behavior {
        Behavior::Orbit {
            orbit_radius,
            rotation_time,
        } => whirling_blades(world, &caster, desc, level, level_value(orbit_radius, level), rotation_time),
        Behavior::Homing {
            speed,
            turn_rate,
            search_radius,
        } => arcane_orbs(world, &caster, desc, level, speed, turn_rate, search_radius),
        Behavior::Chain { .. } => chain_lightning(world, &caster, desc, level),
        Behavior::Lance {
            pierce,
            speed,
            search_radius,
            lifetime,
        } => {
            let dir = match world.nearest_target(caster.pos, caster.id, search_radius) {
                Some(t) => direction_to(caster.pos, world.entities[t].pos),
                None => polar_to_cartesian(1.0, heading_angle(caster.vel)),
            };
            let mut bullet = ability_bullet(world, &caster, desc, level, caster.pos, dir * speed);
            bullet.pierce = level_value(pierce, level);
            bullet.lifetime = lifetime;
            world.bullets.push(bullet);
            true
        }
        Behavior::Cone { .. } => phantom_daggers(world, &caster, desc, level),
        Behavior::Totem {
            duration,
            attack_interval,
            range,
            max_active,
            hp,
        } => {
            let active = world
                .entities
                .iter()
                .filter(|e| e.is_alive() && is_own_totem(e, caster.id))
                .count();
            if active >= max_active {
                return false;
            }
            let id = world.next_entity_id();
            let summon = Summon {
                owner: caster.id,
                role: SummonRole::Totem { lifetime: duration },
                power: desc.damage_at(level),
                attack_cooldown: 0.0,
                max_attack_cooldown: attack_interval,
                range,
                speed: 0.0,
                level,
            };
            world.spawn(Entity::new_summon(id, caster.pos, TOTEM_RADIUS, hp, summon));
            debug!("Entity {} placed a totem ({}/{max_active})", caster.id, active + 1);
            true
        }
        Behavior::Canister {
            duration,
            radius,
            search_radius,
            min_throw,
            max_throw,
        } => {
            let angle = match world.nearest_target(caster.pos, caster.id, search_radius) {
                Some(t) => heading_angle(world.entities[t].pos - caster.pos),
                None => world.rng.random::<f32>() * TAU,
            };
            let dist = world.rng.random_range(min_throw..max_throw);
            let land = caster.pos + polar_to_cartesian(dist, angle);
            let mut pool = ability_bullet(world, &caster, desc, level, land, Vec2::ZERO);
            pool.motion = Motion::Pool;
            pool.radius = radius * caster.area_scale;
            pool.lifetime = duration;
            world.bullets.push(pool);
            true
        }
        // Actives and summons never come through here
        Behavior::Companion { .. }
        | Behavior::Dash { .. }
        | Behavior::Meteor { .. }
        | Behavior::Barrier { .. }
        | Behavior::Nova { .. } => false,
    }
}

/// Keep `count` blades evenly spaced around the caster, spawning only the deficit
fn whirling_blades(
    world: &mut World,
    caster: &Caster,
    desc: &AbilityDescriptor,
    level: u8,
    radius: f32,
    rotation_time: f32,
) -> bool {
    let count = desc.count_at(level) as usize;
    let existing: Vec<usize> = world
        .bullets
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_orbit_from(caster.id, desc.id))
        .map(|(i, _)| i)
        .collect();
    if existing.len() >= count || count == 0 {
        return false;
    }

    let base = existing
        .first()
        .and_then(|&i| match world.bullets[i].motion {
            Motion::Orbit { angle, .. } => Some(angle),
            _ => None,
        })
        .unwrap_or(0.0);
    let step = TAU / count as f32;
    let angular_speed = TAU / rotation_time;

    for (slot, &i) in existing.iter().enumerate() {
        let angle = base + slot as f32 * step;
        let blade = &mut world.bullets[i];
        blade.motion = Motion::Orbit {
            angle,
            radius,
            angular_speed,
        };
        blade.pos = caster.pos + polar_to_cartesian(radius, angle);
    }
    for slot in existing.len()..count {
        let angle = base + slot as f32 * step;
        let pos = caster.pos + polar_to_cartesian(radius, angle);
        let mut blade = ability_bullet(world, caster, desc, level, pos, Vec2::ZERO);
        blade.motion = Motion::Orbit {
            angle,
            radius,
            angular_speed,
        };
        blade.pierce = 999;
        blade.lifetime = PERSISTENT;
        world.bullets.push(blade);
    }
    true
}

fn arcane_orbs(
    world: &mut World,
    caster: &Caster,
    desc: &AbilityDescriptor,
    level: u8,
    speed: f32,
    turn_rate: f32,
    search_radius: f32,
) -> bool {
    let Some(t) = world.nearest_target(caster.pos, caster.id, search_radius) else {
        return false;
    };
    let target = world.entities[t].id;
    for _ in 0..desc.count_at(level) {
        let mut orb = ability_bullet(world, caster, desc, level, caster.pos, Vec2::ZERO);
        orb.motion = Motion::Homing {
            target,
            turn_rate,
            speed,
        };
        world.bullets.push(orb);
    }
    true
}

/// Strike the nearest target, then jump between hostiles and the caster's
/// own totems. A link landing on a totem overloads it instead of dealing
/// chain damage, and the chain carries on from there.
fn chain_lightning(world: &mut World, caster: &Caster, desc: &AbilityDescriptor, level: u8) -> bool {
    let Behavior::Chain {
        jumps,
        search_radius,
        jump_radius,
        decay,
        overload_radius,
        overload_damage,
    } = desc.behavior
    else {
        return false;
    };

    let Some(first) = world.nearest_where(caster.pos, search_radius, |e| {
        e.is_enemy_of(caster.id) || is_own_totem(e, caster.id)
    }) else {
        return false;
    };

    let jumps = level_value(jumps, level);
    let mut visited = vec![world.entities[first].id];
    let mut from = caster.pos;
    let mut link = first;
    let mut k = 0;
    loop {
        let at = world.entities[link].pos;
        if is_own_totem(&world.entities[link], caster.id) {
            overload(world, caster, from, at, overload_radius, overload_damage);
        } else {
            let roll = calculate_damage(&caster.offense, desc.damage_at(level), &mut world.rng);
            let amount = (roll.amount * decay.powi(k as i32)).floor();
            apply_damage(world, link, amount, Some(caster.id), roll.crit);
            lightning(world, from, at);
        }

        if k >= jumps {
            break;
        }
        let next = world.nearest_where(at, jump_radius, |e| {
            !visited.contains(&e.id) && (e.is_hostile() || is_own_totem(e, caster.id))
        });
        let Some(next) = next else {
            break;
        };
        visited.push(world.entities[next].id);
        from = at;
        link = next;
        k += 1;
    }
    true
}

fn overload(world: &mut World, caster: &Caster, from: Vec2, at: Vec2, radius: f32, damage: f32) {
    lightning(world, from, at);
    ring(world, at, radius);
    debug!("Entity {} overloaded a totem", caster.id);
    let len = world.entities.len();
    for i in 0..len {
        let e = &world.entities[i];
        if e.dead || !e.is_hostile() || e.pos.distance(at) >= radius {
            continue;
        }
        let roll = calculate_damage(&caster.offense, damage, &mut world.rng);
        apply_damage(world, i, roll.amount, Some(caster.id), true);
    }
}

/// Daggers fly opposite to the caster's heading; a nearby frozen target
/// draws them in for triple damage and a guaranteed crit.
fn phantom_daggers(world: &mut World, caster: &Caster, desc: &AbilityDescriptor, level: u8) -> bool {
    let Behavior::Cone {
        speed,
        spread,
        lifetime,
        frozen_search_radius,
        frozen_multiplier,
    } = desc.behavior
    else {
        return false;
    };

    let now = world.time;
    let frozen_target = world
        .nearest_where(caster.pos, frozen_search_radius, |e| {
            e.is_enemy_of(caster.id) && e.status.is_frozen(now)
        })
        .map(|i| world.entities[i].id);

    let back = if caster.vel == Vec2::ZERO {
        world.rng.random::<f32>() * TAU
    } else {
        heading_angle(caster.vel) + PI
    };

    for _ in 0..desc.count_at(level) {
        let a = back - spread / 2.0 + world.rng.random::<f32>() * spread;
        let mut dagger = ability_bullet(world, caster, desc, level, caster.pos, polar_to_cartesian(speed, a));
        dagger.lifetime = lifetime;
        if let Some(target) = frozen_target {
            dagger.motion = Motion::Homing {
                target,
                turn_rate: DAGGER_TURN_RATE,
                speed,
            };
            dagger.damage *= frozen_multiplier;
            dagger.crit = true;
        }
        world.bullets.push(dagger);
    }
    true
}

// ============================================================================
// Manual actives
// ============================================================================

/// Trigger an active ability if acquired, off cooldown and not frozen.
///
/// `aim` is a world-space point used for the dash direction when the caster
/// is standing still. Returns whether the ability fired.
pub fn activate_skill(world: &mut World, idx: usize, id: SkillId, aim: Option<Vec2>) -> bool {
    let Some(desc) = descriptor(id).filter(|d| d.category == SkillCategory::Active) else {
        return false;
    };
    let now = world.time;
    let e = &world.entities[idx];
    if e.dead || e.status.is_frozen(now) {
        return false;
    }
    let Some(c) = e.combatant() else {
        return false;
    };
    let level = c.skill_level(id);
    if level == 0 || c.cooldown(id) > 0.0 {
        return false;
    }
    let Some(caster) = Caster::read(world, idx) else {
        return false;
    };

    match desc.behavior {
        Behavior::Dash {
            distance,
            invulnerable_for,
        } => {
            let mut dir = caster.vel.normalize_or_zero();
            if dir == Vec2::ZERO {
                dir = aim.map(|a| direction_to(caster.pos, a)).unwrap_or(Vec2::ZERO);
            }
            if dir == Vec2::ZERO {
                dir = Vec2::X;
            }
            let e = &mut world.entities[idx];
            e.pos += dir * distance;
            e.status.invulnerable_until = now + invulnerable_for;
            let at = e.pos;
            ring(world, at, 30.0);
        }
        Behavior::Meteor {
            radius,
            blast_radius,
            fuse,
            fuse_jitter,
        } => {
            let center = caster
                .target
                .and_then(|t| world.alive(t))
                .map_or(caster.pos, |t| t.pos);
            for _ in 0..desc.count_at(level) {
                let angle = world.rng.random::<f32>() * TAU;
                let dist = world.rng.random::<f32>() * radius;
                let drop = center + polar_to_cartesian(dist, angle);
                let mut meteor = ability_bullet(world, &caster, desc, level, drop, Vec2::ZERO);
                meteor.motion = Motion::Fuse { blast_radius };
                meteor.radius = blast_radius;
                meteor.lifetime = fuse + world.rng.random::<f32>() * fuse_jitter;
                world.bullets.push(meteor);
            }
        }
        Behavior::Barrier {
            duration,
            shield_pct,
            shield_per_level,
            radius,
        } => {
            let shield = (caster.max_hp * (shield_pct + shield_per_level * level as f32)).floor();
            if let Some(c) = world.entities[idx].combatant_mut() {
                c.max_shield = shield;
                c.shield = shield;
            }
            let mut aura = ability_bullet(world, &caster, desc, level, caster.pos, Vec2::ZERO);
            aura.motion = Motion::Aura;
            aura.radius = radius;
            aura.lifetime = duration;
            aura.pierce = 999;
            world.bullets.push(aura);
        }
        Behavior::Nova { radius, freeze_for } => {
            let radius = radius * caster.area_scale;
            ring(world, caster.pos, radius);
            let len = world.entities.len();
            for i in 0..len {
                let t = &mut world.entities[i];
                if t.dead || !t.is_enemy_of(caster.id) || t.pos.distance(caster.pos) >= radius {
                    continue;
                }
                t.status.frozen_until = now + freeze_for;
                let at = t.pos;
                let roll = calculate_damage(&caster.offense, desc.damage_at(level), &mut world.rng);
                apply_damage(world, i, roll.amount, Some(caster.id), roll.crit);
                world.emit(Particle::text(at, ParticleKind::Status { label: "FROZEN" }));
            }
        }
        _ => return false,
    }

    set_cooldown(world, idx, id, desc.cooldown_at(level));
    true
}

/// First acquired primary active that is ready: meteor, then barrier, then nova
pub fn ready_primary_active(entity: &Entity) -> Option<SkillId> {
    let c = entity.combatant()?;
    SkillId::PRIMARY_ACTIVES.into_iter().find(|id| c.is_ready(*id))
}

// ============================================================================
// Basic attack
// ============================================================================

/// Count down the basic attack and fire a fan at the nearest target when ready
pub fn auto_attack(world: &mut World, idx: usize, dt: f32) {
    let now = world.time;
    let e = &mut world.entities[idx];
    let frozen = e.status.is_frozen(now);
    let (id, pos, area_scale) = (e.id, e.pos, e.combatant().map_or(1.0, |c| c.build.area_scale));
    let Some(c) = e.combatant_mut() else {
        return;
    };
    c.attack_cooldown -= dt;
    if c.attack_cooldown > 0.0 || frozen {
        return;
    }
    let (range, count, pierce, offense) = (c.range, c.build.projectile_count.max(1), c.build.pierce, c.offense());

    let Some(t) = world.nearest_target(pos, id, range + TARGET_RANGE_BONUS) else {
        return;
    };
    let base = heading_angle(world.entities[t].pos - pos);
    let start = -((count - 1) as f32 * BASIC_SPREAD) / 2.0;
    for i in 0..count {
        let angle = base + start + i as f32 * BASIC_SPREAD;
        let roll = calculate_damage(&offense, offense.damage, &mut world.rng);
        let bid = world.next_entity_id();
        let mut bullet = Bullet::new(
            bid,
            id,
            pos,
            polar_to_cartesian(BASIC_SPEED, angle),
            BASIC_RADIUS * area_scale,
            roll.amount,
        );
        bullet.crit = roll.crit;
        bullet.pierce = pierce;
        bullet.lifetime = BASIC_LIFETIME;
        world.bullets.push(bullet);
    }

    let e = &mut world.entities[idx];
    e.status.last_combat_time = now;
    if let Some(c) = e.combatant_mut() {
        c.attack_cooldown = c.max_attack_cooldown;
    }
}

// ============================================================================
// Summons
// ============================================================================

/// Spawn the owner's companion if it has none, or bring it up to `level`
fn ensure_companion(world: &mut World, idx: usize, desc: &AbilityDescriptor, level: u8) {
    let Behavior::Companion {
        attack_cooldown,
        attack_cooldown_per_level,
        range,
        follow_speed,
        hp,
        ..
    } = desc.behavior
    else {
        return;
    };
    let (owner, owner_pos) = (world.entities[idx].id, world.entities[idx].pos);
    let max_attack_cooldown = attack_cooldown + attack_cooldown_per_level * level as f32;
    let power = desc.damage_at(level);

    let existing = world.entities.iter_mut().find_map(|e| match &mut e.kind {
        EntityKind::Summon(s) if !e.dead && s.owner == owner && !s.is_static() => Some(s),
        _ => None,
    });
    if let Some(s) = existing {
        if s.level < level {
            s.level = level;
            s.power = power;
            s.max_attack_cooldown = max_attack_cooldown;
        }
        return;
    }

    let id = world.next_entity_id();
    let summon = Summon {
        owner,
        role: SummonRole::Companion,
        power,
        attack_cooldown: 0.0,
        max_attack_cooldown,
        range,
        speed: follow_speed,
        level,
    };
    world.spawn(Entity::new_summon(id, owner_pos + COMPANION_SPAWN_OFFSET, COMPANION_RADIUS, hp, summon));
    debug!("Entity {owner} summoned a companion");
}

/// Run one summon: expire it, move it and let it attack
pub fn update_summon(world: &mut World, idx: usize, dt: f32) {
    let (pos, owner) = match &world.entities[idx].kind {
        EntityKind::Summon(s) => (world.entities[idx].pos, s.owner),
        _ => return,
    };
    let owner_entity = world.alive(owner);
    let owner_pos = owner_entity.map(|o| o.pos);
    let owner_offense = owner_entity.and_then(Entity::offense);

    let e = &mut world.entities[idx];
    let Some(owner_pos) = owner_pos else {
        e.dead = true;
        return;
    };
    let EntityKind::Summon(s) = &mut e.kind else {
        return;
    };

    if let SummonRole::Totem { lifetime } = &mut s.role {
        *lifetime -= dt;
        if *lifetime <= 0.0 {
            e.dead = true;
            return;
        }
    } else {
        let ideal = owner_pos + COMPANION_OFFSET;
        e.vel = if pos.distance(ideal) > 10.0 {
            direction_to(pos, ideal) * s.speed
        } else {
            Vec2::ZERO
        };
    }

    s.attack_cooldown -= dt;
    if s.attack_cooldown > 0.0 {
        return;
    }
    let (range, power, is_static) = (s.range, s.power, s.is_static());
    let Some(t) = world.nearest_where(pos, range, |t| t.is_hostile()) else {
        return;
    };
    let target_pos = world.entities[t].pos;

    if is_static {
        lightning(world, pos, target_pos);
        apply_damage(world, t, power, Some(owner), false);
    } else {
        let Some(offense) = owner_offense else {
            return;
        };
        let Some(Behavior::Companion { projectile_speed, .. }) =
            descriptor(SkillId::DragonScion).map(|d| d.behavior)
        else {
            return;
        };
        let roll = calculate_damage(&offense, power, &mut world.rng);
        let id = world.next_entity_id();
        let mut breath = Bullet::new(
            id,
            owner,
            pos,
            direction_to(pos, target_pos) * projectile_speed,
            COMPANION_BREATH_RADIUS,
            roll.amount,
        );
        breath.crit = roll.crit;
        breath.lifetime = COMPANION_BREATH_LIFETIME;
        breath.visual = VisualTag::Fire;
        world.bullets.push(breath);
    }

    if let EntityKind::Summon(s) = &mut world.entities[idx].kind {
        s.attack_cooldown = s.max_attack_cooldown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::sim::catalog::{Archetype, apply_upgrade};
    use crate::sim::entity::{Combatant, Hostile, Kind};

    fn arena() -> World {
        World::empty(11, ArenaConfig::default())
    }

    fn add_combatant(world: &mut World, pos: Vec2, archetype: Archetype) -> usize {
        let id = world.next_entity_id();
        world.spawn(Entity::new_combatant(id, pos, Combatant::new("T", archetype), false));
        world.entities.len() - 1
    }

    fn add_hostile(world: &mut World, pos: Vec2, hp: f32) -> usize {
        let id = world.next_entity_id();
        let hostile = Hostile {
            damage: 12.0,
            speed: 80.0,
            exp_reward: 20.0,
            elite: false,
        };
        world.spawn(Entity::new_hostile(id, pos, 16.0, hp, hostile));
        world.entities.len() - 1
    }

    fn learn(world: &mut World, idx: usize, id: SkillId, levels: u8) {
        for _ in 0..levels {
            assert!(apply_upgrade(&mut world.entities[idx], id));
        }
    }

    fn add_totem(world: &mut World, owner: EntityId, pos: Vec2) -> usize {
        let id = world.next_entity_id();
        let summon = Summon {
            owner,
            role: SummonRole::Totem { lifetime: 10.0 },
            power: 24.0,
            attack_cooldown: 0.0,
            max_attack_cooldown: 0.6,
            range: 320.0,
            speed: 0.0,
            level: 1,
        };
        world.spawn(Entity::new_summon(id, pos, TOTEM_RADIUS, 500.0, summon));
        world.entities.len() - 1
    }

    fn no_crits(world: &mut World, idx: usize) {
        world.entities[idx].combatant_mut().unwrap().build.crit_rate = 0.0;
    }

    fn orbit_count(world: &World, owner: EntityId) -> usize {
        world
            .bullets
            .iter()
            .filter(|b| b.is_orbit_from(owner, SkillId::WhirlingBlades))
            .count()
    }

    #[test]
    fn test_orbit_spawns_only_deficit() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(500.0), Archetype::Warrior);
        let owner = world.entities[idx].id;
        learn(&mut world, idx, SkillId::WhirlingBlades, 1);

        process_skills(&mut world, idx, 1.0 / 60.0);
        assert_eq!(orbit_count(&world, owner), 2);
        for _ in 0..10 {
            process_skills(&mut world, idx, 1.0 / 60.0);
        }
        assert_eq!(orbit_count(&world, owner), 2);

        learn(&mut world, idx, SkillId::WhirlingBlades, 1);
        process_skills(&mut world, idx, 1.0 / 60.0);
        assert_eq!(orbit_count(&world, owner), 3);

        // Evenly spaced from the first blade
        let angles: Vec<f32> = world
            .bullets
            .iter()
            .filter_map(|b| match b.motion {
                Motion::Orbit { angle, radius, .. } => {
                    assert_eq!(radius, 110.0);
                    Some(angle)
                }
                _ => None,
            })
            .collect();
        assert!((angles[1] - angles[0] - TAU / 3.0).abs() < 1e-4);
        assert!((angles[2] - angles[0] - 2.0 * TAU / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbs_need_a_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(500.0), Archetype::Mage);
        learn(&mut world, idx, SkillId::ArcaneOrbs, 2);

        process_skills(&mut world, idx, 0.01);
        assert!(world.bullets.is_empty());
        assert_eq!(world.entities[idx].combatant().unwrap().cooldown(SkillId::ArcaneOrbs), 0.0);

        let h = add_hostile(&mut world, Vec2::new(900.0, 500.0), 50.0);
        let hid = world.entities[h].id;
        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 2);
        assert!(world
            .bullets
            .iter()
            .all(|b| matches!(b.motion, Motion::Homing { target, .. } if target == hid)));
        let cd = world.entities[idx].combatant().unwrap().cooldown(SkillId::ArcaneOrbs);
        assert!((cd - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_chain_visits_each_target_once() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::ChainLightning, 3);
        let a = add_hostile(&mut world, Vec2::new(100.0, 0.0), 10_000.0);
        let b = add_hostile(&mut world, Vec2::new(250.0, 0.0), 10_000.0);

        process_skills(&mut world, idx, 0.01);
        // Two links only, no bouncing back
        assert!(world.entities[a].hp < 10_000.0);
        assert!(world.entities[b].hp < 10_000.0);
        let damage_texts = world
            .particles
            .iter()
            .filter(|p| matches!(p.kind, ParticleKind::Damage { .. }))
            .count();
        assert_eq!(damage_texts, 2);
    }

    #[test]
    fn test_chain_overloads_own_totem() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::ThunderTotem, 1);
        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.count_alive(Kind::Summon), 1);

        learn(&mut world, idx, SkillId::ChainLightning, 1);
        let far = add_hostile(&mut world, Vec2::new(200.0, 0.0), 10_000.0);
        process_skills(&mut world, idx, 0.01);

        // The totem sits on the caster, so it is the first link
        assert!(world
            .particles
            .iter()
            .any(|p| matches!(p.kind, ParticleKind::Ring { radius } if radius == 250.0)));
        assert!(world.entities[far].hp <= 10_000.0 - 300.0);
        assert_eq!(world.count_alive(Kind::Summon), 1);
    }

    #[test]
    fn test_chain_overload_on_later_jump_carries_on() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        let owner = world.entities[idx].id;
        no_crits(&mut world, idx);
        learn(&mut world, idx, SkillId::ChainLightning, 1);
        let first = add_hostile(&mut world, Vec2::new(100.0, 0.0), 10_000.0);
        add_totem(&mut world, owner, Vec2::new(300.0, 0.0));
        // Only reachable from the totem, and outside its blast
        let last = add_hostile(&mut world, Vec2::new(300.0, 255.0), 10_000.0);

        process_skills(&mut world, idx, 0.01);

        assert!(world
            .particles
            .iter()
            .any(|p| matches!(p.kind, ParticleKind::Ring { radius } if radius == 250.0)));
        // 36 from the first link plus the 300 blast
        assert_eq!(world.entities[first].hp, 10_000.0 - 36.0 - 300.0);
        // Third link: floor(36 * 0.85^2)
        assert_eq!(world.entities[last].hp, 10_000.0 - 26.0);
        assert_eq!(world.count_alive(Kind::Summon), 1);
    }

    #[test]
    fn test_meteors_fall_around_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(500.0), Archetype::Mage);
        learn(&mut world, idx, SkillId::MeteorShower, 2);
        let h = add_hostile(&mut world, Vec2::new(1500.0, 500.0), 500.0);
        let target = world.entities[h].id;
        world.entities[idx].combatant_mut().unwrap().target = Some(target);

        assert!(activate_skill(&mut world, idx, SkillId::MeteorShower, None));
        assert_eq!(world.bullets.len(), 8);
        for m in &world.bullets {
            assert!(matches!(m.motion, Motion::Fuse { blast_radius } if blast_radius == 90.0));
            assert!(m.pos.distance(Vec2::new(1500.0, 500.0)) <= 260.0 + 1e-3);
            assert!((0.7..1.2).contains(&m.lifetime));
        }
        let first = world.bullets[0].lifetime;
        assert!(world.bullets.iter().any(|m| m.lifetime != first));
        let cd = world.entities[idx].combatant().unwrap().cooldown(SkillId::MeteorShower);
        assert!((cd - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_meteors_fall_around_caster_without_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(500.0), Archetype::Mage);
        learn(&mut world, idx, SkillId::MeteorShower, 1);
        assert!(activate_skill(&mut world, idx, SkillId::MeteorShower, None));
        assert_eq!(world.bullets.len(), 5);
        assert!(world
            .bullets
            .iter()
            .all(|m| m.pos.distance(Vec2::splat(500.0)) <= 260.0 + 1e-3));
    }

    #[test]
    fn test_canister_lands_toward_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(1000.0), Archetype::Warrior);
        learn(&mut world, idx, SkillId::ToxicGas, 1);
        add_hostile(&mut world, Vec2::new(1300.0, 1000.0), 500.0);

        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 1);
        let pool = &world.bullets[0];
        assert!(matches!(pool.motion, Motion::Pool));
        assert_eq!(pool.radius, 140.0);
        let offset = pool.pos - Vec2::splat(1000.0);
        assert!((100.0 - 1e-3..250.0).contains(&offset.length()));
        assert!(offset.x > 0.0 && offset.y.abs() < 1e-2);
    }

    #[test]
    fn test_canister_thrown_blind_without_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(1000.0), Archetype::Warrior);
        learn(&mut world, idx, SkillId::ToxicGas, 1);
        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 1);
        let d = world.bullets[0].pos.distance(Vec2::splat(1000.0));
        assert!((100.0 - 1e-3..250.0).contains(&d));
    }

    #[test]
    fn test_totem_cap_keeps_cooldown() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(400.0), Archetype::Warrior);
        learn(&mut world, idx, SkillId::ThunderTotem, 1);
        let desc = descriptor(SkillId::ThunderTotem).unwrap();

        assert!(trigger_weapon(&mut world, idx, desc, 1));
        assert!(trigger_weapon(&mut world, idx, desc, 1));
        assert!(!trigger_weapon(&mut world, idx, desc, 1));
        assert_eq!(world.count_alive(Kind::Summon), 2);

        // Capped: nothing placed and the cooldown stays ready
        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.count_alive(Kind::Summon), 2);
        assert_eq!(world.entities[idx].combatant().unwrap().cooldown(SkillId::ThunderTotem), 0.0);
    }

    #[test]
    fn test_spear_follows_heading_without_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(500.0), Archetype::Warrior);
        learn(&mut world, idx, SkillId::BoneSpear, 2);
        world.entities[idx].vel = Vec2::new(0.0, 10.0);

        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 1);
        let spear = &world.bullets[0];
        assert!((spear.vel - Vec2::new(0.0, 650.0)).length() < 1e-2);
        assert_eq!(spear.pierce, 4);
        assert_eq!(spear.lifetime, 3.0);
    }

    #[test]
    fn test_totem_zaps_then_expires() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        let owner = world.entities[idx].id;
        let h = add_hostile(&mut world, Vec2::new(200.0, 0.0), 500.0);
        let totem = add_totem(&mut world, owner, Vec2::ZERO);

        update_summon(&mut world, totem, 0.1);
        assert_eq!(world.entities[h].hp, 476.0);
        assert!(world
            .particles
            .iter()
            .any(|p| matches!(p.kind, ParticleKind::Lightning { .. })));

        // Recharging
        update_summon(&mut world, totem, 0.1);
        assert_eq!(world.entities[h].hp, 476.0);

        update_summon(&mut world, totem, 10.0);
        assert!(world.entities[totem].dead);
        assert_eq!(world.entities[h].hp, 476.0);
    }

    #[test]
    fn test_nova_freezes_and_bonus_applies() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::FrostNova, 1);
        world.entities[idx].combatant_mut().unwrap().build.crit_rate = 0.0;
        let h = add_hostile(&mut world, Vec2::new(100.0, 0.0), 500.0);
        let out = add_hostile(&mut world, Vec2::new(1000.0, 0.0), 500.0);

        assert!(activate_skill(&mut world, idx, SkillId::FrostNova, None));
        assert!(world.entities[h].status.is_frozen(world.time));
        assert!(!world.entities[out].status.is_frozen(world.time));
        // 15 scaled by the frozen bonus
        assert!((world.entities[h].hp - 480.5).abs() < 1e-3);
        // On cooldown now
        assert!(!activate_skill(&mut world, idx, SkillId::FrostNova, None));
    }

    #[test]
    fn test_dash_uses_aim_when_still() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(1000.0), Archetype::Ranger);
        learn(&mut world, idx, SkillId::VoidDash, 1);
        world.time = 2.0;
        assert!(activate_skill(&mut world, idx, SkillId::VoidDash, Some(Vec2::new(1000.0, 0.0))));
        let e = &world.entities[idx];
        assert!((e.pos - Vec2::new(1000.0, 750.0)).length() < 1e-3);
        assert!(e.status.is_invulnerable(2.4));
        assert!(!e.status.is_invulnerable(2.5));
    }

    #[test]
    fn test_frozen_caster_cannot_act() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::VoidDash, 1);
        learn(&mut world, idx, SkillId::BoneSpear, 1);
        world.entities[idx].status.frozen_until = 5.0;
        assert!(!activate_skill(&mut world, idx, SkillId::VoidDash, None));
        process_skills(&mut world, idx, 0.01);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_barrier_grants_shield_and_aura() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::HolyBarrier, 1);
        assert!(activate_skill(&mut world, idx, SkillId::HolyBarrier, None));
        // floor(250 * 0.15)
        assert_eq!(world.entities[idx].combatant().unwrap().shield, 37.0);
        assert!(matches!(world.bullets[0].motion, Motion::Aura));
    }

    #[test]
    fn test_daggers_home_on_frozen_target() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Warrior);
        learn(&mut world, idx, SkillId::PhantomDaggers, 1);
        let h = add_hostile(&mut world, Vec2::new(300.0, 0.0), 500.0);
        world.entities[h].status.frozen_until = 10.0;
        let hid = world.entities[h].id;

        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 2);
        for b in &world.bullets {
            assert!(b.crit);
            assert!(matches!(b.motion, Motion::Homing { target, .. } if target == hid));
        }
    }

    #[test]
    fn test_companion_is_unique_and_dies_with_owner() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::splat(400.0), Archetype::Mage);
        learn(&mut world, idx, SkillId::DragonScion, 1);
        process_skills(&mut world, idx, 0.01);
        process_skills(&mut world, idx, 0.01);
        assert_eq!(world.count_alive(Kind::Summon), 1);

        world.entities[idx].dead = true;
        let pet = world.entities.len() - 1;
        update_summon(&mut world, pet, 0.01);
        assert!(world.entities[pet].dead);
    }

    #[test]
    fn test_auto_attack_fan() {
        let mut world = arena();
        let idx = add_combatant(&mut world, Vec2::ZERO, Archetype::Ranger);
        world.entities[idx].combatant_mut().unwrap().build.projectile_count = 3;
        add_hostile(&mut world, Vec2::new(300.0, 0.0), 50.0);
        auto_attack(&mut world, idx, 0.01);
        assert_eq!(world.bullets.len(), 3);
        let middle = world.bullets[1].vel;
        assert!((middle - Vec2::new(600.0, 0.0)).length() < 1e-2);
        assert!(world.entities[idx].combatant().unwrap().attack_cooldown > 0.0);
    }
}
