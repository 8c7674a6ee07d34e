//! Fixed timestep simulation tick
//!
//! One pass over the world in a fixed order: input, entity behaviours,
//! spawner, physics and zone, projectiles, contact damage, sweep, terminal
//! check, particles.
//!
//! The entity pass walks indices up to the length captured when it starts.
//! Anything spawned during the pass (pickups, summons) is appended and only
//! takes part in the later phases of this tick.

use glam::Vec2;
use log::info;

use super::ai::run_bot;
use super::catalog::SkillId;
use super::combat::{apply_damage, handle_kill};
use super::entity::{EntityKind, Kind};
use super::progression::update_pickup;
use super::projectiles::update_bullets;
use super::skills::{activate_skill, auto_attack, process_skills, ready_primary_active, update_summon};
use super::spawner::spawn_hostiles;
use super::state::{GameEvent, GamePhase, World};
use crate::direction_to;

/// Hostiles chase anything within this distance
pub const HOSTILE_SEEK_RADIUS: f32 = 2000.0;

/// Contact damage per second is the hostile's damage times this
pub const CONTACT_DAMAGE_SCALE: f32 = 2.0;

/// Contact damage reduction per Weakening Curse level
const CURSE_REDUCTION: f32 = 0.1;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; normalized before use
    pub movement: Vec2,
    /// World-space pointer position, the dash fallback direction
    pub aim: Option<Vec2>,
    /// Dash trigger
    pub dash: bool,
    /// Primary active trigger (meteor, then barrier, then nova)
    pub primary: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if input.pause {
        match world.phase {
            GamePhase::Playing => {
                world.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => world.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if world.phase != GamePhase::Playing {
        return;
    }

    world.time += dt;
    world.zone_radius = (world.zone_radius - world.config.zone_shrink_speed * dt).max(0.0);

    apply_player_input(world, input);
    update_entities(world, dt);
    spawn_hostiles(world, dt);
    integrate(world, dt);
    update_bullets(world, dt);
    contact_damage(world, dt);

    let outcome = match world.player() {
        Some(p) => p.combatant().map(|c| (p.dead, c.level, c.kills)),
        None => None,
    };
    world.entities.retain(|e| !e.dead);
    check_match_end(world, outcome);

    decay_particles(world, dt);
}

/// Movement, dash and primary active for the controlled avatar
fn apply_player_input(world: &mut World, input: &TickInput) {
    let now = world.time;
    let Some(idx) = world.index_of(world.player_id) else {
        return;
    };
    let e = &mut world.entities[idx];
    if e.dead {
        return;
    }
    if !e.status.is_frozen(now) {
        let speed = e.combatant().map_or(0.0, |c| c.speed);
        e.vel = input.movement.normalize_or_zero() * speed;
    }

    if input.dash {
        activate_skill(world, idx, SkillId::VoidDash, input.aim);
    }
    if input.primary {
        if let Some(id) = ready_primary_active(&world.entities[idx]) {
            activate_skill(world, idx, id, input.aim);
        }
    }
}

/// Regen plus the kind-specific behaviour of every entity alive at pass start
fn update_entities(world: &mut World, dt: f32) {
    let len = world.entities.len();
    for idx in 0..len {
        if world.entities[idx].dead {
            continue;
        }
        regenerate(world, idx, dt);

        match world.entities[idx].kind() {
            Kind::Hostile => seek(world, idx),
            Kind::Bot => run_bot(world, idx),
            Kind::Summon => update_summon(world, idx, dt),
            Kind::Pickup => update_pickup(world, idx, dt),
            Kind::Player | Kind::Bullet => {}
        }

        let e = &world.entities[idx];
        if e.is_combatant() && !e.dead {
            auto_attack(world, idx, dt);
            process_skills(world, idx, dt);
        }
    }
}

/// Passive regen always; out-of-combat regen after the configured delay
fn regenerate(world: &mut World, idx: usize, dt: f32) {
    let (now, delay, rate) = (world.time, world.config.regen_delay, world.config.regen_rate);
    let e = &mut world.entities[idx];

    let passive = e.combatant().map_or(0.0, |c| c.build.regen);
    if passive > 0.0 {
        e.hp = (e.hp + passive * dt).min(e.max_hp);
    }

    let recovers = matches!(
        e.kind,
        EntityKind::Player(_) | EntityKind::Bot(_) | EntityKind::Hostile(_)
    );
    if recovers && e.hp < e.max_hp && now - e.status.last_combat_time > delay {
        e.hp = (e.hp + e.max_hp * rate * dt).min(e.max_hp);
    }
}

/// Hostile steering toward the nearest combatant or mobile summon
fn seek(world: &mut World, idx: usize) {
    let now = world.time;
    let e = &world.entities[idx];
    let EntityKind::Hostile(h) = &e.kind else {
        return;
    };
    if e.status.is_frozen(now) {
        return;
    }
    let (pos, speed) = (e.pos, h.speed);
    let target = world.nearest_where(pos, HOSTILE_SEEK_RADIUS, |t| match &t.kind {
        EntityKind::Player(_) | EntityKind::Bot(_) => true,
        EntityKind::Summon(s) => !s.is_static(),
        _ => false,
    });
    if let Some(t) = target {
        let dir = direction_to(pos, world.entities[t].pos);
        world.entities[idx].vel = dir * speed;
    }
}

/// Position integration, map clamping and zone damage
fn integrate(world: &mut World, dt: f32) {
    let (now, map, center) = (world.time, world.config.map_size, world.config.center());
    let (zone, zone_dps) = (world.zone_radius, world.config.zone_damage_per_sec);

    let len = world.entities.len();
    for idx in 0..len {
        let e = &mut world.entities[idx];
        if e.dead {
            continue;
        }
        let pinned = e.status.is_frozen(now) || matches!(&e.kind, EntityKind::Summon(s) if s.is_static());
        if !pinned {
            e.pos += e.vel * dt;
            if e.pos.x < 0.0 || e.pos.x > map {
                e.pos.x = e.pos.x.clamp(0.0, map);
                e.vel.x = 0.0;
            }
            if e.pos.y < 0.0 || e.pos.y > map {
                e.pos.y = e.pos.y.clamp(0.0, map);
                e.vel.y = 0.0;
            }
        }

        // Frozen combatants still burn outside the zone
        if e.is_combatant() && e.pos.distance(center) > zone {
            // Environmental: bypasses armor, shield and invulnerability
            e.hp -= zone_dps * dt;
            e.status.last_combat_time = now;
            if e.hp <= 0.0 {
                let id = e.id;
                handle_kill(world, id, idx);
            }
        }
    }
}

/// Hostiles touching players and bots grind them down in whole points
fn contact_damage(world: &mut World, dt: f32) {
    let now = world.time;
    let len = world.entities.len();
    for ti in 0..len {
        let target = &world.entities[ti];
        if target.dead || !target.is_combatant() || target.status.is_invulnerable(now) {
            continue;
        }
        let curse = target
            .combatant()
            .map_or(0, |c| c.skill_level(SkillId::WeakeningCurse));
        let scale = (1.0 - CURSE_REDUCTION * curse as f32).max(0.0);

        for hi in 0..len {
            let (t, h) = (&world.entities[ti], &world.entities[hi]);
            if t.dead {
                break;
            }
            let EntityKind::Hostile(hostile) = &h.kind else {
                continue;
            };
            if h.dead || h.status.is_frozen(now) || t.pos.distance(h.pos) >= t.radius + h.radius {
                continue;
            }
            let raw = hostile.damage * dt * CONTACT_DAMAGE_SCALE * scale;
            let attacker = h.id;

            let Some(c) = world.entities[ti].combatant_mut() else {
                break;
            };
            c.contact_carry += raw;
            let whole = c.contact_carry.floor();
            if whole >= 1.0 {
                c.contact_carry -= whole;
                apply_damage(world, ti, whole, Some(attacker), false);
            }
        }
    }
}

/// Loss on player death, win when the player is the last combatant standing
fn check_match_end(world: &mut World, outcome: Option<(bool, u32, u32)>) {
    let Some((player_dead, level, kills)) = outcome else {
        return;
    };
    let won = if player_dead {
        false
    } else if world.survivors() == 1 {
        true
    } else {
        return;
    };

    world.phase = GamePhase::GameOver;
    info!(
        "Match ended: {} at t={:.1}, level {level}, {kills} kills",
        if won { "victory" } else { "defeat" },
        world.time
    );
    world.push_event(GameEvent::MatchEnded {
        won,
        level,
        kills,
        time: world.time,
    });
}

fn decay_particles(world: &mut World, dt: f32) {
    for p in world.particles.iter_mut() {
        p.life -= p.decay * dt;
        p.pos += p.vel * dt;
    }
    world.particles.retain(|p| p.life > 0.0);
}
