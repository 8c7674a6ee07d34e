//! Bot heuristic controller
//!
//! Each bot sums weighted steering contributions (zone, dodging, spacing,
//! rivals, pickups, kiting) into one movement vector and picks which actives
//! to fire. [`decide`] is a pure read of the world; [`apply_decision`] writes
//! it back, so the order bots are resolved in is the only coupling between
//! them within a tick.

use glam::Vec2;

use super::bullet::Motion;
use super::catalog::SkillId;
use super::entity::{Entity, EntityId, Kind};
use super::skills::activate_skill;
use super::state::World;
use crate::direction_to;

/// Everything a bot considers lies within this distance
pub const VIEW_DIST: f32 = 600.0;

// Zone compliance
const ZONE_HARD: f32 = 0.98;
const ZONE_SOFT: f32 = 0.85;
const ZONE_PULL: f32 = 2.5;

// Projectile dodging
const DODGE_RADIUS: f32 = 180.0;
const DODGE_SIDESTEP_DIST: f32 = 100.0;
const DODGE_WEIGHT: f32 = 12.0;
const DODGE_DASH_URGENCY: f32 = 0.7;

// Pool avoidance
const POOL_MARGIN: f32 = 20.0;
const POOL_WEIGHT: f32 = 8.0;

// Mob spacing
const SPACE_SURVIVAL: f32 = 450.0;
const SPACE_NORMAL: f32 = 200.0;
const SPACE_WEIGHT_SURVIVAL: f32 = 12.0;
const SPACE_WEIGHT_NORMAL: f32 = 6.0;

// Modes
const SURVIVAL_HP_RATIO: f32 = 0.4;
const SWARM_COUNT: usize = 3;
const FARMING_LEVEL: u32 = 8;
const EARLY_LEVEL: u32 = 5;

// Rivals
const RIVAL_FLEE_DIST: f32 = 600.0;
const RIVAL_WEIGHT: f32 = 8.0;

// Combat
const FINISH_HP_RATIO: f32 = 0.25;
const FINISH_RANGE: f32 = 300.0;
const IDEAL_RANGE_FACTOR: f32 = 0.8;
const IDEAL_BAND: f32 = 50.0;
const ADVANCE_WEIGHT: f32 = 1.5;
const RETREAT_WEIGHT: f32 = 1.2;
const STRAFE_WEIGHT: f32 = 2.0;
const NOVA_RANGE: f32 = 300.0;
const BARRIER_HP_RATIO: f32 = 0.5;

/// Idle bots coast to a stop
const IDLE_DECAY: f32 = 0.9;

/// One bot's choice for this tick
#[derive(Debug, Clone, PartialEq)]
pub struct BotDecision {
    pub velocity: Vec2,
    pub target: Option<EntityId>,
    /// Actives to fire, in order, before the new velocity is applied
    pub casts: Vec<SkillId>,
}

fn nearest<'a>(from: Vec2, items: impl Iterator<Item = &'a Entity>) -> Option<&'a Entity> {
    items.min_by(|a, b| a.pos.distance(from).total_cmp(&b.pos.distance(from)))
}

/// Decide movement, target and casts for the bot at `idx`
pub fn decide(world: &World, idx: usize) -> BotDecision {
    let bot = &world.entities[idx];
    let Some(me) = bot.combatant() else {
        return BotDecision {
            velocity: bot.vel,
            target: None,
            casts: Vec::new(),
        };
    };
    let mut decision = BotDecision {
        velocity: bot.vel,
        target: me.target,
        casts: Vec::new(),
    };

    // 1. Zone compliance
    let center = world.config.center();
    let to_center = direction_to(bot.pos, center);
    let dist_center = bot.pos.distance(center);
    if dist_center > world.zone_radius * ZONE_HARD {
        decision.velocity = to_center * me.speed;
        return decision;
    }
    let mut steer = Vec2::ZERO;
    if dist_center > world.zone_radius * ZONE_SOFT {
        steer += to_center * ZONE_PULL;
    }

    // 2. Frozen
    if bot.status.is_frozen(world.time) {
        decision.velocity = Vec2::ZERO;
        return decision;
    }

    let away_from = |p: Vec2| direction_to(p, bot.pos);
    let hp_ratio = bot.hp_ratio();

    // 3. Threat evasion
    let mut wants_dash = false;
    for b in &world.bullets {
        if b.dead || b.owner == bot.id || matches!(b.motion, Motion::Pool) {
            continue;
        }
        let d = b.pos.distance(bot.pos);
        if d >= DODGE_RADIUS {
            continue;
        }
        let away = away_from(b.pos);
        let urgency = (DODGE_RADIUS - d) / DODGE_RADIUS;
        let dodge = if d > DODGE_SIDESTEP_DIST { away.perp() } else { away };
        steer += dodge * DODGE_WEIGHT * urgency;
        if urgency > DODGE_DASH_URGENCY && me.is_ready(SkillId::VoidDash) {
            wants_dash = true;
        }
    }
    if wants_dash {
        decision.casts.push(SkillId::VoidDash);
    }

    // 4. Pool avoidance
    for p in &world.bullets {
        if p.dead || p.owner == bot.id || !matches!(p.motion, Motion::Pool) {
            continue;
        }
        if p.pos.distance(bot.pos) < p.radius + POOL_MARGIN {
            steer += away_from(p.pos) * POOL_WEIGHT;
        }
    }

    let in_view = |e: &&Entity| e.is_alive() && e.id != bot.id && e.pos.distance(bot.pos) < VIEW_DIST;
    let hostiles: Vec<&Entity> = world.entities.iter().filter(in_view).filter(|e| e.is_hostile()).collect();
    let rivals: Vec<&Entity> = world.entities.iter().filter(in_view).filter(|e| e.is_combatant()).collect();

    let swarmed = hostiles.len() > SWARM_COUNT;
    let survival = hp_ratio < SURVIVAL_HP_RATIO || swarmed;
    let farming = me.level < FARMING_LEVEL;

    // 5. Mob spacing
    let (space, weight) = if survival {
        (SPACE_SURVIVAL, SPACE_WEIGHT_SURVIVAL)
    } else {
        (SPACE_NORMAL, SPACE_WEIGHT_NORMAL)
    };
    for h in &hostiles {
        let d = h.pos.distance(bot.pos);
        if d < space {
            steer += away_from(h.pos) * weight * (space - d) / space;
        }
    }

    // 6. Rival avoidance
    if farming || survival {
        for r in &rivals {
            let threat = r.hp_ratio() > 0.2 || hp_ratio < 0.5;
            if threat && r.pos.distance(bot.pos) < RIVAL_FLEE_DIST {
                steer += away_from(r.pos) * RIVAL_WEIGHT;
            }
        }
    }

    // 7. Pickup greed
    if !swarmed {
        let pickups = world
            .entities
            .iter()
            .filter(in_view)
            .filter(|e| e.kind() == Kind::Pickup);
        if let Some(p) = nearest(bot.pos, pickups) {
            let base = if farming { 10.0 } else { 2.0 };
            let early = if me.level < EARLY_LEVEL { 2.0 } else { 1.0 };
            steer += direction_to(bot.pos, p.pos) * (base + hp_ratio * 2.0) * early;
        }
    }

    // 8. Combat targeting
    if !survival {
        let killable = nearest(
            bot.pos,
            rivals.iter().copied().filter(|r| {
                r.hp_ratio() < FINISH_HP_RATIO && r.pos.distance(bot.pos) < FINISH_RANGE
            }),
        );
        let nearest_hostile = nearest(bot.pos, hostiles.iter().copied());

        let mut target = if farming && killable.is_none() { nearest_hostile } else { None };
        if target.is_none() {
            target = killable.or_else(|| {
                if farming {
                    None
                } else {
                    nearest(bot.pos, rivals.iter().copied())
                }
            });
        }
        let target = target.or(nearest_hostile);

        if let Some(t) = target {
            decision.target = Some(t.id);
            let d = t.pos.distance(bot.pos);
            let to_target = direction_to(bot.pos, t.pos);
            let ideal = me.range * IDEAL_RANGE_FACTOR;
            if d > ideal + IDEAL_BAND {
                steer += to_target * ADVANCE_WEIGHT;
            } else if d < ideal - IDEAL_BAND {
                steer -= to_target * RETREAT_WEIGHT;
            } else {
                steer += to_target.perp() * STRAFE_WEIGHT;
            }

            if me.is_ready(SkillId::MeteorShower) {
                decision.casts.push(SkillId::MeteorShower);
            }
            if me.is_ready(SkillId::FrostNova) && d < NOVA_RANGE {
                decision.casts.push(SkillId::FrostNova);
            }
        }
    }

    // 9. Defensive actives
    if hp_ratio < BARRIER_HP_RATIO && me.is_ready(SkillId::HolyBarrier) {
        decision.casts.push(SkillId::HolyBarrier);
    }

    decision.velocity = if steer == Vec2::ZERO {
        bot.vel * IDLE_DECAY
    } else {
        steer.normalize_or_zero() * me.speed
    };
    decision
}

/// Write a decision back: target first, then casts (a dash moves along the
/// old heading), then the new velocity
pub fn apply_decision(world: &mut World, idx: usize, decision: BotDecision) {
    if let Some(c) = world.entities[idx].combatant_mut() {
        c.target = decision.target;
    }
    for skill in decision.casts {
        activate_skill(world, idx, skill, None);
    }
    world.entities[idx].vel = decision.velocity;
}

/// Decide and act for one bot
pub fn run_bot(world: &mut World, idx: usize) {
    let decision = decide(world, idx);
    apply_decision(world, idx, decision);
}
