//! Experience pickups, level-ups and upgrade offers

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use super::catalog::{MAX_SKILL_LEVEL, SkillId, apply_upgrade};
use super::entity::EntityKind;
use super::state::{GameEvent, GamePhase, Particle, ParticleKind, World};
use crate::direction_to;

/// Pickups inside a collector's magnet radius drift toward it this fast
pub const MAGNET_PULL_SPEED: f32 = 600.0;

/// Upgrades presented per level-up
pub const OFFER_SIZE: usize = 3;

/// Rejected upgrade selections
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("no upgrade choice is pending")]
    NoPendingChoice,
    #[error("upgrade {0:?} was not offered")]
    NotOffered(SkillId),
    #[error("unknown upgrade id: {0}")]
    UnknownUpgrade(String),
}

/// Pull a pickup toward collectors in magnet range; the first one touching
/// it collects it
pub fn update_pickup(world: &mut World, idx: usize, dt: f32) {
    let (value, radius) = match &world.entities[idx].kind {
        EntityKind::Pickup(p) => (p.value, world.entities[idx].radius),
        _ => return,
    };

    let len = world.entities.len();
    for ci in 0..len {
        let c = &world.entities[ci];
        if c.dead {
            continue;
        }
        let Some(magnet) = c.combatant().map(|cb| cb.build.magnet) else {
            continue;
        };
        let (c_pos, c_radius) = (c.pos, c.radius);
        let pickup = &mut world.entities[idx];
        let d = pickup.pos.distance(c_pos);
        if d >= magnet {
            continue;
        }
        pickup.pos += direction_to(pickup.pos, c_pos) * MAGNET_PULL_SPEED * dt;
        if d < c_radius + radius {
            pickup.dead = true;
            collect(world, ci, value);
            break;
        }
    }
}

/// Credit experience to the combatant at `idx`, levelling it up when due
pub fn collect(world: &mut World, idx: usize, value: f32) {
    let e = &mut world.entities[idx];
    let pos = e.pos;
    let is_player = matches!(e.kind, EntityKind::Player(_));
    let Some(c) = e.combatant_mut() else {
        return;
    };
    let gain = value * c.build.xp_mult;
    c.exp += gain;
    let due = c.exp >= c.exp_to_next_level;
    world.emit(Particle::text(pos, ParticleKind::Exp { amount: gain.floor() }));

    if due {
        if is_player {
            level_up_player(world, idx);
        } else {
            level_up_bot(world, idx);
        }
    }
}

fn level_up_player(world: &mut World, idx: usize) {
    let e = &mut world.entities[idx];
    e.max_hp = (e.max_hp * 1.1).floor() + 10.0;
    e.hp = e.max_hp;
    let pos = e.pos;
    let Some(c) = e.combatant_mut() else {
        return;
    };
    c.level += 1;
    c.damage *= 1.05;
    if c.max_shield > 0.0 {
        c.max_shield = (c.max_shield * 1.1).floor();
    }
    c.exp = 0.0;
    c.exp_to_next_level = (c.exp_to_next_level * 1.5).floor();
    let level = c.level;
    info!("Player reached level {level} at t={:.1}", world.time);

    world.emit(Particle::text(pos, ParticleKind::Status { label: "LEVEL UP!" }));
    world.pending_level_ups += 1;
    if world.phase == GamePhase::Playing {
        open_offer(world);
    }
}

fn level_up_bot(world: &mut World, idx: usize) {
    let e = &mut world.entities[idx];
    e.max_hp = (e.max_hp * 1.1).floor() + 20.0;
    e.hp = e.max_hp;
    let Some(c) = e.combatant_mut() else {
        return;
    };
    c.level += 1;
    c.exp = 0.0;
    c.exp_to_next_level = (c.exp_to_next_level * 1.5).floor();
    c.damage = (c.damage * 1.1).floor();
    if c.max_shield > 0.0 {
        c.max_shield = (c.max_shield * 1.1).floor();
    }
    let candidates: Vec<SkillId> = SkillId::ABILITIES
        .into_iter()
        .filter(|id| c.skill_level(*id) < MAX_SKILL_LEVEL)
        .collect();
    let level = c.level;
    let name = c.name.clone();

    if candidates.is_empty() {
        return;
    }
    let pick = candidates[world.rng.random_range(0..candidates.len())];
    apply_upgrade(&mut world.entities[idx], pick);
    debug!("{name} reached level {level} and learned {}", pick.key());
}

/// Up to [`OFFER_SIZE`] distinct upgrades the player has not maxed
pub fn roll_offer(world: &mut World) -> Vec<SkillId> {
    let Some(c) = world.player().and_then(|p| p.combatant()) else {
        return Vec::new();
    };
    let mut pool: Vec<SkillId> = SkillId::ALL
        .into_iter()
        .filter(|id| c.skill_level(*id) < MAX_SKILL_LEVEL)
        .collect();
    pool.shuffle(&mut world.rng);
    pool.truncate(OFFER_SIZE);
    pool
}

/// Pause for a choice if a level-up is waiting and anything is offerable
fn open_offer(world: &mut World) {
    if world.pending_level_ups == 0 {
        return;
    }
    let choices = roll_offer(world);
    if choices.is_empty() {
        world.pending_level_ups = 0;
        return;
    }
    let level = world
        .player()
        .and_then(|p| p.combatant())
        .map_or(1, |c| c.level);
    world.offered = choices.clone();
    world.phase = GamePhase::ChoosingUpgrade;
    world.push_event(GameEvent::UpgradeOffered { level, choices });
}

impl World {
    /// Apply one of the offered upgrades and resume (or offer the next one)
    pub fn choose_upgrade(&mut self, id: SkillId) -> Result<(), UpgradeError> {
        let reject = |err: UpgradeError| {
            warn!("Upgrade selection rejected: {err}");
            Err(err)
        };
        if self.phase != GamePhase::ChoosingUpgrade {
            return reject(UpgradeError::NoPendingChoice);
        }
        if !self.offered.contains(&id) {
            return reject(UpgradeError::NotOffered(id));
        }
        let Some(idx) = self.index_of(self.player_id) else {
            return reject(UpgradeError::NoPendingChoice);
        };

        apply_upgrade(&mut self.entities[idx], id);
        debug!("Player chose {}", id.key());
        self.offered.clear();
        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        self.phase = GamePhase::Playing;
        open_offer(self);
        Ok(())
    }

    /// [`World::choose_upgrade`] by string key
    pub fn choose_upgrade_key(&mut self, key: &str) -> Result<(), UpgradeError> {
        match SkillId::from_key(key) {
            Some(id) => self.choose_upgrade(id),
            None => {
                let err = UpgradeError::UnknownUpgrade(key.to_string());
                warn!("Upgrade selection rejected: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::sim::catalog::Archetype;
    use crate::sim::entity::{Combatant, Entity, Kind};
    use glam::Vec2;

    fn arena_with_player() -> (World, usize) {
        let mut world = World::empty(4, ArenaConfig::default());
        let id = world.next_entity_id();
        world.spawn(Entity::new_combatant(id, Vec2::splat(500.0), Combatant::new("YOU", Archetype::Warrior), true));
        world.player_id = id;
        (world, 0)
    }

    fn drop_pickup(world: &mut World, pos: Vec2, value: f32) -> usize {
        let id = world.next_entity_id();
        world.spawn(Entity::new_pickup(id, pos, value));
        world.entities.len() - 1
    }

    #[test]
    fn test_level_up_threshold() {
        let (mut world, p) = arena_with_player();
        {
            let c = world.entities[p].combatant_mut().unwrap();
            c.exp = 100.0;
        }
        let gem = drop_pickup(&mut world, Vec2::splat(505.0), 10.0);
        update_pickup(&mut world, gem, 1.0 / 60.0);

        assert!(world.entities[gem].dead);
        let e = &world.entities[p];
        let c = e.combatant().unwrap();
        assert_eq!(c.level, 2);
        assert_eq!(c.exp, 0.0);
        assert_eq!(c.exp_to_next_level, 150.0);
        assert_eq!(e.max_hp, 285.0);
        assert_eq!(e.hp, 285.0);

        assert_eq!(world.phase, GamePhase::ChoosingUpgrade);
        let events = world.drain_events();
        let GameEvent::UpgradeOffered { level, choices } = &events[0] else {
            panic!("expected an upgrade offer, got {events:?}");
        };
        assert_eq!(*level, 2);
        assert_eq!(choices.len(), 3);
        assert!(choices.iter().all(|c| choices.iter().filter(|d| *d == c).count() == 1));
    }

    #[test]
    fn test_pickup_has_one_collector() {
        let (mut world, p) = arena_with_player();
        let id = world.next_entity_id();
        world.spawn(Entity::new_combatant(id, Vec2::splat(510.0), Combatant::new("Viper", Archetype::Mage), false));
        let gem = drop_pickup(&mut world, Vec2::splat(505.0), 20.0);
        update_pickup(&mut world, gem, 1.0 / 60.0);

        let total: f32 = world.entities.iter().filter_map(|e| e.combatant()).map(|c| c.exp).sum();
        assert_eq!(total, 20.0);
        assert_eq!(world.entities[p].combatant().unwrap().exp, 20.0);
    }

    #[test]
    fn test_magnet_pulls_from_range() {
        let (mut world, _) = arena_with_player();
        let gem = drop_pickup(&mut world, Vec2::new(580.0, 500.0), 5.0);
        update_pickup(&mut world, gem, 0.1);
        assert!((world.entities[gem].pos.x - 520.0).abs() < 1e-3);
        assert!(!world.entities[gem].dead);

        let far = drop_pickup(&mut world, Vec2::new(900.0, 500.0), 5.0);
        update_pickup(&mut world, far, 0.1);
        assert_eq!(world.entities[far].pos, Vec2::new(900.0, 500.0));
    }

    #[test]
    fn test_choose_upgrade_flow() {
        let (mut world, p) = arena_with_player();
        assert_eq!(world.choose_upgrade(SkillId::BoneSpear), Err(UpgradeError::NoPendingChoice));

        world.entities[p].combatant_mut().unwrap().exp = 99.0;
        collect(&mut world, p, 1.0);
        let offered = world.offered.clone();
        let not_offered = SkillId::ALL.into_iter().find(|id| !offered.contains(id)).unwrap();
        assert_eq!(
            world.choose_upgrade(not_offered),
            Err(UpgradeError::NotOffered(not_offered))
        );
        assert!(matches!(
            world.choose_upgrade_key("laser_eyes"),
            Err(UpgradeError::UnknownUpgrade(_))
        ));

        world.choose_upgrade_key(offered[0].key()).unwrap();
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.entities[p].combatant().unwrap().skill_level(offered[0]), 1);
        assert_eq!(world.pending_level_ups, 0);
    }

    #[test]
    fn test_queued_level_ups_reoffer() {
        let (mut world, p) = arena_with_player();
        world.entities[p].combatant_mut().unwrap().exp = 100.0;
        collect(&mut world, p, 0.0);
        world.entities[p].combatant_mut().unwrap().exp = 150.0;
        collect(&mut world, p, 0.0);
        assert_eq!(world.pending_level_ups, 2);
        assert_eq!(world.drain_events().len(), 1);

        let first = world.offered[0];
        world.choose_upgrade(first).unwrap();
        assert_eq!(world.phase, GamePhase::ChoosingUpgrade);
        assert_eq!(world.drain_events().len(), 1);
    }

    #[test]
    fn test_offer_skips_maxed() {
        let (mut world, p) = arena_with_player();
        for id in SkillId::ALL.into_iter().skip(1) {
            for _ in 0..MAX_SKILL_LEVEL {
                apply_upgrade(&mut world.entities[p], id);
            }
        }
        for _ in 0..10 {
            assert_eq!(roll_offer(&mut world), vec![SkillId::ALL[0]]);
        }
    }

    #[test]
    fn test_bot_level_up_learns_ability() {
        let mut world = World::empty(9, ArenaConfig::default());
        let id = world.next_entity_id();
        world.spawn(Entity::new_combatant(id, Vec2::ZERO, Combatant::new("Ghost", Archetype::Ranger), false));
        world.entities[0].combatant_mut().unwrap().exp = 100.0;
        collect(&mut world, 0, 0.0);

        let e = &world.entities[0];
        let c = e.combatant().unwrap();
        assert_eq!(c.level, 2);
        assert_eq!(c.damage, 19.0);
        assert_eq!(e.max_hp, 185.0);
        assert_eq!(c.skills.values().sum::<u8>(), 1);
        assert!(c.skills.keys().all(|id| id.category() != crate::sim::catalog::SkillCategory::Passive));
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.count_alive(Kind::Bot), 1);
    }
}
