//! Match state and core simulation types
//!
//! The [`World`] owns every entity, bullet, particle, the zone clock and the
//! match RNG. It is mutated only from inside [`super::tick::tick`] and the
//! upgrade selection API.

use glam::Vec2;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::bullet::Bullet;
use super::catalog::{Archetype, BOT_NAMES, SkillId};
use super::entity::{Combatant, Entity, EntityId, Kind};
use crate::config::ArenaConfig;
use crate::polar_to_cartesian;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Paused by input; the tick is a no-op
    Paused,
    /// Waiting for the UI to pick one of the offered upgrades
    ChoosingUpgrade,
    /// Match ended
    GameOver,
}

/// Edge-triggered notifications for the UI collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Present these choices; the simulation is paused until one is chosen
    UpgradeOffered { level: u32, choices: Vec<SkillId> },
    /// Terminal state reached
    MatchEnded {
        won: bool,
        level: u32,
        kills: u32,
        time: f32,
    },
}

/// What a particle depicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ParticleKind {
    /// Floating damage number
    Damage { amount: f32, crit: bool },
    /// Hit fully soaked by a shield
    Absorbed,
    Heal { amount: f32 },
    Exp { amount: f32 },
    /// Short floating label ("LEVEL UP!", "FROZEN", ...)
    Status { label: &'static str },
    /// Expanding ring (nova, dash, overload)
    Ring { radius: f32 },
    /// Lightning link from `pos` to `to`
    Lightning { to: Vec2 },
    Explosion { radius: f32 },
    /// Death burst fragment
    Spark,
}

/// A purely visual particle
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at birth, removed at 0
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(pos: Vec2, kind: ParticleKind) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            life: 1.0,
            decay: 1.0,
            kind,
        }
    }

    /// Floating text drifts upward
    pub fn text(pos: Vec2, kind: ParticleKind) -> Self {
        Self {
            vel: Vec2::new(0.0, -40.0),
            ..Self::new(pos, kind)
        }
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Radius of the player and rival bodies
pub const COMBATANT_RADIUS: f32 = 18.0;

/// Complete match state
#[derive(Debug, Clone, Serialize)]
pub struct World {
    pub config: ArenaConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Elapsed simulation time, seconds
    pub time: f32,
    pub zone_radius: f32,
    pub phase: GamePhase,
    /// Live entities, ascending by id
    pub entities: Vec<Entity>,
    pub bullets: Vec<Bullet>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub player_id: EntityId,
    /// Player level-ups still waiting for an upgrade choice
    pub pending_level_ups: u32,
    /// Choices currently presented to the UI
    pub offered: Vec<SkillId>,
    #[serde(skip)]
    pub rng: Pcg32,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl World {
    /// Create a match: the player at the map centre plus the rival cohort
    pub fn new(seed: u64, archetype: Archetype, config: ArenaConfig) -> Self {
        let config = checked(config);
        let mut world = Self {
            zone_radius: config.initial_zone_radius,
            config,
            seed,
            time: 0.0,
            phase: GamePhase::Playing,
            entities: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            player_id: 0,
            pending_level_ups: 0,
            offered: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        };

        let center = world.config.center();
        let id = world.next_entity_id();
        world
            .entities
            .push(Entity::new_combatant(id, center, Combatant::new("YOU", archetype), true));
        world.player_id = id;

        for i in 0..world.config.bot_count as usize {
            world.spawn_bot(BOT_NAMES[i % BOT_NAMES.len()]);
        }

        info!(
            "Match started: seed={seed}, archetype={archetype:?}, bots={}",
            world.config.bot_count
        );
        world
    }

    /// An empty arena with no player or bots, for focused scenarios
    pub fn empty(seed: u64, config: ArenaConfig) -> Self {
        let config = checked(config);
        Self {
            zone_radius: config.initial_zone_radius,
            config,
            seed,
            time: 0.0,
            phase: GamePhase::Playing,
            entities: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            player_id: 0,
            pending_level_ups: 0,
            offered: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    fn spawn_bot(&mut self, name: &str) {
        let archetype = Archetype::ALL[self.rng.random_range(0..Archetype::ALL.len())];
        let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
        let dist = self
            .rng
            .random_range(self.config.bot_spawn_min_dist..=self.config.bot_spawn_max_dist);
        let pos = self.config.center() + polar_to_cartesian(dist, angle);

        let mut combatant = Combatant::new(name, archetype);
        combatant.speed *= self.config.bot_speed_factor;
        let id = self.next_entity_id();
        self.entities
            .push(Entity::new_combatant(id, pos, combatant, false));
    }

    /// Allocate a new entity ID (shared by entities and bullets)
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append an entity; it is not visited by an entity pass already running
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Index of an entity by id (dead-but-unswept entities included)
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(|i| &mut self.entities[i])
    }

    /// Living entity by id
    pub fn alive(&self, id: EntityId) -> Option<&Entity> {
        self.get(id).filter(|e| e.is_alive())
    }

    pub fn player(&self) -> Option<&Entity> {
        self.get(self.player_id)
    }

    /// Nearest living entity that effects owned by `owner` may damage
    pub fn nearest_target(&self, pos: Vec2, owner: EntityId, radius: f32) -> Option<usize> {
        self.nearest_where(pos, radius, |e| e.is_enemy_of(owner))
    }

    /// Nearest living entity within `radius` matching `pred`
    pub fn nearest_where(
        &self,
        pos: Vec2,
        radius: f32,
        pred: impl Fn(&Entity) -> bool,
    ) -> Option<usize> {
        let mut best = None;
        let mut best_dist = radius;
        for (i, e) in self.entities.iter().enumerate() {
            if e.dead || !pred(e) {
                continue;
            }
            let d = e.pos.distance(pos);
            if d < best_dist {
                best_dist = d;
                best = Some(i);
            }
        }
        best
    }

    /// Living players and bots
    pub fn survivors(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.is_alive() && e.is_combatant())
            .count()
    }

    pub fn count_alive(&self, kind: Kind) -> usize {
        self.entities
            .iter()
            .filter(|e| e.is_alive() && e.kind() == kind)
            .count()
    }

    /// Push a particle, evicting the oldest when full
    pub fn emit(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all notifications raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Typed read-only handle to the controlled avatar
    pub fn player_view(&self) -> Option<PlayerView<'_>> {
        let entity = self.player()?;
        let combatant = entity.combatant()?;
        Some(PlayerView { entity, combatant })
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            time: self.time,
            zone_center: self.config.center(),
            zone_radius: self.zone_radius,
            map_size: self.config.map_size,
            phase: self.phase,
            player_id: self.player_id,
            entities: &self.entities,
            bullets: &self.bullets,
            particles: &self.particles,
        }
    }
}

/// Hand-built configs skip `from_json`; fall back to defaults when invalid
fn checked(config: ArenaConfig) -> ArenaConfig {
    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            warn!("Invalid arena config ({err}), using defaults");
            ArenaConfig::default()
        }
    }
}

/// Borrowed view of the player, handed to the UI each frame
#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    pub entity: &'a Entity,
    pub combatant: &'a Combatant,
}

impl PlayerView<'_> {
    pub fn skill_level(&self, id: SkillId) -> u8 {
        self.combatant.skill_level(id)
    }

    pub fn is_alive(&self) -> bool {
        self.entity.is_alive()
    }
}

/// Everything the renderer reads in one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub time: f32,
    pub zone_center: Vec2,
    pub zone_radius: f32,
    pub map_size: f32,
    pub phase: GamePhase,
    pub player_id: EntityId,
    pub entities: &'a [Entity],
    pub bullets: &'a [Bullet],
    pub particles: &'a [Particle],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_population() {
        let world = World::new(7, Archetype::Ranger, ArenaConfig::default());
        assert_eq!(world.survivors(), 15);
        assert_eq!(world.count_alive(Kind::Bot), 14);
        let player = world.player_view().unwrap();
        assert_eq!(player.entity.pos, Vec2::splat(1500.0));
        assert_eq!(player.combatant.name, "YOU");
    }

    #[test]
    fn test_bots_spawn_in_ring() {
        let world = World::new(42, Archetype::Warrior, ArenaConfig::default());
        let center = world.config.center();
        for e in world.entities.iter().filter(|e| e.kind() == Kind::Bot) {
            let d = e.pos.distance(center);
            assert!((799.0..=2001.0).contains(&d), "bot at distance {d}");
        }
    }

    #[test]
    fn test_determinism() {
        let a = World::new(99, Archetype::Mage, ArenaConfig::default());
        let b = World::new(99, Archetype::Mage, ArenaConfig::default());
        for (x, y) in a.entities.iter().zip(&b.entities) {
            assert_eq!(x.pos, y.pos);
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let world = World::new(1, Archetype::Warrior, ArenaConfig::default());
        let id = world.entities[5].id;
        assert_eq!(world.index_of(id), Some(5));
        assert!(world.get(9999).is_none());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = ArenaConfig {
            bot_spawn_min_dist: 2500.0,
            bot_spawn_max_dist: 100.0,
            bot_count: 3,
            ..ArenaConfig::default()
        };
        let world = World::new(5, Archetype::Warrior, config);
        assert_eq!(world.config, ArenaConfig::default());
        assert_eq!(world.count_alive(Kind::Bot), 14);
    }

    #[test]
    fn test_particle_cap() {
        let mut world = World::empty(1, ArenaConfig::default());
        for _ in 0..MAX_PARTICLES + 10 {
            world.emit(Particle::new(Vec2::ZERO, ParticleKind::Spark));
        }
        assert_eq!(world.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_events_drain_once() {
        let mut world = World::empty(1, ArenaConfig::default());
        world.push_event(GameEvent::MatchEnded {
            won: true,
            level: 1,
            kills: 0,
            time: 3.0,
        });
        assert_eq!(world.drain_events().len(), 1);
        assert!(world.drain_events().is_empty());
    }
}
