//! Frame-clock driver around the fixed-step tick
//!
//! The host calls [`Session::frame`] once per animation frame with the real
//! elapsed time. The session feeds whole [`SIM_DT`] steps to the simulation,
//! clears one-shot input pulses after the first step that sees them, and
//! refreshes the HUD summary every [`HUD_REFRESH_FRAMES`] frames.

use glam::Vec2;
use log::info;

use crate::config::ArenaConfig;
use crate::consts::{HUD_REFRESH_FRAMES, MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::hud::HudSummary;
use crate::sim::{Archetype, GameEvent, SkillId, TickInput, UpgradeError, World, tick};

/// A running match plus its frame clock and pending input
#[derive(Debug)]
pub struct Session {
    pub world: World,
    input: TickInput,
    accumulator: f32,
    frames: u32,
    hud: Option<HudSummary>,
}

impl Session {
    pub fn new(seed: u64, archetype: Archetype, config: ArenaConfig) -> Self {
        let world = World::new(seed, archetype, config);
        let hud = HudSummary::from_world(&world);
        Self {
            world,
            input: TickInput::default(),
            accumulator: 0.0,
            frames: 0,
            hud,
        }
    }

    /// Start over with a fresh world, keeping the config
    pub fn restart(&mut self, seed: u64, archetype: Archetype) {
        let config = self.world.config.clone();
        *self = Self::new(seed, archetype, config);
        info!("Match restarted with seed: {seed}");
    }

    /// Advance by one rendered frame; returns the number of ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.world, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.dash = false;
            self.input.primary = false;
            self.input.pause = false;
        }

        self.frames = self.frames.wrapping_add(1);
        if self.frames % HUD_REFRESH_FRAMES == 0 {
            self.refresh_hud();
        }
        substeps
    }

    pub fn refresh_hud(&mut self) {
        self.hud = HudSummary::from_world(&self.world);
    }

    /// Last HUD summary (may lag the world by a few frames)
    pub fn hud(&self) -> Option<&HudSummary> {
        self.hud.as_ref()
    }

    /// Held movement intent
    pub fn set_movement(&mut self, movement: Vec2) {
        self.input.movement = movement;
    }

    /// Pointer position in world space
    pub fn set_aim(&mut self, aim: Option<Vec2>) {
        self.input.aim = aim;
    }

    pub fn trigger_dash(&mut self) {
        self.input.dash = true;
    }

    pub fn trigger_primary(&mut self) {
        self.input.primary = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn choose_upgrade(&mut self, id: SkillId) -> Result<(), UpgradeError> {
        self.world.choose_upgrade(id)?;
        self.refresh_hud();
        Ok(())
    }

    /// [`Session::choose_upgrade`] by string key, as sent by a UI
    pub fn choose_upgrade_key(&mut self, key: &str) -> Result<(), UpgradeError> {
        self.world.choose_upgrade_key(key)?;
        self.refresh_hud();
        Ok(())
    }

    /// Notifications since the last call, each delivered once
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    fn session() -> Session {
        Session::new(42, Archetype::Ranger, ArenaConfig::default())
    }

    #[test]
    fn test_accumulator_steps() {
        let mut s = session();
        assert_eq!(s.frame(SIM_DT * 0.5), 0);
        assert_eq!(s.frame(SIM_DT * 0.6), 1);
        assert_eq!(s.frame(SIM_DT * 3.0), 3);
    }

    #[test]
    fn test_frame_dt_is_capped() {
        let mut s = session();
        // A long stall only feeds MAX_FRAME_DT worth of ticks
        let steps = s.frame(5.0);
        assert!((5..=6).contains(&steps));
        assert!(s.world.time <= MAX_FRAME_DT + 1e-4);
    }

    #[test]
    fn test_one_shot_pause() {
        let mut s = session();
        s.toggle_pause();
        s.frame(SIM_DT * 3.0);
        assert_eq!(s.world.phase, GamePhase::Paused);
        assert_eq!(s.world.time, 0.0);

        s.toggle_pause();
        s.frame(SIM_DT * 2.0);
        assert_eq!(s.world.phase, GamePhase::Playing);
        assert!(s.world.time > 0.0);
    }

    #[test]
    fn test_hud_refresh_cadence() {
        let mut s = session();
        let initial = s.hud().cloned().unwrap();
        for _ in 0..HUD_REFRESH_FRAMES - 1 {
            s.frame(SIM_DT);
        }
        assert_eq!(s.hud().unwrap().time, initial.time);
        s.frame(SIM_DT);
        assert!(s.hud().unwrap().time > initial.time);
    }

    #[test]
    fn test_choose_without_offer() {
        let mut s = session();
        assert_eq!(
            s.choose_upgrade(SkillId::FrostNova),
            Err(UpgradeError::NoPendingChoice)
        );
    }
}
