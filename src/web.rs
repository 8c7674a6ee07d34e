//! Browser bindings
//!
//! A JS renderer owns the canvas, the input devices and the menus. It drives
//! a [`WebArena`] once per animation frame and reads JSON back out.

use glam::Vec2;
use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::ArenaConfig;
use crate::session::Session;
use crate::sim::Archetype;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Survivor Royale starting...");
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        warn!("Serialization failed: {err}");
        "null".to_string()
    })
}

fn parse_archetype(name: &str) -> Result<Archetype, JsError> {
    Ok(name.parse::<Archetype>()?)
}

/// Seed from the wall clock when the page does not supply one
fn seed_or_now(seed: Option<f64>) -> u64 {
    seed.unwrap_or_else(js_sys::Date::now) as u64
}

#[wasm_bindgen]
pub struct WebArena {
    session: Session,
}

#[wasm_bindgen]
impl WebArena {
    /// `config_json` may be omitted to use the default tuning
    #[wasm_bindgen(constructor)]
    pub fn new(archetype: &str, seed: Option<f64>, config_json: Option<String>) -> Result<WebArena, JsError> {
        let archetype = parse_archetype(archetype)?;
        let config = match config_json {
            Some(json) => ArenaConfig::from_json(&json)?,
            None => ArenaConfig::default(),
        };
        Ok(Self {
            session: Session::new(seed_or_now(seed), archetype, config),
        })
    }

    pub fn restart(&mut self, archetype: &str, seed: Option<f64>) -> Result<(), JsError> {
        let archetype = parse_archetype(archetype)?;
        self.session.restart(seed_or_now(seed), archetype);
        Ok(())
    }

    /// Advance by a frame of `dt` seconds; returns ticks run
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.session.frame(dt)
    }

    pub fn set_movement(&mut self, x: f32, y: f32) {
        self.session.set_movement(Vec2::new(x, y));
    }

    pub fn set_aim(&mut self, x: f32, y: f32) {
        self.session.set_aim(Some(Vec2::new(x, y)));
    }

    pub fn clear_aim(&mut self) {
        self.session.set_aim(None);
    }

    pub fn dash(&mut self) {
        self.session.trigger_dash();
    }

    pub fn primary(&mut self) {
        self.session.trigger_primary();
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn choose_upgrade(&mut self, key: &str) -> Result<(), JsError> {
        self.session.choose_upgrade_key(key)?;
        Ok(())
    }

    /// Entities, bullets, particles and zone state for this frame
    pub fn snapshot_json(&self) -> String {
        to_json(&self.session.world.snapshot())
    }

    pub fn hud_json(&self) -> String {
        to_json(&self.session.hud())
    }

    /// Upgrade offers and match end, each delivered once
    pub fn drain_events_json(&mut self) -> String {
        to_json(&self.session.drain_events())
    }
}
