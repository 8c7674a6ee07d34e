//! Survivor Royale - a top-down arena survival simulation
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (entities, combat, abilities, AI, zone)
//! - `config`: Data-driven match tuning
//! - `hud`: Derived read-only summary for the HUD collaborator
//! - `session`: Frame-clock driver around the fixed-step tick
//! - `web`: Browser bindings (wasm32 only)

pub mod config;
pub mod hud;
pub mod session;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ArenaConfig, ConfigError};
pub use hud::HudSummary;
pub use session::Session;

use glam::Vec2;

/// Fixed-step configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta fed to the accumulator (tab-switch guard)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// HUD summary is rebuilt every N frames
    pub const HUD_REFRESH_FRAMES: u32 = 10;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector pointing from `from` to `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading angle of a vector in radians (0 for the zero vector)
#[inline]
pub fn heading_angle(v: Vec2) -> f32 {
    if v == Vec2::ZERO { 0.0 } else { v.y.atan2(v.x) }
}
