//! Square Chase - a chase-the-square arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, score, particles)
//! - `controller`: Command queue and per-frame snapshot for the presentation layer
//! - `settings`: Data-driven game tuning, loadable from JSON

pub mod controller;
pub mod settings;
pub mod sim;

pub use controller::{CommandSender, Controller, FrameSnapshot, ParticleView};
pub use settings::{ScoringPolicy, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::TAU;

    /// Square sizes (px)
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const TARGET_SIZE: f32 = 16.0;

    /// Target seeking speed (px/s)
    pub const TARGET_SPEED: f32 = 200.0;
    /// Distance of each candidate waypoint from the target
    pub const WAYPOINT_STEP: f32 = 100.0;
    /// Waypoint timer window (ms), sampled from [min, max)
    pub const WAYPOINT_DELAY_MIN_MS: f64 = 200.0;
    pub const WAYPOINT_DELAY_MAX_MS: f64 = 2000.0;
    /// Push-away distance applied to the target on a hit
    pub const NUDGE_DISTANCE: f32 = 30.0;
    /// Below this the target counts as having reached its waypoint
    pub const ARRIVAL_EPSILON: f32 = 1.0;

    /// Orbit mode
    pub const ORBIT_RADIUS: f32 = 50.0;
    pub const ORBIT_ANGULAR_SPEED: f32 = TAU; // one revolution per second
    pub const ORBIT_SCORE: u32 = 100;

    /// Particle bursts
    pub const PARTICLE_LIFETIME_MS: f64 = 1000.0;
    pub const PARTICLE_BASE: u32 = 16;
    pub const PARTICLE_MAX: u32 = 25;

    /// Arrow-key step (px)
    pub const KEYBOARD_STEP: f32 = 10.0;

    /// Viewport used before the first resize notification arrives
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 800.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
