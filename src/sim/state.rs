//! Simulation state and core types
//!
//! Everything the frame update reads or writes lives in [`SimState`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Aabb;
use crate::settings::Settings;

/// Viewport validation failure
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewportError {
    #[error("viewport {width}x{height} is degenerate")]
    Degenerate { width: f32, height: f32 },
}

/// Visible play area in pixels, origin top-left, y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Both dimensions must be positive and finite
    pub fn new(width: f32, height: f32) -> Result<Self, ViewportError> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(ViewportError::Degenerate { width, height })
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Largest top-left corner that keeps a square of `size` on screen.
    /// Squares larger than the viewport pin to the origin.
    pub fn max_corner(&self, size: f32) -> Vec2 {
        (self.size() - Vec2::splat(size)).max(Vec2::ZERO)
    }

    /// Clamp the top-left corner of a square into the viewport
    pub fn clamp(&self, pos: Vec2, size: f32) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.max_corner(size))
    }

    /// Whether a square at `pos` lies entirely inside the viewport
    pub fn contains(&self, pos: Vec2, size: f32) -> bool {
        let max = self.max_corner(size);
        pos.is_finite() && pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle until the first click/tap/key
    Title,
    /// Active chase
    Playing,
}

/// A square on screen. `pos` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub size: f32,
}

impl Entity {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb::from_square(self.pos, self.size)
    }
}

/// Target motion policy state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionState {
    /// Where the target is heading while seeking
    pub waypoint: Vec2,
    /// Timestamp (ms) of the last positional update
    pub last_update_ms: Option<f64>,
    /// Terminal orbit mode; never cleared once set
    pub orbiting: bool,
    pub orbit_angle: f32,
    pub orbit_radius: f32,
    /// px/s
    pub speed: f32,
    /// rad/s
    pub orbit_angular_speed: f32,
}

/// A transient burst particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Unique key, derived from the spawn time
    pub id: u64,
    /// Spawn timestamp (ms)
    pub born_ms: f64,
    /// Burst origin
    pub pos: Vec2,
    /// Emission direction (radians)
    pub angle: f32,
}

impl Particle {
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.born_ms
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    pub viewport: Viewport,
    pub phase: GamePhase,
    pub player: Entity,
    /// Latest pointer/keyboard position (player centre), if any input arrived yet
    pub pointer: Option<Vec2>,
    pub target: Entity,
    pub motion: MotionState,
    /// Never decreases
    pub score: u32,
    /// Player and target overlapped on the previous frame
    pub overlapping: bool,
    pub particles: Vec<Particle>,
    pub seed: u64,
    pub rng: Pcg32,
    last_particle_id: Option<u64>,
}

impl SimState {
    /// New game in the title phase, entities placed relative to the viewport
    pub fn new(settings: Settings, viewport: Viewport, seed: u64) -> Self {
        let player = Entity::new(
            viewport.clamp(
                viewport.size() / 2.0 - Vec2::splat(settings.player_size / 2.0),
                settings.player_size,
            ),
            settings.player_size,
        );
        let target = Entity::new(
            viewport.clamp(viewport.size() / 4.0, settings.target_size),
            settings.target_size,
        );
        let motion = MotionState {
            waypoint: target.pos,
            last_update_ms: None,
            orbiting: false,
            orbit_angle: 0.0,
            orbit_radius: settings.orbit_radius,
            speed: settings.target_speed,
            orbit_angular_speed: settings.orbit_angular_speed,
        };

        Self {
            settings,
            viewport,
            phase: GamePhase::Title,
            player,
            pointer: None,
            target,
            motion,
            score: 0,
            overlapping: false,
            particles: Vec::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            last_particle_id: None,
        }
    }

    /// Allocate a particle id from a spawn time, unique even within one millisecond
    pub fn next_particle_id(&mut self, now_ms: f64) -> u64 {
        let from_time = (now_ms.max(0.0) as u64).saturating_mul(PARTICLE_IDS_PER_MS);
        let id = match self.last_particle_id {
            Some(last) if last >= from_time => last + 1,
            _ => from_time,
        };
        self.last_particle_id = Some(id);
        id
    }
}

/// Id space reserved per millisecond of spawn time
pub const PARTICLE_IDS_PER_MS: u64 = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_rejects_zero() {
        assert!(Viewport::new(0.0, 100.0).is_err());
        assert!(Viewport::new(100.0, 0.0).is_err());
        assert!(Viewport::new(f32::NAN, 100.0).is_err());
        assert!(Viewport::new(100.0, 100.0).is_ok());
    }

    #[test]
    fn test_viewport_clamp() {
        let vp = Viewport::new(500.0, 400.0).unwrap();
        assert_eq!(vp.clamp(Vec2::new(-5.0, 390.0), 32.0), Vec2::new(0.0, 368.0));
        assert_eq!(vp.clamp(Vec2::new(600.0, 10.0), 32.0), Vec2::new(468.0, 10.0));
    }

    #[test]
    fn test_oversized_square_pins_to_origin() {
        let vp = Viewport::new(10.0, 10.0).unwrap();
        assert_eq!(vp.clamp(Vec2::new(3.0, 3.0), 32.0), Vec2::ZERO);
    }

    #[test]
    fn test_new_state_is_inside_viewport() {
        let vp = Viewport::new(320.0, 240.0).unwrap();
        let state = SimState::new(Settings::default(), vp, 7);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(vp.contains(state.player.pos, state.player.size));
        assert!(vp.contains(state.target.pos, state.target.size));
        assert_eq!(state.motion.waypoint, state.target.pos);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_particle_ids_unique_within_a_millisecond() {
        let vp = Viewport::new(320.0, 240.0).unwrap();
        let mut state = SimState::new(Settings::default(), vp, 7);
        let a = state.next_particle_id(1000.0);
        let b = state.next_particle_id(1000.4);
        let c = state.next_particle_id(2000.0);
        assert_eq!(a, 1000 * PARTICLE_IDS_PER_MS);
        assert_eq!(b, a + 1);
        assert_eq!(c, 2000 * PARTICLE_IDS_PER_MS);
    }
}
