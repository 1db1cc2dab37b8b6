//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only enters through the `now_ms` argument
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod motion;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::Aabb;
pub use state::{Entity, GamePhase, MotionState, Particle, SimState, Viewport, ViewportError};
pub use tick::{Command, Direction, GameEvent, apply_command, tick};
pub use timer::WaypointTimer;
