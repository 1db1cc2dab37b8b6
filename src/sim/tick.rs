//! Per-frame simulation update
//!
//! External events reach the simulation only as [`Command`]s. A frame applies
//! the queued commands in order, then runs [`tick`] once.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::motion::{nudge_away, orbit_step, pick_waypoint, seek_step};
use super::state::{GamePhase, Particle, SimState, Viewport};
use crate::settings::ScoringPolicy;

/// Arrow-key direction, screen coordinates (y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Input and timer events, queued and applied at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Pointer/touch position in viewport pixels
    PointerMoved(Vec2),
    Resized { width: f32, height: f32 },
    Arrow(Direction),
    /// First click/tap: leave the title screen
    Start,
    /// Waypoint timer expired
    RetargetWaypoint,
}

/// Things that happened during a frame, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Scored { score: u32 },
    OrbitEngaged,
    WaypointChanged { x: f32, y: f32 },
    /// Every candidate move left the viewport; the waypoint is unchanged
    WaypointBlocked,
}

/// Apply one command. Position changes are clamped before they are committed.
pub fn apply_command(
    state: &mut SimState,
    command: Command,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    match command {
        Command::PointerMoved(pos) => {
            if !pos.is_finite() {
                log::warn!("Ignoring non-finite pointer position {pos:?}");
                return;
            }
            state.pointer = Some(pos);
            follow_pointer(state);
        }
        Command::Arrow(dir) => {
            let from = state.pointer.unwrap_or_else(|| state.player.center());
            state.pointer = Some(from + dir.delta() * state.settings.keyboard_step);
            follow_pointer(state);
            // Keep the pointer on the clamped player so presses at an edge don't pile up
            state.pointer = Some(state.player.center());
        }
        Command::Resized { width, height } => match Viewport::new(width, height) {
            Ok(viewport) => resize(state, viewport),
            Err(e) => log::warn!("Dropping resize: {e}"),
        },
        Command::Start => {
            if state.phase == GamePhase::Title {
                state.phase = GamePhase::Playing;
                state.motion.last_update_ms = Some(now_ms);
                log::info!("Game started (seed {})", state.seed);
                events.push(GameEvent::Started);
            }
        }
        Command::RetargetWaypoint => {
            if state.phase != GamePhase::Playing || state.motion.orbiting {
                return;
            }
            let viewport = state.viewport;
            let (pos, size) = (state.target.pos, state.target.size);
            let step = state.settings.waypoint_step;
            match pick_waypoint(&mut state.rng, pos, step, &viewport, size) {
                Some(waypoint) => {
                    log::debug!("New waypoint {waypoint:?}");
                    state.motion.waypoint = waypoint;
                    events.push(GameEvent::WaypointChanged {
                        x: waypoint.x,
                        y: waypoint.y,
                    });
                }
                None => {
                    log::debug!("Target boxed in at {pos:?}, keeping waypoint");
                    events.push(GameEvent::WaypointBlocked);
                }
            }
        }
    }
}

/// Re-clamp both entities into a new viewport; waypoint and orbit state are untouched
pub fn resize(state: &mut SimState, viewport: Viewport) {
    state.viewport = viewport;
    state.player.pos = viewport.clamp(state.player.pos, state.player.size);
    state.target.pos = viewport.clamp(state.target.pos, state.target.size);
}

/// Centre the player on the latest pointer position, clamped to the viewport
fn follow_pointer(state: &mut SimState) {
    if let Some(pointer) = state.pointer {
        let half = Vec2::splat(state.player.size / 2.0);
        state.player.pos = state.viewport.clamp(pointer - half, state.player.size);
    }
}

/// Advance the simulation to `now_ms`
pub fn tick(state: &mut SimState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let dt = match state.motion.last_update_ms {
        Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
        None => 0.0,
    };
    state.motion.last_update_ms = Some(now_ms);

    if state.phase != GamePhase::Playing {
        return;
    }

    follow_pointer(state);
    move_target(state, dt);

    let overlap = state.player.rect().overlaps(&state.target.rect());
    let scores = match state.settings.scoring {
        ScoringPolicy::PerFrame => overlap,
        ScoringPolicy::PerOverlap => overlap && !state.overlapping,
    };
    state.overlapping = overlap;
    if scores {
        on_hit(state, now_ms, events);
    }

    prune_particles(state, now_ms);
}

fn move_target(state: &mut SimState, dt: f32) {
    let viewport = state.viewport;
    let size = state.target.size;

    if state.motion.orbiting {
        let next = orbit_step(&mut state.motion, &state.player, size, dt);
        if next.is_finite() {
            state.target.pos = viewport.clamp(next, size);
        } else {
            log::warn!("Discarding non-finite orbit position {next:?}");
        }
    } else if let Some(next) = seek_step(
        state.target.pos,
        state.motion.waypoint,
        state.motion.speed,
        dt,
        &viewport,
        size,
    ) {
        state.target.pos = next;
    }
}

fn on_hit(state: &mut SimState, now_ms: f64, events: &mut Vec<GameEvent>) {
    state.score = state.score.saturating_add(1);
    events.push(GameEvent::Scored { score: state.score });

    spawn_burst(state, now_ms);

    if !state.motion.orbiting && state.score >= state.settings.orbit_score {
        state.motion.orbiting = true;
        // Start the orbit from the target's current bearing
        let offset = state.target.center() - state.player.center();
        if offset.length_squared() > 0.0 {
            state.motion.orbit_angle = offset.y.atan2(offset.x);
        }
        log::info!("Score {} reached, target is orbiting", state.score);
        events.push(GameEvent::OrbitEngaged);
    }

    if !state.motion.orbiting {
        let viewport = state.viewport;
        state.target.pos = nudge_away(
            &state.player,
            &state.target,
            state.settings.nudge_distance,
            &viewport,
        );
    }
}

/// Spawn an evenly spaced ring of particles at the player's centre
pub fn spawn_burst(state: &mut SimState, now_ms: f64) {
    let count = state.settings.burst_size(state.score);
    if count == 0 {
        return;
    }
    let origin = state.player.center();
    for i in 0..count {
        let id = state.next_particle_id(now_ms);
        state.particles.push(Particle {
            id,
            born_ms: now_ms,
            pos: origin,
            angle: i as f32 * TAU / count as f32,
        });
    }
    log::debug!("Burst of {count} particles at {origin:?}");
}

/// Drop particles that have lived out their lifetime
pub fn prune_particles(state: &mut SimState, now_ms: f64) {
    let lifetime = state.settings.particle_lifetime_ms;
    state.particles.retain(|p| p.age_ms(now_ms) < lifetime);
}
