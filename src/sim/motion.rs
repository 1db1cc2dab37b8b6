//! Target motion policies: waypoint seeking, orbiting and hit nudges

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::collision::separation_dir;
use super::state::{Entity, MotionState, Viewport};
use crate::consts::ARRIVAL_EPSILON;
use crate::polar_to_cartesian;

/// Move `pos` toward `waypoint` at `speed` px/s for `dt` seconds.
///
/// Returns `None` when the target is already within `ARRIVAL_EPSILON` of the
/// waypoint (including the zero-distance case) or the result is not finite.
/// The step never overshoots the waypoint.
pub fn seek_step(
    pos: Vec2,
    waypoint: Vec2,
    speed: f32,
    dt: f32,
    viewport: &Viewport,
    size: f32,
) -> Option<Vec2> {
    let to_waypoint = waypoint - pos;
    let distance = to_waypoint.length();
    if !(distance > ARRIVAL_EPSILON) {
        return None;
    }

    let step = (speed * dt).clamp(0.0, distance);
    let next = pos + to_waypoint / distance * step;
    if !next.is_finite() {
        log::warn!("Discarding non-finite seek position {next:?}");
        return None;
    }
    Some(viewport.clamp(next, size))
}

/// Advance the orbit angle by `dt` seconds and place the target on the circle
/// around the player's centre. The angle stays in `[0, TAU)`.
pub fn orbit_step(motion: &mut MotionState, player: &Entity, target_size: f32, dt: f32) -> Vec2 {
    motion.orbit_angle = (motion.orbit_angle + motion.orbit_angular_speed * dt).rem_euclid(TAU);
    player.center() + polar_to_cartesian(motion.orbit_radius, motion.orbit_angle)
        - Vec2::splat(target_size / 2.0)
}

/// The four axis-aligned moves of `step` from `pos` that keep the target on screen
pub fn waypoint_candidates(pos: Vec2, step: f32, viewport: &Viewport, size: f32) -> Vec<Vec2> {
    [
        Vec2::new(pos.x - step, pos.y),
        Vec2::new(pos.x + step, pos.y),
        Vec2::new(pos.x, pos.y - step),
        Vec2::new(pos.x, pos.y + step),
    ]
    .into_iter()
    .filter(|c| viewport.contains(*c, size))
    .collect()
}

/// Pick a new waypoint uniformly among the valid candidates.
/// `None` means the target is boxed in and the old waypoint stays.
pub fn pick_waypoint<R: Rng>(
    rng: &mut R,
    pos: Vec2,
    step: f32,
    viewport: &Viewport,
    size: f32,
) -> Option<Vec2> {
    let candidates = waypoint_candidates(pos, step, viewport, size);
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Push the target directly away from the player by `distance`, clamped.
/// Coincident centres have no direction, so the target stays put.
pub fn nudge_away(player: &Entity, target: &Entity, distance: f32, viewport: &Viewport) -> Vec2 {
    match separation_dir(player.center(), target.center()) {
        Some(dir) => viewport.clamp(target.pos + dir * distance, target.size),
        None => target.pos,
    }
}
