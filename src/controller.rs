//! Frame controller
//!
//! Owns the simulation state and is its only writer. Input handlers and
//! timers never touch the state directly: they send [`Command`]s through a
//! [`CommandSender`], and [`Controller::frame`] drains the queue once per
//! display refresh before running the update.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;
use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{
    Command, GameEvent, GamePhase, SimState, Viewport, WaypointTimer, apply_command, tick,
};

/// Cloneable handle for queueing commands from event handlers or other threads
#[derive(Debug, Clone)]
pub struct CommandSender(Sender<Command>);

impl CommandSender {
    /// Queue a command for the next frame. Returns false once the controller is gone.
    pub fn send(&self, command: Command) -> bool {
        self.0.send(command).is_ok()
    }
}

/// A particle as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub id: u64,
    pub pos: Vec2,
    pub angle: f32,
    /// 0 at spawn, 1 at expiry
    pub age: f32,
}

/// Read-only view of one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub player: Vec2,
    pub player_size: f32,
    pub target: Vec2,
    pub target_size: f32,
    pub score: u32,
    pub orbiting: bool,
    pub particles: Vec<ParticleView>,
    pub events: Vec<GameEvent>,
}

pub struct Controller {
    state: SimState,
    timer: WaypointTimer,
    tx: Sender<Command>,
    rx: Receiver<Command>,
    suspended: bool,
}

impl Controller {
    pub fn new(settings: Settings, viewport: Viewport, seed: u64) -> Self {
        let timer = WaypointTimer::new(settings.waypoint_delay_min_ms, settings.waypoint_delay_max_ms);
        let (tx, rx) = mpsc::channel();
        Self {
            state: SimState::new(settings, viewport, seed),
            timer,
            tx,
            rx,
            suspended: false,
        }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender(self.tx.clone())
    }

    /// Queue a command for the next frame
    pub fn push(&self, command: Command) {
        // The receiver lives in `self`, so this cannot fail
        let _ = self.tx.send(command);
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn timer(&self) -> &WaypointTimer {
        &self.timer
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Freeze the game (e.g. hidden tab). The waypoint timer keeps its remaining time.
    pub fn suspend(&mut self, now_ms: f64) {
        if !self.suspended {
            self.suspended = true;
            self.timer.suspend(now_ms);
            log::info!("Suspended");
        }
    }

    /// Continue after [`suspend`](Self::suspend) without a positional jump
    pub fn resume(&mut self, now_ms: f64) {
        if self.suspended {
            self.suspended = false;
            self.timer.resume(now_ms);
            self.state.motion.last_update_ms = Some(now_ms);
            log::info!("Resumed");
        }
    }

    /// Explicitly restart the waypoint timer, keeping the remaining time of its window
    pub fn restart_timer(&mut self, now_ms: f64) {
        self.timer.restart(now_ms, &mut self.state.rng);
    }

    /// Run one frame at `now_ms` and return what to draw
    pub fn frame(&mut self, now_ms: f64) -> FrameSnapshot {
        let mut events = Vec::new();
        if self.suspended {
            return self.snapshot(now_ms, events);
        }

        if self.state.phase == GamePhase::Playing && self.timer.poll(now_ms, &mut self.state.rng) {
            self.push(Command::RetargetWaypoint);
        }

        while let Ok(command) = self.rx.try_recv() {
            let was_playing = self.state.phase == GamePhase::Playing;
            apply_command(&mut self.state, command, now_ms, &mut events);
            if !was_playing && self.state.phase == GamePhase::Playing {
                self.timer.arm(now_ms, &mut self.state.rng);
            }
        }

        tick(&mut self.state, now_ms, &mut events);
        self.snapshot(now_ms, events)
    }

    fn snapshot(&self, now_ms: f64, events: Vec<GameEvent>) -> FrameSnapshot {
        let lifetime = self.state.settings.particle_lifetime_ms;
        let particles = self
            .state
            .particles
            .iter()
            .map(|p| ParticleView {
                id: p.id,
                pos: p.pos,
                angle: p.angle,
                age: (p.age_ms(now_ms) / lifetime).clamp(0.0, 1.0) as f32,
            })
            .collect();

        FrameSnapshot {
            phase: self.state.phase,
            player: self.state.player.pos,
            player_size: self.state.player.size,
            target: self.state.target.pos,
            target_size: self.state.target.size,
            score: self.state.score,
            orbiting: self.state.motion.orbiting,
            particles,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn controller() -> Controller {
        Controller::new(Settings::default(), Viewport::new(800.0, 600.0).unwrap(), 99)
    }

    #[test]
    fn test_starts_on_title() {
        let mut c = controller();
        let snap = c.frame(0.0);
        assert_eq!(snap.phase, GamePhase::Title);
        assert!(c.timer().deadline_ms().is_none());
    }

    #[test]
    fn test_start_arms_timer() {
        let mut c = controller();
        c.push(Command::Start);
        let snap = c.frame(100.0);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.events, vec![GameEvent::Started]);
        let deadline = c.timer().deadline_ms().unwrap();
        assert!((300.0..2100.0).contains(&deadline));
    }

    #[test]
    fn test_commands_from_other_threads() {
        let mut c = controller();
        let sender = c.sender();
        thread::spawn(move || {
            sender.send(Command::Start);
            sender.send(Command::PointerMoved(Vec2::new(100.0, 100.0)));
        })
        .join()
        .unwrap();

        let snap = c.frame(16.0);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.player, Vec2::new(84.0, 84.0));
    }

    #[test]
    fn test_sender_reports_dropped_controller() {
        let c = controller();
        let sender = c.sender();
        drop(c);
        assert!(!sender.send(Command::Start));
    }

    #[test]
    fn test_timer_retargets_waypoint() {
        let mut c = controller();
        c.push(Command::Start);
        c.frame(0.0);

        let mut changes = 0;
        let mut t = 0.0;
        while t < 10_000.0 {
            t += 16.0;
            let snap = c.frame(t);
            changes += snap
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::WaypointChanged { .. } | GameEvent::WaypointBlocked))
                .count();
        }
        // One expiry at most every 200ms, at least one every 2000ms
        assert!(changes >= 5, "only {changes} retargets");
        assert!(changes <= 50, "{changes} retargets");
    }

    #[test]
    fn test_suspend_freezes_and_resume_does_not_jump() {
        let mut c = controller();
        c.push(Command::Start);
        c.frame(0.0);
        let remaining = c.timer().remaining_ms(0.0).unwrap();

        c.suspend(0.0);
        let frozen = c.frame(5_000.0);
        assert_eq!(c.timer().remaining_ms(5_000.0), Some(remaining));

        c.resume(60_000.0);
        let snap = c.frame(60_000.0);
        assert_eq!(snap.target, frozen.target);
        assert!(!c.is_suspended());
    }

    #[test]
    fn test_restart_timer_keeps_window() {
        let mut c = controller();
        c.push(Command::Start);
        c.frame(0.0);
        let deadline = c.timer().deadline_ms().unwrap();

        c.restart_timer(deadline / 2.0);
        assert!((c.timer().deadline_ms().unwrap() - deadline).abs() < 1e-9);
        assert_eq!(c.timer().remaining_ms(deadline / 2.0), Some(deadline / 2.0));
    }

    #[test]
    fn test_snapshot_particle_age() {
        // Keep the waypoint timer quiet so the target stays put
        let settings = Settings {
            waypoint_delay_min_ms: 5_000.0,
            waypoint_delay_max_ms: 6_000.0,
            ..Settings::default()
        };
        let mut c = Controller::new(settings, Viewport::new(800.0, 600.0).unwrap(), 99);
        c.push(Command::Start);
        c.frame(0.0);
        c.push(Command::PointerMoved(c.state().target.center()));
        let hit = c.frame(0.0);
        assert_eq!(hit.score, 1);
        assert_eq!(hit.particles.len(), 17);
        assert!(hit.particles.iter().all(|p| p.age == 0.0));

        let later = c.frame(500.0);
        assert!(later.particles.iter().all(|p| (p.age - 0.5).abs() < 1e-6));
        let gone = c.frame(1_001.0);
        assert!(gone.particles.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut c = controller();
        let json = serde_json::to_string(&c.frame(0.0)).unwrap();
        assert!(json.contains("\"phase\":\"Title\""));
        assert!(json.contains("\"score\":0"));
    }
}
