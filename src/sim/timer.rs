//! Randomized self-rearming waypoint timer
//!
//! The timer fires after a delay sampled from `[min, max)` ms. Each new window
//! starts at the previous scheduled deadline, not at the time the expiry was
//! observed, so late polling never stretches the cadence. An interrupted
//! timer keeps its remaining time.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum TimerState {
    Idle,
    Armed { deadline_ms: f64 },
    Suspended { remaining_ms: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointTimer {
    min_ms: f64,
    max_ms: f64,
    state: TimerState,
}

impl WaypointTimer {
    pub fn new(min_ms: f64, max_ms: f64) -> Self {
        Self {
            min_ms,
            max_ms,
            state: TimerState::Idle,
        }
    }

    fn sample_delay<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.max_ms > self.min_ms {
            rng.random_range(self.min_ms..self.max_ms)
        } else {
            self.min_ms
        }
    }

    /// Start a fresh window at `now_ms`
    pub fn arm<R: Rng>(&mut self, now_ms: f64, rng: &mut R) {
        let deadline_ms = now_ms + self.sample_delay(rng);
        log::debug!("Waypoint timer armed for {deadline_ms:.1}ms");
        self.state = TimerState::Armed { deadline_ms };
    }

    /// Returns true once per expiry and re-arms from the expired deadline
    pub fn poll<R: Rng>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        let TimerState::Armed { deadline_ms } = self.state else {
            return false;
        };
        if now_ms < deadline_ms {
            return false;
        }

        let mut next = deadline_ms + self.sample_delay(rng);
        if next <= now_ms {
            // More than a whole window behind (e.g. a backgrounded tab): start over from now
            next = now_ms + self.sample_delay(rng);
        }
        self.state = TimerState::Armed { deadline_ms: next };
        true
    }

    /// Pause the timer, remembering how much of the window is left
    pub fn suspend(&mut self, now_ms: f64) {
        if let TimerState::Armed { deadline_ms } = self.state {
            self.state = TimerState::Suspended {
                remaining_ms: (deadline_ms - now_ms).max(0.0),
            };
        }
    }

    /// Continue a suspended timer with exactly its remaining time
    pub fn resume(&mut self, now_ms: f64) {
        if let TimerState::Suspended { remaining_ms } = self.state {
            self.state = TimerState::Armed {
                deadline_ms: now_ms + remaining_ms,
            };
        }
    }

    /// Explicit restart: an armed or suspended timer keeps its remaining time,
    /// an idle one gets a fresh window
    pub fn restart<R: Rng>(&mut self, now_ms: f64, rng: &mut R) {
        match self.state {
            TimerState::Idle => self.arm(now_ms, rng),
            TimerState::Armed { .. } => {
                self.suspend(now_ms);
                self.resume(now_ms);
            }
            TimerState::Suspended { .. } => self.resume(now_ms),
        }
    }

    pub fn deadline_ms(&self) -> Option<f64> {
        match self.state {
            TimerState::Armed { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Armed { deadline_ms } => Some((deadline_ms - now_ms).max(0.0)),
            TimerState::Suspended { remaining_ms } => Some(remaining_ms),
        }
    }
}
