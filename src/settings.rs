//! Game tuning and preferences
//!
//! Every field has a default, so partial JSON documents are accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// How collisions turn into score events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// One point per overlap episode; the player must separate before scoring again
    #[default]
    PerOverlap,
    /// One point for every frame spent overlapping
    PerFrame,
}

impl ScoringPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::PerOverlap => "per_overlap",
            ScoringPolicy::PerFrame => "per_frame",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per_overlap" | "overlap" => Some(ScoringPolicy::PerOverlap),
            "per_frame" | "frame" => Some(ScoringPolicy::PerFrame),
            _ => None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Entities ===
    pub player_size: f32,
    pub target_size: f32,

    // === Seeking ===
    /// Target speed toward its waypoint (px/s)
    pub target_speed: f32,
    /// Distance of each candidate waypoint
    pub waypoint_step: f32,
    /// Waypoint timer window (ms), sampled from [min, max)
    pub waypoint_delay_min_ms: f64,
    pub waypoint_delay_max_ms: f64,
    /// Push-away distance applied on a hit
    pub nudge_distance: f32,

    // === Orbit ===
    pub orbit_radius: f32,
    /// Radians per second
    pub orbit_angular_speed: f32,
    /// Score at which the target starts orbiting for good
    pub orbit_score: u32,

    // === Particles ===
    pub particle_lifetime_ms: f64,
    pub particle_base: u32,
    pub particle_max: u32,
    /// Particle effects on/off
    pub particles: bool,

    // === Input / scoring ===
    pub keyboard_step: f32,
    pub scoring: ScoringPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_size: PLAYER_SIZE,
            target_size: TARGET_SIZE,

            target_speed: TARGET_SPEED,
            waypoint_step: WAYPOINT_STEP,
            waypoint_delay_min_ms: WAYPOINT_DELAY_MIN_MS,
            waypoint_delay_max_ms: WAYPOINT_DELAY_MAX_MS,
            nudge_distance: NUDGE_DISTANCE,

            orbit_radius: ORBIT_RADIUS,
            orbit_angular_speed: ORBIT_ANGULAR_SPEED,
            orbit_score: ORBIT_SCORE,

            particle_lifetime_ms: PARTICLE_LIFETIME_MS,
            particle_base: PARTICLE_BASE,
            particle_max: PARTICLE_MAX,
            particles: true,

            keyboard_step: KEYBOARD_STEP,
            scoring: ScoringPolicy::PerOverlap,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("player_size", self.player_size),
            ("target_size", self.target_size),
            ("target_speed", self.target_speed),
            ("waypoint_step", self.waypoint_step),
            ("nudge_distance", self.nudge_distance),
            ("orbit_radius", self.orbit_radius),
            ("orbit_angular_speed", self.orbit_angular_speed),
            ("keyboard_step", self.keyboard_step),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive finite number",
                });
            }
        }

        if !(self.waypoint_delay_min_ms.is_finite() && self.waypoint_delay_min_ms >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "waypoint_delay_min_ms",
                reason: "must be a non-negative finite number",
            });
        }
        if !(self.waypoint_delay_max_ms.is_finite()
            && self.waypoint_delay_max_ms > self.waypoint_delay_min_ms)
        {
            return Err(SettingsError::Invalid {
                field: "waypoint_delay_max_ms",
                reason: "must be greater than waypoint_delay_min_ms",
            });
        }
        if !(self.particle_lifetime_ms.is_finite() && self.particle_lifetime_ms > 0.0) {
            return Err(SettingsError::Invalid {
                field: "particle_lifetime_ms",
                reason: "must be a positive finite number",
            });
        }
        if self.particle_base > self.particle_max {
            return Err(SettingsError::Invalid {
                field: "particle_base",
                reason: "must not exceed particle_max",
            });
        }
        if self.orbit_score == 0 {
            return Err(SettingsError::Invalid {
                field: "orbit_score",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Particles spawned by a hit that brought the score to `score`
    pub fn burst_size(&self, score: u32) -> usize {
        if !self.particles {
            0
        } else {
            self.particle_base.saturating_add(score).min(self.particle_max) as usize
        }
    }
}
