//! Session settings
//!
//! Loaded from an optional JSON file by the host; every field has a default
//! so a partial file only overrides what it names.

use std::path::Path;

use anyhow::{Context, bail};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Settings for one headless session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Logical arena width
    pub arena_width: f32,
    /// Logical arena height
    pub arena_height: f32,

    // === Run ===
    /// Fixed RNG seed; a time-based seed is used when absent
    pub seed: Option<u64>,
    /// Ticks to simulate
    pub ticks: u64,
    /// Pace ticks at wall-clock speed instead of running flat out
    pub realtime: bool,
    /// Runs the host plays before stopping early (0 = until ticks run out)
    pub max_runs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            seed: None,
            ticks: u64::from(TICKS_PER_SECOND) * 60,
            realtime: false,
            max_runs: 0,
        }
    }
}

impl Settings {
    /// Arena size as a vector
    pub fn arena(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject arenas the simulation can't place a safe zone in
    pub fn validate(&self) -> anyhow::Result<()> {
        let min = ANOMALY_SAFE_RADIUS * 2.0;
        let dims = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
        ];
        for (name, value) in dims {
            if !value.is_finite() {
                bail!("{name} must be finite, got {value}");
            }
            if value <= min {
                bail!("{name} must be larger than {min}, got {value}");
            }
        }
        Ok(())
    }
}
