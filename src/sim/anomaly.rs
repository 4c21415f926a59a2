//! The anomaly: a periodic screen-wide hazard
//!
//! Once activated it warns for a while (incoming), fades in, flickers, and
//! strikes one tick before its fade timer runs out. A ship outside the safe
//! zone at the strike ends the run. Opacity is presentation only; the strike
//! is decided by the fade timer alone.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::clamp_circle_center;
use crate::consts::*;

/// Observable phase of the anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyPhase {
    Inactive,
    /// Warning countdown, not yet dangerous
    Incoming,
    /// Opacity ramping up
    FadingIn,
    /// Opacity saturated, flickering until the strike
    Flashing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anomaly {
    pub active: bool,
    /// Ticks of warning left before the fade starts
    pub incoming_ticks: u32,
    /// Overall countdown of the dangerous part; strike at 1
    pub fade_ticks: u32,
    /// Set by `update` once a tick starts with the warning already over
    pub fading: bool,
    pub flash_ticks: u32,
    pub flashing: bool,
    /// Overlay opacity, 0..=ANOMALY_ALPHA_MAX
    pub alpha: u8,
    pub safe_center: Vec2,
    pub safe_radius: f32,
}

impl Anomaly {
    /// Arm the anomaly and pick a new safe zone fully inside the arena
    pub fn activate<R: Rng>(&mut self, rng: &mut R, arena: Vec2) {
        self.active = true;
        self.incoming_ticks = ANOMALY_INCOMING_TICKS;
        self.fade_ticks = ANOMALY_FADE_TICKS;
        self.fading = false;
        self.flash_ticks = 0;
        self.flashing = false;
        self.alpha = 0;
        self.safe_radius = ANOMALY_SAFE_RADIUS;

        let raw = Vec2::new(rng.random::<f32>() * arena.x, rng.random::<f32>() * arena.y);
        self.safe_center = clamp_circle_center(raw, self.safe_radius, arena);
        log::info!(
            "Anomaly incoming, safe zone at ({:.0}, {:.0})",
            self.safe_center.x,
            self.safe_center.y
        );
    }

    /// Zero every timer and forget the safe zone
    pub fn deactivate(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> AnomalyPhase {
        if !self.active {
            AnomalyPhase::Inactive
        } else if self.incoming_ticks > 0 {
            AnomalyPhase::Incoming
        } else if self.flashing {
            AnomalyPhase::Flashing
        } else {
            AnomalyPhase::FadingIn
        }
    }

    /// Advance the opacity animation by one tick
    pub fn update(&mut self) {
        if !self.active {
            return;
        }

        if self.incoming_ticks > 0 {
            self.incoming_ticks -= 1;
            return;
        }
        self.fading = true;

        if !self.flashing {
            if self.alpha < ANOMALY_ALPHA_MAX {
                if self.fade_ticks % ANOMALY_FADE_STEP_TICKS == 0 {
                    self.alpha = (self.alpha + ANOMALY_ALPHA_STEP).min(ANOMALY_ALPHA_MAX);
                }
            } else {
                self.flashing = true;
                self.flash_ticks = ANOMALY_FLASH_TICKS;
            }
        }

        if self.flashing && self.flash_ticks > 0 {
            self.alpha = if self.flash_ticks % ANOMALY_FLICKER_PERIOD == 0 {
                ANOMALY_ALPHA_LOW
            } else {
                ANOMALY_ALPHA_MAX
            };
            self.flash_ticks -= 1;
            if self.flash_ticks == 0 {
                self.deactivate();
            }
        }
    }

    /// Count the fade timer down by one tick.
    ///
    /// Returns true on the strike tick (timer reached 1). Deactivates when
    /// the timer reaches zero. Does nothing until `update` has run a tick
    /// past the warning, including the tick the warning ran out on.
    pub fn advance_fade(&mut self) -> bool {
        if !self.active || !self.fading {
            return false;
        }
        self.fade_ticks = self.fade_ticks.saturating_sub(1);
        if self.fade_ticks == 0 {
            self.deactivate();
            return false;
        }
        self.fade_ticks == 1
    }

    /// True if `pos` is inside (or on the edge of) the safe zone
    pub fn is_safe(&self, pos: Vec2) -> bool {
        pos.distance_squared(self.safe_center) <= self.safe_radius * self.safe_radius
    }
}
