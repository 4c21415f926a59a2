//! Read-only view of a session for an external renderer
//!
//! Captured after a tick completes. Only active entities are included and
//! nothing here can be written back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{AnomalyPhase, GamePhase, GameState, PowerupKind, ship_hull};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipView {
    pub pos: Vec2,
    pub angle: f32,
    /// Hull polygon in arena coordinates, same shape used for collision
    pub hull: [Vec2; 4],
    pub shield_ticks: u32,
    pub bombs: u32,
    pub invincible_bullets_ticks: u32,
    pub frozen_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub invincible: bool,
    /// Flashing before despawn
    pub hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    pub pos: Vec2,
    pub kind: PowerupKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyView {
    pub active: bool,
    pub phase: AnomalyPhase,
    pub alpha: u8,
    pub safe_center: Vec2,
    pub safe_radius: f32,
    pub incoming_ticks: u32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub arena: Vec2,
    pub phase: GamePhase,
    pub awaiting_start: bool,
    pub score: u64,
    pub previous_score: u64,
    pub time_ticks: u64,
    /// Full-screen bomb flash ticks left
    pub screen_flash_ticks: u32,
    pub ship: ShipView,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub powerups: Vec<PowerupView>,
    pub anomaly: AnomalyView,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let ship = &state.ship;
        let effects = &state.effects;
        let anomaly = &state.anomaly;

        Self {
            arena: state.arena,
            phase: state.phase,
            awaiting_start: state.phase == GamePhase::AwaitingStart,
            score: state.score,
            previous_score: state.previous_score,
            time_ticks: state.time_ticks,
            screen_flash_ticks: effects.flash_ticks,
            ship: ShipView {
                pos: ship.pos,
                angle: ship.angle,
                hull: ship_hull(ship.pos, ship.angle),
                shield_ticks: effects.shield_ticks,
                bombs: effects.bombs,
                invincible_bullets_ticks: effects.invincible_bullets_ticks,
                frozen_ticks: effects.frozen_ticks,
            },
            enemies: state
                .enemies
                .iter()
                .filter(|e| e.active)
                .map(|e| EnemyView {
                    id: e.id,
                    pos: e.pos,
                    radius: e.radius,
                    invincible: e.invincible,
                    hit: e.is_hit(),
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .filter(|b| b.active)
                .map(|b| BulletView { pos: b.pos })
                .collect(),
            powerups: state
                .powerups
                .iter()
                .filter(|p| p.active)
                .map(|p| PowerupView {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
            anomaly: AnomalyView {
                active: anomaly.active,
                phase: anomaly.phase(),
                alpha: anomaly.alpha,
                safe_center: anomaly.safe_center,
                safe_radius: anomaly.safe_radius,
                incoming_ticks: anomaly.incoming_ticks,
            },
        }
    }
}

impl GameState {
    /// Snapshot of the current state for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
