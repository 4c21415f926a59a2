//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only, all rates expressed per tick
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod anomaly;
pub mod geometry;
pub mod spawn;
pub mod state;
pub mod tick;

pub use anomaly::{Anomaly, AnomalyPhase};
pub use geometry::{
    distance_to_segment_squared, point_in_polygon, polygon_circle_intersects, rotate_point,
    ship_hull, wrap_position,
};
pub use state::{
    ActiveEffects, Bullet, Enemy, GameEvent, GamePhase, GameState, LossCause, Powerup,
    PowerupKind, Ship, score_for_radius,
};
pub use tick::{TickInput, tick};
