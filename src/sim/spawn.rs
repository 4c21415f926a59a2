//! Enemy spawning, splitting and powerup drops
//!
//! Enemies enter on a random edge and head for a random point on the
//! opposite edge, so they cross the arena instead of converging on the ship.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, GameEvent, GameState, Powerup, PowerupKind};
use crate::consts::*;

/// Maybe spawn one enemy this tick (suppressed while enemies are frozen)
pub fn spawn_enemies(state: &mut GameState) {
    if state.effects.enemies_frozen() {
        return;
    }
    if !state.rng.random_bool(SPAWN_CHANCE) {
        return;
    }

    let (start, target) = random_edge_route(&mut state.rng, state.arena);
    let vel = (target - start).normalize_or_zero() * ENEMY_SPEED;
    let invincible = state.rng.random_bool(INVINCIBLE_ENEMY_CHANCE);

    let id = state.next_entity_id();
    let mut enemy = Enemy::new(id, start, vel, ENEMY_LARGE_RADIUS);
    enemy.invincible = invincible;
    state.enemies.push(enemy);

    log::debug!("Spawned enemy {id} at ({:.0}, {:.0})", start.x, start.y);
    state.events.push(GameEvent::EnemySpawned {
        enemy_id: id,
        invincible,
    });
}

/// Start point just outside one edge and a target just outside the opposite one
pub fn random_edge_route<R: Rng>(rng: &mut R, arena: Vec2) -> (Vec2, Vec2) {
    let (w, h) = (arena.x, arena.y);
    match rng.random_range(0..4u8) {
        // Top -> bottom
        0 => (
            Vec2::new(rng.random_range(0.0..w), -1.0),
            Vec2::new(rng.random_range(0.0..w), h),
        ),
        // Bottom -> top
        1 => (
            Vec2::new(rng.random_range(0.0..w), h),
            Vec2::new(rng.random_range(0.0..w), -1.0),
        ),
        // Left -> right
        2 => (
            Vec2::new(-1.0, rng.random_range(0.0..h)),
            Vec2::new(w, rng.random_range(0.0..h)),
        ),
        // Right -> left
        _ => (
            Vec2::new(w, rng.random_range(0.0..h)),
            Vec2::new(-1.0, rng.random_range(0.0..h)),
        ),
    }
}

/// The two children of a split. They fly off in random directions; while
/// frozen they are nudged apart so they don't sit exactly on top of each other.
pub fn split_children<R: Rng>(rng: &mut R, parent: &Enemy, frozen: bool) -> [(Vec2, Vec2); 2] {
    std::array::from_fn(|_| {
        let angle = rng.random::<f32>() * TAU;
        let vel = Vec2::from_angle(angle) * ENEMY_SPEED;
        let mut pos = parent.pos;
        if frozen {
            let jitter_angle = rng.random::<f32>() * TAU;
            let offset = rng.random::<f32>() * FROZEN_SPLIT_JITTER;
            pos += Vec2::from_angle(jitter_angle) * offset;
        }
        (pos, vel)
    })
}

/// Roll for a powerup when an enemy finishes despawning
pub fn roll_powerup_drop<R: Rng>(rng: &mut R) -> Option<PowerupKind> {
    let drop_roll = rng.random::<f32>();
    if drop_roll >= POWERUP_DROP_CHANCE {
        return None;
    }
    Some(powerup_kind_for_roll(rng.random::<f32>()))
}

/// Map a uniform roll in [0, 1) onto the powerup bands
pub fn powerup_kind_for_roll(roll: f32) -> PowerupKind {
    if roll < 0.05 {
        PowerupKind::Shield
    } else if roll < 0.1 {
        PowerupKind::Bomb
    } else if roll < 0.5 {
        PowerupKind::FreezeEnemies
    } else {
        PowerupKind::InvincibleBullets
    }
}

/// Drop a powerup at `pos` if the roll says so
pub fn drop_powerup(state: &mut GameState, pos: Vec2) {
    let Some(kind) = roll_powerup_drop(&mut state.rng) else {
        return;
    };
    let id = state.next_entity_id();
    state.powerups.push(Powerup {
        id,
        pos,
        kind,
        active: true,
    });
    log::debug!("Dropped {kind:?} at ({:.0}, {:.0})", pos.x, pos.y);
    state.events.push(GameEvent::PowerupDropped { kind, pos });
}
