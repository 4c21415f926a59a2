//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session by one frame. The order of the
//! stages matters: enemies settle their overlaps before bullets test against
//! them, and the ship is tested only after everything else has moved.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{
    circle_outside_arena, point_outside_arena, polygon_circle_intersects, ship_hull, wrap_position,
};
use super::spawn::{drop_powerup, spawn_enemies, split_children};
use super::state::{Bullet, Enemy, GameEvent, GamePhase, GameState, LossCause};
use crate::consts::*;
use crate::normalize_angle;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub brake: bool,
    pub fire: bool,
    pub detonate_bomb: bool,
    /// Leave the splash screen
    pub confirm_start: bool,
}

/// Advance the session by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.anomaly.update();

    state.effects.shield_ticks = state.effects.shield_ticks.saturating_sub(1);

    if state.anomaly.advance_fade() {
        anomaly_strike(state);
    }

    state.effects.frozen_ticks = state.effects.frozen_ticks.saturating_sub(1);
    state.effects.invincible_bullets_ticks =
        state.effects.invincible_bullets_ticks.saturating_sub(1);
    state.effects.flash_ticks = state.effects.flash_ticks.saturating_sub(1);

    if state.phase == GamePhase::AwaitingStart {
        if input.confirm_start {
            state.start_run();
        }
        return;
    }

    state.time_ticks += 1;

    apply_input(state, input);
    move_ship(state, input);
    spawn_enemies(state);
    resolve_enemy_collisions(&mut state.enemies);
    update_enemies(state);
    bullet_enemy_collisions(state);
    move_bullets(state);

    if ship_hit(state) {
        state.lose(LossCause::EnemyContact);
        return;
    }

    collect_powerups(state);
}

/// The anomaly strikes: anything outside the safe zone loses the run
fn anomaly_strike(state: &mut GameState) {
    let survived = state.anomaly.is_safe(state.ship.pos);
    state.events.push(GameEvent::AnomalyStrike { survived });
    if survived {
        log::info!("Anomaly strike survived");
    } else if state.phase == GamePhase::Playing {
        state.lose(LossCause::AnomalyStrike);
    }
}

/// Bomb, rotation, thrust/brake and firing
fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.detonate_bomb && state.effects.bombs > 0 && state.effects.flash_ticks == 0 {
        detonate_bomb(state);
    }

    let ship = &mut state.ship;
    if input.rotate_left {
        ship.angle = normalize_angle(ship.angle - ROTATE_SPEED);
    }
    if input.rotate_right {
        ship.angle = normalize_angle(ship.angle + ROTATE_SPEED);
    }

    if input.thrust {
        ship.speed = (ship.speed + ACCEL).min(ship.max_speed);
    }
    if input.brake {
        ship.speed = (ship.speed - ACCEL).max(0.0);
    }

    if input.fire && state.ship.fire_cooldown == 0 {
        let id = state.next_entity_id();
        let heading = state.ship.heading();
        state.bullets.push(Bullet {
            id,
            pos: state.ship.gun_tip(),
            vel: heading * BULLET_SPEED,
            active: true,
        });
        state.ship.fire_cooldown = FIRE_COOLDOWN;
        state.events.push(GameEvent::ShotFired { bullet_id: id });
    }
}

/// Clear every enemy on screen and flash the screen
fn detonate_bomb(state: &mut GameState) {
    state.effects.bombs -= 1;
    state.effects.flash_ticks = BOMB_FLASH_TICKS;

    let points: u64 = state
        .enemies
        .iter()
        .filter(|e| e.active)
        .map(Enemy::points)
        .sum();
    let cleared = state.enemies.iter().filter(|e| e.active).count();
    state.enemies.clear();

    log::info!("Bomb cleared {cleared} enemies for {points} points");
    state.events.push(GameEvent::BombDetonated {
        enemies_cleared: cleared,
        points,
    });
    state.add_score(points);
}

/// Friction, integration and toroidal wrap
fn move_ship(state: &mut GameState, input: &TickInput) {
    let ship = &mut state.ship;
    if !input.thrust && !input.brake {
        ship.speed = (ship.speed - FRICTION).max(0.0);
    }
    ship.pos = wrap_position(ship.pos + ship.heading() * ship.speed, state.arena);
}

/// Push overlapping enemies apart along their line of centers and swap
/// their velocities (equal-mass elastic approximation)
pub fn resolve_enemy_collisions(enemies: &mut [Enemy]) {
    for i in 0..enemies.len() {
        let (head, tail) = enemies.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.active {
            continue;
        }
        for b in tail.iter_mut().filter(|b| b.active) {
            let delta = b.pos - a.pos;
            let r_sum = a.radius + b.radius;
            let dist_sq = delta.length_squared();
            if dist_sq >= r_sum * r_sum {
                continue;
            }

            let (dist, normal) = if dist_sq == 0.0 {
                // Coincident centers: pick an axis
                (MIN_SEPARATION, Vec2::X)
            } else {
                let dist = dist_sq.sqrt();
                (dist, delta / dist)
            };

            let overlap = 0.5 * (r_sum - dist);
            a.pos -= normal * overlap;
            b.pos += normal * overlap;
            std::mem::swap(&mut a.vel, &mut b.vel);
        }
    }
}

/// Move enemies, finish hit flashes (with a powerup roll) and drop enemies
/// that left the arena
fn update_enemies(state: &mut GameState) {
    let frozen = state.effects.enemies_frozen();
    let arena = state.arena;
    let mut despawned = Vec::new();

    state.enemies.retain_mut(|enemy| {
        if !enemy.active {
            return false;
        }
        if !frozen {
            enemy.pos += enemy.vel;
        }
        if enemy.hit_ticks > 0 {
            enemy.hit_ticks -= 1;
            if enemy.hit_ticks == 0 {
                despawned.push(enemy.pos);
                return false;
            }
            return true;
        }
        !circle_outside_arena(enemy.pos, enemy.radius, arena)
    });

    for pos in despawned {
        drop_powerup(state, pos);
    }
}

/// Each bullet resolves at most one enemy per tick
fn bullet_enemy_collisions(state: &mut GameState) {
    let piercing = state.effects.bullets_invincible();
    let frozen = state.effects.enemies_frozen();
    let mut points = 0;
    let mut children: Vec<(Vec2, Vec2, f32)> = Vec::new();

    for bullet in state.bullets.iter_mut().filter(|b| b.active) {
        for enemy in state.enemies.iter_mut() {
            if !enemy.active {
                continue;
            }
            if bullet.pos.distance_squared(enemy.pos) >= enemy.radius * enemy.radius {
                continue;
            }

            if enemy.invincible {
                bullet.active = false;
                state.events.push(GameEvent::BulletAbsorbed {
                    bullet_id: bullet.id,
                    enemy_id: enemy.id,
                });
                break;
            }

            // Piercing bullets fly on but score nothing
            let award = if piercing {
                0
            } else {
                bullet.active = false;
                enemy.points()
            };
            points += award;
            state.events.push(GameEvent::EnemyHit {
                enemy_id: enemy.id,
                points: award,
            });

            if let Some(child_radius) = enemy.split_radius() {
                for (pos, vel) in split_children(&mut state.rng, enemy, frozen) {
                    children.push((pos, vel, child_radius));
                }
                state.events.push(GameEvent::EnemySplit {
                    enemy_id: enemy.id,
                    child_radius,
                });
            }
            enemy.hit_ticks = HIT_FLASH_TICKS;
            log::debug!("Bullet {} hit enemy {} (+{award})", bullet.id, enemy.id);
            break;
        }
    }

    for (pos, vel, radius) in children {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, pos, vel, radius));
    }
    state.add_hit_score(points);
}

/// Advance bullets, drop spent or escaped ones, cool the gun down
fn move_bullets(state: &mut GameState) {
    let arena = state.arena;
    state.bullets.retain_mut(|bullet| {
        if !bullet.active {
            return false;
        }
        bullet.pos += bullet.vel;
        !point_outside_arena(bullet.pos, arena)
    });
    state.ship.fire_cooldown = state.ship.fire_cooldown.saturating_sub(1);
}

/// Ship hull vs every active enemy, unless shielded
fn ship_hit(state: &GameState) -> bool {
    if state.effects.shielded() {
        return false;
    }
    let hull = ship_hull(state.ship.pos, state.ship.angle);
    state
        .enemies
        .iter()
        .filter(|e| e.active)
        .any(|e| polygon_circle_intersects(&hull, e.pos, e.radius))
}

fn collect_powerups(state: &mut GameState) {
    let ship_pos = state.ship.pos;
    for powerup in state.powerups.iter_mut().filter(|p| p.active) {
        if ship_pos.distance_squared(powerup.pos) < PICKUP_RADIUS * PICKUP_RADIUS {
            powerup.active = false;
            state.effects.apply(powerup.kind);
            log::debug!("Collected {:?}", powerup.kind);
            state.events.push(GameEvent::PowerupCollected { kind: powerup.kind });
        }
    }
    state.powerups.retain(|p| p.active);
}
