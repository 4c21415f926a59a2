//! Session state and core simulation types
//!
//! `GameState` owns everything a run needs: the ship, the entity stores,
//! the anomaly and the seeded RNG. The frame step in `tick` is its only
//! mutator.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anomaly::Anomaly;
use crate::consts::*;
use crate::settings::Settings;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Splash screen; only a start intent is consumed
    AwaitingStart,
    /// Active gameplay
    Playing,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    EnemyContact,
    AnomalyStrike,
}

/// Something that happened during a tick, for the host to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    ShotFired { bullet_id: u32 },
    EnemySpawned { enemy_id: u32, invincible: bool },
    EnemyHit { enemy_id: u32, points: u64 },
    EnemySplit { enemy_id: u32, child_radius: f32 },
    /// An invincible enemy swallowed a bullet
    BulletAbsorbed { bullet_id: u32, enemy_id: u32 },
    PowerupDropped { kind: PowerupKind, pos: Vec2 },
    PowerupCollected { kind: PowerupKind },
    BombDetonated { enemies_cleared: usize, points: u64 },
    AnomalyActivated { safe_center: Vec2 },
    AnomalyStrike { survived: bool },
    GameOver { cause: LossCause, score: u64 },
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Heading in radians (0 = up, clockwise positive)
    pub angle: f32,
    /// Scalar speed along the heading, 0..=max_speed
    pub speed: f32,
    pub max_speed: f32,
    /// Ticks until the gun can fire again
    pub fire_cooldown: u32,
}

impl Ship {
    /// A fresh ship at the arena center
    pub fn new(arena: Vec2) -> Self {
        Self {
            pos: arena / 2.0,
            angle: 0.0,
            speed: 0.0,
            max_speed: MAX_SPEED,
            fire_cooldown: RESET_FIRE_COOLDOWN,
        }
    }

    /// Unit vector the ship is facing
    #[inline]
    pub fn heading(&self) -> Vec2 {
        crate::heading_vector(self.angle)
    }

    /// Where bullets leave the ship
    #[inline]
    pub fn gun_tip(&self) -> Vec2 {
        self.pos + self.heading() * SHIP_GUN_LENGTH
    }
}

/// Timed modifiers and consumables on the ship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shield_ticks: u32,
    pub invincible_bullets_ticks: u32,
    pub frozen_ticks: u32,
    /// Full-screen flash after a bomb
    pub flash_ticks: u32,
    pub bombs: u32,
}

impl ActiveEffects {
    #[inline]
    pub fn shielded(&self) -> bool {
        self.shield_ticks > 0
    }

    #[inline]
    pub fn enemies_frozen(&self) -> bool {
        self.frozen_ticks > 0
    }

    #[inline]
    pub fn bullets_invincible(&self) -> bool {
        self.invincible_bullets_ticks > 0
    }

    /// Apply a collected powerup
    pub fn apply(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::Shield => self.shield_ticks = SHIELD_TICKS,
            PowerupKind::Bomb => self.bombs = (self.bombs + 1).min(MAX_BOMBS),
            PowerupKind::InvincibleBullets => {
                self.invincible_bullets_ticks = INVINCIBLE_BULLETS_TICKS
            }
            PowerupKind::FreezeEnemies => self.frozen_ticks = FREEZE_TICKS,
        }
    }
}

/// An enemy (circle). Radius doubles as its tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
    /// Ticks left flashing before despawn; 0 = not hit
    pub hit_ticks: u32,
    /// Immune to bullets
    pub invincible: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            active: true,
            hit_ticks: 0,
            invincible: false,
        }
    }

    /// True while flashing before despawn
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.hit_ticks > 0
    }

    /// Radius of the two children this enemy splits into, if any
    pub fn split_radius(&self) -> Option<f32> {
        (self.radius > ENEMY_SMALL_RADIUS).then_some(self.radius / 2.0)
    }

    /// Points for destroying this enemy
    pub fn points(&self) -> u64 {
        score_for_radius(self.radius)
    }
}

/// Score by tier; smaller fragments are worth more
pub fn score_for_radius(radius: f32) -> u64 {
    match radius.round() as u32 {
        40 => 10,
        20 => 20,
        10 => 40,
        other => {
            log::warn!("No score for enemy radius {other}");
            debug_assert!(false, "unexpected enemy radius {radius}");
            0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    Shield,
    Bomb,
    InvincibleBullets,
    FreezeEnemies,
}

/// A powerup waiting to be collected. Never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerupKind,
    pub active: bool,
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Logical arena size
    pub arena: Vec2,
    pub phase: GamePhase,
    pub score: u64,
    /// Score of the last finished run
    pub previous_score: u64,
    /// Score at which the anomaly next triggers
    pub next_anomaly_score: u64,
    /// Ticks played in the current run
    pub time_ticks: u64,
    pub ship: Ship,
    pub effects: ActiveEffects,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<Powerup>,
    pub anomaly: Anomaly,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// New session on the default arena, waiting for a start intent
    pub fn new(seed: u64) -> Self {
        Self::with_arena(seed, Vec2::new(ARENA_WIDTH, ARENA_HEIGHT))
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self::with_arena(seed, settings.arena())
    }

    pub fn with_arena(seed: u64, arena: Vec2) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            phase: GamePhase::AwaitingStart,
            score: 0,
            previous_score: 0,
            next_anomaly_score: ANOMALY_FIRST_SCORE,
            time_ticks: 0,
            ship: Ship::new(arena),
            effects: ActiveEffects::default(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            anomaly: Anomaly::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Leave the splash screen and start playing
    pub fn start_run(&mut self) {
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started (seed {})", self.seed);
    }

    /// Bank the score and put everything back to the pre-game state
    pub fn lose(&mut self, cause: LossCause) {
        log::info!("Game over ({:?}) with score {}", cause, self.score);
        self.events.push(GameEvent::GameOver {
            cause,
            score: self.score,
        });
        self.previous_score = self.score;
        self.reset_run();
    }

    /// Reset ship, entities and modifiers; the RNG stream carries on
    pub fn reset_run(&mut self) {
        self.phase = GamePhase::AwaitingStart;
        self.score = 0;
        self.next_anomaly_score = ANOMALY_FIRST_SCORE;
        self.time_ticks = 0;
        self.ship = Ship::new(self.arena);
        self.effects = ActiveEffects::default();
        self.enemies.clear();
        self.bullets.clear();
        self.powerups.clear();
        self.anomaly.deactivate();
    }

    /// Add points without touching the anomaly (bomb clears)
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Add points for bullet hits and trigger the anomaly when the score
    /// crosses its threshold
    pub fn add_hit_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.add_score(points);
        if self.score >= self.next_anomaly_score {
            // Skip thresholds a single large award jumped over
            while self.next_anomaly_score <= self.score {
                self.next_anomaly_score += ANOMALY_REARM_SCORE;
            }
            if !self.anomaly.active {
                self.anomaly.activate(&mut self.rng, self.arena);
                self.events.push(GameEvent::AnomalyActivated {
                    safe_center: self.anomaly.safe_center,
                });
            }
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Active enemy count (including ones flashing before despawn)
    pub fn active_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_awaits_start() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::AwaitingStart);
        assert_eq!(state.score, 0);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert!(state.powerups.is_empty());
        assert_eq!(state.ship.pos, Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0));
        assert_eq!(state.ship.fire_cooldown, RESET_FIRE_COOLDOWN);
    }

    #[test]
    fn test_score_table() {
        assert_eq!(score_for_radius(ENEMY_LARGE_RADIUS), 10);
        assert_eq!(score_for_radius(ENEMY_MEDIUM_RADIUS), 20);
        assert_eq!(score_for_radius(ENEMY_SMALL_RADIUS), 40);
    }

    #[test]
    fn test_split_tiers() {
        let e = |r| Enemy::new(1, Vec2::ZERO, Vec2::ZERO, r);
        assert_eq!(e(40.0).split_radius(), Some(20.0));
        assert_eq!(e(20.0).split_radius(), Some(10.0));
        assert_eq!(e(10.0).split_radius(), None);
    }

    #[test]
    fn test_bomb_charges_capped() {
        let mut effects = ActiveEffects::default();
        for _ in 0..5 {
            effects.apply(PowerupKind::Bomb);
        }
        assert_eq!(effects.bombs, MAX_BOMBS);
    }

    #[test]
    fn test_timed_powerups_rearm() {
        let mut effects = ActiveEffects {
            frozen_ticks: 3,
            ..Default::default()
        };
        effects.apply(PowerupKind::FreezeEnemies);
        effects.apply(PowerupKind::InvincibleBullets);
        effects.apply(PowerupKind::Shield);
        assert_eq!(effects.frozen_ticks, FREEZE_TICKS);
        assert_eq!(effects.invincible_bullets_ticks, INVINCIBLE_BULLETS_TICKS);
        assert_eq!(effects.shield_ticks, SHIELD_TICKS);
        assert!(effects.shielded() && effects.enemies_frozen() && effects.bullets_invincible());
    }

    #[test]
    fn test_first_score_crossing_activates_anomaly() {
        let mut state = GameState::new(3);
        state.phase = GamePhase::Playing;
        state.add_hit_score(10);
        assert!(state.anomaly.active);
        assert_eq!(state.next_anomaly_score, ANOMALY_FIRST_SCORE + ANOMALY_REARM_SCORE);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::AnomalyActivated { .. }]
        ));

        // Further points below the next threshold do nothing new
        state.anomaly.deactivate();
        state.add_hit_score(20);
        assert!(!state.anomaly.active);

        // Crossing the next threshold re-arms it
        state.add_hit_score(ANOMALY_REARM_SCORE);
        assert!(state.anomaly.active);
    }

    #[test]
    fn test_plain_score_never_activates_anomaly() {
        let mut state = GameState::new(3);
        state.phase = GamePhase::Playing;
        state.add_score(30);
        assert_eq!(state.score, 30);
        assert!(!state.anomaly.active);
        assert_eq!(state.next_anomaly_score, ANOMALY_FIRST_SCORE);
        assert!(state.drain_events().is_empty());

        // The next bullet hit catches up with the missed threshold
        state.add_hit_score(10);
        assert!(state.anomaly.active);
        assert_eq!(state.next_anomaly_score, ANOMALY_FIRST_SCORE + ANOMALY_REARM_SCORE);
    }

    #[test]
    fn test_lose_banks_score_and_resets() {
        let mut state = GameState::new(4);
        state.phase = GamePhase::Playing;
        state.score = 130;
        state.effects.bombs = 2;
        state.effects.shield_ticks = 50;
        state.ship.pos = Vec2::new(10.0, 10.0);
        state.ship.speed = 5.0;
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, Vec2::ZERO, Vec2::ZERO, 40.0));
        state.anomaly.activate(&mut state.rng, state.arena);

        state.lose(LossCause::EnemyContact);

        assert_eq!(state.previous_score, 130);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::AwaitingStart);
        assert!(state.enemies.is_empty());
        assert_eq!(state.effects.bombs, 0);
        assert_eq!(state.effects.shield_ticks, 0);
        assert_eq!(state.ship.speed, 0.0);
        assert!(!state.anomaly.active);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::GameOver {
                cause: LossCause::EnemyContact,
                score: 130
            }]
        );
    }
}
