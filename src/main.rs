//! Space Shooter headless host
//!
//! Drives the simulation with a simple autopilot, logs gameplay events and
//! prints the final snapshot as JSON on stdout.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use space_shooter::consts::*;
use space_shooter::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use space_shooter::{Settings, normalize_angle};

/// Fixed timestep in seconds
const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
/// Max ticks per frame when catching up in realtime mode
const MAX_SUBSTEPS: u32 = 8;

#[derive(Parser, Debug)]
#[command(name = "space-shooter", version, about = "Headless arena shooter simulation")]
struct Cli {
    /// RNG seed (defaults to the settings file, then the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Pace the simulation at wall-clock speed
    #[arg(long)]
    realtime: bool,

    /// Pretty-print the final snapshot
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(ticks) = cli.ticks {
        settings.ticks = ticks;
    }
    settings.realtime |= cli.realtime;

    let seed = cli.seed.or(settings.seed).unwrap_or_else(clock_seed);
    log::info!("Space Shooter starting with seed {seed} for {} ticks", settings.ticks);

    let mut state = GameState::from_settings(&settings, seed);
    let mut host = Host::new(&settings);

    if settings.realtime {
        host.run_realtime(&mut state, settings.ticks);
    } else {
        while host.ticks < settings.ticks && !host.finished() {
            host.step(&mut state);
        }
    }

    log::info!(
        "Finished after {} ticks: {} runs, best score {}",
        host.ticks,
        host.runs_finished,
        host.best_score.max(state.score)
    );

    let snapshot = state.snapshot();
    let json = if cli.pretty {
        serde_json::to_string_pretty(&snapshot)
    } else {
        serde_json::to_string(&snapshot)
    }
    .context("serializing final snapshot")?;
    println!("{json}");
    Ok(())
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Host-side bookkeeping around the simulation
struct Host {
    ticks: u64,
    runs_finished: u32,
    max_runs: u32,
    best_score: u64,
}

impl Host {
    fn new(settings: &Settings) -> Self {
        Self {
            ticks: 0,
            runs_finished: 0,
            max_runs: settings.max_runs,
            best_score: 0,
        }
    }

    fn finished(&self) -> bool {
        self.max_runs > 0 && self.runs_finished >= self.max_runs
    }

    /// One simulation tick plus event handling
    fn step(&mut self, state: &mut GameState) {
        let input = autopilot(state);
        tick(state, &input);
        self.ticks += 1;

        for event in state.drain_events() {
            self.handle_event(&event);
        }
    }

    /// Accumulate wall-clock time and run as many fixed ticks as it covers
    fn run_realtime(&mut self, state: &mut GameState, total_ticks: u64) {
        let mut accumulator = 0.0f32;
        let mut last = Instant::now();

        while self.ticks < total_ticks && !self.finished() {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32().min(0.1);
            last = now;
            accumulator += dt;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && self.ticks < total_ticks {
                self.step(state);
                accumulator -= SIM_DT;
                substeps += 1;
            }

            std::thread::sleep(Duration::from_secs_f32(SIM_DT / 2.0));
        }
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::GameOver { cause, score } => {
                self.runs_finished += 1;
                self.best_score = self.best_score.max(*score);
                log::info!("Run {} over: {:?}, score {}", self.runs_finished, cause, score);
            }
            GameEvent::AnomalyActivated { safe_center } => {
                log::info!(
                    "Anomaly incoming, safe zone at ({:.0}, {:.0})",
                    safe_center.x,
                    safe_center.y
                );
            }
            GameEvent::AnomalyStrike { survived } => {
                log::info!("Anomaly struck (survived: {survived})");
            }
            GameEvent::PowerupCollected { kind } => log::info!("Collected {kind:?}"),
            GameEvent::BombDetonated {
                enemies_cleared,
                points,
            } => log::info!("Bomb cleared {enemies_cleared} enemies (+{points})"),
            other => log::trace!("{other:?}"),
        }
    }
}

/// Enemies close enough to make the autopilot use a bomb
const AUTOPILOT_PANIC_RADIUS: f32 = 120.0;
/// Aim tolerance before firing
const AUTOPILOT_AIM_TOLERANCE: f32 = 0.15;

/// Deterministic input policy: start runs, flee to the safe zone while the
/// anomaly is active, otherwise turn toward the nearest enemy and shoot.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();

    if state.phase == GamePhase::AwaitingStart {
        input.confirm_start = true;
        return input;
    }

    let ship = &state.ship;
    let live = || state.enemies.iter().filter(|e| e.active && !e.is_hit());

    if state.effects.bombs > 0 && state.effects.flash_ticks == 0 {
        let crowded = live().count() >= 6;
        let close = live().any(|e| e.pos.distance(ship.pos) < AUTOPILOT_PANIC_RADIUS + e.radius);
        input.detonate_bomb = crowded || close;
    }

    if state.anomaly.active && !state.anomaly.is_safe(ship.pos) {
        let to_zone = state.anomaly.safe_center - ship.pos;
        let diff = turn_toward(&mut input, ship.angle, to_zone);
        if diff.abs() < 0.5 {
            input.thrust = true;
        } else if ship.speed > 1.0 {
            input.brake = true;
        }
        return input;
    }

    if state.anomaly.active && ship.speed > 0.0 {
        input.brake = true;
    }

    let nearest = live().min_by(|a, b| {
        a.pos
            .distance_squared(ship.pos)
            .total_cmp(&b.pos.distance_squared(ship.pos))
    });
    if let Some(enemy) = nearest {
        let diff = turn_toward(&mut input, ship.angle, enemy.pos - ship.pos);
        input.fire = diff.abs() < AUTOPILOT_AIM_TOLERANCE;
    }

    input
}

/// Set the rotate intent toward `dir` and return the remaining angle error
fn turn_toward(input: &mut TickInput, angle: f32, dir: glam::Vec2) -> f32 {
    // Inverse of heading_vector: (sin a, -cos a)
    let target = dir.x.atan2(-dir.y);
    let diff = normalize_angle(target - angle);
    if diff > ROTATE_SPEED / 2.0 {
        input.rotate_right = true;
    } else if diff < -ROTATE_SPEED / 2.0 {
        input.rotate_left = true;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use space_shooter::heading_vector;
    use space_shooter::sim::Enemy;

    #[test]
    fn test_turn_toward_matches_heading_convention() {
        for angle in [0.0f32, 1.0, -2.0, 3.0] {
            let mut input = TickInput::default();
            let diff = turn_toward(&mut input, 0.0, heading_vector(angle));
            assert!((normalize_angle(diff - angle)).abs() < 1e-4);
        }

        let mut input = TickInput::default();
        turn_toward(&mut input, 0.0, Vec2::new(1.0, 0.0));
        assert!(input.rotate_right && !input.rotate_left);
    }

    #[test]
    fn test_autopilot_starts_runs() {
        let state = GameState::new(1);
        assert!(autopilot(&state).confirm_start);
    }

    #[test]
    fn test_autopilot_fires_at_enemy_ahead() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        let id = state.next_entity_id();
        let ahead = state.ship.pos + Vec2::new(0.0, -300.0);
        state.enemies.push(Enemy::new(id, ahead, Vec2::ZERO, ENEMY_LARGE_RADIUS));

        let input = autopilot(&state);
        assert!(input.fire);
        assert!(!input.rotate_left && !input.rotate_right);
        assert!(!input.detonate_bomb);
    }

    #[test]
    fn test_autopilot_bombs_when_enemy_is_close() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.effects.bombs = 1;
        let id = state.next_entity_id();
        let near = state.ship.pos + Vec2::new(60.0, 0.0);
        state.enemies.push(Enemy::new(id, near, Vec2::ZERO, ENEMY_SMALL_RADIUS));
        assert!(autopilot(&state).detonate_bomb);
    }

    #[test]
    fn test_host_is_deterministic() {
        let settings = Settings {
            ticks: 2000,
            ..Default::default()
        };
        let run = || {
            let mut state = GameState::from_settings(&settings, 77);
            let mut host = Host::new(&settings);
            while host.ticks < settings.ticks {
                host.step(&mut state);
            }
            (state.snapshot(), host.runs_finished, host.best_score)
        };
        assert_eq!(run(), run());
    }
}
