//! Per-frame run update
//!
//! Order within a tick:
//! 1. input edges (held flags, pause toggle)
//! 2. overlap notices, in delivery order
//! 3. stop here while paused
//! 4. run clock, due timers
//! 5. movement and fire control (not while disabled)
//! 6. spawning
//! 7. damage-indicator upkeep

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{self, Notice, Resolution};
use super::state::{DestroyCause, GameEvent, RunOutcome, RunPhase, RunState, RunTimer};
use crate::consts::*;
use crate::initials::MenuChoice;

/// Period of the damage-indicator pulse
pub const TARGET_LOCK_PULSE_MS: f64 = 500.0;

/// Discrete input edges from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    MoveLeftDown,
    MoveLeftUp,
    MoveRightDown,
    MoveRightUp,
    FireDown,
    FireUp,
    /// Pause toggled; every event flips the pause state
    PauseToggle,
    /// Raw pause key press; auto-repeat presses before `PauseUp` are ignored
    PauseDown,
    PauseUp,
    /// Letter picked on the initials screen
    Letter(char),
    /// Tap/click/any key on the logo screen
    Confirm,
    /// Menu pick after the leaderboard is shown
    Menu(MenuChoice),
}

/// Everything the run consumes in one tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
    pub notices: Vec<Notice>,
}

/// Advance a run by `dt_ms` of elapsed time
pub fn tick(state: &mut RunState, input: &TickInput, dt_ms: f64) {
    step(state, input, dt_ms);
    state.sync_status();
}

fn step(state: &mut RunState, input: &TickInput, dt_ms: f64) {
    if state.is_over() {
        return;
    }

    for event in &input.events {
        apply_input(state, *event);
    }

    // Resolved even while paused so no overlap onset is lost
    for notice in &input.notices {
        resolve_notice(state, notice);
    }

    if state.paused {
        return;
    }

    state.clock_ms += dt_ms.max(0.0);

    for timer in state.timers.take_due(state.clock_ms) {
        run_timer(state, timer);
        if state.is_over() {
            return;
        }
    }

    if state.phase == RunPhase::Running {
        steer(state, dt_ms.max(0.0));
        fire_control(state);
    }
    state.controls.fire_pressed = false;

    for id in state.spawner.advance(dt_ms, &mut state.registry) {
        if let Some(o) = state.registry.obstacle(id) {
            let event = GameEvent::ObstacleCreated {
                id,
                pos: o.pos,
                scale: o.scale,
                vel: o.vel,
                angular_vel: o.angular_vel,
            };
            state.emit(event);
        }
    }

    let clock_ms = state.clock_ms;
    state.registry.for_each_obstacle(|o| {
        if let Some(lock) = &mut o.target_lock {
            let phase = (clock_ms - lock.locked_at_ms) / TARGET_LOCK_PULSE_MS;
            lock.pulse = phase.fract() as f32;
        }
    });
}

fn apply_input(state: &mut RunState, event: InputEvent) {
    let controls = &mut state.controls;
    match event {
        InputEvent::MoveLeftDown => controls.left = true,
        InputEvent::MoveLeftUp => controls.left = false,
        InputEvent::MoveRightDown => controls.right = true,
        InputEvent::MoveRightUp => controls.right = false,
        InputEvent::FireDown => {
            controls.fire = true;
            if !state.paused {
                controls.fire_pressed = true;
            }
        }
        InputEvent::FireUp => controls.fire = false,
        InputEvent::PauseToggle => toggle_pause(state),
        InputEvent::PauseDown => {
            if !controls.pause_held {
                controls.pause_held = true;
                toggle_pause(state);
            }
        }
        InputEvent::PauseUp => controls.pause_held = false,
        InputEvent::Letter(_) | InputEvent::Confirm | InputEvent::Menu(_) => {}
    }
}

fn toggle_pause(state: &mut RunState) {
    state.paused = !state.paused;
    if state.paused {
        // A tap latched earlier in this tick must not fire on resume
        state.controls.fire_pressed = false;
    }
    log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
}

fn resolve_notice(state: &mut RunState, notice: &Notice) {
    let resolution = combat::resolve(
        notice,
        &mut state.registry,
        &mut state.craft,
        state.clock_ms,
        &mut state.events,
    );
    match resolution {
        Resolution::Hit { points, .. } | Resolution::ShotDown { points, .. } => {
            state.award(points);
        }
        Resolution::CraftStruck { lives_lost } => {
            state.emit(GameEvent::LivesChanged { lives_lost });
            state.phase = RunPhase::Disabled;
            if lives_lost >= LIVES {
                state
                    .timers
                    .schedule(state.clock_ms + GAME_OVER_DELAY_MS, RunTimer::EndRun);
            } else {
                state
                    .timers
                    .schedule(state.clock_ms + RESPAWN_DELAY_MS, RunTimer::Respawn);
            }
        }
        Resolution::Departed | Resolution::Ignored => {}
    }
}

fn run_timer(state: &mut RunState, timer: RunTimer) {
    match timer {
        RunTimer::Respawn => {
            for o in state.registry.clear_obstacles() {
                state.emit(GameEvent::ObstacleDestroyed {
                    id: o.id,
                    pos: o.pos,
                    cause: DestroyCause::Cleared,
                });
            }
            state.craft.respawn();
            state.phase = RunPhase::Running;
            log::info!("Craft respawned ({} lives left)", state.craft.lives_left());
        }
        RunTimer::EndRun => {
            let outcome = RunOutcome {
                final_score: state.score,
            };
            state.phase = RunPhase::GameOver;
            state.paused = false;
            state.timers.cancel_all();
            state.outcome = Some(outcome);
            state.emit(GameEvent::RunEnded(outcome));
            log::info!("Game over, final score {}", outcome.final_score);
        }
    }
}

/// Left wins when both directions are held
fn steer(state: &mut RunState, dt_ms: f64) {
    let step = (state.move_speed * dt_ms / 2000.0) as f32;
    let controls = &state.controls;
    if controls.left {
        state.craft.pos.x -= step;
    } else if controls.right {
        state.craft.pos.x += step;
    }
}

fn fire_control(state: &mut RunState) {
    if !(state.controls.fire || state.controls.fire_pressed) {
        return;
    }
    let ready = state
        .last_shot_ms
        .is_none_or(|last| state.clock_ms >= last + SHOT_COOLDOWN_MS);
    if !ready {
        return;
    }
    let pos = state.craft.pos - Vec2::new(0.0, PROJECTILE_OFFSET_Y);
    let id = state
        .registry
        .spawn_projectile(pos, Vec2::new(0.0, -PROJECTILE_SPEED));
    state.last_shot_ms = Some(state.clock_ms);
    state.emit(GameEvent::ProjectileCreated { id, pos });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{EntityId, RunStatus};

    const FRAME: f64 = 1000.0 / 60.0;

    fn new_run() -> RunState {
        RunState::new(&Settings::default(), 12345).unwrap()
    }

    fn press(state: &mut RunState, events: &[InputEvent]) {
        let input = TickInput {
            events: events.to_vec(),
            ..Default::default()
        };
        tick(state, &input, FRAME);
    }

    fn notify(state: &mut RunState, notices: &[Notice]) {
        let input = TickInput {
            notices: notices.to_vec(),
            ..Default::default()
        };
        tick(state, &input, FRAME);
    }

    fn idle(state: &mut RunState, ms: f64) {
        let frames = (ms / FRAME).ceil() as usize;
        for _ in 0..frames {
            tick(state, &TickInput::default(), FRAME);
        }
    }

    fn rock(state: &mut RunState) -> EntityId {
        state
            .registry
            .spawn_obstacle(Vec2::new(200.0, 600.0), Vec2::new(0.0, 100.0), 0.0, 0.5)
    }

    fn ram(state: &mut RunState) {
        let obstacle = rock(state);
        notify(state, &[Notice::CraftObstacle { obstacle }]);
    }

    #[test]
    fn test_movement_left_takes_precedence() {
        let mut state = new_run();
        let start_x = state.craft.pos.x;
        let step = (state.move_speed * FRAME / 2000.0) as f32;

        press(&mut state, &[InputEvent::MoveLeftDown, InputEvent::MoveRightDown]);
        assert!((state.craft.pos.x - (start_x - step)).abs() < 1e-3);

        press(&mut state, &[InputEvent::MoveLeftUp]);
        assert!((state.craft.pos.x - start_x).abs() < 1e-3);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::FireDown, InputEvent::FireUp]);
        idle(&mut state, 100.0);
        press(&mut state, &[InputEvent::FireDown, InputEvent::FireUp]);
        assert_eq!(state.registry.projectiles().len(), 1);

        // Past the cooldown a tap fires again
        idle(&mut state, SHOT_COOLDOWN_MS);
        press(&mut state, &[InputEvent::FireDown, InputEvent::FireUp]);
        assert_eq!(state.registry.projectiles().len(), 2);
    }

    #[test]
    fn test_held_fire_repeats_at_cooldown() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::FireDown]);
        idle(&mut state, 1000.0);
        // First shot plus one every 180 ms, quantised to frames
        let shots = state.registry.projectiles().len();
        assert!((5..=6).contains(&shots), "got {shots}");

        let projectile = &state.registry.projectiles()[0];
        assert_eq!(projectile.vel, Vec2::new(0.0, -PROJECTILE_SPEED));
    }

    #[test]
    fn test_pause_is_edge_triggered() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::PauseDown]);
        assert_eq!(state.status(), RunStatus::Paused);

        // Auto-repeat while held does not toggle back
        press(&mut state, &[InputEvent::PauseDown]);
        press(&mut state, &[InputEvent::PauseDown]);
        assert_eq!(state.status(), RunStatus::Paused);

        press(&mut state, &[InputEvent::PauseUp]);
        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        assert_eq!(state.status(), RunStatus::Running);
    }

    #[test]
    fn test_pause_toggle_needs_no_release() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::PauseToggle]);
        assert_eq!(state.status(), RunStatus::Paused);
        idle(&mut state, 500.0);
        press(&mut state, &[InputEvent::PauseToggle]);
        assert_eq!(state.status(), RunStatus::Running);
        press(&mut state, &[InputEvent::PauseToggle, InputEvent::PauseToggle]);
        assert_eq!(state.status(), RunStatus::Running);
    }

    #[test]
    fn test_tap_before_pause_does_not_fire_on_resume() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::FireDown, InputEvent::PauseToggle]);
        press(&mut state, &[InputEvent::FireUp]);
        press(&mut state, &[InputEvent::PauseToggle]);
        idle(&mut state, 100.0);
        assert!(state.registry.projectiles().is_empty());
    }

    #[test]
    fn test_pause_freezes_clock_spawning_and_movement() {
        let mut state = new_run();
        idle(&mut state, 500.0);
        let clock = state.clock_ms;
        let accumulated = state.spawner.accumulated_ms();

        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp, InputEvent::MoveLeftDown]);
        let x = state.craft.pos.x;
        idle(&mut state, 5000.0);
        assert_eq!(state.clock_ms, clock);
        assert_eq!(state.spawner.accumulated_ms(), accumulated);
        assert!(state.registry.obstacles().is_empty());
        assert_eq!(state.craft.pos.x, x);

        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        idle(&mut state, 600.0);
        assert_eq!(state.registry.obstacles().len(), 1);
    }

    #[test]
    fn test_spawns_one_obstacle_per_second() {
        let mut state = new_run();
        idle(&mut state, 3010.0);
        assert_eq!(state.registry.obstacles().len(), 3);
        let created = state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ObstacleCreated { .. }))
            .count();
        assert_eq!(created, 3);
    }

    #[test]
    fn test_scoring() {
        let mut state = new_run();
        let obstacle = rock(&mut state);
        for n in 1..=OBSTACLE_IMPACTS as u64 {
            let projectile = state
                .registry
                .spawn_projectile(Vec2::new(200.0, 650.0), Vec2::NEG_Y);
            notify(&mut state, &[Notice::ProjectileObstacle { projectile, obstacle }]);
            if n < OBSTACLE_IMPACTS as u64 {
                assert_eq!(state.score, n * HIT_SCORE);
            }
        }
        assert_eq!(
            state.score,
            OBSTACLE_IMPACTS as u64 * HIT_SCORE + DESTROY_BONUS
        );
        assert!(state.registry.obstacle(obstacle).is_none());
        assert!(state.events().contains(&GameEvent::ScoreChanged(state.score)));
    }

    #[test]
    fn test_respawn_after_delay() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::MoveRightDown]);
        ram(&mut state);
        assert_eq!(state.status(), RunStatus::Disabled);
        assert_eq!(state.craft.lives_lost, 1);

        // Threats keep coming while disabled, but controls are inert
        let x = state.craft.pos.x;
        idle(&mut state, 2500.0);
        assert_eq!(state.craft.pos.x, x);
        assert!(!state.registry.obstacles().is_empty());
        assert_eq!(state.status(), RunStatus::Disabled);

        idle(&mut state, 600.0);
        assert_eq!(state.status(), RunStatus::Running);
        assert!(state.craft.visible);
        assert_eq!(state.craft.pos.y, state.craft.start.y);
        assert!(state.events().iter().any(|e| matches!(
            e,
            GameEvent::ObstacleDestroyed {
                cause: DestroyCause::Cleared,
                ..
            }
        )));
    }

    #[test]
    fn test_disabled_craft_ignores_collisions() {
        let mut state = new_run();
        ram(&mut state);
        ram(&mut state);
        ram(&mut state);
        assert_eq!(state.craft.lives_lost, 1);
    }

    #[test]
    fn test_pause_does_not_shift_respawn() {
        let mut state = new_run();
        // Notices resolve before the clock advances
        let hit_clock = state.clock_ms;
        ram(&mut state);

        idle(&mut state, 1000.0);
        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        idle(&mut state, 10_000.0);
        assert_eq!(state.status(), RunStatus::Paused);
        assert_eq!(state.phase, RunPhase::Disabled);
        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);

        // Respawn lands exactly RESPAWN_DELAY_MS of run time after the hit
        while state.phase == RunPhase::Disabled {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        let elapsed = state.clock_ms - hit_clock;
        assert!(elapsed >= RESPAWN_DELAY_MS);
        assert!(elapsed < RESPAWN_DELAY_MS + FRAME + 1e-6);
    }

    fn lose_life_and_wait(state: &mut RunState) {
        ram(state);
        idle(state, RESPAWN_DELAY_MS + FRAME);
    }

    #[test]
    fn test_game_over_on_last_life() {
        let mut state = new_run();
        for lost in 1..LIVES {
            lose_life_and_wait(&mut state);
            assert_eq!(state.craft.lives_lost, lost);
            assert_eq!(state.status(), RunStatus::Running);
        }

        state.score = 420;
        ram(&mut state);
        assert_eq!(state.craft.lives_lost, LIVES);
        assert_eq!(state.status(), RunStatus::Disabled);
        assert!(state.outcome.is_none());

        idle(&mut state, GAME_OVER_DELAY_MS + FRAME);
        assert_eq!(state.status(), RunStatus::GameOver);
        assert_eq!(state.outcome, Some(RunOutcome { final_score: 420 }));
        assert!(state.events().contains(&GameEvent::RunEnded(RunOutcome { final_score: 420 })));
        assert!(state.events().contains(&GameEvent::StatusChanged(RunStatus::GameOver)));
    }

    #[test]
    fn test_no_updates_after_game_over() {
        let mut state = new_run();
        for _ in 0..LIVES {
            lose_life_and_wait(&mut state);
        }
        assert!(state.is_over());
        let clock = state.clock_ms;
        let obstacles = state.registry.obstacles().len();

        press(&mut state, &[InputEvent::FireDown, InputEvent::PauseDown]);
        idle(&mut state, 5000.0);
        assert_eq!(state.clock_ms, clock);
        assert_eq!(state.registry.obstacles().len(), obstacles);
        assert_eq!(state.status(), RunStatus::GameOver);
    }

    #[test]
    fn test_lives_never_decrease() {
        let mut state = new_run();
        let mut last = 0;
        for _ in 0..20 {
            ram(&mut state);
            idle(&mut state, 700.0);
            assert!(state.craft.lives_lost >= last);
            assert!(state.craft.lives_lost <= LIVES);
            last = state.craft.lives_lost;
        }
        assert!(state.is_over());
    }

    #[test]
    fn test_target_lock_pulse_advances_and_freezes() {
        let mut state = new_run();
        let obstacle = rock(&mut state);
        let projectile = state
            .registry
            .spawn_projectile(Vec2::new(200.0, 650.0), Vec2::NEG_Y);
        notify(&mut state, &[Notice::ProjectileObstacle { projectile, obstacle }]);

        idle(&mut state, 100.0);
        let pulse = state.registry.obstacle(obstacle).unwrap().target_lock.unwrap().pulse;
        assert!(pulse > 0.0);

        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        idle(&mut state, 123.0);
        let frozen = state.registry.obstacle(obstacle).unwrap().target_lock.unwrap().pulse;
        assert_eq!(pulse, frozen);
    }

    #[test]
    fn test_status_events_emitted_on_change() {
        let mut state = new_run();
        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        press(&mut state, &[InputEvent::PauseDown, InputEvent::PauseUp]);
        let statuses: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::StatusChanged(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![RunStatus::Paused, RunStatus::Running]);
        assert!(state.events().is_empty());
    }
}
