//! Rock Rain headless entry point
//!
//! Runs the scene flow with a minimal stand-in for the engine: it integrates
//! positions, reports overlap onsets and field exits, and an autopilot
//! supplies input. Rendering and audio are not part of this binary.

use std::collections::HashSet;
use std::path::Path;

use rock_rain::flow::{FlowEvent, FrameInput, SceneFlow, SceneKind};
use rock_rain::initials::MenuChoice;
use rock_rain::leaderboard::Leaderboard;
use rock_rain::persistence::JsonFileStore;
use rock_rain::settings::Settings;
use rock_rain::sim::{EntityId, GameEvent, InputEvent, Notice, RunState, TickInput};

/// Fixed frame time for the headless loop (60 Hz)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Stop after ten minutes of simulated time
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Collision radius of an obstacle at scale 1.0
const OBSTACLE_RADIUS: f32 = 80.0;
const CRAFT_RADIUS: f32 = 40.0;
const PROJECTILE_RADIUS: f32 = 6.0;

/// Stand-in physics: moves entities and reports overlap onsets
#[derive(Default)]
struct Physics {
    /// Pairs overlapping last frame, so each onset is reported once
    touching: HashSet<(EntityId, Option<EntityId>)>,
}

impl Physics {
    fn step(&mut self, run: &mut RunState, dt_ms: f64, width: f32, height: f32) -> Vec<Notice> {
        let dt = (dt_ms / 1000.0) as f32;
        let mut notices = Vec::new();

        if !run.paused {
            for o in run.registry.obstacles_mut() {
                o.pos += o.vel * dt;
            }
            for p in run.registry.projectiles_mut() {
                p.pos += p.vel * dt;
            }
        }
        // Containment is the engine's job
        run.craft.pos.x = run.craft.pos.x.clamp(0.0, width);

        let mut touching = HashSet::new();
        for o in run.registry.obstacles() {
            let reach = OBSTACLE_RADIUS * o.scale;
            if o.pos.y - reach > height {
                notices.push(Notice::LeftField { entity: o.id });
                continue;
            }
            if run.craft.visible && o.pos.distance(run.craft.pos) < reach + CRAFT_RADIUS {
                touching.insert((o.id, None));
            }
            for p in run.registry.projectiles() {
                if o.pos.distance(p.pos) < reach + PROJECTILE_RADIUS {
                    touching.insert((o.id, Some(p.id)));
                }
            }
        }
        for p in run.registry.projectiles() {
            if p.pos.y < -PROJECTILE_RADIUS {
                notices.push(Notice::LeftField { entity: p.id });
            }
        }

        let mut onsets: Vec<_> = touching.difference(&self.touching).copied().collect();
        onsets.sort();
        for (obstacle, other) in onsets {
            notices.push(match other {
                Some(projectile) => Notice::ProjectileObstacle {
                    projectile,
                    obstacle,
                },
                None => Notice::CraftObstacle { obstacle },
            });
        }
        self.touching = touching;
        notices
    }
}

/// Steers under the nearest obstacle and keeps the trigger down
#[derive(Default)]
struct Autopilot {
    heading: Option<InputEvent>,
    firing: bool,
    typed: usize,
}

impl Autopilot {
    fn inputs(&mut self, flow: &SceneFlow) -> Vec<InputEvent> {
        match flow.scene_kind() {
            SceneKind::Logo => vec![InputEvent::Confirm],
            SceneKind::Run => flow.run().map(|run| self.steer(run)).unwrap_or_default(),
            SceneKind::Initials => {
                const NAME: [char; 3] = ['C', 'P', 'U'];
                if self.typed < NAME.len() {
                    self.typed += 1;
                    vec![InputEvent::Letter(NAME[self.typed - 1])]
                } else {
                    vec![InputEvent::Menu(MenuChoice::Exit)]
                }
            }
            SceneKind::GameOver | SceneKind::Exit => Vec::new(),
        }
    }

    fn steer(&mut self, run: &RunState) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if !self.firing {
            self.firing = true;
            events.push(InputEvent::FireDown);
        }

        let craft = run.craft.pos;
        let target = run
            .registry
            .obstacles()
            .iter()
            .filter(|o| o.pos.y < craft.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|o| o.pos.x);
        let wanted = match target {
            Some(x) if x < craft.x - 8.0 => Some(InputEvent::MoveLeftDown),
            Some(x) if x > craft.x + 8.0 => Some(InputEvent::MoveRightDown),
            _ => None,
        };
        if wanted != self.heading {
            match self.heading {
                Some(InputEvent::MoveLeftDown) => events.push(InputEvent::MoveLeftUp),
                Some(InputEvent::MoveRightDown) => events.push(InputEvent::MoveRightUp),
                _ => {}
            }
            events.extend(wanted);
            self.heading = wanted;
        }
        events
    }
}

fn load_settings() -> Result<Settings, rock_rain::SettingsError> {
    match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => {
            let settings = Settings::default();
            settings.validate()?;
            Ok(settings)
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Rock Rain (headless) starting...");

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    let (width, height) = (settings.field_width, settings.field_height);
    let store = JsonFileStore::new(settings.leaderboard_path.clone());
    let mut flow = match SceneFlow::new(settings, Box::new(store)) {
        Ok(flow) => flow,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let mut physics = Physics::default();
    let mut pilot = Autopilot::default();
    let mut now_ms = 0.0;

    for _ in 0..MAX_FRAMES {
        if flow.is_finished() {
            break;
        }
        now_ms += FRAME_MS;

        let events = pilot.inputs(&flow);
        let notices = match flow.run_mut() {
            Some(run) => physics.step(run, FRAME_MS, width, height),
            None => Vec::new(),
        };
        flow.update(&FrameInput {
            now_ms,
            dt_ms: FRAME_MS,
            input: TickInput { events, notices },
        });

        for event in flow.drain_events() {
            match event {
                FlowEvent::Run(GameEvent::LivesChanged { lives_lost }) => {
                    println!("Life lost ({lives_lost})");
                }
                FlowEvent::Run(GameEvent::RunEnded(outcome)) => {
                    println!("GAME OVER - score {}", outcome.final_score);
                }
                FlowEvent::LeaderboardChanged(outcome) => {
                    if outcome.is_new_top {
                        println!("NEW RECORD!");
                    }
                    for line in Leaderboard::from_entries(outcome.entries).ranked_lines() {
                        println!("{line}");
                    }
                }
                FlowEvent::SceneChanged(SceneKind::Run) => physics = Physics::default(),
                _ => {}
            }
        }
    }
}
