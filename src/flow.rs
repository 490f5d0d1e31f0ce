//! Scene sequencing
//!
//! Logo → Run → GameOver → Initials → (Run | Exit). The leaderboard is read
//! from the store when initials entry opens and written back once per run.

use serde::{Deserialize, Serialize};

use crate::consts::GAME_OVER_SCREEN_MS;
use crate::error::SettingsError;
use crate::initials::{InitialsEntry, LetterOutcome, MenuChoice};
use crate::leaderboard::{Leaderboard, SubmitOutcome};
use crate::persistence::LeaderboardStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, InputEvent, RunOutcome, RunState, TickInput, tick};

/// The active scene and its state
#[derive(Debug)]
pub enum Scene {
    /// Title screen, waiting for a confirm
    Logo,
    Run(Box<RunState>),
    /// Final score on screen until `reveal_at_ms`
    GameOver {
        outcome: RunOutcome,
        reveal_at_ms: f64,
    },
    Initials(InitialsEntry),
    /// Player chose to quit
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneKind {
    Logo,
    Run,
    GameOver,
    Initials,
    Exit,
}

impl Scene {
    pub fn kind(&self) -> SceneKind {
        match self {
            Scene::Logo => SceneKind::Logo,
            Scene::Run(_) => SceneKind::Run,
            Scene::GameOver { .. } => SceneKind::GameOver,
            Scene::Initials(_) => SceneKind::Initials,
            Scene::Exit => SceneKind::Exit,
        }
    }
}

/// Effects for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    SceneChanged(SceneKind),
    Run(GameEvent),
    LeaderboardChanged(SubmitOutcome),
}

/// One frame from the application shell
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Elapsed time since startup
    pub now_ms: f64,
    /// Time since the previous frame
    pub dt_ms: f64,
    pub input: TickInput,
}

enum Transition {
    StartRun,
    EndRun(RunOutcome),
    Reveal(u64),
    Exit,
}

pub struct SceneFlow {
    settings: Settings,
    store: Box<dyn LeaderboardStore>,
    scene: Scene,
    runs_started: u64,
    events: Vec<FlowEvent>,
}

impl SceneFlow {
    pub fn new(settings: Settings, store: Box<dyn LeaderboardStore>) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            store,
            scene: Scene::Logo,
            runs_started: 0,
            events: Vec::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_kind(&self) -> SceneKind {
        self.scene.kind()
    }

    pub fn run(&self) -> Option<&RunState> {
        match &self.scene {
            Scene::Run(run) => Some(&**run),
            _ => None,
        }
    }

    /// Mutable run access for the physics collaborator
    pub fn run_mut(&mut self) -> Option<&mut RunState> {
        match &mut self.scene {
            Scene::Run(run) => Some(&mut **run),
            _ => None,
        }
    }

    pub fn initials(&self) -> Option<&InitialsEntry> {
        match &self.scene {
            Scene::Initials(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn store(&self) -> &dyn LeaderboardStore {
        &*self.store
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.scene, Scene::Exit)
    }

    pub fn drain_events(&mut self) -> Vec<FlowEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the active scene by one frame
    pub fn update(&mut self, frame: &FrameInput) {
        let events = &frame.input.events;
        let transition = match &mut self.scene {
            Scene::Logo => events
                .contains(&InputEvent::Confirm)
                .then_some(Transition::StartRun),
            Scene::Run(run) => {
                tick(run, &frame.input, frame.dt_ms);
                self.events
                    .extend(run.drain_events().into_iter().map(FlowEvent::Run));
                run.outcome.map(Transition::EndRun)
            }
            Scene::GameOver {
                outcome,
                reveal_at_ms,
            } => (frame.now_ms >= *reveal_at_ms).then_some(Transition::Reveal(outcome.final_score)),
            Scene::Initials(entry) => {
                let mut transition = None;
                for event in events {
                    match *event {
                        InputEvent::Letter(letter) => {
                            if let LetterOutcome::Submitted(outcome) =
                                entry.select_letter(letter, &mut *self.store)
                            {
                                self.events.push(FlowEvent::LeaderboardChanged(outcome));
                            }
                        }
                        InputEvent::Menu(choice) => {
                            transition = entry.choose(choice).map(|choice| match choice {
                                MenuChoice::NewGame => Transition::StartRun,
                                MenuChoice::Exit => Transition::Exit,
                            });
                            if transition.is_some() {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                transition
            }
            Scene::Exit => None,
        };

        if let Some(transition) = transition {
            self.apply(transition, frame.now_ms);
        }
    }

    fn apply(&mut self, transition: Transition, now_ms: f64) {
        self.scene = match transition {
            Transition::StartRun => {
                self.runs_started += 1;
                let seed = self.settings.seed.wrapping_add(self.runs_started);
                match RunState::new(&self.settings, seed) {
                    Ok(run) => Scene::Run(Box::new(run)),
                    Err(e) => {
                        log::error!("Cannot start run: {e}");
                        Scene::Exit
                    }
                }
            }
            Transition::EndRun(outcome) => Scene::GameOver {
                outcome,
                reveal_at_ms: now_ms + GAME_OVER_SCREEN_MS,
            },
            Transition::Reveal(score) => {
                let leaderboard = Leaderboard::load_or_empty(&*self.store);
                Scene::Initials(InitialsEntry::new(score, leaderboard))
            }
            Transition::Exit => Scene::Exit,
        };
        let kind = self.scene.kind();
        log::info!("Scene: {kind:?}");
        self.events.push(FlowEvent::SceneChanged(kind));
    }
}
