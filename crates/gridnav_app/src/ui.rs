use crate::runtime::{ComputeOutcome, RuntimeCoordinator};
use gridnav_core::coords::GridIndex;
use gridnav_core::engine::{EditRejected, Engine, EngineCommand, SessionMode};
use gridnav_core::input::{ObstacleDraft, RobotDraft};
use gridnav_core::model::{Direction, ObstacleId};
use gridnav_core::playback::describe_command;
use gridnav_rt::health::HealthStatus;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepView {
    pub page: usize,
    pub len: usize,
    pub command: Option<String>,
    pub description: String,
    pub has_previous: bool,
    pub has_next: bool,
}

impl StepView {
    pub fn label(&self) -> String {
        format!("Step {} of {}", self.page + 1, self.len)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UiSnapshot {
    pub mode: SessionMode,
    pub robot_draft: RobotDraft,
    pub obstacle_draft: ObstacleDraft,
    pub health: HealthStatus,
    pub solver_backend: &'static str,
    pub last_outcome: Option<ComputeOutcome>,
    pub obstacle_count: usize,
    pub requests_issued: u64,
    pub distance: Option<f64>,
    pub step: Option<StepView>,
}

#[derive(Clone, Debug, Default)]
pub struct UiController {
    robot_draft: RobotDraft,
    obstacle_draft: ObstacleDraft,
}

#[derive(Clone, Debug)]
pub enum UiAction {
    EditRobotX(String),
    EditRobotY(String),
    EditRobotDirection(Direction),
    ApplyRobot,
    EditObstacleX(String),
    EditObstacleY(String),
    EditObstacleDirection(Direction),
    AddObstacle,
    ClickCell(GridIndex),
    RemoveObstacle { id: ObstacleId },
    StartPathfinding,
    ResetRobot,
    ResetAll,
    CheckApi,
    PreviousStep,
    NextStep,
    GoToStep(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UiError {
    #[error(transparent)]
    Rejected(#[from] EditRejected),
    #[error("already at the first step")]
    AtFirstStep,
    #[error("a health check is already running")]
    CheckInFlight,
}

impl UiController {
    pub fn robot_draft(&self) -> RobotDraft {
        self.robot_draft
    }

    pub fn obstacle_draft(&self) -> ObstacleDraft {
        self.obstacle_draft
    }

    pub fn handle_action(
        &mut self,
        action: UiAction,
        engine: &mut Engine,
        runtime: &mut RuntimeCoordinator,
    ) -> Result<(), UiError> {
        match action {
            UiAction::EditRobotX(raw) => {
                self.robot_draft.set_x(&raw);
                Ok(())
            }
            UiAction::EditRobotY(raw) => {
                self.robot_draft.set_y(&raw);
                Ok(())
            }
            UiAction::EditRobotDirection(direction) => {
                self.robot_draft.set_direction(direction);
                Ok(())
            }
            UiAction::ApplyRobot => {
                let draft = self.robot_draft;
                runtime.apply_edit(
                    engine,
                    EngineCommand::SetRobot {
                        x: draft.x,
                        y: draft.y,
                        direction: draft.direction,
                    },
                )?;
                Ok(())
            }
            UiAction::EditObstacleX(raw) => {
                self.obstacle_draft.set_x(&raw);
                Ok(())
            }
            UiAction::EditObstacleY(raw) => {
                self.obstacle_draft.set_y(&raw);
                Ok(())
            }
            UiAction::EditObstacleDirection(direction) => {
                self.obstacle_draft.set_direction(direction);
                Ok(())
            }
            UiAction::AddObstacle => {
                let draft = self.obstacle_draft;
                runtime.apply_edit(
                    engine,
                    EngineCommand::AddObstacle {
                        at: draft.position(),
                        direction: draft.direction,
                    },
                )?;
                Ok(())
            }
            UiAction::ClickCell(grid) => {
                runtime.apply_edit(engine, EngineCommand::ClickCell(grid))?;
                Ok(())
            }
            UiAction::RemoveObstacle { id } => {
                let obstacle = engine.obstacle(id)?;
                runtime.apply_edit(
                    engine,
                    EngineCommand::RemoveObstacle {
                        at: obstacle.position(),
                    },
                )?;
                Ok(())
            }
            UiAction::StartPathfinding => {
                runtime.start_compute(engine)?;
                Ok(())
            }
            UiAction::ResetRobot => {
                runtime.apply_edit(engine, EngineCommand::ResetRobot)?;
                self.robot_draft = RobotDraft::default();
                Ok(())
            }
            UiAction::ResetAll => {
                runtime.apply_edit(engine, EngineCommand::ResetAll)?;
                self.robot_draft = RobotDraft::default();
                Ok(())
            }
            UiAction::CheckApi => {
                if runtime.check_health() {
                    Ok(())
                } else {
                    Err(UiError::CheckInFlight)
                }
            }
            UiAction::PreviousStep => {
                let page = engine
                    .snapshot()
                    .playback
                    .previous_page()
                    .ok_or(UiError::AtFirstStep)?;
                runtime.apply_edit(engine, EngineCommand::SeekStep(page))?;
                Ok(())
            }
            UiAction::NextStep => {
                let page = engine.snapshot().playback.next_page();
                runtime.apply_edit(engine, EngineCommand::SeekStep(page))?;
                Ok(())
            }
            UiAction::GoToStep(page) => {
                runtime.apply_edit(engine, EngineCommand::SeekStep(page))?;
                Ok(())
            }
        }
    }

    pub fn snapshot(&self, engine: &Engine, runtime: &RuntimeCoordinator) -> UiSnapshot {
        let scenario = engine.snapshot();
        let runtime_snapshot = runtime.snapshot();
        let playback = &scenario.playback;

        let step = (!playback.is_empty()).then(|| {
            let command = playback.current_command().map(str::to_string);
            StepView {
                page: playback.cursor(),
                len: playback.len(),
                description: command.as_deref().map(describe_command).unwrap_or_default(),
                command,
                has_previous: playback.has_previous(),
                has_next: playback.has_next(),
            }
        });

        UiSnapshot {
            mode: runtime.mode(engine),
            robot_draft: self.robot_draft,
            obstacle_draft: self.obstacle_draft,
            health: runtime_snapshot.health,
            solver_backend: runtime_snapshot.solver_backend,
            last_outcome: runtime_snapshot.last_outcome,
            obstacle_count: scenario.obstacles.len(),
            requests_issued: runtime_snapshot.requests_issued,
            distance: playback.distance(),
            step,
        }
    }
}
