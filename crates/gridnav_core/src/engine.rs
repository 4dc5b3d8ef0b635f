use thiserror::Error;

use crate::coords::{GridIndex, LogicalCoord};
use crate::model::{Direction, Obstacle, ObstacleId, Plan, PlanRequest, RobotPose, NO_SCAN};
use crate::playback::PathPlayback;
use crate::registry::ObstacleRegistry;
use crate::robot::{Footprint, Robot};

#[derive(Clone, Debug)]
pub enum EngineCommand {
    AddObstacle {
        at: LogicalCoord,
        direction: Direction,
    },
    ClickCell(GridIndex),
    RemoveObstacle {
        at: LogicalCoord,
    },
    SetRobot {
        x: i32,
        y: i32,
        direction: Direction,
    },
    ResetRobot,
    ResetAll,
    LoadPlan(Plan),
    SeekStep(usize),
}

impl EngineCommand {
    /// Commands that touch the registry or the robot and so wait for idle.
    pub fn is_edit(&self) -> bool {
        !matches!(self, EngineCommand::LoadPlan(_) | EngineCommand::SeekStep(_))
    }
}

/// A guarded action that was ignored. State is untouched whenever one is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("scenario is read-only while a path is loaded")]
    ReadOnly,
    #[error("a path computation is already in flight")]
    Busy,
    #[error("cell ({x}, {y}) is outside the arena")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) already holds an obstacle")]
    Occupied { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is covered by the robot")]
    RobotFootprint { x: i32, y: i32 },
    #[error("no obstacle at ({x}, {y})")]
    NotFound { x: i32, y: i32 },
    #[error("no obstacle with id {0}")]
    UnknownObstacle(ObstacleId),
    #[error("place at least one obstacle first")]
    NoObstacles,
    #[error("step {page} is outside 0..{len}")]
    PageOutOfRange { page: usize, len: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    Editing,
    Computing,
    Playback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Obstacle {
        id: ObstacleId,
        direction: Direction,
    },
    RobotBody,
    RobotMarker {
        direction: Direction,
        scanned: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Scenario {
    pub obstacles: ObstacleRegistry,
    pub robot: Robot,
    pub playback: PathPlayback,
}

impl Scenario {
    pub fn footprint(&self) -> Footprint {
        self.robot.footprint()
    }

    /// Obstacles win over robot cells when both claim a grid cell.
    pub fn cell_at(&self, grid: GridIndex) -> CellKind {
        let at = grid.to_logical();
        if let Some(obstacle) = self.obstacles.at(at) {
            return CellKind::Obstacle {
                id: obstacle.id,
                direction: obstacle.direction,
            };
        }

        let footprint = self.footprint();
        match footprint.cell_at(at) {
            Some(cell) => match cell.marker {
                Some(marker) => CellKind::RobotMarker {
                    direction: marker.direction,
                    scanned: marker.scan_id != NO_SCAN,
                },
                None => CellKind::RobotBody,
            },
            None => CellKind::Empty,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.playback.is_empty()
    }
}

pub struct Engine {
    scenario: Scenario,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            scenario: Scenario::default(),
        }
    }

    pub fn snapshot(&self) -> &Scenario {
        &self.scenario
    }

    /// Mode as seen by the engine alone; the runtime layers `Computing` on top.
    pub fn mode(&self) -> SessionMode {
        if self.scenario.is_editable() {
            SessionMode::Editing
        } else {
            SessionMode::Playback
        }
    }

    pub fn plan_request(&self) -> Result<PlanRequest, EditRejected> {
        if self.scenario.obstacles.is_empty() {
            return Err(EditRejected::NoObstacles);
        }

        Ok(PlanRequest {
            obstacles: self.scenario.obstacles.as_slice().to_vec(),
            robot: self.scenario.robot.pose(),
        })
    }

    pub fn obstacle(&self, id: ObstacleId) -> Result<Obstacle, EditRejected> {
        self.scenario
            .obstacles
            .get(id)
            .copied()
            .ok_or(EditRejected::UnknownObstacle(id))
    }

    pub fn apply_command(&mut self, command: EngineCommand) -> Result<(), EditRejected> {
        match command {
            EngineCommand::AddObstacle { at, direction } => {
                self.ensure_editable()?;
                let footprint = self.scenario.footprint();
                self.scenario.obstacles.add(at, direction, &footprint)?;
                Ok(())
            }
            EngineCommand::ClickCell(grid) => {
                self.ensure_editable()?;
                let footprint = self.scenario.footprint();
                self.scenario
                    .obstacles
                    .add_at_grid_index(grid, &footprint)?;
                Ok(())
            }
            EngineCommand::RemoveObstacle { at } => {
                self.ensure_editable()?;
                self.scenario.obstacles.remove(at)?;
                Ok(())
            }
            EngineCommand::SetRobot { x, y, direction } => {
                self.ensure_editable()?;
                let mut candidate = Robot::default();
                candidate.set_pose(x, y, direction);
                self.ensure_uncovered(&candidate)?;
                self.scenario.robot = candidate;
                Ok(())
            }
            EngineCommand::ResetRobot => {
                let home = Robot::default();
                self.ensure_uncovered(&home)?;
                self.scenario.playback.clear();
                self.scenario.robot = home;
                Ok(())
            }
            EngineCommand::ResetAll => {
                self.scenario.obstacles.clear();
                self.scenario.playback.clear();
                self.scenario.robot.reset();
                Ok(())
            }
            EngineCommand::LoadPlan(plan) => {
                if let Some(pose) = self.scenario.playback.load(plan) {
                    self.scenario.robot.show(pose);
                }
                Ok(())
            }
            EngineCommand::SeekStep(page) => {
                let pose = self.scenario.playback.advance(page)?;
                self.scenario.robot.show(pose);
                Ok(())
            }
        }
    }

    pub fn robot_pose(&self) -> RobotPose {
        self.scenario.robot.pose()
    }

    /// Every robot move made while editing keeps its footprint clear of obstacles.
    fn ensure_uncovered(&self, robot: &Robot) -> Result<(), EditRejected> {
        let footprint = robot.footprint();
        match self
            .scenario
            .obstacles
            .iter()
            .find(|obstacle| footprint.contains(obstacle.position()))
        {
            Some(obstacle) => Err(EditRejected::Occupied {
                x: obstacle.x,
                y: obstacle.y,
            }),
            None => Ok(()),
        }
    }

    fn ensure_editable(&self) -> Result<(), EditRejected> {
        if self.scenario.is_editable() {
            Ok(())
        } else {
            Err(EditRejected::ReadOnly)
        }
    }
}
