//! JSON shapes exchanged with the planning service.
//!
//! Directions travel as their numeric codes (`0, 2, 4, 6, 8`) and positions
//! are always in logical space. A pose's `s` field is the scan id, `-1` when
//! the pose has no scan attached.

use gridnav_core::model::{Direction, Obstacle, Plan, PlanRequest, RobotPose, NO_SCAN};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RtError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireObstacle {
    pub x: i32,
    pub y: i32,
    pub d: u8,
    pub id: u32,
}

impl From<&Obstacle> for WireObstacle {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            x: obstacle.x,
            y: obstacle.y,
            d: obstacle.direction.code(),
            id: obstacle.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathRequest {
    pub obstacles: Vec<WireObstacle>,
    pub retrying: bool,
    pub robot_x: i32,
    pub robot_y: i32,
    pub robot_dir: u8,
}

impl PathRequest {
    pub fn new(request: &PlanRequest, retrying: bool) -> Self {
        Self {
            obstacles: request.obstacles.iter().map(WireObstacle::from).collect(),
            retrying,
            robot_x: request.robot.x,
            robot_y: request.robot.y,
            robot_dir: request.robot.direction.code(),
        }
    }
}

fn no_scan() -> i32 {
    NO_SCAN
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WirePose {
    pub x: i32,
    pub y: i32,
    pub d: i64,
    #[serde(default = "no_scan")]
    pub s: i32,
}

impl WirePose {
    pub fn to_pose(&self) -> Result<RobotPose> {
        let direction = Direction::from_code(self.d).ok_or(RtError::UnknownDirection(self.d))?;
        Ok(RobotPose {
            x: self.x,
            y: self.y,
            direction,
            scan_id: self.s,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PathData {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub path: Vec<WirePose>,
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PathResponse {
    #[serde(default)]
    pub data: Option<PathData>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl PathResponse {
    /// A present `data` block wins even when `error` is also set.
    pub fn into_plan(self) -> Result<Plan> {
        let Some(data) = self.data else {
            return Err(match self.error {
                Some(Value::String(message)) => RtError::Service(message),
                Some(Value::Null) | None => RtError::MissingData,
                Some(other) => RtError::Service(other.to_string()),
            });
        };

        let path = data
            .path
            .iter()
            .map(WirePose::to_pose)
            .collect::<Result<Vec<_>>>()?;
        Ok(Plan::from_solver(path, data.commands, data.distance))
    }
}
