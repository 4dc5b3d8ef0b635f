use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::coords::LogicalCoord;

pub const ROBOT_MIN: i32 = 1;
pub const ROBOT_MAX: i32 = 18;
pub const NO_SCAN: i32 = -1;
pub const SNAPSHOT_PREFIX: &str = "SNAP";

pub type ObstacleId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
    Skip,
}

impl Direction {
    /// Order in which a clicked obstacle rotates through its facings.
    pub const CYCLE: [Direction; 5] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Skip,
    ];

    pub fn next(self) -> Self {
        let index = Self::CYCLE
            .iter()
            .position(|direction| *direction == self)
            .unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    /// Numeric code used by the planning service.
    pub fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 6,
            Direction::Skip => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Direction::North),
            2 => Some(Direction::East),
            4 => Some(Direction::South),
            6 => Some(Direction::West),
            8 => Some(Direction::Skip),
            _ => None,
        }
    }

    /// Unit step in logical space; `Skip` has none.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::Skip => (0, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "Up",
            Direction::East => "Right",
            Direction::South => "Down",
            Direction::West => "Left",
            Direction::Skip => "None",
        }
    }

    pub fn is_heading(self) -> bool {
        self != Direction::Skip
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "n" | "north" | "up" | "0" => Ok(Direction::North),
            "e" | "east" | "right" | "2" => Ok(Direction::East),
            "s" | "south" | "down" | "4" => Ok(Direction::South),
            "w" | "west" | "left" | "6" => Ok(Direction::West),
            "x" | "skip" | "none" | "8" => Ok(Direction::Skip),
            _ => Err(ParseDirectionError(raw.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Obstacle {
    pub fn position(&self) -> LogicalCoord {
        LogicalCoord::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotPose {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub scan_id: i32,
}

impl RobotPose {
    pub const fn new(x: i32, y: i32, direction: Direction) -> Self {
        Self {
            x,
            y,
            direction,
            scan_id: NO_SCAN,
        }
    }

    pub fn position(&self) -> LogicalCoord {
        LogicalCoord::new(self.x, self.y)
    }

    pub fn has_scan(&self) -> bool {
        self.scan_id != NO_SCAN
    }
}

impl Default for RobotPose {
    fn default() -> Self {
        Self::new(ROBOT_MIN, ROBOT_MIN, Direction::North)
    }
}

/// Scenario frozen at the moment a compute starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    pub obstacles: Vec<Obstacle>,
    pub robot: RobotPose,
}

/// Successful planner answer, ready for playback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub path: Vec<RobotPose>,
    pub commands: Vec<String>,
    pub distance: Option<f64>,
}

impl Plan {
    /// Keeps the path verbatim and drops snapshot pseudo-commands.
    pub fn from_solver<I>(path: Vec<RobotPose>, commands: I, distance: Option<f64>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            path,
            commands: commands
                .into_iter()
                .filter(|command| !command.starts_with(SNAPSHOT_PREFIX))
                .collect(),
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Plan, RobotPose};

    #[test]
    fn direction_cycle_wraps_after_skip() {
        let mut direction = Direction::North;
        let mut seen = Vec::new();
        for _ in 0..5 {
            direction = direction.next();
            seen.push(direction);
        }

        assert_eq!(
            seen,
            vec![
                Direction::East,
                Direction::South,
                Direction::West,
                Direction::Skip,
                Direction::North,
            ]
        );
    }

    #[test]
    fn wire_codes_are_even_steps() {
        for direction in Direction::CYCLE {
            assert_eq!(Direction::from_code(direction.code() as i64), Some(direction));
        }
        assert_eq!(Direction::from_code(1), None);
        assert_eq!(Direction::from_code(-2), None);
    }

    #[test]
    fn direction_parses_names_labels_and_codes() {
        assert_eq!("north".parse::<Direction>(), Ok(Direction::North));
        assert_eq!(" Left ".parse::<Direction>(), Ok(Direction::West));
        assert_eq!("4".parse::<Direction>(), Ok(Direction::South));
        assert_eq!("none".parse::<Direction>(), Ok(Direction::Skip));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn plan_filters_snapshot_markers_only() {
        let plan = Plan::from_solver(
            vec![RobotPose::default()],
            ["SNAP0", "FW10", "SNAP1", "TR90"].map(String::from),
            Some(12.5),
        );

        assert_eq!(plan.commands, vec!["FW10".to_string(), "TR90".to_string()]);
        assert_eq!(plan.path.len(), 1);
    }

    #[test]
    fn plan_keeps_commands_that_merely_contain_snap() {
        let plan = Plan::from_solver(Vec::new(), ["FIN", "XSNAP"].map(String::from), None);
        assert_eq!(plan.commands.len(), 2);
    }

    #[test]
    fn default_pose_has_no_scan() {
        let pose = RobotPose::default();
        assert_eq!((pose.x, pose.y, pose.direction), (1, 1, Direction::North));
        assert!(!pose.has_scan());
    }
}
