//! Form-field state that has been typed but not yet applied to the scenario.
//!
//! Raw text is parsed the way a numeric input box would: surrounding
//! whitespace is ignored, an empty field reads as zero, and whole-valued
//! decimals such as `"5.0"` count as integers. Anything malformed or out of
//! range falls back to the field's safe default instead of failing.

use crate::coords::{LogicalCoord, GRID_MAX};
use crate::model::{Direction, RobotPose, ROBOT_MAX, ROBOT_MIN};

pub const OBSTACLE_AXIS_DEFAULT: i32 = 0;
pub const ROBOT_AXIS_DEFAULT: i32 = ROBOT_MIN;

fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64)
        .then_some(value as i64)
}

fn parse_in_range(raw: &str, min: i32, max: i32, fallback: i32) -> i32 {
    parse_integer(raw)
        .filter(|value| (min as i64..=max as i64).contains(value))
        .map_or(fallback, |value| value as i32)
}

pub fn parse_obstacle_axis(raw: &str) -> i32 {
    parse_in_range(raw, 0, GRID_MAX, OBSTACLE_AXIS_DEFAULT)
}

pub fn parse_robot_axis(raw: &str) -> i32 {
    parse_in_range(raw, ROBOT_MIN, ROBOT_MAX, ROBOT_AXIS_DEFAULT)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotDraft {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Default for RobotDraft {
    fn default() -> Self {
        Self {
            x: ROBOT_AXIS_DEFAULT,
            y: ROBOT_AXIS_DEFAULT,
            direction: Direction::North,
        }
    }
}

impl RobotDraft {
    pub fn set_x(&mut self, raw: &str) -> i32 {
        self.x = parse_robot_axis(raw);
        self.x
    }

    pub fn set_y(&mut self, raw: &str) -> i32 {
        self.y = parse_robot_axis(raw);
        self.y
    }

    /// The robot heading selector offers no `Skip` entry.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction.is_heading() {
            self.direction = direction;
        }
    }

    pub fn to_pose(self) -> RobotPose {
        RobotPose::new(self.x, self.y, self.direction)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObstacleDraft {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl ObstacleDraft {
    pub fn set_x(&mut self, raw: &str) -> i32 {
        self.x = parse_obstacle_axis(raw);
        self.x
    }

    pub fn set_y(&mut self, raw: &str) -> i32 {
        self.y = parse_obstacle_axis(raw);
        self.y
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn position(self) -> LogicalCoord {
        LogicalCoord::new(self.x, self.y)
    }
}
