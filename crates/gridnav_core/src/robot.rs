use crate::coords::LogicalCoord;
use crate::model::{Direction, RobotPose, NO_SCAN, ROBOT_MAX, ROBOT_MIN};

pub const FOOTPRINT_CELLS: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub direction: Direction,
    pub scan_id: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FootprintCell {
    pub at: LogicalCoord,
    pub marker: Option<Marker>,
}

/// The 3x3 block a pose covers, derived on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    cells: [FootprintCell; FOOTPRINT_CELLS],
}

impl Footprint {
    pub fn of(pose: &RobotPose) -> Self {
        let center = pose.position();
        let (marker_dx, marker_dy) = pose.direction.step();
        let mut cells = [FootprintCell {
            at: center,
            marker: None,
        }; FOOTPRINT_CELLS];

        let mut index = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let marker = (dx == marker_dx && dy == marker_dy).then_some(Marker {
                    direction: pose.direction,
                    scan_id: pose.scan_id,
                });
                cells[index] = FootprintCell {
                    at: center.offset(dx, dy),
                    marker,
                };
                index += 1;
            }
        }

        Self { cells }
    }

    pub fn cells(&self) -> &[FootprintCell] {
        &self.cells
    }

    pub fn contains(&self, at: LogicalCoord) -> bool {
        self.cells.iter().any(|cell| cell.at == at)
    }

    pub fn cell_at(&self, at: LogicalCoord) -> Option<&FootprintCell> {
        self.cells.iter().find(|cell| cell.at == at)
    }

    #[cfg(test)]
    fn marker_cell(&self) -> &FootprintCell {
        self.cells
            .iter()
            .find(|cell| cell.marker.is_some())
            .unwrap_or(&self.cells[FOOTPRINT_CELLS / 2])
    }
}

pub fn clamp_robot_axis(value: i32) -> i32 {
    if (ROBOT_MIN..=ROBOT_MAX).contains(&value) {
        value
    } else {
        ROBOT_MIN
    }
}

#[derive(Clone, Debug, Default)]
pub struct Robot {
    pose: RobotPose,
}

impl Robot {
    pub fn pose(&self) -> RobotPose {
        self.pose
    }

    /// Out-of-range axes fall back to 1 individually; the scan marker is cleared.
    pub fn set_pose(&mut self, x: i32, y: i32, direction: Direction) -> RobotPose {
        self.pose = RobotPose {
            x: clamp_robot_axis(x),
            y: clamp_robot_axis(y),
            direction,
            scan_id: NO_SCAN,
        };
        self.pose
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::of(&self.pose)
    }

    pub fn reset(&mut self) {
        self.pose = RobotPose::default();
    }

    /// Playback writes poses verbatim, including their scan id.
    pub(crate) fn show(&mut self, pose: RobotPose) {
        self.pose = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::{Footprint, Robot, FOOTPRINT_CELLS};
    use crate::coords::LogicalCoord;
    use crate::model::{Direction, RobotPose, NO_SCAN};

    #[test]
    fn north_footprint_has_single_marker_above_center() {
        let footprint = Footprint::of(&RobotPose::new(5, 5, Direction::North));

        assert_eq!(footprint.cells().len(), FOOTPRINT_CELLS);
        let markers: Vec<_> = footprint
            .cells()
            .iter()
            .filter(|cell| cell.marker.is_some())
            .collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].at, LogicalCoord::new(5, 6));
        assert_eq!(markers[0].marker.map(|m| m.direction), Some(Direction::North));
    }

    #[test]
    fn marker_follows_heading() {
        let cases = [
            (Direction::East, LogicalCoord::new(6, 5)),
            (Direction::South, LogicalCoord::new(5, 4)),
            (Direction::West, LogicalCoord::new(4, 5)),
        ];

        for (direction, expected) in cases {
            let footprint = Footprint::of(&RobotPose::new(5, 5, direction));
            assert_eq!(footprint.marker_cell().at, expected);
        }
    }

    #[test]
    fn marker_carries_scan_id() {
        let pose = RobotPose {
            scan_id: 3,
            ..RobotPose::new(2, 2, Direction::West)
        };
        let marker = Footprint::of(&pose).marker_cell().marker.unwrap();
        assert_eq!(marker.scan_id, 3);
    }

    #[test]
    fn footprint_covers_three_by_three_block() {
        let footprint = Footprint::of(&RobotPose::new(1, 1, Direction::North));
        for x in 0..=2 {
            for y in 0..=2 {
                assert!(footprint.contains(LogicalCoord::new(x, y)));
            }
        }
        assert!(!footprint.contains(LogicalCoord::new(3, 1)));
    }

    #[test]
    fn set_pose_clamps_each_axis_and_clears_scan() {
        let mut robot = Robot::default();
        robot.show(RobotPose {
            scan_id: 7,
            ..RobotPose::new(4, 4, Direction::East)
        });

        let pose = robot.set_pose(19, 12, Direction::South);
        assert_eq!((pose.x, pose.y), (1, 12));
        assert_eq!(pose.scan_id, NO_SCAN);

        let pose = robot.set_pose(0, -3, Direction::West);
        assert_eq!((pose.x, pose.y), (1, 1));
    }

    #[test]
    fn reset_restores_default_pose() {
        let mut robot = Robot::default();
        robot.set_pose(9, 9, Direction::West);
        robot.reset();
        assert_eq!(robot.pose(), RobotPose::new(1, 1, Direction::North));
    }
}
