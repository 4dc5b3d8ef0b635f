//! The two coordinate spaces of the arena.
//!
//! Logical coordinates have their origin at the bottom-left corner with `y`
//! growing upwards. Grid indices address the rendered table: `row` counts down
//! from the top edge and `col` counts right from the left edge. The only way to
//! move between the two is [`to_grid`] and [`to_logical`].

pub const GRID_SIZE: i32 = 20;
pub const GRID_MAX: i32 = GRID_SIZE - 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LogicalCoord {
    pub x: i32,
    pub y: i32,
}

impl LogicalCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn to_grid(self) -> GridIndex {
        to_grid(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub row: i32,
    pub col: i32,
}

impl GridIndex {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.row) && (0..GRID_SIZE).contains(&self.col)
    }

    pub fn to_logical(self) -> LogicalCoord {
        to_logical(self)
    }
}

/// Logical position to the rendered cell that displays it.
pub fn to_grid(logical: LogicalCoord) -> GridIndex {
    GridIndex {
        row: GRID_MAX - logical.y,
        col: logical.x,
    }
}

/// Rendered cell back to its logical position. Inverse of [`to_grid`].
pub fn to_logical(grid: GridIndex) -> LogicalCoord {
    LogicalCoord {
        x: grid.col,
        y: GRID_MAX - grid.row,
    }
}

#[cfg(test)]
mod tests {
    use super::{to_grid, to_logical, GridIndex, LogicalCoord, GRID_SIZE};

    #[test]
    fn default_robot_cell_lands_on_row_eighteen() {
        assert_eq!(to_grid(LogicalCoord::new(1, 1)), GridIndex::new(18, 1));
    }

    #[test]
    fn corners_map_to_opposite_rows() {
        assert_eq!(to_grid(LogicalCoord::new(0, 0)), GridIndex::new(19, 0));
        assert_eq!(to_grid(LogicalCoord::new(0, 19)), GridIndex::new(0, 0));
        assert_eq!(to_grid(LogicalCoord::new(19, 0)), GridIndex::new(19, 19));
        assert_eq!(to_logical(GridIndex::new(0, 19)), LogicalCoord::new(19, 19));
    }

    #[test]
    fn every_cell_round_trips_both_ways() {
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                let logical = LogicalCoord::new(x, y);
                assert_eq!(to_logical(to_grid(logical)), logical);

                let grid = GridIndex::new(x, y);
                assert_eq!(to_grid(to_logical(grid)), grid);
            }
        }
    }

    #[test]
    fn transform_is_not_self_inverse() {
        let logical = LogicalCoord::new(3, 7);
        let grid = to_grid(logical);
        assert_eq!(grid, GridIndex::new(12, 3));

        // Feeding a grid index back through the forward transform goes astray.
        let misused = to_grid(LogicalCoord::new(grid.row, grid.col));
        assert_eq!(misused, GridIndex::new(16, 12));
        assert_ne!(to_logical(misused), logical);
    }

    #[test]
    fn bounds_checks_cover_both_spaces() {
        assert!(LogicalCoord::new(19, 0).in_bounds());
        assert!(!LogicalCoord::new(20, 0).in_bounds());
        assert!(!LogicalCoord::new(0, -1).in_bounds());
        assert!(GridIndex::new(0, 19).in_bounds());
        assert!(!GridIndex::new(-1, 3).in_bounds());
    }
}
