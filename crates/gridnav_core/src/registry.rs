use crate::coords::{GridIndex, LogicalCoord};
use crate::engine::EditRejected;
use crate::model::{Direction, Obstacle, ObstacleId};
use crate::robot::Footprint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellClick {
    Placed(Obstacle),
    Rotated(Obstacle),
}

#[derive(Clone, Debug, Default)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|obstacle| obstacle.id == id)
    }

    pub fn at(&self, at: LogicalCoord) -> Option<&Obstacle> {
        self.obstacles.iter().find(|obstacle| obstacle.position() == at)
    }

    /// Ids are never reused while a larger one is still registered.
    pub fn next_id(&self) -> ObstacleId {
        self.obstacles
            .iter()
            .map(|obstacle| obstacle.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    pub fn add(
        &mut self,
        at: LogicalCoord,
        direction: Direction,
        footprint: &Footprint,
    ) -> Result<Obstacle, EditRejected> {
        if !at.in_bounds() {
            return Err(EditRejected::OutOfBounds { x: at.x, y: at.y });
        }
        if footprint.contains(at) {
            return Err(EditRejected::RobotFootprint { x: at.x, y: at.y });
        }
        if self.at(at).is_some() {
            return Err(EditRejected::Occupied { x: at.x, y: at.y });
        }

        let obstacle = Obstacle {
            id: self.next_id(),
            x: at.x,
            y: at.y,
            direction,
        };
        self.obstacles.push(obstacle);
        Ok(obstacle)
    }

    /// Robot cells swallow the click; an existing obstacle rotates; an empty
    /// cell gets a new north-facing obstacle.
    pub fn add_at_grid_index(
        &mut self,
        grid: GridIndex,
        footprint: &Footprint,
    ) -> Result<CellClick, EditRejected> {
        let at = grid.to_logical();
        if !at.in_bounds() {
            return Err(EditRejected::OutOfBounds { x: at.x, y: at.y });
        }
        if footprint.contains(at) {
            return Err(EditRejected::RobotFootprint { x: at.x, y: at.y });
        }

        if let Some(existing) = self
            .obstacles
            .iter_mut()
            .find(|obstacle| obstacle.position() == at)
        {
            existing.direction = existing.direction.next();
            return Ok(CellClick::Rotated(*existing));
        }

        self.add(at, Direction::North, footprint)
            .map(CellClick::Placed)
    }

    pub fn remove(&mut self, at: LogicalCoord) -> Result<Obstacle, EditRejected> {
        let index = self
            .obstacles
            .iter()
            .position(|obstacle| obstacle.position() == at)
            .ok_or(EditRejected::NotFound { x: at.x, y: at.y })?;
        Ok(self.obstacles.remove(index))
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}
