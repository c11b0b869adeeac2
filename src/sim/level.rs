//! The campaign's level definitions
//!
//! Levels are static data: a start pose, a delivery target, an optional
//! parcel, and the authored walls. Level selection and validation of the
//! index happen outside the core; an unknown index is a configuration error.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Wall;
use crate::consts::{WALL_THICKNESS, WORLD_SIZE};

/// Highest authored level index (levels are 1-based)
pub const MAX_LEVEL: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The campaign table has no entry for this index
    #[error("no level {0} in the campaign")]
    UnknownLevel(usize),
}

/// A static level description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Drone start position
    pub start: Vec2,
    /// Drone start heading in degrees (0 = east, 90 = north)
    pub start_heading: f32,
    /// Parcel position; `None` means the drone starts already carrying
    pub parcel: Option<Vec2>,
    /// Delivery target position
    pub target: Vec2,
    /// Authored walls, followed by the four boundary walls once
    /// [`Level::add_boundary_walls`] has run
    pub walls: Vec<Wall>,
    bounded: bool,
}

impl Level {
    fn new(
        start: (f32, f32),
        start_heading: f32,
        parcel: Option<(f32, f32)>,
        target: (f32, f32),
        walls: Vec<Wall>,
    ) -> Self {
        Self {
            start: Vec2::new(start.0, start.1),
            start_heading,
            parcel: parcel.map(|(x, y)| Vec2::new(x, y)),
            target: Vec2::new(target.0, target.1),
            walls,
            bounded: false,
        }
    }

    /// Append the four boundary walls enclosing the play area.
    ///
    /// The boundary square sits half a wall thickness outside the 0..100
    /// play area. Idempotent: calling it again is a no-op, so `walls` always
    /// ends with exactly four boundary segments.
    pub fn add_boundary_walls(&mut self) {
        if self.bounded {
            return;
        }
        self.bounded = true;

        let lo = -WALL_THICKNESS / 2.0;
        let hi = WORLD_SIZE + WALL_THICKNESS / 2.0;
        self.walls.extend([
            Wall::new(lo, lo, lo, hi),
            Wall::new(lo, hi, hi, hi),
            Wall::new(hi, hi, hi, lo),
            Wall::new(hi, lo, lo, lo),
        ]);
    }
}

/// Look up a level in the fixed campaign table.
pub fn load_level(index: usize) -> Result<Level, LevelError> {
    let level = match index {
        1 => Level::new((20.0, 20.0), 90.0, Some((50.0, 50.0)), (80.0, 80.0), vec![]),
        2 => Level::new(
            (20.0, 20.0),
            0.0,
            Some((80.0, 20.0)),
            (80.0, 80.0),
            vec![Wall::new(0.0, 50.0, 60.0, 50.0)],
        ),
        3 => Level::new(
            (20.0, 70.0),
            270.0,
            Some((50.0, 20.0)),
            (80.0, 70.0),
            vec![Wall::new(50.0, 50.0, 50.0, 100.0)],
        ),
        4 => Level::new(
            (20.0, 80.0),
            0.0,
            None,
            (80.0, 20.0),
            vec![Wall::new(0.0, 0.0, 65.0, 65.0)],
        ),
        5 => Level::new(
            (80.0, 80.0),
            270.0,
            None,
            (20.0, 20.0),
            vec![Wall::new(0.0, 100.0, 65.0, 35.0)],
        ),
        6 => Level::new(
            (20.0, 40.0),
            0.0,
            Some((80.0, 20.0)),
            (20.0, 80.0),
            vec![Wall::new(0.0, 59.0, 50.0, 59.0)],
        ),
        7 => Level::new(
            (80.0, 80.0),
            180.0,
            Some((80.0, 20.0)),
            (20.0, 20.0),
            vec![
                Wall::new(0.0, 70.0, 40.0, 70.0),
                Wall::new(70.0, 50.0, 100.0, 50.0),
            ],
        ),
        8 => Level::new(
            (20.0, 25.0),
            90.0,
            Some((80.0, 25.0)),
            (80.0, 75.0),
            vec![
                Wall::new(50.0, 0.0, 50.0, 25.0),
                Wall::new(75.0, 50.0, 100.0, 50.0),
                Wall::new(50.0, 100.0, 50.0, 75.0),
                Wall::new(0.0, 50.0, 25.0, 50.0),
            ],
        ),
        9 => Level::new(
            (80.0, 70.0),
            180.0,
            Some((20.0, 20.0)),
            (80.0, 20.0),
            vec![
                Wall::new(0.0, 69.0, 31.0, 100.0),
                Wall::new(40.0, 50.0, 71.0, 0.0),
                Wall::new(80.0, 50.0, 100.0, 50.0),
            ],
        ),
        10 => Level::new(
            (20.0, 20.0),
            90.0,
            Some((80.0, 50.0)),
            (20.0, 20.0),
            vec![
                Wall::new(40.0, 60.0, 60.0, 60.0),
                Wall::new(40.0, 60.0, 60.0, 30.0),
                Wall::new(60.0, 30.0, 100.0, 30.0),
            ],
        ),
        _ => return Err(LevelError::UnknownLevel(index)),
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_every_authored_level() {
        for index in 1..=MAX_LEVEL {
            assert!(load_level(index).is_ok(), "level {index} missing");
        }
    }

    #[test]
    fn rejects_unknown_indices() {
        assert_eq!(load_level(0).unwrap_err(), LevelError::UnknownLevel(0));
        assert_eq!(
            load_level(MAX_LEVEL + 1).unwrap_err(),
            LevelError::UnknownLevel(MAX_LEVEL + 1)
        );
    }

    #[test]
    fn boundary_walls_appended_once() {
        let mut level = load_level(7).unwrap();
        let authored = level.walls.len();

        level.add_boundary_walls();
        assert_eq!(level.walls.len(), authored + 4);
        let after_first: Vec<_> = level.walls.clone();

        level.add_boundary_walls();
        assert_eq!(level.walls, after_first);
    }

    #[test]
    fn boundary_walls_enclose_the_play_area() {
        let mut level = load_level(1).unwrap();
        level.add_boundary_walls();

        // Level 1 has no authored walls, so all four are boundary
        assert_eq!(level.walls.len(), 4);
        for wall in &level.walls {
            for p in [wall.a, wall.b] {
                assert!(p.x == -5.0 || p.x == 105.0 || p.y == -5.0 || p.y == 105.0);
            }
        }
    }

    #[test]
    fn carrying_levels_have_no_parcel() {
        assert!(load_level(4).unwrap().parcel.is_none());
        assert!(load_level(5).unwrap().parcel.is_none());
        assert!(load_level(1).unwrap().parcel.is_some());
    }
}
