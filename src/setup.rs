//! Validated construction input for maze generation.

use crate::constants::MIN_MAZE_SIZE;
use crate::grid::Cell;
use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Everything needed to generate one maze.
///
/// The first exit is the carving start and doubles as the maze entry; the
/// second is the conventional exit agents walk toward.
///
/// # Examples
///
/// ```
/// use maze_wander::grid::Cell;
/// use maze_wander::setup::MazeSetup;
///
/// let setup = MazeSetup::new(
///     Cell::new(15, 9),
///     vec![Cell::new(7, 8), Cell::new(7, 0)],
///     1,
/// ).unwrap();
/// assert_eq!(setup.entry(), Cell::new(7, 8));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MazeSetup {
    size: Cell,
    exits: Vec<Cell>,
    path_width: i32,
}

impl MazeSetup {
    /// Create a setup, rejecting malformed input up front so generation can
    /// assume it is valid.
    pub fn new(size: Cell, exits: Vec<Cell>, path_width: i32) -> Result<Self, Error> {
        if size.x < MIN_MAZE_SIZE || size.y < MIN_MAZE_SIZE {
            return Err(anyhow!("Maze size must be at least {0}x{0}", MIN_MAZE_SIZE));
        }
        if path_width < 1 {
            return Err(anyhow!("Path width must be positive"));
        }
        if exits.len() < 2 {
            return Err(anyhow!("A maze needs at least 2 exits"));
        }
        for (i, exit) in exits.iter().enumerate() {
            if exit.x < 0
                || exit.y < 0
                || exit.x + path_width > size.x
                || exit.y + path_width > size.y
            {
                return Err(anyhow!("Exit ({}, {}) does not fit the field", exit.x, exit.y));
            }
            if exits[..i].contains(exit) {
                return Err(anyhow!("Exit ({}, {}) is listed twice", exit.x, exit.y));
            }
        }
        Ok(Self {
            size,
            exits,
            path_width,
        })
    }

    /// Create a setup from a playable interior size, wrapping it in a sealed
    /// one-cell boundary ring.
    ///
    /// Exit coordinates are given in interior space, so `(0, 0)` names the
    /// interior corner just inside the ring. This is the layout to use when
    /// exits should sit at arbitrary interior positions (corners included)
    /// rather than act as doorways through the boundary.
    pub fn bordered(interior: Cell, exits: Vec<Cell>, path_width: i32) -> Result<Self, Error> {
        for exit in &exits {
            if exit.x < 0
                || exit.y < 0
                || exit.x + path_width > interior.x
                || exit.y + path_width > interior.y
            {
                return Err(anyhow!(
                    "Exit ({}, {}) is outside the interior",
                    exit.x,
                    exit.y
                ));
            }
        }
        Self::new(
            Cell::new(interior.x + 2, interior.y + 2),
            exits
                .into_iter()
                .map(|e| Cell::new(e.x + 1, e.y + 1))
                .collect(),
            path_width,
        )
    }

    /// Returns the field size.
    pub fn size(&self) -> Cell {
        self.size
    }

    /// Returns the exit list, in construction order.
    pub fn exits(&self) -> &[Cell] {
        &self.exits
    }

    /// Returns the carving path-width.
    pub fn path_width(&self) -> i32 {
        self.path_width
    }

    /// Returns the entry cell (the first exit).
    pub fn entry(&self) -> Cell {
        self.exits[0]
    }

    /// Returns the exit cell agents walk toward (the second exit).
    pub fn exit(&self) -> Cell {
        self.exits[1]
    }
}
