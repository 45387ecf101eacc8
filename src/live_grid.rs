//! The runtime maze: a sparse wall map with connectivity-preserving edits.

use crate::constants::EXIT_OVERSHOOT;
use crate::grid::{neighbors, Cell, WallField};
use rapier2d::na::Vector2;
use std::collections::{HashMap, HashSet};

/// Opaque handle pairing a wall with whatever obstacle the presentation
/// layer stood up for it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WallId(u64);

/// Identifier for an agent occupying maze cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

/// A wall change the obstacle layer still has to apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WallEvent {
    /// A wall was committed at `cell`.
    Added {
        /// Handle of the new wall.
        id: WallId,
        /// Cell the wall occupies.
        cell: Cell,
    },
    /// The wall at `cell` was torn down.
    Removed {
        /// Handle of the removed wall.
        id: WallId,
        /// Cell the wall occupied.
        cell: Cell,
    },
}

/// The interactive maze a play session runs on.
///
/// Built once from a generated [`WallField`] and then mutated in place.
/// Every wall insertion is validated by flood fill so the maze never becomes
/// unsolvable and never seals an occupant away from both endpoints; wall
/// removal is unconditional since it can only increase connectivity. The
/// boundary ring can never be toggled.
///
/// # Examples
///
/// ```
/// use maze_wander::generator::generate;
/// use maze_wander::live_grid::LiveMazeGrid;
/// use maze_wander::standard_setups::setup_doorway;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let field = generate(&setup_doorway(), &mut StdRng::seed_from_u64(2));
/// let grid = LiveMazeGrid::from_field(&field);
/// assert!(grid.is_open(grid.entry_point()));
/// assert!(grid.is_open(grid.exit_point()));
/// ```
#[derive(Clone, Debug)]
pub struct LiveMazeGrid {
    size: Cell,
    entry: Cell,
    exit: Cell,
    walls: HashMap<Cell, WallId>,
    occupancy: HashMap<Cell, HashSet<AgentId>>,
    events: Vec<WallEvent>,
    next_wall_id: u64,
}

impl LiveMazeGrid {
    /// Ingest a generated field. The field's first exit becomes the entry,
    /// its second the exit.
    pub fn from_field(field: &WallField) -> Self {
        let mut grid = Self {
            size: field.size(),
            entry: field.exits()[0],
            exit: field.exits()[1],
            walls: HashMap::new(),
            occupancy: HashMap::new(),
            events: Vec::new(),
            next_wall_id: 0,
        };
        for (cell, wall) in field.iter_cells() {
            if wall {
                let id = grid.alloc_wall_id();
                grid.walls.insert(cell, id);
            }
        }
        grid
    }

    fn alloc_wall_id(&mut self) -> WallId {
        let id = WallId(self.next_wall_id);
        self.next_wall_id += 1;
        id
    }

    /// Returns the maze size.
    pub fn size(&self) -> Cell {
        self.size
    }

    /// Returns the cell agents enter at.
    pub fn entry_point(&self) -> Cell {
        self.entry
    }

    /// Returns the cell agents try to reach.
    pub fn exit_point(&self) -> Cell {
        self.exit
    }

    /// Returns the fixed point past the exit an agent walks to before it is
    /// retired.
    pub fn finish_point(&self) -> Cell {
        let exit = self.exit;
        let outward = if exit.y == 0 {
            Vector2::new(0, -1)
        } else if exit.y == self.size.y - 1 {
            Vector2::new(0, 1)
        } else if exit.x == 0 {
            Vector2::new(-1, 0)
        } else if exit.x == self.size.x - 1 {
            Vector2::new(1, 0)
        } else {
            // interior exit (bordered layouts): head for the nearest edge
            let dx = exit.x - self.size.x / 2;
            let dy = exit.y - self.size.y / 2;
            if dx.abs() >= dy.abs() && dx != 0 {
                Vector2::new(dx.signum(), 0)
            } else if dy != 0 {
                Vector2::new(0, dy.signum())
            } else {
                Vector2::new(0, -1)
            }
        };
        exit + outward * EXIT_OVERSHOOT
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.size.x && cell.y >= 0 && cell.y < self.size.y
    }

    /// Returns whether `cell` sits on the outer boundary ring.
    pub fn is_boundary(&self, cell: Cell) -> bool {
        cell.x == 0 || cell.y == 0 || cell.x == self.size.x - 1 || cell.y == self.size.y - 1
    }

    /// Returns whether `cell` is inside the maze and walkable.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls.contains_key(&cell)
    }

    /// Returns the handle of the wall at `cell`, if any.
    pub fn wall_id(&self, cell: Cell) -> Option<WallId> {
        self.walls.get(&cell).copied()
    }

    /// Iterates every wall with its handle.
    pub fn walls(&self) -> impl Iterator<Item = (Cell, WallId)> + '_ {
        self.walls.iter().map(|(&cell, &id)| (cell, id))
    }

    /// Returns the walkable orthogonal neighbors of `cell`.
    pub fn open_neighbors(&self, cell: Cell) -> Vec<Cell> {
        neighbors(cell, 1)
            .into_iter()
            .filter(|&n| self.is_open(n))
            .collect()
    }

    /// Returns how many cells are currently open.
    pub fn open_cell_count(&self) -> usize {
        (self.size.x * self.size.y) as usize - self.walls.len()
    }

    /// All open cells reachable from `seed` without stepping on `excluded`.
    fn flood_region(&self, seed: Cell, excluded: Cell) -> HashSet<Cell> {
        let mut region = HashSet::new();
        let mut queue = vec![seed];
        while let Some(cell) = queue.pop() {
            if !region.insert(cell) {
                continue;
            }
            for n in neighbors(cell, 1) {
                if n != excluded && self.is_open(n) {
                    queue.push(n);
                }
            }
        }
        region
    }

    /// Try to place a wall at `cell`.
    ///
    /// Refused (returning `None`, with the wall map untouched) when the cell
    /// is out of bounds, on the boundary ring, already a wall, or occupied,
    /// and when committing the wall would disconnect the entry from the exit
    /// or seal an occupant into a region that can reach neither. On success
    /// the new wall's handle is returned and an [`WallEvent::Added`] is
    /// queued for the obstacle layer.
    pub fn try_add_wall(&mut self, cell: Cell) -> Option<WallId> {
        if !self.in_bounds(cell)
            || self.is_boundary(cell)
            || self.walls.contains_key(&cell)
            || self.is_occupied(cell)
        {
            return None;
        }

        for seed in neighbors(cell, 1) {
            if !self.is_open(seed) {
                continue;
            }
            let region = self.flood_region(seed, cell);
            let has_entry = region.contains(&self.entry);
            let has_exit = region.contains(&self.exit);
            if has_entry != has_exit {
                return None;
            }
            if !has_entry && region.iter().any(|&c| self.is_occupied(c)) {
                return None;
            }
        }

        let id = self.alloc_wall_id();
        self.walls.insert(cell, id);
        self.events.push(WallEvent::Added { id, cell });
        Some(id)
    }

    /// Remove the wall at `cell`. Boundary cells can never be toggled;
    /// otherwise removal always succeeds and queues a
    /// [`WallEvent::Removed`].
    pub fn remove_wall(&mut self, cell: Cell) -> Option<WallId> {
        if !self.in_bounds(cell) || self.is_boundary(cell) {
            return None;
        }
        let id = self.walls.remove(&cell)?;
        self.events.push(WallEvent::Removed { id, cell });
        Some(id)
    }

    /// Drain the wall changes committed since the last call.
    pub fn take_events(&mut self) -> Vec<WallEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record `agent` as standing at `cell`.
    pub fn add_occupant(&mut self, agent: AgentId, cell: Cell) {
        self.occupancy.entry(cell).or_default().insert(agent);
    }

    /// Remove `agent` from `cell`. No-op if it was not recorded there.
    pub fn remove_occupant(&mut self, agent: AgentId, cell: Cell) {
        if let Some(agents) = self.occupancy.get_mut(&cell) {
            agents.remove(&agent);
            if agents.is_empty() {
                self.occupancy.remove(&cell);
            }
        }
    }

    /// Returns whether any agent is recorded at `cell`.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupancy.get(&cell).is_some_and(|a| !a.is_empty())
    }

    /// Returns whether `agent` is recorded at `cell`.
    pub fn has_occupant(&self, agent: AgentId, cell: Cell) -> bool {
        self.occupancy
            .get(&cell)
            .is_some_and(|a| a.contains(&agent))
    }
}
