//! Logical maze field structs and utilities.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;
use rapier2d::na::{Point2, Vector2};

/// A single addressable maze cell.
///
/// When the path-width is greater than 1, a cell named by the carving layer
/// stands for the `w×w` block anchored at it.
pub type Cell = Point2<i32>;

/// Enum for direction values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// Every direction, in the fixed scan order used by all neighbor queries.
    ///
    /// First-match scans and candidate lists must use this order so that runs
    /// with a seeded RNG are reproducible.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the unit offset for this direction.
    pub fn offset(self) -> Vector2<i32> {
        match self {
            Direction::Up => Vector2::new(0, 1),
            Direction::Down => Vector2::new(0, -1),
            Direction::Left => Vector2::new(-1, 0),
            Direction::Right => Vector2::new(1, 0),
        }
    }
}

/// Returns the four orthogonal neighbors of `cell` at the given stride, in
/// [`Direction::CARDINALS`] order.
pub fn neighbors(cell: Cell, stride: i32) -> [Cell; 4] {
    Direction::CARDINALS.map(|d| cell + d.offset() * stride)
}

/// Returns whether two cells are orthogonally adjacent.
pub fn is_adjacent(a: Cell, b: Cell) -> bool {
    (a.x - b.x).abs() + (a.y - b.y).abs() == 1
}

/// A fixed-size boolean wall grid consumed by the maze generator.
///
/// Cells are carved and queried in `path_width × path_width` blocks. Queries
/// outside the field always answer "wall" so neighbor arithmetic never needs
/// bounds guards at the call site.
///
/// # Examples
///
/// ```
/// use maze_wander::grid::{Cell, WallField};
///
/// let field = WallField::new(Cell::new(7, 7), vec![Cell::new(3, 6), Cell::new(3, 0)], 1);
/// assert!(field.is_wall(Cell::new(1, 1)));
/// assert!(!field.is_wall(Cell::new(3, 6)) || field.is_unvisited_exit(Cell::new(3, 6)));
/// ```
#[derive(Clone, Debug)]
pub struct WallField {
    walls: Vec<bool>,
    size: Cell,
    exits: Vec<Cell>,
    path_width: i32,
    visited_exits: Vec<Cell>,
    longest_path: Vec<Cell>,
}

impl WallField {
    /// Create a field that is all walls except the exit blocks.
    pub fn new(size: Cell, exits: Vec<Cell>, path_width: i32) -> Self {
        let mut field = Self {
            walls: vec![true; (size.x * size.y) as usize],
            size,
            exits,
            path_width,
            visited_exits: Vec::new(),
            longest_path: Vec::new(),
        };
        for exit in field.exits.clone() {
            field.set(exit, false);
        }
        field
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.size.x && y >= 0 && y < self.size.y
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.size.x + x) as usize
    }

    /// Returns whether the block anchored at `pos` reads as a wall.
    ///
    /// Out-of-bounds cells and exits that have not been visited by the carver
    /// both count as walls.
    pub fn is_wall(&self, pos: Cell) -> bool {
        for i in 0..self.path_width {
            for j in 0..self.path_width {
                let (x, y) = (pos.x + i, pos.y + j);
                if !self.in_bounds(x, y)
                    || self.walls[self.index(x, y)]
                    || self.is_unvisited_exit(Cell::new(x, y))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Returns whether the block anchored at `pos` touches the field boundary.
    pub fn is_outer_wall(&self, pos: Cell) -> bool {
        for i in 0..self.path_width {
            for j in 0..self.path_width {
                let (x, y) = (pos.x + i, pos.y + j);
                if x <= 0 || y <= 0 || x >= self.size.x - 1 || y >= self.size.y - 1 {
                    return true;
                }
            }
        }
        false
    }

    fn block_contains(&self, anchor: Cell, cell: Cell) -> bool {
        cell.x >= anchor.x
            && cell.x < anchor.x + self.path_width
            && cell.y >= anchor.y
            && cell.y < anchor.y + self.path_width
    }

    /// Returns whether the block anchored at `pos` holds an exit.
    pub fn is_exit(&self, pos: Cell) -> bool {
        self.exits.iter().any(|&e| self.block_contains(pos, e))
    }

    /// Returns whether the block anchored at `pos` holds an exit the carver
    /// has not reached yet.
    pub fn is_unvisited_exit(&self, pos: Cell) -> bool {
        self.is_exit(pos) && !self.visited_exits.iter().any(|&v| self.block_contains(pos, v))
    }

    /// Count of the four orthogonal neighbor blocks that are walls.
    pub fn surrounding_wall_count(&self, pos: Cell) -> usize {
        neighbors(pos, self.path_width)
            .into_iter()
            .filter(|&n| self.is_wall(n))
            .count()
    }

    /// Count of the four diagonal neighbor blocks that are walls.
    pub fn surrounding_diagonal_wall_count(&self, pos: Cell) -> usize {
        let w = self.path_width;
        [(w, w), (w, -w), (-w, -w), (-w, w)]
            .into_iter()
            .filter(|&(dx, dy)| self.is_wall(Cell::new(pos.x + dx, pos.y + dy)))
            .count()
    }

    /// Count of all eight neighbor blocks that are walls.
    pub fn surrounding_eight_wall_count(&self, pos: Cell) -> usize {
        self.surrounding_wall_count(pos) + self.surrounding_diagonal_wall_count(pos)
    }

    /// Returns whether `pos` is a wall the carver must never remove.
    ///
    /// A wall is hard when it sits on the boundary, when it is structurally
    /// load-bearing (fewer than 6 of 8 or fewer than 3 of 4 orthogonal
    /// neighbors are walls), or when removing it would let two corridors
    /// touch diagonally: an open diagonal neighbor whose two shared
    /// orthogonal neighbors are both walls forces the cell hard.
    pub fn is_hard_wall(&self, pos: Cell) -> bool {
        if self.is_outer_wall(pos) {
            return true;
        }
        if !self.is_wall(pos) {
            return false;
        }
        if self.surrounding_eight_wall_count(pos) < 6 || self.surrounding_wall_count(pos) < 3 {
            return true;
        }

        let w = self.path_width;
        for (dx, dy) in [(w, w), (w, -w), (-w, -w), (-w, w)] {
            if !self.is_wall(Cell::new(pos.x + dx, pos.y + dy))
                && self.is_wall(Cell::new(pos.x + dx, pos.y))
                && self.is_wall(Cell::new(pos.x, pos.y + dy))
            {
                return true;
            }
        }
        false
    }

    /// Returns whether `pos` is a wall that is eligible for carving.
    pub fn is_soft_wall(&self, pos: Cell) -> bool {
        !self.is_hard_wall(pos) && self.is_wall(pos)
    }

    /// Picks uniformly among the orthogonal neighbor blocks that are soft
    /// walls, or `None` if there is no candidate.
    pub fn random_soft_wall_neighbor(&self, pos: Cell, rng: &mut impl Rng) -> Option<Cell> {
        let candidates: Vec<Cell> = neighbors(pos, self.path_width)
            .into_iter()
            .filter(|&n| self.is_soft_wall(n))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    /// Returns the first orthogonal neighbor block that is an unvisited exit.
    pub fn nearby_unvisited_exit(&self, pos: Cell) -> Option<Cell> {
        neighbors(pos, self.path_width)
            .into_iter()
            .find(|&n| self.is_unvisited_exit(n))
    }

    /// Returns the first orthogonal neighbor block that is itself adjacent to
    /// an unvisited exit, so the carver can step toward it and stitch the
    /// exit into the maze.
    pub fn step_toward_unvisited_exit(&self, pos: Cell) -> Option<Cell> {
        neighbors(pos, self.path_width)
            .into_iter()
            .find(|&n| self.nearby_unvisited_exit(n).is_some())
    }

    /// Marks the exit at `pos` as visited. No-op unless `pos` is an exit that
    /// is still unvisited.
    pub fn visit_exit(&mut self, pos: Cell) {
        if !self.is_exit(pos) || !self.is_unvisited_exit(pos) {
            return;
        }
        self.visited_exits.push(pos);
    }

    /// Writes the block anchored at `pos`. Out-of-bounds cells are skipped.
    pub fn set(&mut self, pos: Cell, wall: bool) {
        for i in 0..self.path_width {
            for j in 0..self.path_width {
                let (x, y) = (pos.x + i, pos.y + j);
                if self.in_bounds(x, y) {
                    let index = self.index(x, y);
                    self.walls[index] = wall;
                }
            }
        }
    }

    /// Iterates every cell with its raw wall value.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, bool)> + '_ {
        let width = self.size.x;
        self.walls
            .iter()
            .enumerate()
            .map(move |(i, &wall)| (Cell::new(i as i32 % width, i as i32 / width), wall))
    }

    /// Returns the field size.
    pub fn size(&self) -> Cell {
        self.size
    }

    /// Returns the exit list, in construction order.
    pub fn exits(&self) -> &[Cell] {
        &self.exits
    }

    /// Returns the path-width the field was built with.
    pub fn path_width(&self) -> i32 {
        self.path_width
    }

    /// Returns the longest carve path the generator recorded.
    pub fn longest_path(&self) -> &[Cell] {
        &self.longest_path
    }

    /// Records the longest carve path.
    pub fn set_longest_path(&mut self, path: Vec<Cell>) {
        self.longest_path = path;
    }
}
