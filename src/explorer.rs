//! Agent exploration behavior.
//!
//! An [`Explorer`] walks the maze one target cell at a time using only what
//! it can see from its current cell: no global pathfinding, just randomized
//! depth-first wandering with a trail, dead-end retracing, and recovery paths
//! for walls that appear mid-flight. Continuous movement toward the chosen
//! target is somebody else's job (see [`crate::simulation`]); `step` only
//! ever decides where to head next.

use crate::grid::{is_adjacent, neighbors, Cell};
use crate::live_grid::{AgentId, LiveMazeGrid};
use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;
use rapier2d::na::Point2;
use serde::{Deserialize, Serialize};

/// Where an agent is in its trip through the maze.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ExplorerState {
    /// Spawned, waiting to be pointed at a maze.
    WaitingForSpawn = 0,
    /// Heading to the entry cell.
    MovingToEntry = 1,
    /// Wandering toward the exit.
    Exploring = 2,
    /// Walking back along the trail after a dead end.
    Retracing = 3,
    /// Reached the exit; walking out past it.
    ExitingMaze = 4,
}

/// What to do with the primary trail when an old intersection is re-crossed
/// and the freshly chosen cell is not on it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RecrossPolicy {
    /// Truncate the trail back to the chosen cell only when the trail
    /// already contains it; otherwise leave the trail alone.
    #[default]
    TruncateWhenKnown,
    /// Additionally restart the trail at the current cell when the chosen
    /// cell is unknown, so the trail never describes a path the agent has
    /// abandoned.
    Reanchor,
}

/// One tick's decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// Keep moving toward this cell.
    Seek(Cell),
    /// The agent walked out past the exit and should be despawned.
    Finished,
}

/// A single wandering agent.
pub struct Explorer {
    id: AgentId,
    state: ExplorerState,
    recross_policy: RecrossPolicy,
    target: Cell,
    previous_target: Cell,
    last_cell: Option<Cell>,
    trail: Vec<Cell>,
    secondary_trail: Vec<Cell>,
}

impl Explorer {
    /// Create an explorer with the default [`RecrossPolicy`].
    pub fn new(id: AgentId) -> Self {
        Self::with_policy(id, RecrossPolicy::default())
    }

    /// Create an explorer with an explicit [`RecrossPolicy`].
    pub fn with_policy(id: AgentId, recross_policy: RecrossPolicy) -> Self {
        Self {
            id,
            state: ExplorerState::WaitingForSpawn,
            recross_policy,
            target: Point2::origin(),
            previous_target: Point2::origin(),
            last_cell: None,
            trail: Vec::new(),
            secondary_trail: Vec::new(),
        }
    }

    /// This agent's identifier.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Current state tag.
    pub fn state(&self) -> ExplorerState {
        self.state
    }

    /// The cell the agent is currently heading toward.
    pub fn target(&self) -> Cell {
        self.target
    }

    fn set_target(&mut self, target: Cell) {
        self.previous_target = self.target;
        self.target = target;
    }

    /// Advance the agent one tick from `current`, its cell as reported by
    /// the movement layer.
    ///
    /// Re-registers the agent's occupancy (leave the previous cell, claim
    /// the current one) before anything else, so wall validation later in
    /// the same tick sees an up-to-date index. Standing on the exit cell
    /// forces [`ExplorerState::ExitingMaze`] no matter what else is going
    /// on.
    pub fn step(
        &mut self,
        grid: &mut LiveMazeGrid,
        current: Cell,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if !grid.has_occupant(self.id, current) {
            if let Some(previous) = self.last_cell {
                grid.remove_occupant(self.id, previous);
            }
            grid.add_occupant(self.id, current);
        }
        self.last_cell = Some(current);

        if current == grid.exit_point() {
            self.state = ExplorerState::ExitingMaze;
        }

        match self.state {
            ExplorerState::WaitingForSpawn => {
                self.set_target(grid.entry_point());
                self.state = ExplorerState::MovingToEntry;
                StepOutcome::Seek(self.target)
            }
            ExplorerState::MovingToEntry => self.step_entry(grid, current, rng),
            ExplorerState::Exploring => self.step_explore(grid, current, rng),
            ExplorerState::Retracing => self.step_retrace(grid, current, rng),
            ExplorerState::ExitingMaze => self.step_exit(grid, current),
        }
    }

    fn step_entry(
        &mut self,
        grid: &LiveMazeGrid,
        current: Cell,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if current != grid.entry_point() {
            return StepOutcome::Seek(grid.entry_point());
        }
        if let Some(next) = self.choose_next(grid, current, false, rng) {
            self.trail.push(current);
            self.set_target(next);
            self.state = ExplorerState::Exploring;
        }
        StepOutcome::Seek(self.target)
    }

    fn step_explore(
        &mut self,
        grid: &LiveMazeGrid,
        current: Cell,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        let reached = current == self.target;
        let target_valid = self.is_new_and_valid(grid, self.target);

        if reached {
            self.trail.push(current);
        }

        if reached || !target_valid {
            if self.has_new_valid_neighbor(grid, current) {
                if let Some(next) = self.choose_next(grid, current, true, rng) {
                    self.set_target(next);
                }
            } else if self.is_dead_end(grid, current) {
                self.secondary_trail.clear();
                self.secondary_trail.push(self.target);
                // the trail holds at least the entry plus the cell reached
                // just now; anything shorter means connectivity was lost
                let back = self.trail[self.trail.len() - 2];
                self.set_target(back);
                self.state = ExplorerState::Retracing;
            } else {
                debug!("agent {:?} re-crossed an old intersection, trying a new path", self.id);
                if let Some(next) = self.choose_next(grid, current, false, rng) {
                    self.set_target(next);
                    let truncated = self.pop_trail_until(next);
                    if !truncated && self.recross_policy == RecrossPolicy::Reanchor {
                        self.trail.clear();
                        self.trail.push(current);
                    }
                }
            }
        }

        StepOutcome::Seek(self.target)
    }

    fn step_retrace(
        &mut self,
        grid: &LiveMazeGrid,
        current: Cell,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if current == self.target {
            self.secondary_trail.push(current);

            if self.has_new_valid_neighbor(grid, current) {
                // a mutation opened something since we came through here
                if let Some(next) = self.choose_next(grid, current, true, rng) {
                    self.set_target(next);
                }
                self.secondary_trail.clear();
                self.state = ExplorerState::Exploring;
            } else {
                self.trail.push(current);
                let next = self.trail_cell_before(current);
                if next == self.target || self.target == self.trail[0] {
                    // back at the branch point: the walk back becomes the
                    // new forward trail
                    self.trail = std::mem::take(&mut self.secondary_trail);
                    self.set_target(self.trail[self.trail.len() - 1]);
                    self.state = ExplorerState::Exploring;
                } else {
                    self.set_target(next);
                }
            }
        } else if !grid.is_open(self.target) {
            // the cell we were retracing to was walled off mid-flight;
            // start exploring afresh from wherever we are
            let fallback = if self.secondary_trail.len() > 1 {
                self.secondary_trail[self.secondary_trail.len() - 2]
            } else {
                self.secondary_trail[self.secondary_trail.len() - 1]
            };
            self.set_target(fallback);
            self.trail.clear();
            self.secondary_trail.clear();
            self.trail.push(current);
            self.state = ExplorerState::Exploring;
        }

        StepOutcome::Seek(self.target)
    }

    fn step_exit(&mut self, grid: &mut LiveMazeGrid, current: Cell) -> StepOutcome {
        let finish = grid.finish_point();
        if current == finish {
            grid.remove_occupant(self.id, current);
            return StepOutcome::Finished;
        }
        StepOutcome::Seek(finish)
    }

    /// Pick the next cell to head for from `current`.
    ///
    /// The exit always wins when it is orthogonally adjacent. Otherwise the
    /// four neighbors are filtered down to the valid candidate set first and
    /// one is drawn uniformly, so the draw terminates even when most
    /// directions are invalid.
    fn choose_next(
        &self,
        grid: &LiveMazeGrid,
        current: Cell,
        must_be_new: bool,
        rng: &mut impl Rng,
    ) -> Option<Cell> {
        if is_adjacent(current, grid.exit_point()) {
            return Some(grid.exit_point());
        }

        let candidates: Vec<Cell> = neighbors(current, 1)
            .into_iter()
            .filter(|&n| {
                if must_be_new {
                    self.is_new_and_valid(grid, n)
                } else {
                    grid.is_open(n) && n != self.previous_target
                }
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    /// Open, not walked this trip, and not where we just came from.
    fn is_new_and_valid(&self, grid: &LiveMazeGrid, cell: Cell) -> bool {
        grid.is_open(cell) && !self.trail.contains(&cell) && cell != self.previous_target
    }

    fn has_new_valid_neighbor(&self, grid: &LiveMazeGrid, current: Cell) -> bool {
        neighbors(current, 1)
            .into_iter()
            .any(|n| self.is_new_and_valid(grid, n))
    }

    /// At most one open neighbor: nowhere to go but back.
    fn is_dead_end(&self, grid: &LiveMazeGrid, current: Cell) -> bool {
        grid.open_neighbors(current).len() <= 1
    }

    /// The trail cell just before the first occurrence of `target`, or
    /// `target` itself when the trail does not contain it.
    fn trail_cell_before(&self, target: Cell) -> Cell {
        for i in 1..self.trail.len() {
            if self.trail[i] == target {
                return self.trail[i - 1];
            }
        }
        target
    }

    /// Drop trail cells from the end until `target` is the last entry.
    /// Returns whether the trail contained it at all.
    fn pop_trail_until(&mut self, target: Cell) -> bool {
        if !self.trail.contains(&target) {
            return false;
        }
        while let Some(&last) = self.trail.last() {
            if last == target {
                break;
            }
            self.trail.pop();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WallField;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 7x7 field with a single straight corridor at x=3 between the entry
    /// doorway (3, 6) and the exit doorway (3, 0).
    fn corridor_grid() -> LiveMazeGrid {
        let mut field = WallField::new(
            Cell::new(7, 7),
            vec![Cell::new(3, 6), Cell::new(3, 0)],
            1,
        );
        for y in 1..6 {
            field.set(Cell::new(3, y), false);
        }
        LiveMazeGrid::from_field(&field)
    }

    /// Corridor plus a single-cell dead-end pocket at (2, 3).
    fn junction_grid() -> LiveMazeGrid {
        let mut field = WallField::new(
            Cell::new(7, 7),
            vec![Cell::new(3, 6), Cell::new(3, 0)],
            1,
        );
        for y in 1..6 {
            field.set(Cell::new(3, y), false);
        }
        field.set(Cell::new(2, 3), false);
        LiveMazeGrid::from_field(&field)
    }

    /// Drive an explorer in discrete mode: every tick the agent occupies
    /// the cell it was last told to seek, unless that cell has since been
    /// walled. Returns (move count, tick count).
    fn run_to_finish(
        grid: &mut LiveMazeGrid,
        explorer: &mut Explorer,
        rng: &mut StdRng,
        max_ticks: usize,
    ) -> (usize, usize) {
        let mut current = grid.entry_point();
        let mut moves = 0;
        for tick in 0..max_ticks {
            match explorer.step(grid, current, rng) {
                StepOutcome::Finished => return (moves, tick),
                StepOutcome::Seek(target) => {
                    let in_bounds = target.x >= 0
                        && target.y >= 0
                        && target.x < grid.size().x
                        && target.y < grid.size().y;
                    if !in_bounds || grid.is_open(target) {
                        if target != current {
                            moves += 1;
                        }
                        current = target;
                    }
                }
            }
        }
        panic!("agent did not finish within {max_ticks} ticks");
    }

    #[test]
    fn walks_a_straight_corridor_out_of_the_maze() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(11);
        let (moves, _) = run_to_finish(&mut grid, &mut explorer, &mut rng, 100);
        // entry -> five corridor cells -> exit -> finish point
        assert!(moves <= 2 * grid.open_cell_count());
        // occupancy was cleaned up on the way out
        assert!(!grid.is_occupied(grid.finish_point()));
    }

    #[test]
    fn standing_on_the_exit_overrides_any_state() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(0);
        let exit = grid.exit_point();
        let outcome = explorer.step(&mut grid, exit, &mut rng);
        assert_eq!(explorer.state(), ExplorerState::ExitingMaze);
        assert_eq!(outcome, StepOutcome::Seek(grid.finish_point()));
    }

    #[test]
    fn dead_end_pocket_triggers_a_retrace_for_some_seed() {
        let mut saw_retrace = false;
        for seed in 0..20 {
            let mut grid = junction_grid();
            let mut explorer = Explorer::new(AgentId(1));
            let mut rng = StdRng::seed_from_u64(seed);
            let mut current = grid.entry_point();
            for _ in 0..200 {
                match explorer.step(&mut grid, current, &mut rng) {
                    StepOutcome::Finished => break,
                    StepOutcome::Seek(target) => {
                        saw_retrace |= explorer.state() == ExplorerState::Retracing;
                        let in_bounds = target.x >= 0
                            && target.y >= 0
                            && target.x < grid.size().x
                            && target.y < grid.size().y;
                        if !in_bounds || grid.is_open(target) {
                            current = target;
                        }
                    }
                }
            }
            assert_eq!(
                explorer.state(),
                ExplorerState::ExitingMaze,
                "seed {seed}: agent never made it out"
            );
        }
        assert!(saw_retrace, "no seed ever wandered into the pocket");
    }

    #[test]
    fn walled_target_is_replaced_by_a_fresh_neighbor() {
        // the agent is mid-corridor heading down toward (3, 2), but in this
        // layout (3, 2) is walled and a detour runs through (2, 3)
        let mut field = WallField::new(
            Cell::new(7, 7),
            vec![Cell::new(3, 6), Cell::new(3, 0)],
            1,
        );
        for y in 3..6 {
            field.set(Cell::new(3, y), false);
        }
        field.set(Cell::new(2, 3), false);
        field.set(Cell::new(2, 2), false);
        field.set(Cell::new(2, 1), false);
        field.set(Cell::new(3, 1), false);
        let mut grid = LiveMazeGrid::from_field(&field);

        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(3);
        explorer.state = ExplorerState::Exploring;
        explorer.trail = vec![
            Cell::new(3, 6),
            Cell::new(3, 5),
            Cell::new(3, 4),
            Cell::new(3, 3),
        ];
        explorer.previous_target = Cell::new(3, 3);
        explorer.target = Cell::new(3, 2);

        let outcome = explorer.step(&mut grid, Cell::new(3, 3), &mut rng);
        // (3, 2) is a wall in this layout, so the detour cell (2, 3) is the
        // only new-and-valid choice
        assert_eq!(outcome, StepOutcome::Seek(Cell::new(2, 3)));
        assert_eq!(explorer.state(), ExplorerState::Exploring);
    }

    #[test]
    fn retrace_swaps_trails_when_it_runs_out_of_trail() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(5);

        explorer.state = ExplorerState::Retracing;
        explorer.trail = vec![Cell::new(3, 6), Cell::new(3, 5)];
        explorer.secondary_trail = vec![Cell::new(3, 4)];
        explorer.previous_target = Cell::new(3, 4);
        explorer.target = Cell::new(3, 5);

        // reaching (3, 5): no new neighbor (both are on the trail), keep
        // walking back toward the trail head
        let outcome = explorer.step(&mut grid, Cell::new(3, 5), &mut rng);
        assert_eq!(outcome, StepOutcome::Seek(Cell::new(3, 6)));
        assert_eq!(explorer.state(), ExplorerState::Retracing);

        // reaching the head swaps the walk-back in as the new trail
        explorer.step(&mut grid, Cell::new(3, 6), &mut rng);
        assert_eq!(explorer.state(), ExplorerState::Exploring);
        assert_eq!(
            explorer.trail,
            vec![Cell::new(3, 4), Cell::new(3, 5), Cell::new(3, 6)]
        );
        assert!(explorer.secondary_trail.is_empty());
    }

    #[test]
    fn retrace_target_walled_off_resets_both_trails() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(5);

        explorer.state = ExplorerState::Retracing;
        explorer.trail = vec![Cell::new(3, 6), Cell::new(3, 5), Cell::new(3, 4)];
        explorer.secondary_trail = vec![Cell::new(3, 3), Cell::new(3, 2)];
        explorer.previous_target = Cell::new(3, 2);
        // (2, 2) was never open in this layout: stands in for a cell walled
        // off after the retrace target was chosen
        explorer.target = Cell::new(2, 2);

        let outcome = explorer.step(&mut grid, Cell::new(3, 2), &mut rng);
        assert_eq!(outcome, StepOutcome::Seek(Cell::new(3, 3)));
        assert_eq!(explorer.state(), ExplorerState::Exploring);
        assert_eq!(explorer.trail, vec![Cell::new(3, 2)]);
        assert!(explorer.secondary_trail.is_empty());
    }

    #[test]
    fn recross_truncates_the_trail_to_a_known_cell() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(1));
        let mut rng = StdRng::seed_from_u64(2);

        explorer.state = ExplorerState::Exploring;
        explorer.trail = vec![
            Cell::new(3, 6),
            Cell::new(3, 5),
            Cell::new(3, 4),
            Cell::new(3, 3),
        ];
        explorer.previous_target = Cell::new(3, 5);
        explorer.target = Cell::new(3, 4);

        explorer.step(&mut grid, Cell::new(3, 4), &mut rng);
        // both open neighbors are on the trail and (3, 5) is excluded as
        // previous, so (3, 3) is chosen and the trail is cut back to it
        assert_eq!(explorer.target(), Cell::new(3, 3));
        assert_eq!(
            explorer.trail,
            vec![Cell::new(3, 6), Cell::new(3, 5), Cell::new(3, 4), Cell::new(3, 3)]
        );
    }

    #[test]
    fn recross_with_unknown_choice_keeps_or_reanchors_the_trail_by_policy() {
        for (policy, expect_reanchored) in [
            (RecrossPolicy::TruncateWhenKnown, false),
            (RecrossPolicy::Reanchor, true),
        ] {
            let mut grid = corridor_grid();
            let mut explorer = Explorer::with_policy(AgentId(1), policy);
            let mut rng = StdRng::seed_from_u64(2);

            // at (3, 1), adjacent to the exit; the exit is not on the trail
            // but the short-circuit picks it, exercising the asymmetric arm
            explorer.state = ExplorerState::Exploring;
            explorer.trail = vec![Cell::new(3, 3), Cell::new(3, 2), Cell::new(3, 1)];
            explorer.previous_target = Cell::new(3, 0);
            explorer.target = Cell::new(3, 1);

            explorer.step(&mut grid, Cell::new(3, 1), &mut rng);
            assert_eq!(explorer.target(), Cell::new(3, 0));
            if expect_reanchored {
                assert_eq!(explorer.trail, vec![Cell::new(3, 1)]);
            } else {
                assert_eq!(
                    explorer.trail,
                    vec![
                        Cell::new(3, 3),
                        Cell::new(3, 2),
                        Cell::new(3, 1),
                        Cell::new(3, 1),
                    ]
                );
            }
        }
    }

    #[test]
    fn occupancy_follows_the_agent() {
        let mut grid = corridor_grid();
        let mut explorer = Explorer::new(AgentId(7));
        let mut rng = StdRng::seed_from_u64(1);

        explorer.step(&mut grid, Cell::new(3, 6), &mut rng);
        assert!(grid.has_occupant(AgentId(7), Cell::new(3, 6)));

        explorer.step(&mut grid, Cell::new(3, 5), &mut rng);
        assert!(!grid.is_occupied(Cell::new(3, 6)));
        assert!(grid.has_occupant(AgentId(7), Cell::new(3, 5)));
    }
}
