//! Tick-driven play session: one maze, a roster of wandering agents.

use crate::constants::{DEFAULT_SPAWN_INTERVAL, DEFAULT_SPAWN_LIMIT};
use crate::explorer::{Explorer, ExplorerState, RecrossPolicy, StepOutcome};
use crate::generator::generate;
use crate::grid::Cell;
use crate::live_grid::{AgentId, LiveMazeGrid, WallEvent, WallId};
use crate::setup::MazeSetup;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Session tunables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ticks between spawn attempts.
    pub spawn_interval: u32,
    /// Maximum number of agents alive at once.
    pub spawn_limit: usize,
    /// Recross policy handed to every spawned agent.
    pub recross_policy: RecrossPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            spawn_limit: DEFAULT_SPAWN_LIMIT,
            recross_policy: RecrossPolicy::default(),
        }
    }
}

struct Walker {
    explorer: Explorer,
    cell: Cell,
}

/// Owns the maze and the agent roster, advancing both one tick at a time.
///
/// Movement here is discrete: an agent occupies the cell it chose last tick,
/// unless that cell was walled in the meantime (the continuous alternative
/// lives in [`crate::simulation`]). Wall edits are funneled through
/// [`MazeSession::try_add_wall`] so they validate against the occupancy
/// index as of the current tick.
pub struct MazeSession {
    grid: LiveMazeGrid,
    config: SessionConfig,
    walkers: Vec<Walker>,
    showcase_trail: Vec<Cell>,
    ticks_until_spawn: u32,
    next_agent: u32,
    finished: u32,
}

impl MazeSession {
    /// Start a session over an already-built grid.
    pub fn new(grid: LiveMazeGrid, config: SessionConfig) -> Self {
        Self {
            grid,
            config,
            walkers: Vec::new(),
            showcase_trail: Vec::new(),
            ticks_until_spawn: 0,
            next_agent: 0,
            finished: 0,
        }
    }

    /// Generate a maze from `setup` and start a session on it.
    pub fn generate(setup: &MazeSetup, config: SessionConfig, rng: &mut impl Rng) -> Self {
        let field = generate(setup, rng);
        let showcase_trail = field.longest_path().to_vec();
        let mut session = Self::new(LiveMazeGrid::from_field(&field), config);
        session.showcase_trail = showcase_trail;
        session
    }

    /// The maze this session runs on.
    pub fn grid(&self) -> &LiveMazeGrid {
        &self.grid
    }

    /// The longest carve path recorded during generation, kept around for
    /// showcase purposes (e.g. tracing a demo route through the maze).
    pub fn showcase_trail(&self) -> &[Cell] {
        &self.showcase_trail
    }

    /// Number of agents currently alive.
    pub fn active_agents(&self) -> usize {
        self.walkers.len()
    }

    /// Number of agents still on their way to the entry.
    pub fn entering_count(&self) -> usize {
        self.walkers
            .iter()
            .filter(|w| {
                matches!(
                    w.explorer.state(),
                    ExplorerState::WaitingForSpawn | ExplorerState::MovingToEntry
                )
            })
            .count()
    }

    /// Number of agents that have walked out past the exit.
    pub fn finished_count(&self) -> u32 {
        self.finished
    }

    /// Current cell of every live agent.
    pub fn agent_cells(&self) -> impl Iterator<Item = (AgentId, Cell)> + '_ {
        self.walkers.iter().map(|w| (w.explorer.id(), w.cell))
    }

    /// Place a wall, validated against connectivity and the occupancy index
    /// as of this tick.
    pub fn try_add_wall(&mut self, cell: Cell) -> Option<WallId> {
        self.grid.try_add_wall(cell)
    }

    /// Tear a wall down.
    pub fn remove_wall(&mut self, cell: Cell) -> Option<WallId> {
        self.grid.remove_wall(cell)
    }

    /// Drain wall changes for the obstacle layer.
    pub fn take_wall_events(&mut self) -> Vec<WallEvent> {
        self.grid.take_events()
    }

    /// Advance the session one tick: spawn when the roster allows, step
    /// every agent, retire the ones that finished.
    pub fn step(&mut self, rng: &mut impl Rng) {
        if self.ticks_until_spawn == 0 {
            if self.walkers.len() < self.config.spawn_limit {
                self.spawn();
            }
            self.ticks_until_spawn = self.config.spawn_interval;
        } else {
            self.ticks_until_spawn -= 1;
        }

        let size = self.grid.size();
        let mut retired = Vec::new();
        for walker in &mut self.walkers {
            match walker.explorer.step(&mut self.grid, walker.cell, rng) {
                StepOutcome::Finished => retired.push(walker.explorer.id()),
                StepOutcome::Seek(target) => {
                    let in_bounds = target.x >= 0
                        && target.y >= 0
                        && target.x < size.x
                        && target.y < size.y;
                    // arrive next tick, unless the cell was walled under us
                    if !in_bounds || self.grid.is_open(target) {
                        walker.cell = target;
                    }
                }
            }
        }

        if !retired.is_empty() {
            self.finished += retired.len() as u32;
            self.walkers.retain(|w| !retired.contains(&w.explorer.id()));
            info!("{} agent(s) walked out of the maze", retired.len());
        }
    }

    fn spawn(&mut self) {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        self.walkers.push(Walker {
            explorer: Explorer::with_policy(id, self.config.recross_policy),
            cell: self.grid.entry_point(),
        });
        debug!("agent {id:?} spawned at the entry");
    }
}
