//! Continuous movement for agents, and physical obstacles for walls.
//!
//! This is the collaborator the exploration core delegates motion to: the
//! core decides target cells, this module pushes bodies toward them. Walls
//! are fixed cuboid colliders keyed by [`WallId`] so live edits can stand
//! obstacles up and tear them down; agents are dynamic balls steered with
//! impulses and a clamped speed.

use crate::constants::{AGENT_APPROACH_GAIN, AGENT_DENSITY, AGENT_MAX_SPEED, AGENT_RADIUS};
use crate::grid::Cell;
use crate::live_grid::{AgentId, LiveMazeGrid, WallEvent, WallId};
use rapier2d::dynamics::{IntegrationParameters, RigidBodySet};
use rapier2d::geometry::{BroadPhase, NarrowPhase};
use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::*;
use std::collections::HashMap;

/// Rapier interaction group representing all walls
const GROUP_WALL: u32 = 1;
/// Rapier interaction group representing all agents
const GROUP_AGENT: u32 = 2;

/// Returns the continuous position at the center of `cell`.
pub fn cell_to_position(cell: Cell) -> Point2<f32> {
    Point2::new(cell.x as f32 + 0.5, cell.y as f32 + 0.5)
}

/// Returns the cell containing the continuous position `position`.
pub fn position_to_cell(position: Point2<f32>) -> Cell {
    Cell::new(position.x.floor() as i32, position.y.floor() as i32)
}

/// Physics world mirroring one [`LiveMazeGrid`].
pub struct MazeSimulation {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,

    wall_bodies: HashMap<WallId, RigidBodyHandle>,
    agent_bodies: HashMap<AgentId, RigidBodyHandle>,
    agent_targets: HashMap<AgentId, Cell>,
}

impl MazeSimulation {
    /// Build a physics world with an obstacle for every wall in `grid`.
    pub fn new(grid: &LiveMazeGrid) -> Self {
        let mut sim = Self {
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),

            wall_bodies: HashMap::new(),
            agent_bodies: HashMap::new(),
            agent_targets: HashMap::new(),
        };
        for (cell, id) in grid.walls() {
            sim.insert_wall(id, cell);
        }
        sim
    }

    fn insert_wall(&mut self, id: WallId, cell: Cell) {
        let center = cell_to_position(cell);
        let rigid_body = RigidBodyBuilder::fixed()
            .translation(Vector2::new(center.x, center.y))
            .build();
        let rigid_body_handle = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder::cuboid(0.5, 0.5)
            .collision_groups(InteractionGroups::new(GROUP_WALL.into(), u32::MAX.into()))
            .build();
        self.collider_set
            .insert_with_parent(collider, rigid_body_handle, &mut self.rigid_body_set);

        self.wall_bodies.insert(id, rigid_body_handle);
    }

    fn remove_wall(&mut self, id: WallId) {
        if let Some(handle) = self.wall_bodies.remove(&id) {
            self.rigid_body_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
        }
    }

    /// Apply a batch of wall changes drained from the grid, standing up and
    /// tearing down obstacles to match.
    pub fn apply_wall_events(&mut self, events: impl IntoIterator<Item = WallEvent>) {
        for event in events {
            match event {
                WallEvent::Added { id, cell } => self.insert_wall(id, cell),
                WallEvent::Removed { id, .. } => self.remove_wall(id),
            }
        }
    }

    /// Number of wall obstacles currently in the world.
    pub fn wall_count(&self) -> usize {
        self.wall_bodies.len()
    }

    /// Drop a new agent body at `cell`, initially targeting the cell it
    /// stands on.
    pub fn spawn_agent(&mut self, id: AgentId, cell: Cell) {
        let center = cell_to_position(cell);
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(Vector2::new(center.x, center.y))
            .build();
        let rigid_body_handle = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder::ball(AGENT_RADIUS)
            .density(AGENT_DENSITY)
            .collision_groups(InteractionGroups::new(
                GROUP_AGENT.into(),
                GROUP_WALL.into(),
            )) // agents squeeze past each other, but never through walls
            .build();
        self.collider_set
            .insert_with_parent(collider, rigid_body_handle, &mut self.rigid_body_set);

        self.agent_bodies.insert(id, rigid_body_handle);
        self.agent_targets.insert(id, cell);
    }

    /// Remove an agent's body, e.g. after it walks out past the exit.
    pub fn despawn_agent(&mut self, id: AgentId) {
        self.agent_targets.remove(&id);
        if let Some(handle) = self.agent_bodies.remove(&id) {
            self.rigid_body_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
        }
    }

    /// Number of agent bodies currently in the world.
    pub fn agent_count(&self) -> usize {
        self.agent_bodies.len()
    }

    /// Point an agent at a new target cell.
    pub fn set_agent_target(&mut self, id: AgentId, cell: Cell) {
        if self.agent_bodies.contains_key(&id) {
            self.agent_targets.insert(id, cell);
        }
    }

    /// The continuous position of an agent's body.
    pub fn agent_position(&self, id: AgentId) -> Option<Point2<f32>> {
        let handle = self.agent_bodies.get(&id)?;
        let body = self.rigid_body_set.get(*handle)?;
        Some(Point2::from(body.position().translation.vector))
    }

    /// The cell an agent currently stands in, as reported to the exploration
    /// core each tick.
    pub fn agent_cell(&self, id: AgentId) -> Option<Cell> {
        Some(position_to_cell(self.agent_position(id)?))
    }

    /// Update the physics simulation
    pub fn step(&mut self) {
        self.step_agent_targets();

        self.physics_pipeline.step(
            &Vector2::new(0., 0.),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Apply an impulse to every agent, closing on its target cell with the
    /// speed clamped to [`AGENT_MAX_SPEED`].
    fn step_agent_targets(&mut self) {
        for (id, handle) in &self.agent_bodies {
            let Some(body) = self.rigid_body_set.get_mut(*handle) else {
                continue;
            };
            let target = cell_to_position(self.agent_targets[id]);
            let position = body.position().translation.vector;
            let mut velocity = (target.coords - position) * AGENT_APPROACH_GAIN;
            if velocity.magnitude() > AGENT_MAX_SPEED {
                velocity = velocity.normalize() * AGENT_MAX_SPEED;
            }
            // impulse is scaled by mass so the velocity lands on the desired
            // value this step
            let impulse = (velocity - body.linvel()) * body.mass();
            body.apply_impulse(impulse, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WallField;

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

    #[test]
    fn cell_and_position_round_trip() {
        for cell in [
            Cell::new(0, 0),
            Cell::new(3, 5),
            Cell::new(14, 8),
            Cell::new(-3, 2),
        ] {
            assert_eq!(position_to_cell(cell_to_position(cell)), cell);
        }
    }

    #[test]
    fn world_mirrors_the_grid_walls() {
        let mut grid = corridor_grid();
        let mut sim = MazeSimulation::new(&grid);
        let initial = sim.wall_count();
        assert_eq!(initial, grid.walls().count());

        let removed = grid.remove_wall(Cell::new(1, 1)).unwrap();
        let added = grid.try_add_wall(Cell::new(1, 1)).unwrap();
        sim.apply_wall_events(grid.take_events());
        assert_ne!(removed, added);
        assert_eq!(sim.wall_count(), initial);

        grid.remove_wall(Cell::new(1, 1)).unwrap();
        sim.apply_wall_events(grid.take_events());
        assert_eq!(sim.wall_count(), initial - 1);
    }

    #[test]
    fn agent_bodies_spawn_and_despawn() {
        let grid = corridor_grid();
        let mut sim = MazeSimulation::new(&grid);
        sim.spawn_agent(AgentId(0), grid.entry_point());
        assert_eq!(sim.agent_count(), 1);
        assert_eq!(sim.agent_cell(AgentId(0)), Some(grid.entry_point()));

        sim.despawn_agent(AgentId(0));
        assert_eq!(sim.agent_count(), 0);
        assert_eq!(sim.agent_cell(AgentId(0)), None);
    }

    #[test]
    fn agent_closes_on_its_target_cell() {
        let grid = corridor_grid();
        let mut sim = MazeSimulation::new(&grid);
        let agent = AgentId(1);
        sim.spawn_agent(agent, Cell::new(3, 5));
        sim.set_agent_target(agent, Cell::new(3, 4));

        let start = sim.agent_position(agent).unwrap();
        for _ in 0..120 {
            sim.step();
        }
        let end = sim.agent_position(agent).unwrap();
        assert!(end.y < start.y, "agent did not move toward its target");
        assert_eq!(sim.agent_cell(agent), Some(Cell::new(3, 4)));
    }

    #[test]
    fn targets_are_ignored_for_unknown_agents() {
        let grid = corridor_grid();
        let mut sim = MazeSimulation::new(&grid);
        sim.set_agent_target(AgentId(42), Cell::new(3, 3));
        assert_eq!(sim.agent_count(), 0);
    }
}
