#![warn(missing_docs)]
//! Procedural grid mazes that stay solvable while being edited live
//!
//! The pipeline: a [`setup::MazeSetup`] describes the maze,
//! [`generator::generate`] carves a [`grid::WallField`], a
//! [`live_grid::LiveMazeGrid`] takes over as the runtime maze and accepts
//! validated wall edits, and [`explorer::Explorer`] agents walk it toward the
//! exit using only what they can see from their current cell.

pub mod constants;
pub mod explorer;
pub mod generator;
pub mod grid;
pub mod live_grid;
pub mod session;
pub mod setup;
pub mod simulation;
pub mod standard_setups;
