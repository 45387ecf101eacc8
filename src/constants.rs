//! Provides constants for the library.

/// Minimum maze dimension on either axis
pub const MIN_MAZE_SIZE: i32 = 3;
/// Corridor width used when a setup doesn't specify one
pub const DEFAULT_PATH_WIDTH: i32 = 1;
/// How far past the exit cell an agent walks before it is retired
pub const EXIT_OVERSHOOT: i32 = 3;

/// Ticks between spawn attempts in a session
pub const DEFAULT_SPAWN_INTERVAL: u32 = 60;
/// Maximum number of agents alive in a session at once
pub const DEFAULT_SPAWN_LIMIT: usize = 4;

/// Top speed of a simulated agent, in cells per second
pub const AGENT_MAX_SPEED: f32 = 3.0;
/// Velocity gain applied while closing on the target cell
pub const AGENT_APPROACH_GAIN: f32 = 4.0;
/// Radius of a simulated agent's collider, in cells
pub const AGENT_RADIUS: f32 = 0.35;
/// Density of a simulated agent's collider
pub const AGENT_DENSITY: f32 = 1.0;
