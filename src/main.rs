//! Headless demo: generate a maze, let agents wander out of it, and poke at
//! the walls while they do.

use log::{info, warn};
use maze_wander::grid::Cell;
use maze_wander::live_grid::LiveMazeGrid;
use maze_wander::session::{MazeSession, SessionConfig};
use maze_wander::standard_setups::setup_doorway;

fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let config = SessionConfig {
        spawn_interval: 30,
        spawn_limit: 3,
        ..SessionConfig::default()
    };
    let mut session = MazeSession::generate(&setup_doorway(), config, &mut rng);
    info!(
        "generated a {}x{} maze, showcase trail of {} cells",
        session.grid().size().x,
        session.grid().size().y,
        session.showcase_trail().len()
    );
    println!("{}", render(session.grid()));

    let mut edited = false;
    for tick in 0..50_000u32 {
        session.step(&mut rng);

        if tick == 300 && !edited {
            edited = true;
            demo_edit(&mut session);
        }

        if session.finished_count() >= 5 {
            info!("5 agents made it out after {tick} ticks");
            break;
        }
    }
    if session.finished_count() < 5 {
        warn!("gave up with only {} agents out", session.finished_count());
    }
    println!("{}", render(session.grid()));
}

/// Knock a hole in the first interior wall, then try to seal the first open
/// interior cell that the solvability check will allow.
fn demo_edit(session: &mut MazeSession) {
    let size = session.grid().size();
    let opened = (1..size.y - 1)
        .flat_map(|y| (1..size.x - 1).map(move |x| Cell::new(x, y)))
        .find_map(|cell| session.remove_wall(cell).map(|_| cell));
    match opened {
        Some(cell) => info!("opened a shortcut at ({}, {})", cell.x, cell.y),
        None => warn!("no wall available to remove"),
    }

    let candidates: Vec<Cell> = (1..size.y - 1)
        .flat_map(|y| (1..size.x - 1).map(move |x| Cell::new(x, y)))
        .filter(|&cell| session.grid().is_open(cell))
        .collect();
    let mut refused = 0;
    let mut sealed = None;
    for cell in candidates {
        if session.try_add_wall(cell).is_some() {
            sealed = Some(cell);
            break;
        }
        refused += 1;
    }
    match sealed {
        Some(cell) => info!(
            "sealed ({}, {}) after {refused} refusal(s) kept the maze solvable",
            cell.x, cell.y
        ),
        None => info!("every candidate wall was refused; the maze stays as-is"),
    }
}

fn render(grid: &LiveMazeGrid) -> String {
    let size = grid.size();
    let mut out = String::new();
    for y in (0..size.y).rev() {
        for x in 0..size.x {
            let cell = Cell::new(x, y);
            let glyph = if cell == grid.entry_point() {
                'E'
            } else if cell == grid.exit_point() {
                'X'
            } else if grid.is_open(cell) {
                '.'
            } else {
                '#'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
