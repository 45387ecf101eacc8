//! A set of pre-made maze setups.

use crate::grid::Cell;
use crate::setup::MazeSetup;

/// The classic doorway maze: 15x9 field with the entry punched through the
/// middle of the top edge and the exit through the bottom.
///
/// ```
/// use maze_wander::standard_setups::setup_doorway;
///
/// let setup = setup_doorway();
/// assert_eq!(setup.entry().y, setup.size().y - 1);
/// assert_eq!(setup.exit().y, 0);
/// ```
pub fn setup_doorway() -> MazeSetup {
    MazeSetup::new(
        Cell::new(15, 9),
        vec![Cell::new(7, 8), Cell::new(7, 0)],
        1,
    )
    .expect("doorway setup is valid")
}

/// The smallest interesting bordered maze: a 5x5 playable interior inside a
/// sealed ring, with the entry and exit in opposite interior corners.
///
/// ```
/// use maze_wander::grid::Cell;
/// use maze_wander::standard_setups::setup_bordered_5x5;
///
/// let setup = setup_bordered_5x5();
/// assert_eq!(setup.size(), Cell::new(7, 7));
/// ```
pub fn setup_bordered_5x5() -> MazeSetup {
    MazeSetup::bordered(Cell::new(5, 5), vec![Cell::new(0, 0), Cell::new(4, 4)], 1)
        .expect("bordered setup is valid")
}

/// A doorway maze with two-cell-wide corridors.
pub fn setup_wide_corridors() -> MazeSetup {
    MazeSetup::new(
        Cell::new(18, 14),
        vec![Cell::new(9, 12), Cell::new(9, 0)],
        2,
    )
    .expect("wide setup is valid")
}
