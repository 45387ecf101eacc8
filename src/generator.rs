//! Randomized depth-first maze carving.

use crate::grid::WallField;
use crate::setup::MazeSetup;
use rand::Rng;

/// Carve a maze over a fresh [`WallField`].
///
/// Carving starts from the first exit and grows depth-first: each step either
/// stitches in a still-unvisited exit (stepping onto the neighbor tile beside
/// it, then jumping onto the exit itself) or opens a uniformly chosen soft
/// wall next to the current tile. Dead ends backtrack along the carve stack,
/// and the longest stack seen is recorded on the field before it is popped
/// away. The loop ends when the stack empties, at which point every soft wall
/// reachable from the start has been resolved and all exits are joined by
/// corridors.
///
/// The result is a tree: soft walls open with at most one open orthogonal
/// neighbor, so no carve step can close a loop.
///
/// # Examples
///
/// ```
/// use maze_wander::generator::generate;
/// use maze_wander::standard_setups::setup_doorway;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let field = generate(&setup_doorway(), &mut StdRng::seed_from_u64(1));
/// assert!(!field.longest_path().is_empty());
/// ```
pub fn generate(setup: &MazeSetup, rng: &mut impl Rng) -> WallField {
    let mut field = WallField::new(setup.size(), setup.exits().to_vec(), setup.path_width());
    let mut current = setup.entry();
    let mut path = vec![current];
    field.visit_exit(current);

    while !path.is_empty() {
        let next = field
            .step_toward_unvisited_exit(current)
            .or_else(|| field.random_soft_wall_neighbor(current, rng));

        if let Some(next) = next {
            field.set(next, false);
            current = next;
            path.push(current);

            if let Some(exit) = field.nearby_unvisited_exit(current) {
                field.visit_exit(exit);
                current = exit;
                path.push(current);
            }
        } else {
            if path.len() > field.longest_path().len() {
                field.set_longest_path(path.clone());
            }
            path.pop();
            if let Some(&top) = path.last() {
                current = top;
            }
        }
    }

    field
}
