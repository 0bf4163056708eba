//! Obstacle layouts for driving the planner on something more interesting than an empty grid.
use fxhash::FxHashSet;
use petgraph::unionfind::UnionFind;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Cell, Grid};

/// Blocks `count` random cells, or every candidate if there are fewer. Cells in `keep_clear`
/// (typically start and goal) are never blocked.
pub fn scatter_obstacles<R: Rng>(
    grid: &Grid,
    count: usize,
    keep_clear: &[Cell],
    rng: &mut R,
) -> FxHashSet<Cell> {
    let candidates: Vec<Cell> = grid.cells().filter(|c| !keep_clear.contains(c)).collect();
    candidates
        .choose_multiple(rng, count.min(candidates.len()))
        .copied()
        .collect()
}

/// Whether `cell` is a maze room. Rooms sit on even coordinates, everything else starts as wall.
pub fn is_room(cell: Cell) -> bool {
    cell.x % 2 == 0 && cell.y % 2 == 0
}

/// Generates a perfect maze: exactly one route between any two rooms. Passages are carved with
/// randomized Kruskal, knocking down the wall between two rooms whenever they are not yet
/// connected.
pub fn maze<R: Rng>(grid: &Grid, rng: &mut R) -> FxHashSet<Cell> {
    let mut walls: FxHashSet<Cell> = grid.cells().filter(|c| !is_room(*c)).collect();
    let mut edges: Vec<(Cell, Cell, Cell)> = Vec::new();
    for room in grid.cells().filter(|c| is_room(*c)) {
        for (dx, dy) in [(2, 0), (0, 2)] {
            let next = Cell::new(room.x + dx, room.y + dy);
            if grid.in_bounds(next) {
                let between = Cell::new(room.x + dx / 2, room.y + dy / 2);
                edges.push((room, between, next));
            }
        }
    }
    edges.shuffle(rng);

    let mut rooms = UnionFind::new(grid.area());
    for (a, between, b) in edges {
        if rooms.union(grid.index(a), grid.index(b)) {
            walls.remove(&between);
        }
    }
    walls
}
