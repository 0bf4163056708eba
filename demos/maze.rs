use grid_planner::layout::maze;
use grid_planner::{Canvas, Cell, Grid, IncrementalAstar};
use rand::prelude::*;
use std::thread::sleep;
use std::time::Duration;

// Carves a random 41x41 maze and animates A* from the bottom-left room to the top-right room.
// where
// - # marks a wall
// - o marks an expanded cell, + a cell waiting in the frontier
// - * marks the best route to the cell being expanded

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = Grid::new(41, 41);
    let walls = maze(&grid, &mut rng);
    let start = Cell::new(0, 0);
    let end = Cell::new(40, 40);
    let mut search = match IncrementalAstar::new(grid, start, end, walls.iter().copied()) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    for snapshot in search.snapshots() {
        println!(
            "\x1b[2J\x1b[H{}",
            Canvas::from_snapshot(grid, &walls, start, &snapshot)
        );
        sleep(Duration::from_millis(5));
    }
    match search.path() {
        Some(path) => println!(
            "Path of {} steps after {} expansions.",
            path.len() - 1,
            search.expansions()
        ),
        None => println!("No path."),
    }
}
