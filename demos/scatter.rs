use grid_planner::layout::scatter_obstacles;
use grid_planner::{Canvas, Cell, Grid, IncrementalAstar};
use rand::prelude::*;

// Repeatedly scatters 400 to 500 walls over a 40x40 grid and searches from corner to corner,
// printing the final state of every round. Unlike the maze a route may not exist.

const ROUNDS: usize = 5;

fn main() {
    let mut rng = StdRng::seed_from_u64(0);
    let grid = Grid::new(40, 40);
    let start = Cell::new(0, 0);
    let end = Cell::new(39, 39);
    for round in 0..ROUNDS {
        let count = rng.gen_range(400..=500);
        let walls = scatter_obstacles(&grid, count, &[start, end], &mut rng);
        let mut search = match IncrementalAstar::new(grid, start, end, walls.iter().copied()) {
            Ok(search) => search,
            Err(e) => {
                eprintln!("{e}");
                return;
            }
        };
        let terminal = search.finish();
        println!("{}", Canvas::from_snapshot(grid, &walls, start, &terminal));
        match terminal.path() {
            Some(path) => println!(
                "Round {round}: {count} walls, path of {} steps, {} expansions\n",
                path.len() - 1,
                search.expansions()
            ),
            None => println!(
                "Round {round}: {count} walls, goal unreachable after {} expansions\n",
                search.expansions()
            ),
        }
    }
}
