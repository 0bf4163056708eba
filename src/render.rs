use core::fmt;

use crate::agent::{AgentState, Mode};
use crate::grid::{Cell, Grid};
use crate::search::Snapshot;

pub const FREE: char = '.';
pub const WALL: char = '#';
pub const CLOSED: char = 'o';
pub const FRONTIER: char = '+';
pub const PATH: char = '*';
pub const START: char = 'S';
pub const GOAL: char = 'G';
pub const HEAD: char = '@';
pub const BODY: char = 's';

/// A character per cell. Later paints overwrite earlier ones. Rows are printed with the highest
/// `y` first so north is up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    grid: Grid,
    glyphs: Vec<char>,
}

impl Canvas {
    pub fn new(grid: Grid) -> Canvas {
        Canvas {
            grid,
            glyphs: vec![FREE; grid.area()],
        }
    }

    /// Paints the cells that lie on the grid; others are ignored.
    pub fn paint<'a, I>(&mut self, cells: I, glyph: char) -> &mut Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        for cell in cells {
            if self.grid.in_bounds(*cell) {
                let ix = self.grid.index(*cell);
                self.glyphs[ix] = glyph;
            }
        }
        self
    }

    pub fn glyph(&self, cell: Cell) -> Option<char> {
        self.grid
            .in_bounds(cell)
            .then(|| self.glyphs[self.grid.index(cell)])
    }

    /// Draws one search step: explored cells, the frontier and the best route to the cell being
    /// expanded, or the full path once the search has succeeded.
    pub fn from_snapshot<'a, I>(grid: Grid, obstacles: I, start: Cell, snapshot: &Snapshot) -> Canvas
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut canvas = Canvas::new(grid);
        canvas
            .paint(obstacles, WALL)
            .paint(snapshot.closed(), CLOSED)
            .paint(snapshot.frontier(), FRONTIER);
        let route = match snapshot.path() {
            Some(path) => path,
            None => snapshot
                .current()
                .map(|cell| snapshot.path_to(cell))
                .unwrap_or_default(),
        };
        canvas
            .paint(&route, PATH)
            .paint([start].iter(), START)
            .paint([snapshot.goal()].iter(), GOAL);
        canvas
    }

    /// Draws the agent, its target and whatever it is currently doing.
    pub fn from_agent<'a, I>(grid: Grid, walls: I, state: &AgentState) -> Canvas
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut canvas = Canvas::new(grid);
        canvas.paint(walls, WALL);
        match (&state.mode, &state.snapshot) {
            (Mode::Planning, Some(snapshot)) => {
                canvas.paint(snapshot.closed(), CLOSED);
                if let Some(current) = snapshot.current() {
                    canvas.paint(&snapshot.path_to(current), PATH);
                }
            }
            _ => {
                canvas.paint(&state.path, PATH);
            }
        }
        canvas
            .paint([state.target].iter(), GOAL)
            .paint(state.body.iter().skip(1), BODY)
            .paint(state.body.first(), HEAD);
        canvas
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..self.grid.height).rev() {
            let row: String = self.glyphs[y * self.grid.width..(y + 1) * self.grid.width]
                .iter()
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::IncrementalAstar;

    #[test]
    fn finished_search_shows_path() {
        let grid = Grid::new(3, 3);
        let walls = vec![Cell::new(1, 1)];
        let mut engine =
            IncrementalAstar::new(grid, Cell::new(0, 0), Cell::new(2, 2), walls.clone()).unwrap();
        let terminal = engine.finish();
        let canvas = Canvas::from_snapshot(grid, &walls, Cell::new(0, 0), &terminal);
        assert_eq!(canvas.glyph(Cell::new(1, 1)), Some(WALL));
        assert_eq!(canvas.glyph(Cell::new(0, 0)), Some(START));
        assert_eq!(canvas.glyph(Cell::new(2, 2)), Some(GOAL));
        let path_cells = grid
            .cells()
            .filter(|c| canvas.glyph(*c) == Some(PATH))
            .count();
        assert_eq!(path_cells, 3);
        assert_eq!(canvas.glyph(Cell::new(3, 3)), None);
    }

    #[test]
    fn prints_north_up() {
        let grid = Grid::new(3, 2);
        let mut canvas = Canvas::new(grid);
        canvas.paint([Cell::new(0, 1)].iter(), HEAD);
        assert_eq!(canvas.to_string(), "@..\n...\n");
    }

    #[test]
    fn empty_snapshot_state_is_drawable() {
        let grid = Grid::new(2, 2);
        let state = AgentState {
            body: vec![Cell::new(0, 0), Cell::new(1, 0)],
            target: Cell::new(1, 1),
            mode: Mode::Following,
            path: Vec::new(),
            snapshot: None,
        };
        let canvas = Canvas::from_agent(grid, &Vec::<Cell>::new(), &state);
        assert_eq!(canvas.to_string(), ".G\n@s\n");
    }
}
