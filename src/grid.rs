use core::fmt;

use fxhash::FxHashSet;
use grid_util::point::Point;
use itertools::Itertools;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::error::{PlanError, PlanResult};

/// A coordinate on the grid. Ordered by `x`, then `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Cell {
        Cell { x, y }
    }

    pub fn manhattan_distance(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether the two cells share an edge.
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Point> for Cell {
    fn from(point: Point) -> Cell {
        Cell::new(point.x, point.y)
    }
}

impl From<Cell> for Point {
    fn from(cell: Cell) -> Point {
        Point::new(cell.x, cell.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Cell {
        Cell::new(x, y)
    }
}

/// The four moves available on the grid, in the order neighbours are generated.
/// North points towards increasing `y`.
pub const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A fixed-size rectangle of cells with 4-connected adjacency. The grid itself holds no
/// occupancy; obstacles are supplied per query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Grid {
        Grid { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Fails with [PlanError::OutOfBounds] unless the cell lies on the grid.
    pub fn check(&self, cell: Cell) -> PlanResult<Cell> {
        if self.in_bounds(cell) {
            Ok(cell)
        } else {
            Err(PlanError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// In-bounds neighbours of `cell` in the fixed order east, west, north, south. Expansion
    /// order between equally promising nodes follows this order.
    pub fn neighbors(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        DIRECTIONS
            .iter()
            .map(|(dx, dy)| Cell::new(cell.x + dx, cell.y + dy))
            .filter(|n| self.in_bounds(*n))
            .collect()
    }

    /// Row-major index of an in-bounds cell.
    pub fn index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    /// All cells, row by row starting at `y = 0`.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Cell::new(x, y)))
    }

    /// Checks that a path stays on the grid and only ever takes unit steps.
    pub fn is_contiguous(&self, path: &[Cell]) -> bool {
        path.iter().all(|c| self.in_bounds(*c))
            && path.iter().tuple_windows().all(|(a, b)| a.is_adjacent(b))
    }

    /// Links every free cell to its free neighbours in a [UnionFind] structure.
    pub fn components(&self, obstacles: &FxHashSet<Cell>) -> Components {
        let mut sets = UnionFind::new(self.area());
        for cell in self.cells() {
            if obstacles.contains(&cell) {
                continue;
            }
            let ix = self.index(cell);
            // East and north suffice, the other two links are made from the neighbour.
            for next in [Cell::new(cell.x + 1, cell.y), Cell::new(cell.x, cell.y + 1)] {
                if self.in_bounds(next) && !obstacles.contains(&next) {
                    sets.union(ix, self.index(next));
                }
            }
        }
        Components {
            grid: *self,
            sets,
            blocked: obstacles.clone(),
        }
    }
}

/// Connected components of the free cells of a [Grid] for one obstacle set.
#[derive(Clone, Debug)]
pub struct Components {
    grid: Grid,
    sets: UnionFind<usize>,
    blocked: FxHashSet<Cell>,
}

impl Components {
    /// Checks if start and goal are free and on the same component.
    pub fn reachable(&self, start: &Cell, goal: &Cell) -> bool {
        self.is_free(start)
            && self.is_free(goal)
            && self
                .sets
                .equiv(self.grid.index(*start), self.grid.index(*goal))
    }

    pub fn unreachable(&self, start: &Cell, goal: &Cell) -> bool {
        !self.reachable(start, goal)
    }

    fn is_free(&self, cell: &Cell) -> bool {
        self.grid.in_bounds(*cell) && !self.blocked.contains(cell)
    }
}
