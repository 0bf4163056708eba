//! A* that can be suspended after every expansion.
//!
//! [IncrementalAstar] keeps the frontier, closed set, best known costs and parent links as plain
//! state, so each call to [IncrementalAstar::step] pops and expands exactly one node before
//! handing control back together with a read-only [Snapshot] of the search. Stale frontier
//! entries left behind by cost improvements are discarded when popped instead of being updated
//! in place.
use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::SearchConfig;
use crate::error::{PlanError, PlanResult};
use crate::grid::{Cell, Grid};

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Frontier entry. Ordered so that [BinaryHeap] pops the lowest `f_score` first and, among
/// equal scores, the entry pushed earliest.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    f_score: u32,
    tie_breaker: u64,
    cell: Cell,
}

impl Eq for SearchNode {}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.tie_breaker == other.tie_breaker
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.tie_breaker.cmp(&self.tie_breaker))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Running,
    /// The goal was popped; the next step reports success.
    GoalExpanded,
    Found,
    Exhausted,
}

fn reconstruct_path(came_from: &FxIndexMap<Cell, Cell>, end: Cell) -> Vec<Cell> {
    let mut path: Vec<Cell> =
        std::iter::successors(Some(end), |cell| came_from.get(cell).copied()).collect();
    path.reverse();
    path
}

/// The state of a search right after one step. Cheap to inspect, never shared with the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    current: Option<Cell>,
    goal: Cell,
    closed: FxHashSet<Cell>,
    frontier: Vec<Cell>,
    came_from: FxIndexMap<Cell, Cell>,
    finished: bool,
    succeeded: bool,
}

impl Snapshot {
    /// The cell expanded by this step. Terminal snapshots report the goal on success and
    /// nothing on failure.
    pub fn current(&self) -> Option<Cell> {
        self.current
    }
    pub fn goal(&self) -> Cell {
        self.goal
    }
    pub fn closed(&self) -> &FxHashSet<Cell> {
        &self.closed
    }
    /// Cells waiting in the frontier, in the order they would be popped.
    pub fn frontier(&self) -> &[Cell] {
        &self.frontier
    }
    pub fn came_from(&self) -> &FxIndexMap<Cell, Cell> {
        &self.came_from
    }
    pub fn is_finished(&self) -> bool {
        self.finished
    }
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// The full path from start to goal, available on a successful terminal snapshot.
    pub fn path(&self) -> Option<Vec<Cell>> {
        self.succeeded
            .then(|| reconstruct_path(&self.came_from, self.goal))
    }

    /// Best known route from the start to `cell` through the recorded parent links. For a cell
    /// that was never reached this is just `[cell]`.
    pub fn path_to(&self, cell: Cell) -> Vec<Cell> {
        reconstruct_path(&self.came_from, cell)
    }
}

/// Stepwise A* over a [Grid] with unit move costs.
///
/// The `step` that pops the goal returns an ordinary expansion snapshot; the following `step`
/// returns the terminal snapshot with `succeeded` set. Once terminal, further steps keep
/// returning an equal terminal snapshot.
#[derive(Clone, Debug)]
pub struct IncrementalAstar {
    grid: Grid,
    config: SearchConfig,
    start: Cell,
    goal: Cell,
    obstacles: FxHashSet<Cell>,
    frontier: BinaryHeap<SearchNode>,
    g_score: FxHashMap<Cell, u32>,
    came_from: FxIndexMap<Cell, Cell>,
    closed: FxHashSet<Cell>,
    counter: u64,
    expansions: usize,
    status: Status,
}

impl IncrementalAstar {
    pub fn new<I>(grid: Grid, start: Cell, goal: Cell, obstacles: I) -> PlanResult<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        Self::with_config(grid, SearchConfig::default(), start, goal, obstacles)
    }

    pub fn with_config<I>(
        grid: Grid,
        config: SearchConfig,
        start: Cell,
        goal: Cell,
        obstacles: I,
    ) -> PlanResult<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut engine = IncrementalAstar {
            grid,
            config,
            start,
            goal,
            obstacles: FxHashSet::default(),
            frontier: BinaryHeap::new(),
            g_score: FxHashMap::default(),
            came_from: FxIndexMap::default(),
            closed: FxHashSet::default(),
            counter: 0,
            expansions: 0,
            status: Status::Exhausted,
        };
        engine.reset(start, goal, obstacles)?;
        Ok(engine)
    }

    /// Abandons the current search and starts a new one. On error the previous search is left
    /// untouched.
    pub fn reset<I>(&mut self, start: Cell, goal: Cell, obstacles: I) -> PlanResult<()>
    where
        I: IntoIterator<Item = Cell>,
    {
        self.grid.check(start)?;
        self.grid.check(goal)?;
        let grid = self.grid;
        let obstacles = obstacles
            .into_iter()
            .map(|cell| {
                if grid.in_bounds(cell) {
                    Ok(cell)
                } else {
                    Err(PlanError::InvalidObstacle {
                        cell,
                        width: grid.width,
                        height: grid.height,
                    })
                }
            })
            .collect::<PlanResult<FxHashSet<Cell>>>()?;
        if obstacles.contains(&start) {
            return Err(PlanError::DegenerateStart { cell: start });
        }

        self.start = start;
        self.goal = goal;
        self.obstacles = obstacles;
        self.frontier.clear();
        self.g_score.clear();
        self.came_from.clear();
        self.closed.clear();
        self.counter = 0;
        self.expansions = 0;
        self.g_score.insert(start, 0);
        self.frontier.push(SearchNode {
            f_score: self.heuristic(&start),
            tie_breaker: 0,
            cell: start,
        });
        self.status = Status::Running;
        debug!(
            "search reset: {} -> {} with {} obstacles",
            start,
            goal,
            self.obstacles.len()
        );
        Ok(())
    }

    /// Performs one expansion and reports the resulting state.
    pub fn step(&mut self) -> Snapshot {
        match self.status {
            Status::Running => {}
            Status::GoalExpanded => {
                self.conclude();
                return self.snapshot(Some(self.goal));
            }
            Status::Found => return self.snapshot(Some(self.goal)),
            Status::Exhausted => return self.snapshot(None),
        }
        match self.close_next() {
            Some(current) => {
                let snapshot = self.snapshot(Some(current));
                self.settle(current);
                snapshot
            }
            None => {
                self.conclude();
                self.snapshot(None)
            }
        }
    }

    /// Runs the search to its end without recording intermediate snapshots.
    pub fn finish(&mut self) -> Snapshot {
        while self.status == Status::Running {
            match self.close_next() {
                Some(current) => self.settle(current),
                None => break,
            }
        }
        self.conclude();
        let current = (self.status == Status::Found).then_some(self.goal);
        self.snapshot(current)
    }

    /// Every snapshot of the remaining search, the terminal one included.
    pub fn snapshots(&mut self) -> impl Iterator<Item = Snapshot> + '_ {
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let snapshot = self.step();
            done = snapshot.is_finished();
            Some(snapshot)
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }
    pub fn start(&self) -> Cell {
        self.start
    }
    pub fn goal(&self) -> Cell {
        self.goal
    }
    pub fn obstacles(&self) -> &FxHashSet<Cell> {
        &self.obstacles
    }
    /// Number of cells expanded since the last reset.
    pub fn expansions(&self) -> usize {
        self.expansions
    }
    pub fn is_finished(&self) -> bool {
        matches!(self.status, Status::Found | Status::Exhausted)
    }

    /// The path from start to goal once the search has reported success.
    pub fn path(&self) -> Option<Vec<Cell>> {
        (self.status == Status::Found).then(|| reconstruct_path(&self.came_from, self.goal))
    }

    fn heuristic(&self, cell: &Cell) -> u32 {
        self.config.heuristic.estimate(cell, &self.goal)
    }

    /// Pops frontier entries until one for an unexpanded cell turns up and closes it.
    fn close_next(&mut self) -> Option<Cell> {
        while let Some(SearchNode { cell, .. }) = self.frontier.pop() {
            if self.closed.contains(&cell) {
                trace!("discarding stale frontier entry for {}", cell);
                continue;
            }
            self.closed.insert(cell);
            self.expansions += 1;
            return Some(cell);
        }
        None
    }

    fn settle(&mut self, current: Cell) {
        if current == self.goal {
            self.status = Status::GoalExpanded;
            return;
        }
        let tentative_g = self.g_score.get(&current).copied().unwrap_or_default() + 1;
        for neighbor in self.grid.neighbors(current) {
            if self.obstacles.contains(&neighbor) || self.closed.contains(&neighbor) {
                continue;
            }
            let improves = self
                .g_score
                .get(&neighbor)
                .map_or(true, |&known| tentative_g < known);
            if improves {
                self.g_score.insert(neighbor, tentative_g);
                self.came_from.insert(neighbor, current);
                self.counter += 1;
                self.frontier.push(SearchNode {
                    f_score: tentative_g + self.heuristic(&neighbor),
                    tie_breaker: self.counter,
                    cell: neighbor,
                });
            }
        }
    }

    fn conclude(&mut self) {
        match self.status {
            Status::GoalExpanded => {
                self.status = Status::Found;
                info!(
                    "path {} -> {} found after {} expansions",
                    self.start, self.goal, self.expansions
                );
            }
            Status::Running => {
                self.status = Status::Exhausted;
                warn!(
                    "no path {} -> {}, frontier exhausted after {} expansions",
                    self.start, self.goal, self.expansions
                );
            }
            Status::Found | Status::Exhausted => {}
        }
    }

    fn snapshot(&self, current: Option<Cell>) -> Snapshot {
        let mut seen = FxHashSet::default();
        let frontier = self
            .frontier
            .clone()
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|node| node.cell)
            .filter(|cell| !self.closed.contains(cell) && seen.insert(*cell))
            .collect();
        Snapshot {
            current,
            goal: self.goal,
            closed: self.closed.clone(),
            frontier,
            came_from: self.came_from.clone(),
            finished: self.is_finished(),
            succeeded: self.status == Status::Found,
        }
    }
}

/// Runs a whole search at once and returns the path including both end points, or [None] when
/// the goal cannot be reached.
pub fn find_path<I>(grid: Grid, start: Cell, goal: Cell, obstacles: I) -> PlanResult<Option<Vec<Cell>>>
where
    I: IntoIterator<Item = Cell>,
{
    let mut engine = IncrementalAstar::new(grid, start, goal, obstacles)?;
    Ok(engine.finish().path())
}
