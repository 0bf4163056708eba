//! An agent that plans a route to its target with [IncrementalAstar] and then walks it one cell
//! per tick, growing whenever it reaches the target.
use fxhash::FxHashSet;
use log::{debug, info, warn};
use rand::Rng;
use std::collections::VecDeque;

use crate::config::AgentConfig;
use crate::error::{PlanError, PlanResult};
use crate::grid::{Cell, Grid};
use crate::search::{IncrementalAstar, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The search is running; each tick advances it.
    Planning,
    /// A plan exists (possibly empty) and is being consumed.
    Following,
}

/// Picks a cell uniformly at random among those not in `occupied`, retrying until one is free.
pub fn random_free_cell<R: Rng>(
    grid: &Grid,
    occupied: &FxHashSet<Cell>,
    rng: &mut R,
) -> PlanResult<Cell> {
    let taken = occupied.iter().filter(|c| grid.in_bounds(**c)).count();
    if taken >= grid.area() {
        return Err(PlanError::FullyOccupiedGrid {
            width: grid.width,
            height: grid.height,
        });
    }
    loop {
        let cell = Cell::new(
            rng.gen_range(0..grid.width) as i32,
            rng.gen_range(0..grid.height) as i32,
        );
        if !occupied.contains(&cell) {
            return Ok(cell);
        }
    }
}

/// A copy of everything an observer needs to draw one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    /// Head first.
    pub body: Vec<Cell>,
    pub target: Cell,
    pub mode: Mode,
    /// Cells still to walk, excluding the current head.
    pub path: Vec<Cell>,
    /// Latest search snapshot while planning.
    pub snapshot: Option<Snapshot>,
}

impl AgentState {
    pub fn head(&self) -> Option<Cell> {
        self.body.first().copied()
    }
}

pub struct Agent<R> {
    grid: Grid,
    config: AgentConfig,
    body: VecDeque<Cell>,
    walls: FxHashSet<Cell>,
    target: Cell,
    mode: Mode,
    path: VecDeque<Cell>,
    engine: IncrementalAstar,
    snapshot: Option<Snapshot>,
    rng: R,
    ticks: u64,
    targets_reached: usize,
}

impl<R: Rng> Agent<R> {
    /// Creates an agent with the given body (head first) and a random target, ready to plan.
    pub fn new(grid: Grid, body: Vec<Cell>, config: AgentConfig, mut rng: R) -> PlanResult<Self> {
        if body.is_empty() {
            return Err(PlanError::EmptyBody);
        }
        let mut seen = FxHashSet::default();
        for cell in &body {
            grid.check(*cell)?;
            if !seen.insert(*cell) {
                return Err(PlanError::OverlappingBody { cell: *cell });
            }
        }
        let target = random_free_cell(&grid, &seen, &mut rng)?;
        let body: VecDeque<Cell> = body.into();
        let engine = IncrementalAstar::with_config(
            grid,
            config.search,
            body[0],
            target,
            body.iter().skip(1).copied(),
        )?;
        debug!("agent created at {} with target {}", body[0], target);
        Ok(Agent {
            grid,
            config,
            body,
            walls: FxHashSet::default(),
            target,
            mode: Mode::Planning,
            path: VecDeque::new(),
            engine,
            snapshot: None,
            rng,
            ticks: 0,
            targets_reached: 0,
        })
    }

    /// An agent of `initial_length` cells centred on the configured grid, extending west from
    /// the head.
    pub fn from_config(config: AgentConfig, rng: R) -> PlanResult<Self> {
        let grid = config.grid();
        let mid_x = (grid.width / 2) as i32;
        let mid_y = (grid.height / 2) as i32;
        let body = (0..config.initial_length.max(1) as i32)
            .map(|i| Cell::new(mid_x - i, mid_y))
            .collect();
        Self::new(grid, body, config, rng)
    }

    /// Advances the agent by one state-machine transition.
    pub fn tick(&mut self) -> PlanResult<AgentState> {
        self.ticks += 1;
        match self.mode {
            Mode::Planning => self.plan(),
            Mode::Following => self.follow()?,
        }
        Ok(self.state())
    }

    fn plan(&mut self) {
        let snapshot = if self.config.visualize {
            self.engine.step()
        } else {
            self.engine.finish()
        };
        if snapshot.is_finished() {
            match snapshot.path() {
                // The first cell is the head itself.
                Some(full) => self.path = full.into_iter().skip(1).collect(),
                None => {
                    warn!("no route from {} to {}", self.head(), self.target);
                    self.path.clear();
                }
            }
            debug!("planning done, following {} cells", self.path.len());
            self.mode = Mode::Following;
        }
        self.snapshot = Some(snapshot);
    }

    fn follow(&mut self) -> PlanResult<()> {
        match self.path.pop_front() {
            Some(next) if next == self.target => {
                // The next target must avoid the grown body, and nothing changes if none exists.
                let mut occupied = self.occupied();
                occupied.insert(next);
                let target = match random_free_cell(&self.grid, &occupied, &mut self.rng) {
                    Ok(target) => target,
                    Err(e) => {
                        self.path.push_front(next);
                        return Err(e);
                    }
                };
                self.body.push_front(next);
                self.targets_reached += 1;
                info!(
                    "target {} reached, body length {}",
                    next,
                    self.body.len()
                );
                self.target = target;
                self.replan()
            }
            Some(next) => {
                self.body.push_front(next);
                self.body.pop_back();
                Ok(())
            }
            None => self.replan(),
        }
    }

    fn occupied(&self) -> FxHashSet<Cell> {
        self.body.iter().chain(self.walls.iter()).copied().collect()
    }

    fn pick_target(&mut self) -> PlanResult<Cell> {
        let occupied = self.occupied();
        random_free_cell(&self.grid, &occupied, &mut self.rng)
    }

    /// Restarts the search from the head towards the current target.
    fn replan(&mut self) -> PlanResult<()> {
        let obstacles: Vec<Cell> = self
            .body
            .iter()
            .skip(1)
            .chain(self.walls.iter())
            .copied()
            .collect();
        self.engine.reset(self.head(), self.target, obstacles)?;
        self.path.clear();
        self.snapshot = None;
        self.mode = Mode::Planning;
        debug!("replanning from {} to {}", self.head(), self.target);
        Ok(())
    }

    /// Replaces the static walls and replans. The target is moved if a wall now covers it.
    pub fn set_walls<I>(&mut self, walls: I) -> PlanResult<()>
    where
        I: IntoIterator<Item = Cell>,
    {
        let walls: FxHashSet<Cell> = walls.into_iter().collect();
        for wall in &walls {
            if !self.grid.in_bounds(*wall) {
                return Err(PlanError::InvalidObstacle {
                    cell: *wall,
                    width: self.grid.width,
                    height: self.grid.height,
                });
            }
            if self.body.contains(wall) {
                return Err(PlanError::WallOnBody { cell: *wall });
            }
        }
        self.walls = walls;
        if self.walls.contains(&self.target) {
            self.target = self.pick_target()?;
        }
        self.replan()
    }

    /// Moves the goal and replans from the current head. The goal may not lie on the body or a
    /// wall.
    pub fn set_target(&mut self, target: Cell) -> PlanResult<()> {
        self.grid.check(target)?;
        if self.occupied().contains(&target) {
            return Err(PlanError::TargetOccupied { cell: target });
        }
        self.target = target;
        self.replan()
    }

    pub fn state(&self) -> AgentState {
        AgentState {
            body: self.body.iter().copied().collect(),
            target: self.target,
            mode: self.mode,
            path: self.path.iter().copied().collect(),
            snapshot: self.snapshot.clone(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }
    pub fn head(&self) -> Cell {
        self.body[0]
    }
    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }
    pub fn walls(&self) -> &FxHashSet<Cell> {
        &self.walls
    }
    pub fn target(&self) -> Cell {
        self.target
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
    pub fn targets_reached(&self) -> usize {
        self.targets_reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet() -> AgentConfig {
        AgentConfig {
            visualize: false,
            ..AgentConfig::default()
        }
    }

    fn body(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().map(|&c| Cell::from(c)).collect()
    }

    #[test]
    fn starts_planning_with_free_target() {
        let agent = Agent::from_config(AgentConfig::default(), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(agent.mode(), Mode::Planning);
        assert_eq!(
            agent.body().iter().copied().collect::<Vec<_>>(),
            body(&[(15, 15), (14, 15), (13, 15)])
        );
        assert!(!agent.body().contains(&agent.target()));
        assert!(agent.snapshot().is_none());
    }

    #[test]
    fn rejects_bad_bodies() {
        let grid = Grid::new(5, 5);
        let rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Agent::new(grid, Vec::new(), quiet(), rng.clone()),
            Err(PlanError::EmptyBody)
        ));
        assert!(matches!(
            Agent::new(grid, body(&[(1, 1), (1, 1)]), quiet(), rng.clone()),
            Err(PlanError::OverlappingBody { .. })
        ));
        assert!(matches!(
            Agent::new(grid, body(&[(5, 1)]), quiet(), rng),
            Err(PlanError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn target_never_chosen_on_body() {
        let grid = Grid::new(10, 10);
        let occupied: FxHashSet<Cell> = body(&[(5, 5), (4, 5), (3, 5)]).into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let target = random_free_cell(&grid, &occupied, &mut rng).unwrap();
            assert!(grid.in_bounds(target));
            assert!(!occupied.contains(&target));
        }
    }

    #[test]
    fn full_grid_is_reported() {
        let grid = Grid::new(2, 1);
        let occupied: FxHashSet<Cell> = body(&[(0, 0), (1, 0)]).into_iter().collect();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            random_free_cell(&grid, &occupied, &mut rng),
            Err(PlanError::FullyOccupiedGrid {
                width: 2,
                height: 1
            })
        );
        // The last free cell is always found.
        let almost: FxHashSet<Cell> = body(&[(0, 0)]).into_iter().collect();
        assert_eq!(
            random_free_cell(&grid, &almost, &mut rng),
            Ok(Cell::new(1, 0))
        );
    }

    #[test]
    fn visual_planning_takes_one_expansion_per_tick() {
        let grid = Grid::new(10, 10);
        let mut agent = Agent::new(
            grid,
            body(&[(0, 0)]),
            AgentConfig::default(),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        agent.set_target(Cell::new(3, 0)).unwrap();
        let mut planning_ticks = 0;
        while agent.mode() == Mode::Planning {
            let state = agent.tick().unwrap();
            planning_ticks += 1;
            assert!(state.snapshot.is_some());
        }
        // Four expansions along the row, then the terminal tick.
        assert_eq!(planning_ticks, 5);
        assert_eq!(agent.state().path, body(&[(1, 0), (2, 0), (3, 0)]));
    }

    #[test]
    fn moving_keeps_length_and_drops_tail() {
        let grid = Grid::new(10, 10);
        let mut agent = Agent::new(
            grid,
            body(&[(5, 5), (4, 5), (3, 5)]),
            quiet(),
            StdRng::seed_from_u64(11),
        )
        .unwrap();
        agent.set_target(Cell::new(8, 5)).unwrap();
        let planned = agent.tick().unwrap();
        assert_eq!(planned.mode, Mode::Following);
        assert_eq!(planned.path, body(&[(6, 5), (7, 5), (8, 5)]));

        let moved = agent.tick().unwrap();
        assert_eq!(moved.body, body(&[(6, 5), (5, 5), (4, 5)]));
        assert_eq!(moved.mode, Mode::Following);
    }

    #[test]
    fn reaching_target_grows_and_replans() {
        let grid = Grid::new(10, 10);
        let mut agent = Agent::new(
            grid,
            body(&[(5, 5), (4, 5), (3, 5)]),
            quiet(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        agent.set_target(Cell::new(6, 5)).unwrap();
        agent.tick().unwrap();
        let grown = agent.tick().unwrap();
        assert_eq!(grown.body, body(&[(6, 5), (5, 5), (4, 5), (3, 5)]));
        assert_eq!(grown.mode, Mode::Planning);
        assert!(grown.snapshot.is_none());
        assert!(!grown.body.contains(&grown.target));
        assert_eq!(agent.targets_reached(), 1);
    }

    #[test]
    fn trapped_agent_keeps_replanning() {
        //  ___
        // |@##|
        // |#  |
        //  ___
        let grid = Grid::new(3, 2);
        let mut agent = Agent::new(grid, body(&[(0, 1)]), quiet(), StdRng::seed_from_u64(2))
            .unwrap();
        agent
            .set_walls(body(&[(1, 1), (2, 1), (0, 0)]))
            .unwrap();
        assert!(!agent.walls().contains(&agent.target()));
        let failed = agent.tick().unwrap();
        assert_eq!(failed.mode, Mode::Following);
        assert!(failed.path.is_empty());
        assert!(!failed.snapshot.unwrap().succeeded());
        let retry = agent.tick().unwrap();
        assert_eq!(retry.mode, Mode::Planning);
        assert_eq!(retry.body, body(&[(0, 1)]));
    }

    #[test]
    fn walls_on_body_are_rejected() {
        let grid = Grid::new(4, 4);
        let mut agent = Agent::new(
            grid,
            body(&[(1, 1), (0, 1)]),
            quiet(),
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(
            agent.set_walls(body(&[(0, 1)])),
            Err(PlanError::WallOnBody {
                cell: Cell::new(0, 1)
            })
        );
        assert!(agent.walls().is_empty());
    }

    #[test]
    fn filling_the_grid_is_fatal() {
        // A 2x1 grid: after eating the only free cell nothing is left to target.
        let grid = Grid::new(2, 1);
        let mut agent = Agent::new(grid, body(&[(0, 0)]), quiet(), StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(agent.target(), Cell::new(1, 0));
        agent.tick().unwrap();
        assert_eq!(
            agent.tick(),
            Err(PlanError::FullyOccupiedGrid {
                width: 2,
                height: 1
            })
        );
    }

    #[test]
    fn occupied_targets_are_rejected() {
        let grid = Grid::new(10, 10);
        let mut agent = Agent::new(
            grid,
            body(&[(5, 5), (4, 5), (3, 5)]),
            quiet(),
            StdRng::seed_from_u64(6),
        )
        .unwrap();
        agent.set_walls(body(&[(7, 7)])).unwrap();
        let before = agent.target();
        for cell in [Cell::new(5, 5), Cell::new(4, 5), Cell::new(7, 7)] {
            assert_eq!(
                agent.set_target(cell),
                Err(PlanError::TargetOccupied { cell })
            );
            assert_eq!(agent.target(), before);
        }
        agent.set_target(Cell::new(0, 0)).unwrap();
        assert_eq!(agent.target(), Cell::new(0, 0));
    }

    #[test]
    fn full_grid_error_repeats_without_changing_state() {
        let grid = Grid::new(2, 1);
        let mut agent = Agent::new(grid, body(&[(0, 0)]), quiet(), StdRng::seed_from_u64(4))
            .unwrap();
        agent.tick().unwrap();
        let full = PlanError::FullyOccupiedGrid {
            width: 2,
            height: 1,
        };
        for _ in 0..3 {
            assert_eq!(agent.tick(), Err(full.clone()));
            assert_eq!(agent.body().len(), 1);
            assert_eq!(agent.targets_reached(), 0);
            assert_eq!(agent.mode(), Mode::Following);
        }
    }

    #[test]
    fn empty_state_has_no_head() {
        let state = AgentState {
            body: Vec::new(),
            target: Cell::new(0, 0),
            mode: Mode::Following,
            path: Vec::new(),
            snapshot: None,
        };
        assert_eq!(state.head(), None);
    }
}
