//! # grid_planner
//!
//! Shortest paths on a uniform 4-connected grid, computed by an A* search that can be advanced
//! one expansion at a time so a renderer or game loop can inspect the frontier in between.
//! [IncrementalAstar] does the searching; [Agent] consumes it, planning a route to a target,
//! walking it cell by cell and replanning whenever the target is reached or the plan runs out.
//!
//! ```
//! use grid_planner::{Cell, Grid, IncrementalAstar};
//!
//! let grid = Grid::new(5, 5);
//! let walls = vec![Cell::new(1, 0), Cell::new(1, 1), Cell::new(1, 2)];
//! let mut search = IncrementalAstar::new(grid, Cell::new(0, 0), Cell::new(4, 0), walls).unwrap();
//! while !search.step().is_finished() {}
//! let path = search.path().unwrap();
//! assert_eq!(path.len(), 11);
//! ```
pub mod agent;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod render;
pub mod search;

pub use agent::{Agent, AgentState, Mode};
pub use config::{AgentConfig, Heuristic, SearchConfig};
pub use error::{PlanError, PlanResult};
pub use grid::{Cell, Components, Grid};
pub use render::Canvas;
pub use search::{find_path, IncrementalAstar, Snapshot};
