use crate::grid::Cell;
use thiserror::Error;

/// Configuration errors raised when a search or an agent is set up with cells that cannot be
/// planned over. A search that simply finds no path is not an error; it ends with an
/// unsuccessful terminal [Snapshot](crate::search::Snapshot).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        cell: Cell,
        width: usize,
        height: usize,
    },

    #[error("obstacle {cell} is outside the {width}x{height} grid")]
    InvalidObstacle {
        cell: Cell,
        width: usize,
        height: usize,
    },

    #[error("search start {cell} lies inside the obstacle set")]
    DegenerateStart { cell: Cell },

    #[error("no unoccupied cell left on the {width}x{height} grid")]
    FullyOccupiedGrid { width: usize, height: usize },

    #[error("agent body must contain at least one cell")]
    EmptyBody,

    #[error("agent body occupies {cell} more than once")]
    OverlappingBody { cell: Cell },

    #[error("target {cell} is occupied by the agent body or a wall")]
    TargetOccupied { cell: Cell },

    #[error("wall at {cell} overlaps the agent body")]
    WallOnBody { cell: Cell },
}

pub type PlanResult<T> = Result<T, PlanError>;
