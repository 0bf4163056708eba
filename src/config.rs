use crate::grid::{Cell, Grid};

/// Remaining-cost estimate used to order the frontier. Both are admissible on a 4-connected
/// unit-cost grid, so either returns shortest paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// `|dx| + |dy|`, consistent for 4-connected moves.
    #[default]
    Manhattan,
    /// Always zero, which turns the search into Dijkstra's algorithm.
    Zero,
}

impl Heuristic {
    pub fn estimate(&self, from: &Cell, goal: &Cell) -> u32 {
        match self {
            Heuristic::Manhattan => from.manhattan_distance(goal),
            Heuristic::Zero => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub heuristic: Heuristic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Body length of an agent built by [Agent::from_config](crate::agent::Agent::from_config).
    pub initial_length: usize,
    /// When set, each planning tick performs a single expansion so observers can watch the
    /// frontier grow. Otherwise planning completes within one tick.
    pub visualize: bool,
    pub search: SearchConfig,
}

impl AgentConfig {
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }
}

impl Default for AgentConfig {
    fn default() -> AgentConfig {
        AgentConfig {
            grid_width: 30,
            grid_height: 30,
            initial_length: 3,
            visualize: true,
            search: SearchConfig::default(),
        }
    }
}
