//! Optimal solvers. Every solver rejects unsolvable states up front, prunes
//! with the two-move lookback, and never returns a solution longer than its
//! `max_solution_length`.

mod astar;
mod frontier;
mod ida;
mod path;
mod state_history;

pub use astar::{AStarSolver, BestFirstSolver, FrontierSearchSolver, VisitedStates};
pub use ida::{ExpansionOrder, IdaStarSolver};

use crate::{
    cube::{CubeState, MoveSequence},
    heuristic::CostError,
};
use thiserror::Error;

/// Every solvable state can be solved in at most this many moves.
pub const GODS_NUMBER: u8 = 20;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("The state is not reachable from the solved state")]
    NotSolvable,
    #[error("No solution of at most {max_solution_length} moves exists")]
    CouldNotSolve { max_solution_length: u8 },
    #[error("Cost evaluation failed: {0}")]
    Cost(#[from] CostError),
}

pub trait Solver {
    /// Find a shortest move sequence that solves `state`.
    ///
    /// # Errors
    ///
    /// If the state is unsolvable, has no solution within the solver's
    /// maximum length, or its evaluator fails. See `SolveError`.
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolveError>;
}
