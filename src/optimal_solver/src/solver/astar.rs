use super::{
    GODS_NUMBER, SolveError, Solver,
    frontier::{Frontier, FrontierEntry},
    path::PathArena,
};
use crate::{
    cube::{CubeState, MoveSequence},
    heuristic::CostEvaluator,
    start, success, working,
};
use fxhash::FxHashMap;
use log::{debug, info};
use std::{
    sync::{Mutex, PoisonError},
    time::Instant,
};

/// What a best-first search remembers about the states it has generated.
pub trait VisitedStates: Default {
    /// Record a path of `length` moves to `state`. Returns `false` if a
    /// strictly shorter path to it is already known, in which case the new
    /// path should be discarded.
    fn record(&mut self, state: &CubeState, length: u8) -> bool;

    /// Whether a strictly shorter path than `length` moves to `state` has been
    /// recorded since this one was.
    fn is_superseded(&self, state: &CubeState, length: u8) -> bool;

    fn clear(&mut self);
}

impl VisitedStates for FxHashMap<CubeState, u8> {
    fn record(&mut self, state: &CubeState, length: u8) -> bool {
        match self.get_mut(state) {
            Some(best) if *best < length => false,
            Some(best) => {
                *best = length;
                true
            }
            None => {
                self.insert(*state, length);
                true
            }
        }
    }

    fn is_superseded(&self, state: &CubeState, length: u8) -> bool {
        self.get(state).is_some_and(|&best| best < length)
    }

    fn clear(&mut self) {
        FxHashMap::clear(self);
    }
}

/// Remembers nothing, so duplicate paths are only curbed by the lookback.
impl VisitedStates for () {
    fn record(&mut self, _state: &CubeState, _length: u8) -> bool {
        true
    }

    fn is_superseded(&self, _state: &CubeState, _length: u8) -> bool {
        false
    }

    fn clear(&mut self) {}
}

/// A* search: a visited map of best known path lengths and a frontier
/// ordered by `f = g + h`.
pub type AStarSolver<E> = BestFirstSolver<E, FxHashMap<CubeState, u8>>;

/// Frontier search: A* without the visited map, trading repeated work for
/// memory.
pub type FrontierSearchSolver<E> = BestFirstSolver<E, ()>;

/// Best-first search expanding the path with the lowest estimated total
/// length, ties going to the deeper path. A solution is accepted when it is
/// popped, which with an admissible evaluator makes it optimal.
pub struct BestFirstSolver<E: CostEvaluator, V: VisitedStates> {
    evaluator: E,
    max_solution_length: u8,
    frontier: Frontier,
    mutable: Mutex<BestFirstSolverMutable<V>>,
}

#[derive(Default)]
struct BestFirstSolverMutable<V: VisitedStates> {
    arena: PathArena,
    visited: V,
    nodes_expanded: u64,
}

impl<E: CostEvaluator, V: VisitedStates> BestFirstSolver<E, V> {
    #[must_use]
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            max_solution_length: GODS_NUMBER,
            frontier: Frontier::default(),
            mutable: Mutex::new(BestFirstSolverMutable::default()),
        }
    }

    #[must_use]
    pub fn with_max_solution_length(mut self, max_solution_length: u8) -> Self {
        self.max_solution_length = max_solution_length;
        self
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    fn search(
        &self,
        mutable: &mut BestFirstSolverMutable<V>,
        state: &CubeState,
    ) -> Result<MoveSequence, SolveError> {
        let root_cost = self.evaluator.cost(state)?;
        if root_cost <= self.max_solution_length {
            let root = mutable.arena.push_root(*state);
            mutable.visited.record(state, 0);
            self.frontier.push(FrontierEntry {
                f: root_cost,
                g: 0,
                node: root,
            });
        }

        while let Some(entry) = self.frontier.pop() {
            let node = *mutable.arena.node(entry.node);
            if mutable.visited.is_superseded(node.state(), node.length()) {
                continue;
            }
            if node.state().is_solved() {
                return Ok(mutable.arena.moves(entry.node));
            }
            mutable.nodes_expanded += 1;

            let g = node.length() + 1;
            for m in node.lookback().allowed_moves() {
                let child = node.state().apply_move(m);
                if !mutable.visited.record(&child, g) {
                    continue;
                }
                let cost = self.evaluator.cost(&child)?;
                if g + cost > self.max_solution_length {
                    continue;
                }
                let index = mutable.arena.extend(entry.node, m, child);
                self.frontier.push(FrontierEntry {
                    f: g + cost,
                    g,
                    node: index,
                });
            }
        }

        Err(SolveError::CouldNotSolve {
            max_solution_length: self.max_solution_length,
        })
    }
}

impl<E: CostEvaluator, V: VisitedStates> Solver for BestFirstSolver<E, V> {
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolveError> {
        if !state.is_solvable() {
            return Err(SolveError::NotSolvable);
        }
        info!(start!("Searching for a solution best-first"));
        let start = Instant::now();

        let mut mutable = self.mutable.lock().unwrap_or_else(PoisonError::into_inner);
        mutable.arena.clear();
        mutable.visited.clear();
        mutable.nodes_expanded = 0;
        self.frontier.clear();

        let result = self.search(&mut mutable, state);
        debug!(
            working!("Expanded {} nodes, generated {} paths, {} left in the frontier"),
            mutable.nodes_expanded,
            mutable.arena.len(),
            self.frontier.len()
        );
        if let Ok(solution) = &result {
            info!(
                success!("Found a {} move solution in {:.3}s"),
                solution.len(),
                start.elapsed().as_secs_f64()
            );
        }
        result
    }
}
