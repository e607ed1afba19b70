use super::{GODS_NUMBER, SolveError, Solver, state_history::StateHistory};
use crate::{
    canonical::MoveLookback,
    cube::{CubeState, Move, MoveSequence},
    heuristic::{CostError, CostEvaluator},
    start, success, working,
};
use log::{Level, debug, info, log_enabled};
use std::{
    sync::{Mutex, PoisonError},
    time::Instant,
};

/// The order in which IDA* visits the children of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpansionOrder {
    /// Move order, each child evaluated just before it is visited.
    #[default]
    Plain,
    /// All children evaluated first, then visited cheapest first. On the
    /// final iteration this tends to reach a solution sooner.
    BestFirst,
}

pub struct IdaStarSolver<E: CostEvaluator> {
    evaluator: E,
    max_solution_length: u8,
    expansion_order: ExpansionOrder,
    mutable: Mutex<IdaStarSolverMutable>,
}

struct IdaStarSolverMutable {
    state_history: StateHistory,
    /// One reusable buffer of children per depth, for best-first expansion.
    successors: Vec<Vec<Successor>>,
    solution: Option<Vec<Move>>,
    nodes_visited: u64,
}

#[derive(Clone, Copy)]
struct Successor {
    m: Move,
    state: CubeState,
    cost: u8,
}

/// The return type of the IDA* recursion function. It maintains the
/// soft-invariant that zero means a solution has been found, hence
/// `AdmissibleGoalHeuristic::SOLVED`.
#[derive(PartialEq, Copy, Clone, Debug)]
struct AdmissibleGoalHeuristic(u8);

impl AdmissibleGoalHeuristic {
    const SOLVED: Self = Self(0);
}

/// Sort by ascending cost. The lists are at most 18 long, and insertion sort
/// keeps equal costs in move order.
fn insertion_sort_by_cost(successors: &mut [Successor]) {
    for i in 1..successors.len() {
        let mut j = i;
        while j > 0 && successors[j - 1].cost > successors[j].cost {
            successors.swap(j - 1, j);
            j -= 1;
        }
    }
}

impl<E: CostEvaluator> IdaStarSolver<E> {
    #[must_use]
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            max_solution_length: GODS_NUMBER,
            expansion_order: ExpansionOrder::default(),
            mutable: Mutex::new(IdaStarSolverMutable {
                state_history: StateHistory::new(CubeState::solved()),
                successors: vec![],
                solution: None,
                nodes_visited: 0,
            }),
        }
    }

    #[must_use]
    pub fn with_max_solution_length(mut self, max_solution_length: u8) -> Self {
        self.max_solution_length = max_solution_length;
        self
    }

    #[must_use]
    pub fn with_expansion_order(mut self, expansion_order: ExpansionOrder) -> Self {
        self.expansion_order = expansion_order;
        self
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Depth-first search below the last state of the history, which costs
    /// `cost`, for a solution of at most `permitted_cost` more moves.
    ///
    /// The return value is an admissible goal heuristic: a lower bound on
    /// the number of moves to the solved state from this node, zero only if
    /// a solution was found. The cost of every child is computed by the
    /// parent and passed down, so each node is evaluated once.
    fn search_for_solution(
        &self,
        mutable: &mut IdaStarSolverMutable,
        lookback: MoveLookback,
        cost: u8,
        mut permitted_cost: u8,
    ) -> Result<AdmissibleGoalHeuristic, CostError> {
        if log_enabled!(Level::Debug) {
            mutable.nodes_visited += 1;
        }
        if cost > permitted_cost {
            return Ok(AdmissibleGoalHeuristic(cost));
        }
        let last_state = *mutable.state_history.last_state();
        if last_state.is_solved() {
            mutable.solution = Some(mutable.state_history.create_move_history());
            return Ok(AdmissibleGoalHeuristic::SOLVED);
        }
        // If this node is not a solution, then we are at least one step away
        // from one
        let unsolved = AdmissibleGoalHeuristic(cost.max(1));
        if permitted_cost == 0 {
            return Ok(unsolved);
        }

        permitted_cost -= 1;
        match self.expansion_order {
            ExpansionOrder::Plain => {
                for m in lookback.allowed_moves() {
                    let state = last_state.apply_move(m);
                    let successor = Successor {
                        m,
                        cost: self.evaluator.cost(&state)?,
                        state,
                    };
                    if let Some(result) =
                        self.visit_successor(mutable, lookback, successor, permitted_cost)?
                    {
                        return Ok(result);
                    }
                }
            }
            ExpansionOrder::BestFirst => {
                let depth = mutable.state_history.depth();
                let mut successors = std::mem::take(&mut mutable.successors[depth]);
                successors.clear();
                for m in lookback.allowed_moves() {
                    let state = last_state.apply_move(m);
                    successors.push(Successor {
                        m,
                        cost: self.evaluator.cost(&state)?,
                        state,
                    });
                }
                insertion_sort_by_cost(&mut successors);

                let mut result = None;
                for &successor in &successors {
                    // Every later child costs at least as much, so none of
                    // them fits either. The last one costs the most.
                    if successor.cost > permitted_cost {
                        let most = successors.last().map_or(0, |s| s.cost);
                        if most > permitted_cost + 2 {
                            result = Some(AdmissibleGoalHeuristic(most - 1));
                        }
                        break;
                    }
                    result = self.visit_successor(mutable, lookback, successor, permitted_cost)?;
                    if result.is_some() {
                        break;
                    }
                }
                mutable.successors[depth] = successors;
                if let Some(result) = result {
                    return Ok(result);
                }
            }
        }
        Ok(unsolved)
    }

    /// Visit one child, returning what this node should return right away if
    /// the child was a solution or proved this node too expensive.
    fn visit_successor(
        &self,
        mutable: &mut IdaStarSolverMutable,
        lookback: MoveLookback,
        successor: Successor,
        permitted_cost: u8,
    ) -> Result<Option<AdmissibleGoalHeuristic>, CostError> {
        mutable.state_history.push_stack(successor.state, successor.m);
        let child_admissible_goal_heuristic = self.search_for_solution(
            mutable,
            lookback.after(successor.m.face()),
            successor.cost,
            permitted_cost,
        )?;
        if mutable.solution.is_some() {
            // The history is no longer needed once a solution is recorded
            return Ok(Some(AdmissibleGoalHeuristic::SOLVED));
        }
        mutable.state_history.pop_stack();

        // Pathmax. A child that is more than one move further from the goal
        // than this node may still go makes this node that expensive, minus
        // the one move to reach the child. It must be written with a plus two
        // to prevent overflow.
        if child_admissible_goal_heuristic.0 > permitted_cost + 2 {
            return Ok(Some(AdmissibleGoalHeuristic(
                child_admissible_goal_heuristic.0 - 1,
            )));
        }
        Ok(None)
    }
}

impl<E: CostEvaluator> Solver for IdaStarSolver<E> {
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolveError> {
        if !state.is_solvable() {
            return Err(SolveError::NotSolvable);
        }
        info!(start!("Searching for a solution with IDA*"));
        let start = Instant::now();

        let mut mutable = self.mutable.lock().unwrap_or_else(PoisonError::into_inner);
        mutable.state_history.reset(*state);
        mutable.solution = None;

        let root_cost = self.evaluator.cost(state)?;
        let mut depth = root_cost;
        loop {
            if depth > self.max_solution_length {
                return Err(SolveError::CouldNotSolve {
                    max_solution_length: self.max_solution_length,
                });
            }
            debug!(working!("Searching depth {}..."), depth);
            let depth_start = Instant::now();
            mutable.nodes_visited = 0;
            mutable.state_history.resize_if_needed(depth as usize);
            if mutable.successors.len() <= depth as usize {
                mutable.successors.resize_with(depth as usize + 1, Vec::new);
            }

            self.search_for_solution(&mut mutable, MoveLookback::default(), root_cost, depth)?;
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                mutable.nodes_visited,
                depth_start.elapsed().as_secs_f64()
            );

            if let Some(solution) = mutable.solution.take() {
                info!(
                    success!("Found a {} move solution in {:.3}s"),
                    solution.len(),
                    start.elapsed().as_secs_f64()
                );
                return Ok(MoveSequence::new(solution));
            }
            if depth == u8::MAX {
                return Err(SolveError::CouldNotSolve {
                    max_solution_length: self.max_solution_length,
                });
            }
            depth += 1;
        }
    }
}
