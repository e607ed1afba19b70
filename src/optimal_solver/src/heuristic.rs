//! Admissible cost evaluators: lower bounds on the number of moves a state
//! needs, used by the solvers to prune.

use crate::{
    cube::{CORNER_ORIENTATIONS, CORNERS, CubeState, EDGE_ORIENTATIONS, EDGES},
    pruning::{Orbit, PatternDatabase, PieceSubset, generate},
    start, success,
};
use enum_dispatch::enum_dispatch;
use log::info;
use std::{sync::Arc, time::Instant};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostError {
    #[error("The state does not contain every piece exactly once")]
    InvalidConfiguration,
    #[error("The pattern database has no entry at index {index}")]
    IncompleteTable { index: u64 },
}

/// A heuristic that never overestimates the number of moves needed to solve a
/// state.
#[enum_dispatch]
pub trait CostEvaluator {
    /// A lower bound on the solution length of `state`.
    ///
    /// # Errors
    ///
    /// If the state is malformed, or a table lookup finds no entry.
    fn cost(&self, state: &CubeState) -> Result<u8, CostError>;
}

/// Every evaluator, dispatched statically.
#[enum_dispatch(CostEvaluator)]
#[derive(Clone, Debug)]
pub enum Evaluator {
    Manhattan(ManhattanDistanceEvaluator),
    PatternDatabase(PatternDatabaseEvaluator),
    Composite(CompositeEvaluator),
}

/// For each piece, the number of moves needed to bring it home from every
/// slot and orientation, indexed by `slot * orientations + orientation`.
#[derive(Debug)]
pub struct ManhattanTables {
    corners: Vec<Vec<u8>>,
    edges: Vec<Vec<u8>>,
}

impl ManhattanTables {
    #[must_use]
    pub fn generate() -> Self {
        info!(start!("Generating Manhattan distance tables"));
        let start = Instant::now();
        let distances = |orbit: Orbit| {
            (0..orbit.size() as u8)
                .map(|piece| generate::bfs(&PieceSubset::single(orbit, piece)))
                .collect::<Vec<_>>()
        };
        let tables = Self {
            corners: distances(Orbit::Corners),
            edges: distances(Orbit::Edges),
        };
        info!(
            success!("Generated Manhattan distance tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        tables
    }

    /// The moves needed to bring the corner `piece` home from `slot`, twisted
    /// by `orientation`.
    #[must_use]
    pub fn corner_distance(&self, piece: u8, slot: u8, orientation: u8) -> u8 {
        self.corners[piece as usize][(slot * CORNER_ORIENTATIONS + orientation) as usize]
    }

    /// The moves needed to bring the edge `piece` home from `slot`, flipped
    /// by `orientation`.
    #[must_use]
    pub fn edge_distance(&self, piece: u8, slot: u8, orientation: u8) -> u8 {
        self.edges[piece as usize][(slot * EDGE_ORIENTATIONS + orientation) as usize]
    }
}

/// The sum of every piece's own distance from home, divided by the four
/// pieces of each kind a move displaces. Corners and edges are bounded
/// separately and the larger bound is taken.
#[derive(Clone, Debug)]
pub struct ManhattanDistanceEvaluator {
    tables: Arc<ManhattanTables>,
}

impl Default for ManhattanDistanceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManhattanDistanceEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tables(Arc::new(ManhattanTables::generate()))
    }

    #[must_use]
    pub fn with_tables(tables: Arc<ManhattanTables>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<ManhattanTables> {
        &self.tables
    }
}

impl CostEvaluator for ManhattanDistanceEvaluator {
    fn cost(&self, state: &CubeState) -> Result<u8, CostError> {
        if !state.is_correctly_stickered() {
            return Err(CostError::InvalidConfiguration);
        }
        let (cp, co) = (state.corner_permutation(), state.corner_orientation());
        let corners: u32 = (0..CORNERS)
            .map(|slot| u32::from(self.tables.corner_distance(cp[slot], slot as u8, co[slot])))
            .sum();
        let (ep, eo) = (state.edge_permutation(), state.edge_orientation());
        let edges: u32 = (0..EDGES)
            .map(|slot| u32::from(self.tables.edge_distance(ep[slot], slot as u8, eo[slot])))
            .sum();
        Ok((corners / 4).max(edges / 4) as u8)
    }
}

/// The exact move count of the state's configuration of one piece subset.
#[derive(Clone, Debug)]
pub struct PatternDatabaseEvaluator {
    database: PatternDatabase,
}

impl PatternDatabaseEvaluator {
    #[must_use]
    pub fn new(database: PatternDatabase) -> Self {
        Self { database }
    }

    #[must_use]
    pub fn database(&self) -> &PatternDatabase {
        &self.database
    }
}

impl CostEvaluator for PatternDatabaseEvaluator {
    fn cost(&self, state: &CubeState) -> Result<u8, CostError> {
        if !state.is_correctly_stickered() {
            return Err(CostError::InvalidConfiguration);
        }
        let index = self.database.subset().index(state);
        self.database
            .get(index)
            .ok_or(CostError::IncompleteTable { index })
    }
}

/// The maximum of several evaluators, which stays admissible.
#[derive(Clone, Debug, Default)]
pub struct CompositeEvaluator {
    evaluators: Vec<Evaluator>,
}

impl CompositeEvaluator {
    #[must_use]
    pub fn new(evaluators: Vec<Evaluator>) -> Self {
        Self { evaluators }
    }

    #[must_use]
    pub fn evaluators(&self) -> &[Evaluator] {
        &self.evaluators
    }
}

impl CostEvaluator for CompositeEvaluator {
    fn cost(&self, state: &CubeState) -> Result<u8, CostError> {
        if !state.is_correctly_stickered() {
            return Err(CostError::InvalidConfiguration);
        }
        self.evaluators
            .iter()
            .try_fold(0, |max, evaluator| Ok(max.max(evaluator.cost(state)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cube::{Face, Move, Turn, random_scramble},
        pruning::{PatternDatabaseBuilder, store::NullStore},
    };

    fn corner_database() -> PatternDatabase {
        PatternDatabaseBuilder::from_spec("corners", &[0, 1, 2, 3], "bfs", NullStore)
            .unwrap()
            .build()
            .unwrap()
    }

    fn all_evaluators() -> Vec<Evaluator> {
        let manhattan = ManhattanDistanceEvaluator::new();
        let database = PatternDatabaseEvaluator::new(corner_database());
        vec![
            manhattan.clone().into(),
            database.clone().into(),
            CompositeEvaluator::new(vec![manhattan.into(), database.into()]).into(),
        ]
    }

    #[test]
    fn test_solved_costs_nothing() {
        for evaluator in all_evaluators() {
            assert_eq!(evaluator.cost(&CubeState::solved()), Ok(0));
        }
        assert_eq!(
            CompositeEvaluator::default().cost(&CubeState::solved()),
            Ok(0)
        );
    }

    #[test]
    fn test_one_move_costs_one() {
        let state = CubeState::solved().apply_move(Move::new(Face::U, Turn::Clockwise));
        for evaluator in all_evaluators() {
            assert_eq!(evaluator.cost(&state), Ok(1));
        }
    }

    #[test]
    fn test_admissible_on_random_walks() {
        let evaluators = all_evaluators();
        for length in 0..=8 {
            for _ in 0..25 {
                let state = CubeState::solved().apply_moves(&random_scramble(length));
                for evaluator in &evaluators {
                    assert!(evaluator.cost(&state).unwrap() as usize <= length);
                }
            }
        }
    }

    #[test]
    fn test_manhattan_tables() {
        let tables = ManhattanTables::generate();
        for piece in 0..CORNERS as u8 {
            assert_eq!(tables.corner_distance(piece, piece, 0), 0);
        }
        for piece in 0..EDGES as u8 {
            assert_eq!(tables.edge_distance(piece, piece, 0), 0);
            // A piece flipped in place needs more than one move
            assert!(tables.edge_distance(piece, piece, 1) > 1);
        }
    }

    #[test]
    fn test_composite_takes_maximum() {
        let manhattan = ManhattanDistanceEvaluator::new();
        let database = PatternDatabaseEvaluator::new(corner_database());
        let composite =
            CompositeEvaluator::new(vec![manhattan.clone().into(), database.clone().into()]);
        for _ in 0..50 {
            let state = CubeState::solved().apply_moves(&random_scramble(12));
            let expected = manhattan.cost(&state).unwrap().max(database.cost(&state).unwrap());
            assert_eq!(composite.cost(&state), Ok(expected));
        }
    }

    #[test]
    fn test_invalid_configuration() {
        let solved = CubeState::solved();
        let mut ep = *solved.edge_permutation();
        ep[0] = 1;
        let state = CubeState::from_pieces(
            *solved.corner_permutation(),
            *solved.corner_orientation(),
            ep,
            *solved.edge_orientation(),
        )
        .unwrap();
        for evaluator in all_evaluators() {
            assert_eq!(evaluator.cost(&state), Err(CostError::InvalidConfiguration));
        }
    }

    #[test]
    fn test_unpopulated_entry() {
        let subset = PieceSubset::new(Orbit::Edges, vec![0]).unwrap();
        let mut bytes = vec![1; 24];
        bytes[0] = 0;
        let state = CubeState::solved().apply_move(Move::new(Face::U, Turn::Half));
        let index = subset.index(&state);
        bytes[index as usize] = crate::pruning::UNPOPULATED;
        let evaluator =
            PatternDatabaseEvaluator::new(PatternDatabase::from_bytes(subset, bytes).unwrap());
        assert_eq!(evaluator.cost(&CubeState::solved()), Ok(0));
        assert_eq!(
            evaluator.cost(&state),
            Err(CostError::IncompleteTable { index })
        );
    }
}
