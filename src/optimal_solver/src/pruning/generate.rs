//! Exhaustive table generation. All three strategies explore the subset's
//! configurations from the solved state with two-move lookback pruning and
//! write the depth at which each configuration is first reached.

use super::{PieceSubset, SubsetState, UNPOPULATED, populated_count};
use crate::{canonical::MoveLookback, cube::CubeState, working};
use log::debug;
use std::collections::VecDeque;

fn empty_table(subset: &PieceSubset) -> Vec<u8> {
    vec![UNPOPULATED; subset.cardinality() as usize]
}

/// Breadth-first generation. A configuration is claimed the first time it is
/// reached, which is at its optimal depth, and only claiming nodes are queued.
pub(crate) fn bfs(subset: &PieceSubset) -> Vec<u8> {
    let mut table = empty_table(subset);
    let solved = subset.project(&CubeState::solved());
    table[subset.index_of(&solved) as usize] = 0;

    let mut queue = VecDeque::from([(solved, MoveLookback::default(), 0_u8)]);
    let mut level = 0;
    let mut level_nodes = 0_u64;
    while let Some((state, lookback, depth)) = queue.pop_front() {
        if depth != level {
            debug!(working!("BFS depth {} has {} entries"), level, level_nodes);
            level = depth;
            level_nodes = 0;
        }
        level_nodes += 1;
        for m in lookback.allowed_moves() {
            let next = subset.apply_move(&state, m.index());
            let entry = &mut table[subset.index_of(&next) as usize];
            if *entry == UNPOPULATED {
                *entry = depth + 1;
                queue.push_back((next, lookback.after(m.face()), depth + 1));
            }
        }
    }
    debug!(working!("BFS depth {} has {} entries"), level, level_nodes);
    table
}

/// Depth-first generation down to `limit` moves.
pub(super) fn dfs(subset: &PieceSubset, limit: u8) -> Vec<u8> {
    let mut table = empty_table(subset);
    let solved = subset.project(&CubeState::solved());
    dfs_into(&mut table, subset, &solved, MoveLookback::default(), 0, limit);
    debug!(
        working!("DFS to depth {} populated {} of {} entries"),
        limit,
        populated_count(&table),
        table.len()
    );
    table
}

/// Iterative deepening: a fresh depth-first search per limit from 0 to
/// `max_depth`, stopping at the first limit that reaches every entry. If none
/// does, the table of the deepest search is returned.
pub(super) fn iddfs(subset: &PieceSubset, max_depth: u8) -> Vec<u8> {
    let expected = subset.cardinality();
    let solved = subset.project(&CubeState::solved());
    let mut table = empty_table(subset);
    for limit in 0..=max_depth {
        table.fill(UNPOPULATED);
        dfs_into(&mut table, subset, &solved, MoveLookback::default(), 0, limit);
        let populated = populated_count(&table);
        debug!(
            working!("IDDFS limit {} populated {} of {} entries"),
            limit, populated, expected
        );
        if populated == expected {
            break;
        }
    }
    table
}

/// A node is pruned when its entry already holds a depth no greater than its
/// own; any continuation from it was or will be explored from that earlier
/// node. Otherwise the entry is lowered to this depth and the node expanded.
fn dfs_into(
    table: &mut [u8],
    subset: &PieceSubset,
    state: &SubsetState,
    lookback: MoveLookback,
    depth: u8,
    limit: u8,
) {
    let entry = &mut table[subset.index_of(state) as usize];
    if *entry <= depth {
        return;
    }
    *entry = depth;
    if depth == limit {
        return;
    }
    for m in lookback.allowed_moves() {
        let next = subset.apply_move(state, m.index());
        dfs_into(table, subset, &next, lookback.after(m.face()), depth + 1, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cube::{ALL_MOVES, MoveSequence},
        pruning::{DfsDepthLimits, Orbit},
    };

    fn small_subsets() -> Vec<PieceSubset> {
        vec![
            PieceSubset::new(Orbit::Corners, vec![0]).unwrap(),
            PieceSubset::new(Orbit::Corners, vec![0, 1, 2]).unwrap(),
            PieceSubset::new(Orbit::Corners, vec![6, 3]).unwrap(),
            PieceSubset::new(Orbit::Edges, vec![0, 1, 2]).unwrap(),
            PieceSubset::new(Orbit::Edges, vec![11, 4]).unwrap(),
        ]
    }

    #[test]
    fn test_strategies_agree() {
        let limits = DfsDepthLimits::uniform(10);
        for subset in small_subsets() {
            let bfs_table = bfs(&subset);
            assert_eq!(populated_count(&bfs_table), subset.cardinality());
            assert_eq!(bfs_table[subset.index(&CubeState::solved()) as usize], 0);
            assert_eq!(dfs(&subset, limits.limit_for(&subset)), bfs_table);
            assert_eq!(iddfs(&subset, limits.iddfs_max_depth), bfs_table);
        }
    }

    #[test]
    fn test_single_moves() {
        let subset = PieceSubset::new(Orbit::Edges, vec![0, 5, 8]).unwrap();
        let table = bfs(&subset);
        let solved = subset.index(&CubeState::solved());
        for m in ALL_MOVES {
            let state = CubeState::solved().apply_move(m);
            let expected = u8::from(subset.index(&state) != solved);
            assert_eq!(table[subset.index(&state) as usize], expected);
        }
    }

    #[test]
    fn test_shallow_dfs_is_incomplete() {
        let subset = PieceSubset::new(Orbit::Corners, vec![0, 1, 2]).unwrap();
        assert!(populated_count(&dfs(&subset, 2)) < subset.cardinality());
        assert!(populated_count(&iddfs(&subset, 2)) < subset.cardinality());
    }

    #[test]
    fn test_complete_orbit_drops_implied_orientation() {
        // Generating the full corner orbit is slow, but the implied
        // orientation can be checked on its index alone
        let subset = PieceSubset::new(Orbit::Corners, (0..8).collect()).unwrap();
        let state = CubeState::solved().apply_moves(&"R U F".parse::<MoveSequence>().unwrap());
        let projected = subset.project(&state);
        let mut twisted = projected;
        twisted.orientations[7] = (twisted.orientations[7] + 1) % 3;
        assert_eq!(subset.index_of(&projected), subset.index_of(&twisted));
    }
}
