use crate::{
    canonical::MoveLookback,
    cube::{CubeState, Move, MoveSequence},
};

/// One search path: the move that ended it, the path it extends, and the
/// state it leads to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PathNode {
    parent: Option<usize>,
    last_move: Option<Move>,
    state: CubeState,
    lookback: MoveLookback,
    length: u8,
}

impl PathNode {
    pub(crate) fn state(&self) -> &CubeState {
        &self.state
    }

    pub(crate) fn lookback(&self) -> MoveLookback {
        self.lookback
    }

    pub(crate) fn length(&self) -> u8 {
        self.length
    }
}

/// Every path a best-first search has generated, stored by parent index so
/// that extending a path is O(1) and shares its prefix.
#[derive(Debug, Default)]
pub(crate) struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Add the empty path starting at `state`.
    pub(crate) fn push_root(&mut self, state: CubeState) -> usize {
        self.nodes.push(PathNode {
            parent: None,
            last_move: None,
            state,
            lookback: MoveLookback::default(),
            length: 0,
        });
        self.nodes.len() - 1
    }

    /// Add the path `parent` followed by `m`, which leads to `state`.
    pub(crate) fn extend(&mut self, parent: usize, m: Move, state: CubeState) -> usize {
        let parent_node = &self.nodes[parent];
        let node = PathNode {
            parent: Some(parent),
            last_move: Some(m),
            state,
            lookback: parent_node.lookback.after(m.face()),
            length: parent_node.length + 1,
        };
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub(crate) fn node(&self, index: usize) -> &PathNode {
        &self.nodes[index]
    }

    /// The moves of the path ending at `index`, root first.
    pub(crate) fn moves(&self, index: usize) -> MoveSequence {
        let mut moves = Vec::with_capacity(self.nodes[index].length as usize);
        let mut current = Some(index);
        while let Some(i) = current {
            let node = &self.nodes[i];
            moves.extend(node.last_move);
            current = node.parent;
        }
        moves.reverse();
        MoveSequence::new(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_prefixes() {
        let mut arena = PathArena::default();
        let root = arena.push_root(CubeState::solved());
        let moves: MoveSequence = "F R' D2".parse().unwrap();
        let mut tip = root;
        let mut state = CubeState::solved();
        for &m in moves.iter() {
            state = state.apply_move(m);
            tip = arena.extend(tip, m, state);
        }
        let b2 = "B2".parse().unwrap();
        let branch = arena.extend(1, b2, arena.node(1).state().apply_move(b2));

        assert_eq!(arena.len(), 5);
        assert_eq!(arena.moves(tip), moves);
        assert_eq!(arena.node(tip).length(), 3);
        assert_eq!(*arena.node(tip).state(), state);
        assert_eq!(arena.moves(branch).to_string(), "F B2");
        assert!(!arena.node(branch).lookback().allows(crate::cube::Face::B));
        assert!(arena.moves(root).is_empty());
    }
}
