use crate::cube::{CubeState, Move};

/// The states along the current IDA* path, root first. The buffer only ever
/// grows so deeper iterations reuse it.
pub(crate) struct StateHistory {
    stack: Vec<(CubeState, Option<Move>)>,
    stack_pointer: usize,
}

impl StateHistory {
    pub(crate) fn new(root: CubeState) -> Self {
        Self {
            stack: vec![(root, None)],
            stack_pointer: 0,
        }
    }

    /// Start over from a new root state.
    pub(crate) fn reset(&mut self, root: CubeState) {
        self.stack[0] = (root, None);
        self.stack_pointer = 0;
    }

    /// Resize the underlying buffer capacity if needed.
    pub(crate) fn resize_if_needed(&mut self, max_stack_pointer: usize) {
        if self.stack.len() <= max_stack_pointer {
            let root = self.stack[0].0;
            self.stack.resize(max_stack_pointer + 1, (root, None));
        }
    }

    /// Push the state reached by applying `m` to the last state. The state is
    /// passed in since the caller already computed it to evaluate it.
    pub(crate) fn push_stack(&mut self, state: CubeState, m: Move) {
        debug_assert_eq!(
            self.stack[self.stack_pointer].0.apply_move(m),
            state,
            "pushed state must follow from the last state"
        );
        self.stack_pointer += 1;
        self.stack[self.stack_pointer] = (state, Some(m));
    }

    /// Pop the last state from the stack.
    pub(crate) fn pop_stack(&mut self) {
        debug_assert!(self.stack_pointer > 0);
        self.stack_pointer -= 1;
    }

    /// The number of moves from the root to the last state.
    pub(crate) fn depth(&self) -> usize {
        self.stack_pointer
    }

    pub(crate) fn last_state(&self) -> &CubeState {
        &self.stack[self.stack_pointer].0
    }

    /// Create a new move history from the current state of the stack.
    pub(crate) fn create_move_history(&self) -> Vec<Move> {
        self.stack[1..=self.stack_pointer]
            .iter()
            .filter_map(|&(_, m)| m)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::MoveSequence;

    #[test]
    fn test_push_pop() {
        let moves: MoveSequence = "R U2 F'".parse().unwrap();
        let mut history = StateHistory::new(CubeState::solved());
        history.resize_if_needed(moves.len());
        let mut state = CubeState::solved();
        for &m in moves.iter() {
            state = state.apply_move(m);
            history.push_stack(state, m);
        }
        assert_eq!(history.depth(), 3);
        assert_eq!(*history.last_state(), state);
        assert_eq!(history.create_move_history(), moves.clone().into_inner());

        history.pop_stack();
        assert_eq!(history.depth(), 2);
        assert_eq!(
            *history.last_state(),
            CubeState::solved().apply_moves(&moves[..2])
        );
        assert_eq!(history.create_move_history(), moves[..2].to_vec());

        history.reset(state);
        assert_eq!(history.depth(), 0);
        assert_eq!(*history.last_state(), state);
        assert!(history.create_move_history().is_empty());
    }
}
