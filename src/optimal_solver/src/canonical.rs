//! Two-move lookback pruning, shared by every search and table generator.
//!
//! A move is redundant if it turns the same face as the move before it
//! (`R R'` collapses into nothing, `R R` into `R2`), or if it turns the face of
//! the move two back while the move in between turned the opposite face
//! (`R L R` is `R2 L`). Opposite faces commute, so the latter is the only way a
//! face can reappear after a single intervening move without being reducible.

use crate::cube::{ALL_MOVES, Face, Move};

/// The set of faces that may not be turned next, as a bitvector indexed by
/// `Face::index`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveLookback(u8);

impl MoveLookback {
    /// Build the lookback state that follows a move sequence.
    #[must_use]
    pub fn from_moves(moves: &[Move]) -> Self {
        moves
            .iter()
            .fold(Self::default(), |lookback, m| lookback.after(m.face()))
    }

    #[must_use]
    pub fn allows(self, face: Face) -> bool {
        self.0 & face.bit() == 0
    }

    /// The lookback state after turning `face`.
    #[must_use]
    pub fn after(self, face: Face) -> Self {
        let antipode = face.opposite();
        if self.0 & antipode.bit() != 0 {
            // The antipode was turned right before this face, so neither may
            // be turned again until something else is
            Self(face.bit() | antipode.bit())
        } else {
            Self(face.bit())
        }
    }

    /// Every move allowed next, in `ALL_MOVES` order.
    pub fn allowed_moves(self) -> impl Iterator<Item = Move> {
        ALL_MOVES
            .into_iter()
            .filter(move |m| self.allows(m.face()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::MoveSequence;

    fn lookback(moves: &str) -> MoveLookback {
        MoveLookback::from_moves(&moves.parse::<MoveSequence>().unwrap())
    }

    #[test]
    fn test_initially_all_legal() {
        assert_eq!(MoveLookback::default().allowed_moves().count(), 18);
    }

    #[test]
    fn test_prevents_self() {
        for face in Face::ALL {
            let after = MoveLookback::default().after(face);
            assert!(!after.allows(face));
            assert_eq!(after.allowed_moves().count(), 15);
        }
    }

    #[test]
    fn test_prevents_self_and_antipode() {
        let after = lookback("D U");
        assert!(!after.allows(Face::U));
        assert!(!after.allows(Face::D));
        assert!(after.allows(Face::R));
        assert_eq!(after.allowed_moves().count(), 12);

        let after = lookback("L2 R'");
        assert!(!after.allows(Face::L));
        assert!(!after.allows(Face::R));
    }

    #[test]
    fn test_only_looks_back_two_moves() {
        let after = lookback("D U R");
        assert!(after.allows(Face::U));
        assert!(after.allows(Face::D));
        assert!(!after.allows(Face::R));

        // Non-opposite faces never block the second previous face
        let after = lookback("U R");
        assert!(after.allows(Face::U));
    }

    #[test]
    fn test_sequence_counts() {
        // 18 * 15 sequences of length two, and of the 3-move sequences, those
        // of the form X X' X with X and X' opposite faces are pruned
        let mut counts = [0_usize; 4];
        let mut stack = vec![(MoveLookback::default(), 0)];
        while let Some((lookback, depth)) = stack.pop() {
            counts[depth] += 1;
            if depth < 3 {
                for m in lookback.allowed_moves() {
                    stack.push((lookback.after(m.face()), depth + 1));
                }
            }
        }
        assert_eq!(counts[1], 18);
        assert_eq!(counts[2], 270);
        // 216 pairs of different axes each allow 15 third moves, 54 pairs on
        // the same axis allow 12
        assert_eq!(counts[3], 216 * 15 + 54 * 12);
    }
}
