//! The structure and state of the 3x3x3 cube.
//!
//! The state is represented by four properties: corner permutation, corner
//! orientation, edge permutation, and edge orientation. A tuple of these four
//! properties (with correct parity relations) uniquely determines the state of
//! the cube. The six centers never move and are left implicit.
//!
//! The order of the slots is as follows:
//! - Corners: URF UFL ULB UBR DFR DLF DBL DRB
//! - Edges: UR UF UL UB DR DF DL DB FR FL BL BR

use crate::canonical::MoveLookback;
use std::{
    fmt::{self, Display},
    ops::{Deref, DerefMut},
    str::FromStr,
};
use thiserror::Error;

pub const CORNERS: usize = 8;
pub const EDGES: usize = 12;
pub const CORNER_ORIENTATIONS: u8 = 3;
pub const EDGE_ORIENTATIONS: u8 = 2;

pub const CORNER_NAMES: [&str; CORNERS] = ["URF", "UFL", "ULB", "UBR", "DFR", "DLF", "DBL", "DRB"];
pub const EDGE_NAMES: [&str; EDGES] = [
    "UR", "UF", "UL", "UB", "DR", "DF", "DL", "DB", "FR", "FL", "BL", "BR",
];

/// The six faces of the cube. The declaration order is also the facelet
/// order, and opposite faces are exactly three apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 3) % 6]
    }

    pub(crate) const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How far a face is turned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Turn {
    /// 90 degrees clockwise
    Clockwise,
    /// 180 degrees
    Half,
    /// 270 degrees clockwise, or 90 degrees counter-clockwise
    CounterClockwise,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Clockwise, Turn::Half, Turn::CounterClockwise];

    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::Half => Turn::Half,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }

    /// The number of clockwise quarter turns this turn amounts to.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self as u8 + 1
    }
}

/// One of the 18 face turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    face: Face,
    turn: Turn,
}

/// Every move, in face-major order so that `ALL_MOVES[m.index()] == m`.
pub const ALL_MOVES: [Move; 18] = {
    let mut arr = [Move::new(Face::U, Turn::Clockwise); 18];
    let mut i = 0;
    while i < 18 {
        arr[i] = Move::new(Face::ALL[i / 3], Turn::ALL[i % 3]);
        i += 1;
    }
    arr
};

impl Move {
    #[must_use]
    pub const fn new(face: Face, turn: Turn) -> Self {
        Self { face, turn }
    }

    #[must_use]
    pub const fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub const fn turn(self) -> Turn {
        self.turn
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.face as usize * 3 + self.turn as usize
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::new(self.face, self.turn.inverse())
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn {
            Turn::Clockwise => write!(f, "{}", self.face),
            Turn::Half => write!(f, "{}2", self.face),
            Turn::CounterClockwise => write!(f, "{}'", self.face),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid move token: {0:?}")]
pub struct ParseMoveError(String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face = match chars.next() {
            Some('U') => Face::U,
            Some('R') => Face::R,
            Some('F') => Face::F,
            Some('D') => Face::D,
            Some('L') => Face::L,
            Some('B') => Face::B,
            _ => return Err(ParseMoveError(s.to_owned())),
        };
        let turn = match chars.as_str() {
            "" | "1" => Turn::Clockwise,
            "2" | "2'" => Turn::Half,
            "'" | "3" => Turn::CounterClockwise,
            _ => return Err(ParseMoveError(s.to_owned())),
        };
        Ok(Move::new(face, turn))
    }
}

/// A struct representing sequences of moves, used for representing
/// scramble sequences and solution sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveSequence(Vec<Move>);

impl MoveSequence {
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    /// The sequence that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self(self.iter().rev().map(|m| m.inverse()).collect())
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Move> {
        self.0
    }
}

impl Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for m in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{m}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for MoveSequence {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl Deref for MoveSequence {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveSequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CubeStateError {
    #[error("Corner piece {0} is out of range, expected a value below 8")]
    CornerOutOfRange(u8),
    #[error("Corner orientation {0} is out of range, expected a value below 3")]
    CornerOrientationOutOfRange(u8),
    #[error("Edge piece {0} is out of range, expected a value below 12")]
    EdgeOutOfRange(u8),
    #[error("Edge orientation {0} is out of range, expected a value below 2")]
    EdgeOrientationOutOfRange(u8),
}

/// The underlying struct for representing a configuration of the cube.
///
/// `cp[i]` is the corner piece occupying slot `i` and `co[i]` its orientation;
/// `ep` and `eo` are the same for edges.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct CubeState {
    cp: [u8; CORNERS],
    co: [u8; CORNERS],
    ep: [u8; EDGES],
    eo: [u8; EDGES],
}

const SOLVED: CubeState = CubeState {
    cp: [0, 1, 2, 3, 4, 5, 6, 7],
    co: [0; CORNERS],
    ep: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    eo: [0; EDGES],
};

/// The clockwise quarter turns of U R F D L B, in "is replaced by" form: after
/// the turn, slot `i` holds the piece that was in slot `cp[i]`, twisted by
/// `co[i]`.
const QUARTER_TURNS: [CubeState; 6] = [
    // U
    CubeState {
        cp: [3, 0, 1, 2, 4, 5, 6, 7],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // R
    CubeState {
        cp: [4, 1, 2, 0, 7, 5, 6, 3],
        co: [2, 0, 0, 1, 1, 0, 0, 2],
        ep: [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // F
    CubeState {
        cp: [1, 5, 2, 3, 0, 4, 6, 7],
        co: [1, 2, 0, 0, 2, 1, 0, 0],
        ep: [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
        eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubeState {
        cp: [0, 1, 2, 3, 5, 6, 7, 4],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // L
    CubeState {
        cp: [0, 2, 6, 3, 4, 1, 5, 7],
        co: [0, 1, 2, 0, 0, 2, 1, 0],
        ep: [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // B
    CubeState {
        cp: [0, 1, 3, 7, 4, 5, 2, 6],
        co: [0, 0, 1, 2, 0, 0, 2, 1],
        ep: [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
        eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

/// The effect of every move on the solved cube, indexed by `Move::index`.
pub(crate) const MOVE_TABLE: [CubeState; 18] = {
    let mut arr = [SOLVED; 18];
    let mut face = 0;
    while face < 6 {
        let quarter = QUARTER_TURNS[face];
        let half = compose(&quarter, &quarter);
        arr[face * 3] = quarter;
        arr[face * 3 + 1] = half;
        arr[face * 3 + 2] = compose(&half, &quarter);
        face += 1;
    }
    arr
};

/// Apply `b` after `a`.
const fn compose(a: &CubeState, b: &CubeState) -> CubeState {
    let mut result = SOLVED;
    let mut i = 0;
    while i < CORNERS {
        let from = b.cp[i] as usize;
        result.cp[i] = a.cp[from];
        result.co[i] = (a.co[from] + b.co[i]) % CORNER_ORIENTATIONS;
        i += 1;
    }
    let mut i = 0;
    while i < EDGES {
        let from = b.ep[i] as usize;
        result.ep[i] = a.ep[from];
        result.eo[i] = (a.eo[from] + b.eo[i]) % EDGE_ORIENTATIONS;
        i += 1;
    }
    result
}

impl Default for CubeState {
    fn default() -> CubeState {
        SOLVED
    }
}

impl CubeState {
    #[must_use]
    pub const fn solved() -> Self {
        SOLVED
    }

    /// Create a state from raw piece data. Values are range checked, but
    /// duplicated or missing pieces are accepted; whether such a state is
    /// well formed is answered by [`CubeState::is_correctly_stickered`].
    ///
    /// # Errors
    ///
    /// If a piece or orientation value is out of range. See `CubeStateError`.
    pub fn from_pieces(
        cp: [u8; CORNERS],
        co: [u8; CORNERS],
        ep: [u8; EDGES],
        eo: [u8; EDGES],
    ) -> Result<Self, CubeStateError> {
        if let Some(&corner) = cp.iter().find(|&&c| c as usize >= CORNERS) {
            return Err(CubeStateError::CornerOutOfRange(corner));
        }
        if let Some(&ori) = co.iter().find(|&&o| o >= CORNER_ORIENTATIONS) {
            return Err(CubeStateError::CornerOrientationOutOfRange(ori));
        }
        if let Some(&edge) = ep.iter().find(|&&e| e as usize >= EDGES) {
            return Err(CubeStateError::EdgeOutOfRange(edge));
        }
        if let Some(&ori) = eo.iter().find(|&&o| o >= EDGE_ORIENTATIONS) {
            return Err(CubeStateError::EdgeOrientationOutOfRange(ori));
        }
        Ok(Self { cp, co, ep, eo })
    }

    /// Create a state from piece data already known to be in range.
    pub(crate) const fn from_pieces_unchecked(
        cp: [u8; CORNERS],
        co: [u8; CORNERS],
        ep: [u8; EDGES],
        eo: [u8; EDGES],
    ) -> Self {
        Self { cp, co, ep, eo }
    }

    /// Applies a move, leaving `self` untouched.
    #[must_use]
    pub fn apply_move(&self, m: Move) -> Self {
        compose(self, &MOVE_TABLE[m.index()])
    }

    /// Applies a move in place.
    pub fn apply_move_mut(&mut self, m: Move) {
        *self = compose(self, &MOVE_TABLE[m.index()]);
    }

    /// Applies a sequence of moves, in order.
    #[must_use]
    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        moves.iter().fold(*self, |acc, &m| acc.apply_move(m))
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == SOLVED
    }

    #[must_use]
    pub const fn corner_permutation(&self) -> &[u8; CORNERS] {
        &self.cp
    }

    #[must_use]
    pub const fn corner_orientation(&self) -> &[u8; CORNERS] {
        &self.co
    }

    #[must_use]
    pub const fn edge_permutation(&self) -> &[u8; EDGES] {
        &self.ep
    }

    #[must_use]
    pub const fn edge_orientation(&self) -> &[u8; EDGES] {
        &self.eo
    }

    /// The (slot, orientation) of a corner piece, or `None` if the piece is
    /// missing from a malformed state.
    #[must_use]
    pub fn corner_slot(&self, piece: u8) -> Option<(u8, u8)> {
        let slot = self.cp.iter().position(|&c| c == piece)?;
        Some((slot as u8, self.co[slot]))
    }

    /// The (slot, orientation) of an edge piece, or `None` if the piece is
    /// missing from a malformed state.
    #[must_use]
    pub fn edge_slot(&self, piece: u8) -> Option<(u8, u8)> {
        let slot = self.ep.iter().position(|&e| e == piece)?;
        Some((slot as u8, self.eo[slot]))
    }
}

/// Return a random walk of `length` moves from the solved state. Moves
/// rejected by the two-move lookback are never drawn, so the walk never
/// trivially cancels itself.
#[must_use]
pub fn random_scramble(length: usize) -> MoveSequence {
    let mut lookback = MoveLookback::default();
    let mut moves = Vec::with_capacity(length);
    while moves.len() < length {
        let m = ALL_MOVES[fastrand::usize(..ALL_MOVES.len())];
        if lookback.allows(m.face()) {
            lookback = lookback.after(m.face());
            moves.push(m);
        }
    }
    MoveSequence(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(moves: &str) -> MoveSequence {
        moves.parse().unwrap()
    }

    #[test]
    fn test_move_indices_are_dense() {
        for (i, m) in ALL_MOVES.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_opposite_faces() {
        assert_eq!(Face::U.opposite(), Face::D);
        assert_eq!(Face::R.opposite(), Face::L);
        assert_eq!(Face::F.opposite(), Face::B);
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn test_move_notation() {
        let sequence = parse("R U' F2 D L2 B'");
        assert_eq!(sequence.len(), 6);
        assert_eq!(sequence[1], Move::new(Face::U, Turn::CounterClockwise));
        assert_eq!(sequence.to_string(), "R U' F2 D L2 B'");
        assert!("X".parse::<Move>().is_err());
        assert!("R4".parse::<Move>().is_err());
    }

    #[test]
    fn test_inverse_undoes_every_move() {
        let scramble = parse("F2 L' U2 F U F U L' B U' F' U D2 L F2 B'");
        let state = CubeState::solved().apply_moves(&scramble);
        for m in ALL_MOVES {
            assert_eq!(state.apply_move(m).apply_move(m.inverse()), state);
        }
    }

    #[test]
    fn test_quarter_turn_has_order_four() {
        let state = CubeState::solved().apply_moves(&parse("R U R' U'"));
        for face in Face::ALL {
            let m = Move::new(face, Turn::Clockwise);
            let mut result = state;
            for _ in 0..4 {
                result = result.apply_move(m);
            }
            assert_eq!(result, state);
        }
    }

    #[test]
    fn test_turns_agree_with_repeated_quarter_turns() {
        let state = CubeState::solved().apply_moves(&parse("B2 U' B' D B' L' D'"));
        for face in Face::ALL {
            let quarter = Move::new(face, Turn::Clockwise);
            let twice = state.apply_move(quarter).apply_move(quarter);
            assert_eq!(twice, state.apply_move(Move::new(face, Turn::Half)));
            assert_eq!(
                twice.apply_move(quarter),
                state.apply_move(Move::new(face, Turn::CounterClockwise))
            );
        }
    }

    #[test]
    fn test_apply_move_is_non_destructive() {
        let state = CubeState::solved().apply_moves(&parse("L F R"));
        let before = state;
        let _ = state.apply_move(Move::new(Face::D, Turn::Half));
        assert_eq!(state, before);
    }

    #[test]
    fn test_destructive_apply_matches() {
        let scramble = parse("U2 L B L2 F U2 B' U2 R U' F R' F' R F' L' U2");
        let mut state = CubeState::solved();
        for &m in scramble.iter() {
            let expected = state.apply_move(m);
            state.apply_move_mut(m);
            assert_eq!(state, expected);
        }
        assert_eq!(state, CubeState::solved().apply_moves(&scramble));
    }

    #[test]
    fn test_solved() {
        assert!(CubeState::solved().is_solved());
        for m in ALL_MOVES {
            assert!(!CubeState::solved().apply_move(m).is_solved());
        }
    }

    #[test]
    fn test_many_compositions() {
        // (R F) has order 105
        let sequence = parse("R F");
        let mut state = CubeState::solved();
        for _ in 0..105 {
            state = state.apply_moves(&sequence);
        }
        assert!(state.is_solved());
    }

    #[test]
    fn test_sequence_inverse() {
        let scramble = parse("R' U2 R' U2 F' D' L F L2 F U2 F2 D' L' D2 F R2");
        let state = CubeState::solved().apply_moves(&scramble);
        assert!(state.apply_moves(&scramble.inverse()).is_solved());
    }

    #[test]
    fn test_from_pieces_range_checks() {
        let solved = CubeState::solved();
        let mut cp = *solved.corner_permutation();
        cp[0] = 8;
        assert_eq!(
            CubeState::from_pieces(cp, [0; 8], *solved.edge_permutation(), [0; 12]),
            Err(CubeStateError::CornerOutOfRange(8))
        );
        let mut eo = [0; 12];
        eo[3] = 2;
        assert_eq!(
            CubeState::from_pieces(
                *solved.corner_permutation(),
                [0; 8],
                *solved.edge_permutation(),
                eo
            ),
            Err(CubeStateError::EdgeOrientationOutOfRange(2))
        );
    }

    #[test]
    fn test_piece_slots() {
        let state = CubeState::solved().apply_move(Move::new(Face::U, Turn::Clockwise));
        // U carries the URF corner into the UFL slot
        assert_eq!(state.corner_slot(0), Some((1, 0)));
        assert_eq!(state.edge_slot(0), Some((1, 0)));
        assert_eq!(state.corner_slot(4), Some((4, 0)));
    }

    #[test]
    fn test_random_scramble_respects_lookback() {
        for _ in 0..20 {
            let scramble = random_scramble(25);
            assert_eq!(scramble.len(), 25);
            let mut lookback = MoveLookback::default();
            for m in scramble.iter() {
                assert!(lookback.allows(m.face()));
                lookback = lookback.after(m.face());
            }
        }
    }
}
