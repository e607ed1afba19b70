//! Whether a configuration can be solved by face turns at all.
//!
//! Exactly one in twelve well-formed configurations is reachable: corner and
//! edge permutations must share a parity, corner twists must sum to zero
//! modulo 3, and edge flips must sum to zero modulo 2.

use crate::{
    codec::permutation_parity,
    cube::{CORNER_ORIENTATIONS, CubeState, EDGE_ORIENTATIONS},
    facelets::{Color, Cubie, FaceletCube},
};

/// Whether every color appears nine times, the centers are distinct, and
/// every corner and edge of the cube appears exactly once.
#[must_use]
pub fn is_correctly_stickered(cube: &FaceletCube) -> bool {
    let mut counts = [0_u8; 6];
    for color in cube.colors() {
        counts[color.index()] += 1;
    }
    if counts.iter().any(|&count| count != 9) {
        return false;
    }

    let mut centers = 0_u8;
    for cubie in cube.cubies() {
        if let Cubie::Center(tile) = cubie {
            centers |= 1 << tile.color.index();
        }
    }
    if centers.count_ones() != Color::ALL.len() as u32 {
        return false;
    }

    let cubies = cube.cubies().collect::<Vec<_>>();
    cube.home_colors()
        .all(|home| cubies.iter().filter(|cubie| cubie.same_piece(&home)).count() == 1)
}

/// Whether the cube is well formed and reachable from the solved state.
#[must_use]
pub fn is_solvable(cube: &FaceletCube) -> bool {
    is_correctly_stickered(cube)
        && CubeState::try_from(cube).is_ok_and(|state| state.is_solvable())
}

impl CubeState {
    /// Whether every corner and every edge appears exactly once.
    #[must_use]
    pub fn is_correctly_stickered(&self) -> bool {
        let corners = self
            .corner_permutation()
            .iter()
            .fold(0_u32, |seen, &c| seen | 1 << c);
        let edges = self
            .edge_permutation()
            .iter()
            .fold(0_u32, |seen, &e| seen | 1 << e);
        corners == (1 << self.corner_permutation().len()) - 1
            && edges == (1 << self.edge_permutation().len()) - 1
    }

    /// Whether the state is well formed and reachable from the solved state.
    #[must_use]
    pub fn is_solvable(&self) -> bool {
        let twist: u32 = self.corner_orientation().iter().map(|&o| u32::from(o)).sum();
        let flip: u32 = self.edge_orientation().iter().map(|&o| u32::from(o)).sum();
        self.is_correctly_stickered()
            && permutation_parity(self.corner_permutation())
                == permutation_parity(self.edge_permutation())
            && twist % u32::from(CORNER_ORIENTATIONS) == 0
            && flip % u32::from(EDGE_ORIENTATIONS) == 0
    }
}
