//! The sticker form of the cube: 54 colored facelets, with a move table of its
//! own derived from the piece form so that the two always agree.
//!
//! Facelets are numbered face by face in the order U R F D L B, each face
//! row-major as seen when looking straight at it with U (or F for U and D)
//! facing up. Facelet 4 of every face is its center.

use crate::cube::{CORNERS, CubeState, EDGES, Face, MOVE_TABLE, Move};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error;

pub const FACELETS: usize = 54;

/// The facelets of each corner slot, listed clockwise starting from the
/// sticker on the U or D face.
pub(crate) const CORNER_FACELETS: [[u8; 3]; CORNERS] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];

/// The facelets of each edge slot, the first being the one on the U or D face
/// or, for the middle layer, on the F or B face.
pub(crate) const EDGE_FACELETS: [[u8; 2]; EDGES] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

/// The home faces of each corner piece, in the order of `CORNER_FACELETS`.
pub(crate) const CORNER_FACES: [[Face; 3]; CORNERS] = [
    [Face::U, Face::R, Face::F],
    [Face::U, Face::F, Face::L],
    [Face::U, Face::L, Face::B],
    [Face::U, Face::B, Face::R],
    [Face::D, Face::F, Face::R],
    [Face::D, Face::L, Face::F],
    [Face::D, Face::B, Face::L],
    [Face::D, Face::R, Face::B],
];

/// The home faces of each edge piece, in the order of `EDGE_FACELETS`.
pub(crate) const EDGE_FACES: [[Face; 2]; EDGES] = [
    [Face::U, Face::R],
    [Face::U, Face::F],
    [Face::U, Face::L],
    [Face::U, Face::B],
    [Face::D, Face::R],
    [Face::D, Face::F],
    [Face::D, Face::L],
    [Face::D, Face::B],
    [Face::F, Face::R],
    [Face::F, Face::L],
    [Face::B, Face::L],
    [Face::B, Face::R],
];

/// Sticker colors. In the solved state of the standard color scheme each
/// color sits on the face of the same index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Red,
    Green,
    Yellow,
    Orange,
    Blue,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Blue,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The color of `face` in the solved state.
    #[must_use]
    pub const fn of_face(face: Face) -> Self {
        Self::ALL[face.index()]
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Blue => 'B',
        }
    }

    fn from_letter(letter: char) -> Result<Self, FaceletError> {
        Color::ALL
            .into_iter()
            .find(|color| color.letter() == letter)
            .ok_or(FaceletError::InvalidColor(letter))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FaceletError {
    #[error("Expected {FACELETS} facelets, found {0}")]
    InvalidLength(usize),
    #[error("Invalid color letter {0:?}, expected one of W R G Y O B")]
    InvalidColor(char),
    #[error("The six centers must have six different colors")]
    DuplicateCenters,
    #[error("The stickers in corner slot {0} do not form a corner piece")]
    UnidentifiedCorner(usize),
    #[error("The stickers in edge slot {0} do not form an edge piece")]
    UnidentifiedEdge(usize),
}

/// The permutation of the facelets a move performs: after the move, facelet
/// `x` shows what facelet `perm[x]` showed before.
const fn facelet_permutation(state: &CubeState) -> [u8; FACELETS] {
    let mut perm = [0; FACELETS];
    let mut x = 0;
    while x < FACELETS {
        perm[x] = x as u8;
        x += 1;
    }
    let cp = state.corner_permutation();
    let co = state.corner_orientation();
    let mut i = 0;
    while i < CORNERS {
        let from = cp[i] as usize;
        let mut n = 0;
        while n < 3 {
            perm[CORNER_FACELETS[i][(n + co[i] as usize) % 3] as usize] = CORNER_FACELETS[from][n];
            n += 1;
        }
        i += 1;
    }
    let ep = state.edge_permutation();
    let eo = state.edge_orientation();
    let mut i = 0;
    while i < EDGES {
        let from = ep[i] as usize;
        let mut n = 0;
        while n < 2 {
            perm[EDGE_FACELETS[i][(n + eo[i] as usize) % 2] as usize] = EDGE_FACELETS[from][n];
            n += 1;
        }
        i += 1;
    }
    perm
}

const FACELET_MOVES: [[u8; FACELETS]; 18] = {
    let mut tables = [[0; FACELETS]; 18];
    let mut m = 0;
    while m < 18 {
        tables[m] = facelet_permutation(&MOVE_TABLE[m]);
        m += 1;
    }
    tables
};

/// A cube described by its stickers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceletCube {
    facelets: [Color; FACELETS],
}

impl Default for FaceletCube {
    fn default() -> Self {
        Self::solved()
    }
}

impl FaceletCube {
    #[must_use]
    pub const fn solved() -> Self {
        let mut facelets = [Color::White; FACELETS];
        let mut x = 0;
        while x < FACELETS {
            facelets[x] = Color::ALL[x / 9];
            x += 1;
        }
        Self { facelets }
    }

    #[must_use]
    pub const fn from_colors(facelets: [Color; FACELETS]) -> Self {
        Self { facelets }
    }

    #[must_use]
    pub const fn colors(&self) -> &[Color; FACELETS] {
        &self.facelets
    }

    #[must_use]
    pub fn center(&self, face: Face) -> Color {
        self.facelets[face.index() * 9 + 4]
    }

    #[must_use]
    pub fn apply_move(&self, m: Move) -> Self {
        let perm = &FACELET_MOVES[m.index()];
        Self {
            facelets: std::array::from_fn(|x| self.facelets[perm[x] as usize]),
        }
    }

    #[must_use]
    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        moves.iter().fold(*self, |acc, &m| acc.apply_move(m))
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.facelets
            .chunks_exact(9)
            .all(|face| face.iter().all(|&color| color == face[4]))
    }

    /// The face each color belongs to, as decided by the centers, or `None`
    /// if two centers share a color.
    fn faces_by_color(&self) -> Option<[Face; 6]> {
        let mut faces = [None; 6];
        for face in Face::ALL {
            let slot = &mut faces[self.center(face).index()];
            if slot.is_some() {
                return None;
            }
            *slot = Some(face);
        }
        let mut resolved = [Face::U; 6];
        for (slot, face) in resolved.iter_mut().zip(faces) {
            *slot = face?;
        }
        Some(resolved)
    }

    /// The colors that the pieces of this cube carry when solved, as decided
    /// by the centers.
    pub(crate) fn home_colors(&self) -> impl Iterator<Item = Cubie> + '_ {
        let home = |face: Face| self.center(face);
        let edges = (0..EDGES).map(move |i| {
            Cubie::Edge(std::array::from_fn(|n| Tile {
                position: EDGE_FACELETS[i][n],
                color: home(EDGE_FACES[i][n]),
            }))
        });
        let corners = (0..CORNERS).map(move |i| {
            Cubie::Corner(std::array::from_fn(|n| Tile {
                position: CORNER_FACELETS[i][n],
                color: home(CORNER_FACES[i][n]),
            }))
        });
        edges.chain(corners)
    }

    fn tile(&self, position: u8) -> Tile {
        Tile {
            position,
            color: self.facelets[position as usize],
        }
    }

    /// All 26 visible cubies: the six centers, then the twelve edges and the
    /// eight corners in slot order.
    pub fn cubies(&self) -> impl Iterator<Item = Cubie> + '_ {
        let centers = Face::ALL
            .into_iter()
            .map(|face| Cubie::Center(self.tile(face.index() as u8 * 9 + 4)));
        let edges = EDGE_FACELETS
            .iter()
            .map(|positions| Cubie::Edge(positions.map(|position| self.tile(position))));
        let corners = CORNER_FACELETS
            .iter()
            .map(|positions| Cubie::Corner(positions.map(|position| self.tile(position))));
        centers.chain(edges).chain(corners)
    }
}

impl From<&CubeState> for FaceletCube {
    fn from(state: &CubeState) -> Self {
        let mut facelets = Self::solved().facelets;
        let (cp, co) = (state.corner_permutation(), state.corner_orientation());
        for i in 0..CORNERS {
            for n in 0..3 {
                let position = CORNER_FACELETS[i][(n + co[i] as usize) % 3];
                facelets[position as usize] = Color::of_face(CORNER_FACES[cp[i] as usize][n]);
            }
        }
        let (ep, eo) = (state.edge_permutation(), state.edge_orientation());
        for i in 0..EDGES {
            for n in 0..2 {
                let position = EDGE_FACELETS[i][(n + eo[i] as usize) % 2];
                facelets[position as usize] = Color::of_face(EDGE_FACES[ep[i] as usize][n]);
            }
        }
        Self { facelets }
    }
}

impl TryFrom<&FaceletCube> for CubeState {
    type Error = FaceletError;

    fn try_from(cube: &FaceletCube) -> Result<Self, Self::Error> {
        let faces_by_color = cube.faces_by_color().ok_or(FaceletError::DuplicateCenters)?;
        let face_at = |position: u8| faces_by_color[cube.facelets[position as usize].index()];

        let mut cp = [0; CORNERS];
        let mut co = [0; CORNERS];
        for (i, positions) in CORNER_FACELETS.iter().enumerate() {
            let faces = positions.map(face_at);
            let ori = faces
                .iter()
                .position(|&face| face == Face::U || face == Face::D)
                .ok_or(FaceletError::UnidentifiedCorner(i))?;
            let piece = CORNER_FACES
                .iter()
                .position(|home| {
                    home[0] == faces[ori]
                        && home[1] == faces[(ori + 1) % 3]
                        && home[2] == faces[(ori + 2) % 3]
                })
                .ok_or(FaceletError::UnidentifiedCorner(i))?;
            cp[i] = piece as u8;
            co[i] = ori as u8;
        }

        let mut ep = [0; EDGES];
        let mut eo = [0; EDGES];
        for (i, positions) in EDGE_FACELETS.iter().enumerate() {
            let faces = positions.map(face_at);
            let (piece, ori) = EDGE_FACES
                .iter()
                .enumerate()
                .find_map(|(piece, home)| {
                    if *home == faces {
                        Some((piece, 0))
                    } else if *home == [faces[1], faces[0]] {
                        Some((piece, 1))
                    } else {
                        None
                    }
                })
                .ok_or(FaceletError::UnidentifiedEdge(i))?;
            ep[i] = piece as u8;
            eo[i] = ori;
        }

        Ok(CubeState::from_pieces_unchecked(cp, co, ep, eo))
    }
}

impl Display for FaceletCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in self.facelets {
            write!(f, "{}", color.letter())?;
        }
        Ok(())
    }
}

impl FromStr for FaceletCube {
    type Err = FaceletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colors = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Color::from_letter)
            .collect::<Result<Vec<_>, _>>()?;
        let facelets: [Color; FACELETS] = colors
            .try_into()
            .map_err(|colors: Vec<Color>| FaceletError::InvalidLength(colors.len()))?;
        Ok(Self { facelets })
    }
}

/// One visible sticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub position: u8,
    pub color: Color,
}

impl Tile {
    #[must_use]
    pub fn face(self) -> Face {
        Face::from_index(self.position as usize / 9)
    }
}

/// A physical piece as seen from its stickers. Derived equality compares
/// positions and colors; `same_piece` and `same_slot` compare one of the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cubie {
    Center(Tile),
    Edge([Tile; 2]),
    Corner([Tile; 3]),
}

impl Cubie {
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        match self {
            Cubie::Center(tile) => std::slice::from_ref(tile),
            Cubie::Edge(tiles) => tiles,
            Cubie::Corner(tiles) => tiles,
        }
    }

    /// Whether both carry the same colors, and so are the same physical piece
    /// wherever they are. Edges may be flipped and corners twisted, but a
    /// corner's colors must keep their cyclic order.
    #[must_use]
    pub fn same_piece(&self, other: &Cubie) -> bool {
        match (self, other) {
            (Cubie::Center(a), Cubie::Center(b)) => a.color == b.color,
            (Cubie::Edge([a0, a1]), Cubie::Edge([b0, b1])) => {
                (a0.color, a1.color) == (b0.color, b1.color)
                    || (a0.color, a1.color) == (b1.color, b0.color)
            }
            (Cubie::Corner(a), Cubie::Corner(b)) => (0..3).any(|twist| {
                (0..3).all(|n| a[n].color == b[(n + twist) % 3].color)
            }),
            _ => false,
        }
    }

    /// Whether both occupy the same tile positions in the same order.
    #[must_use]
    pub fn same_slot(&self, other: &Cubie) -> bool {
        let (a, b) = (self.tiles(), other.tiles());
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.position == b.position)
    }

    #[must_use]
    pub fn contains_face(&self, face: Face) -> bool {
        self.tiles().iter().any(|tile| tile.face() == face)
    }

    #[must_use]
    pub fn contains_color(&self, color: Color) -> bool {
        self.tiles().iter().any(|tile| tile.color == color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{ALL_MOVES, MoveSequence, random_scramble};

    fn parse(moves: &str) -> MoveSequence {
        moves.parse().unwrap()
    }

    #[test]
    fn test_solved_string() {
        let solved = FaceletCube::solved();
        let expected = "WWWWWWWWWRRRRRRRRRGGGGGGGGGYYYYYYYYYOOOOOOOOOBBBBBBBBB";
        assert_eq!(solved.to_string(), expected);
        assert_eq!(expected.parse::<FaceletCube>().unwrap(), solved);
        assert!(solved.is_solved());
        assert_eq!(FaceletCube::from(&CubeState::solved()), solved);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "WWW".parse::<FaceletCube>(),
            Err(FaceletError::InvalidLength(3))
        );
        let mut bad = FaceletCube::solved().to_string();
        bad.replace_range(0..1, "X");
        assert_eq!(
            bad.parse::<FaceletCube>(),
            Err(FaceletError::InvalidColor('X'))
        );
    }

    #[test]
    fn test_u_turn_stickers() {
        let cube = FaceletCube::solved().apply_move("U".parse().unwrap());
        // The front face's top row comes from the right face
        assert!(cube.colors()[18..21].iter().all(|&c| c == Color::Red));
        assert!(cube.colors()[9..12].iter().all(|&c| c == Color::Blue));
        assert!(cube.colors()[21..27].iter().all(|&c| c == Color::Green));
        assert!(cube.colors()[0..9].iter().all(|&c| c == Color::White));
    }

    #[test]
    fn test_forms_agree() {
        for _ in 0..20 {
            let state = CubeState::solved().apply_moves(&random_scramble(30));
            let cube = FaceletCube::from(&state);
            assert_eq!(CubeState::try_from(&cube), Ok(state));
            for m in ALL_MOVES {
                assert_eq!(FaceletCube::from(&state.apply_move(m)), cube.apply_move(m));
            }
        }
    }

    #[test]
    fn test_facelet_moves_invert() {
        let scramble = parse("D' R2 B L' F2 U R' D2 B2 L");
        let cube = FaceletCube::solved().apply_moves(&scramble);
        assert!(!cube.is_solved());
        assert!(cube.apply_moves(&scramble.inverse()).is_solved());
    }

    #[test]
    fn test_cubies() {
        let cube = FaceletCube::from(&CubeState::solved().apply_moves(&parse("R U F")));
        let cubies = cube.cubies().collect::<Vec<_>>();
        assert_eq!(cubies.len(), 26);
        assert_eq!(
            cubies
                .iter()
                .filter(|c| matches!(c, Cubie::Center(_)))
                .count(),
            6
        );
        assert_eq!(
            cubies
                .iter()
                .filter(|c| matches!(c, Cubie::Corner(_)))
                .count(),
            8
        );
        // Every piece is still present exactly once
        let solved = FaceletCube::solved().cubies().collect::<Vec<_>>();
        for home in &solved {
            assert_eq!(cubies.iter().filter(|c| c.same_piece(home)).count(), 1);
        }
    }

    #[test]
    fn test_cubie_equalities() {
        let tile = |position, color| Tile { position, color };
        let urf = Cubie::Corner([
            tile(8, Color::White),
            tile(9, Color::Red),
            tile(20, Color::Green),
        ]);
        let twisted = Cubie::Corner([
            tile(8, Color::Green),
            tile(9, Color::White),
            tile(20, Color::Red),
        ]);
        let mirrored = Cubie::Corner([
            tile(8, Color::White),
            tile(9, Color::Green),
            tile(20, Color::Red),
        ]);
        assert_ne!(urf, twisted);
        assert!(urf.same_piece(&twisted));
        assert!(urf.same_slot(&twisted));
        assert!(!urf.same_piece(&mirrored));

        let flipped = Cubie::Edge([tile(5, Color::Red), tile(10, Color::White)]);
        let ur = Cubie::Edge([tile(5, Color::White), tile(10, Color::Red)]);
        assert!(ur.same_piece(&flipped));
        assert!(!ur.same_piece(&urf));
        assert!(!ur.same_slot(&urf));

        assert!(urf.contains_face(Face::F));
        assert!(!urf.contains_face(Face::D));
        assert!(ur.contains_color(Color::Red));
        assert!(!ur.contains_color(Color::Blue));
    }

    #[test]
    fn test_unidentifiable_stickers() {
        let mut colors = *FaceletCube::solved().colors();
        colors.swap(9, 20);
        assert_eq!(
            CubeState::try_from(&FaceletCube::from_colors(colors)),
            Err(FaceletError::UnidentifiedCorner(0))
        );

        let mut colors = *FaceletCube::solved().colors();
        colors[5] = Color::Red;
        assert_eq!(
            CubeState::try_from(&FaceletCube::from_colors(colors)),
            Err(FaceletError::UnidentifiedEdge(0))
        );

        let mut colors = *FaceletCube::solved().colors();
        colors[4] = Color::Red;
        assert_eq!(
            CubeState::try_from(&FaceletCube::from_colors(colors)),
            Err(FaceletError::DuplicateCenters)
        );
    }
}
