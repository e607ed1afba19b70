//! Pattern databases: exact move counts for every configuration of a subset
//! of the pieces, generated by exhaustive search and cached in a
//! [`PersistentStore`].

pub(crate) mod generate;
pub mod store;

use crate::{
    codec::{falling_factorial, rank_orientations, rank_partial_permutation},
    cube::{CORNER_ORIENTATIONS, CORNERS, CubeState, EDGE_ORIENTATIONS, EDGES, MOVE_TABLE},
    start, success,
};
use log::{info, warn};
use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::Arc,
    time::Instant,
};
use store::{PersistentStore, StoreError};
use thiserror::Error;

/// The value of a table entry no search has reached yet.
pub const UNPOPULATED: u8 = 0xFF;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubsetError {
    #[error("A piece subset must contain at least one piece")]
    Empty,
    #[error("{orbit} only has {max} pieces, but {found} were given")]
    TooManyPieces { orbit: Orbit, max: usize, found: usize },
    #[error("Piece {piece} is out of range for {orbit}")]
    PieceOutOfRange { orbit: Orbit, piece: u8 },
    #[error("Piece {0} appears more than once")]
    DuplicatePiece(u8),
    #[error("Unknown orbit {0:?}, expected \"corners\" or \"edges\"")]
    UnknownOrbit(String),
    #[error("Unknown generation mode {0:?}, expected \"bfs\", \"dfs\" or \"iddfs\"")]
    UnknownGenerationMode(String),
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid piece subset: {0}")]
    InvalidSubsetSpecification(#[from] SubsetError),
    #[error("Generation populated {populated} of {expected} entries")]
    IncompleteTable { populated: u64, expected: u64 },
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

/// The two kinds of movable pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orbit {
    Corners,
    Edges,
}

impl Orbit {
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Orbit::Corners => CORNERS,
            Orbit::Edges => EDGES,
        }
    }

    #[must_use]
    pub const fn orientation_count(self) -> u8 {
        match self {
            Orbit::Corners => CORNER_ORIENTATIONS,
            Orbit::Edges => EDGE_ORIENTATIONS,
        }
    }
}

impl Display for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orbit::Corners => f.write_str("corners"),
            Orbit::Edges => f.write_str("edges"),
        }
    }
}

impl FromStr for Orbit {
    type Err = SubsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "corners" | "corner" => Ok(Orbit::Corners),
            "edges" | "edge" => Ok(Orbit::Edges),
            _ => Err(SubsetError::UnknownOrbit(s.to_owned())),
        }
    }
}

/// Where every piece of an orbit goes under each move: the piece in slot `j`
/// moves to slot `dest[j]` and is twisted by `twist[j]`.
#[derive(Clone, Copy)]
struct SlotMove {
    dest: [u8; EDGES],
    twist: [u8; EDGES],
}

const fn slot_moves(orbit: Orbit) -> [SlotMove; 18] {
    let mut moves = [SlotMove {
        dest: [0; EDGES],
        twist: [0; EDGES],
    }; 18];
    let mut m = 0;
    while m < 18 {
        let state = &MOVE_TABLE[m];
        let (perm, ori): (&[u8], &[u8]) = match orbit {
            Orbit::Corners => (state.corner_permutation(), state.corner_orientation()),
            Orbit::Edges => (state.edge_permutation(), state.edge_orientation()),
        };
        let mut i = 0;
        while i < perm.len() {
            let from = perm[i] as usize;
            moves[m].dest[from] = i as u8;
            moves[m].twist[from] = ori[i];
            i += 1;
        }
        m += 1;
    }
    moves
}

const CORNER_SLOT_MOVES: [SlotMove; 18] = slot_moves(Orbit::Corners);
const EDGE_SLOT_MOVES: [SlotMove; 18] = slot_moves(Orbit::Edges);

/// The slots and orientations of the pieces of a subset, in subset order.
/// This is all table generation needs to track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SubsetState {
    slots: [u8; EDGES],
    orientations: [u8; EDGES],
}

/// An orbit together with an ordered list of distinct pieces of that orbit,
/// identifying one pattern database.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PieceSubset {
    orbit: Orbit,
    pieces: Vec<u8>,
}

impl PieceSubset {
    /// # Errors
    ///
    /// If the list is empty, longer than the orbit, or contains a piece that
    /// is out of range or repeated.
    pub fn new(orbit: Orbit, pieces: Vec<u8>) -> Result<Self, SubsetError> {
        if pieces.is_empty() {
            return Err(SubsetError::Empty);
        }
        if pieces.len() > orbit.size() {
            return Err(SubsetError::TooManyPieces {
                orbit,
                max: orbit.size(),
                found: pieces.len(),
            });
        }
        let mut seen = 0_u32;
        for &piece in &pieces {
            if piece as usize >= orbit.size() {
                return Err(SubsetError::PieceOutOfRange { orbit, piece });
            }
            if seen & (1 << piece) != 0 {
                return Err(SubsetError::DuplicatePiece(piece));
            }
            seen |= 1 << piece;
        }
        Ok(Self { orbit, pieces })
    }

    /// A subset of one piece, which needs no validation.
    pub(crate) fn single(orbit: Orbit, piece: u8) -> Self {
        debug_assert!((piece as usize) < orbit.size());
        Self {
            orbit,
            pieces: vec![piece],
        }
    }

    #[must_use]
    pub fn orbit(&self) -> Orbit {
        self.orbit
    }

    #[must_use]
    pub fn pieces(&self) -> &[u8] {
        &self.pieces
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Whether the subset covers its whole orbit, in which case the last
    /// piece's orientation is implied by the others.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pieces.len() == self.orbit.size()
    }

    fn orientation_digits(&self) -> usize {
        if self.is_complete() {
            self.pieces.len() - 1
        } else {
            self.pieces.len()
        }
    }

    fn orientation_cardinality(&self) -> u64 {
        u64::from(self.orbit.orientation_count()).pow(self.orientation_digits() as u32)
    }

    /// The number of distinct configurations of the subset, which is also
    /// the length of its table.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        falling_factorial(self.orbit.size() as u8, self.pieces.len() as u8)
            * self.orientation_cardinality()
    }

    #[must_use]
    pub fn key(&self) -> TableKey {
        TableKey {
            orbit: self.orbit,
            pieces: self.pieces.clone(),
            cardinality: self.cardinality(),
        }
    }

    /// The table index of the subset's configuration within `state`. The
    /// state must be well formed.
    #[must_use]
    pub fn index(&self, state: &CubeState) -> u64 {
        self.index_of(&self.project(state))
    }

    pub(crate) fn project(&self, state: &CubeState) -> SubsetState {
        let (perm, ori): (&[u8], &[u8]) = match self.orbit {
            Orbit::Corners => (state.corner_permutation(), state.corner_orientation()),
            Orbit::Edges => (state.edge_permutation(), state.edge_orientation()),
        };
        let mut projected = SubsetState {
            slots: [0; EDGES],
            orientations: [0; EDGES],
        };
        for (slot, &piece) in perm.iter().enumerate() {
            if let Some(k) = self.pieces.iter().position(|&p| p == piece) {
                projected.slots[k] = slot as u8;
                projected.orientations[k] = ori[slot];
            }
        }
        projected
    }

    pub(crate) fn index_of(&self, state: &SubsetState) -> u64 {
        let k = self.pieces.len();
        let position_rank = rank_partial_permutation(&state.slots[..k], self.orbit.size() as u8);
        let orientation_rank = rank_orientations(
            &state.orientations[..self.orientation_digits()],
            self.orbit.orientation_count(),
        );
        position_rank * self.orientation_cardinality() + orientation_rank
    }

    pub(crate) fn apply_move(&self, state: &SubsetState, move_index: usize) -> SubsetState {
        let slot_move = match self.orbit {
            Orbit::Corners => &CORNER_SLOT_MOVES[move_index],
            Orbit::Edges => &EDGE_SLOT_MOVES[move_index],
        };
        let base = self.orbit.orientation_count();
        let mut next = *state;
        for k in 0..self.pieces.len() {
            let slot = state.slots[k] as usize;
            next.slots[k] = slot_move.dest[slot];
            next.orientations[k] = (state.orientations[k] + slot_move.twist[slot]) % base;
        }
        next
    }
}

impl Display for PieceSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.orbit, self.pieces)
    }
}

/// The name under which a table is persisted, e.g. `corners_0-1-2-3_136080`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableKey {
    orbit: Orbit,
    pieces: Vec<u8>,
    cardinality: u64,
}

impl TableKey {
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }
}

impl Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_", self.orbit)?;
        for (i, piece) in self.pieces.iter().enumerate() {
            if i != 0 {
                f.write_str("-")?;
            }
            write!(f, "{piece}")?;
        }
        write!(f, "_{}", self.cardinality)
    }
}

/// How a table is populated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationMode {
    /// Breadth-first from the solved state; every entry is reached at its
    /// optimal depth first.
    #[default]
    Bfs,
    /// A single depth-limited depth-first search, which must be deep enough
    /// to reach every configuration.
    Dfs,
    /// Depth-first searches with increasing limits until the table is full.
    Iddfs,
}

impl FromStr for GenerationMode {
    type Err = SubsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(GenerationMode::Bfs),
            "dfs" => Ok(GenerationMode::Dfs),
            "iddfs" => Ok(GenerationMode::Iddfs),
            _ => Err(SubsetError::UnknownGenerationMode(s.to_owned())),
        }
    }
}

/// Depth limits for depth-first generation. `corners[k]` and `edges[k]` are
/// the limits for subsets of `k` pieces; they must be at least the deepest
/// entry of the table or generation reports an incomplete table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfsDepthLimits {
    pub corners: Vec<u8>,
    pub edges: Vec<u8>,
    /// The last limit iterative deepening tries before giving up.
    pub iddfs_max_depth: u8,
}

impl Default for DfsDepthLimits {
    fn default() -> Self {
        Self {
            corners: vec![0, 4, 6, 8, 9, 10, 11, 11, 12],
            edges: vec![0, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
            iddfs_max_depth: 12,
        }
    }
}

impl DfsDepthLimits {
    /// The same limit for every subset size.
    #[must_use]
    pub fn uniform(limit: u8) -> Self {
        Self {
            corners: vec![limit; CORNERS + 1],
            edges: vec![limit; EDGES + 1],
            iddfs_max_depth: limit,
        }
    }

    /// The limit for `subset`, falling back to the last configured limit of
    /// its orbit.
    #[must_use]
    pub fn limit_for(&self, subset: &PieceSubset) -> u8 {
        let limits = match subset.orbit() {
            Orbit::Corners => &self.corners,
            Orbit::Edges => &self.edges,
        };
        limits
            .get(subset.len())
            .or(limits.last())
            .copied()
            .unwrap_or(self.iddfs_max_depth)
    }
}

/// A complete, immutable table of optimal move counts for one subset.
/// Cloning shares the underlying table.
#[derive(Clone, Debug)]
pub struct PatternDatabase {
    subset: PieceSubset,
    table: Arc<[u8]>,
}

impl PatternDatabase {
    /// Wrap raw table bytes, or `None` if their length is not the subset's
    /// cardinality.
    #[must_use]
    pub fn from_bytes(subset: PieceSubset, bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() as u64 == subset.cardinality()).then(|| Self {
            subset,
            table: bytes.into(),
        })
    }

    #[must_use]
    pub fn subset(&self) -> &PieceSubset {
        &self.subset
    }

    /// The entry at `index`, or `None` if it is out of range or unpopulated.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<u8> {
        let entry = *self.table.get(usize::try_from(index).ok()?)?;
        (entry != UNPOPULATED).then_some(entry)
    }

    #[must_use]
    pub fn populated_count(&self) -> u64 {
        populated_count(&self.table)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }

    /// The deepest entry of the table, the most moves any configuration of
    /// the subset needs.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.table
            .iter()
            .copied()
            .filter(|&entry| entry != UNPOPULATED)
            .max()
            .unwrap_or(0)
    }
}

pub(crate) fn populated_count(table: &[u8]) -> u64 {
    table.iter().filter(|&&entry| entry != UNPOPULATED).count() as u64
}

/// Loads a pattern database from a store, or generates and persists it.
pub struct PatternDatabaseBuilder<S: PersistentStore> {
    subset: PieceSubset,
    store: S,
    generation_mode: GenerationMode,
    depth_limits: DfsDepthLimits,
}

impl<S: PersistentStore> PatternDatabaseBuilder<S> {
    #[must_use]
    pub fn new(subset: PieceSubset, store: S) -> Self {
        Self {
            subset,
            store,
            generation_mode: GenerationMode::default(),
            depth_limits: DfsDepthLimits::default(),
        }
    }

    /// Create a builder from textual names, as in
    /// `from_spec("corners", &[0, 1, 2, 3], "bfs", store)`.
    ///
    /// # Errors
    ///
    /// If the orbit, pieces or generation mode are invalid.
    pub fn from_spec(
        orbit: &str,
        pieces: &[u8],
        generation_mode: &str,
        store: S,
    ) -> Result<Self, BuildError> {
        let subset = PieceSubset::new(orbit.parse()?, pieces.to_vec())?;
        Ok(Self::new(subset, store).with_generation_mode(generation_mode.parse()?))
    }

    #[must_use]
    pub fn with_generation_mode(mut self, generation_mode: GenerationMode) -> Self {
        self.generation_mode = generation_mode;
        self
    }

    #[must_use]
    pub fn with_depth_limits(mut self, depth_limits: DfsDepthLimits) -> Self {
        self.depth_limits = depth_limits;
        self
    }

    #[must_use]
    pub fn subset(&self) -> &PieceSubset {
        &self.subset
    }

    /// Load the table from the store, or generate it and write it back if the
    /// store has no usable copy. Blocks until the table is complete.
    ///
    /// # Errors
    ///
    /// If generation does not reach every configuration, or the store fails
    /// with anything other than an incomplete table.
    pub fn build(&self) -> Result<PatternDatabase, BuildError> {
        let key = self.subset.key();
        let expected = self.subset.cardinality();
        match self.store.read(&key) {
            Ok(Some(bytes)) => {
                let found = bytes.len();
                match PatternDatabase::from_bytes(self.subset.clone(), bytes) {
                    Some(db) if db.populated_count() == expected => {
                        info!(success!("Loaded pattern database {}"), key);
                        return Ok(db);
                    }
                    Some(db) => warn!(
                        "Stored table {key} only has {} of {expected} entries populated, regenerating",
                        db.populated_count()
                    ),
                    None => {
                        warn!("Stored table {key} has {found} entries, expected {expected}, regenerating");
                    }
                }
            }
            Ok(None) => (),
            Err(StoreError::Incomplete { expected, actual }) => {
                warn!("Stored table {key} has {actual} of {expected} entries, regenerating");
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            start!("Generating pattern database {} with {:?} ({} entries)"),
            key, self.generation_mode, expected
        );
        let start = Instant::now();
        let table = match self.generation_mode {
            GenerationMode::Bfs => generate::bfs(&self.subset),
            GenerationMode::Dfs => {
                generate::dfs(&self.subset, self.depth_limits.limit_for(&self.subset))
            }
            GenerationMode::Iddfs => {
                generate::iddfs(&self.subset, self.depth_limits.iddfs_max_depth)
            }
        };
        let populated = populated_count(&table);
        if populated != expected {
            return Err(BuildError::IncompleteTable {
                populated,
                expected,
            });
        }
        info!(
            success!("Generated pattern database {} in {:.3}s"),
            key,
            start.elapsed().as_secs_f64()
        );

        self.store.write(&key, &table)?;
        Ok(PatternDatabase {
            subset: self.subset.clone(),
            table: table.into(),
        })
    }
}
