#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions
)]

//! Optimal solving of the 3x3x3 cube with informed search over admissible
//! heuristics, the strongest of which are pattern databases generated by this
//! crate.

pub mod canonical;
pub mod codec;
pub mod cube;
pub mod facelets;
pub mod heuristic;
pub mod pruning;
pub mod solvability;
pub mod solver;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// A precomputed factorial table for 0! to 19!, where index[i] is i!. We can
/// do one more however it will overflow when multiplying by an orientation
/// count, which is common in context.
pub(crate) const FACT_UNTIL_19: [u64; 20] = {
    let mut arr = [0; 20];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u64;
        i += 1;
    }
    arr
};
