//! Maze engine core: packed grid codec, Eller generator, path trees.
//!
//! A maze over a W×H grid is stored as two bits per cell (east/south
//! openings) in a packed byte buffer. [`eller::generate`] produces a perfect
//! maze (a spanning tree of the grid graph), [`path::PathTree`] answers
//! "route from source to cell" queries after one O(W*H) precomputation pass.
//!
//! The crate is pure algorithm and data layout; identity tokens, message
//! protocols, and transport live in `mazepath-engine`.

pub mod eller;
pub mod grid;
pub mod path;
pub mod rng;

pub use eller::generate;
pub use grid::{PackedGrid, EAST, SOUTH};
pub use path::PathTree;
pub use rng::{MinstdRng, RandomSource};

use thiserror::Error;

/// Errors for grid and path operations.
///
/// Invalid input is rejected up front and never clamped; no variant is fatal
/// to the caller, which stays usable for subsequent valid calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Dimensions must both be at least 1.
    #[error("maze dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Coordinate outside [0,W)×[0,H).
    #[error("cell ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    /// Wire buffer length does not match the dimensions it claims to encode.
    #[error("buffer length {actual} does not match {expected} bytes for {width}x{height} grid")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, MazeError>;
