//! Wire protocol between the interactive side and the engine.
//!
//! Every request that refers to an existing maze carries that maze's
//! identity; the engine compares it against the current instance and drops
//! mismatches. `Init` carries no identity because it *creates* one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cell coordinate pair `[x, y]`.
pub type Cell = [u32; 2];

/// Grid dimensions `[width, height]`.
pub type Dim = [u32; 2];

/// Requests consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Regenerate the maze, rebuild the path tree for `source`, and reply
    /// with `MazeBuffer` followed by the route to `trace`.
    Init { dim: Dim, source: Cell, trace: Cell },

    /// Rebuild the path tree for a new source cell, if `maze_id` still
    /// names the active maze.
    UpdatePaths { maze_id: Uuid, source: Cell },

    /// Reconstruct the route to `cell`, if `maze_id` still names the
    /// active maze.
    Trace { maze_id: Uuid, cell: Cell },
}

/// Replies produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// A freshly generated maze: identity, packed wall-opening buffer
    /// (bit-for-bit the codec layout), and dimensions.
    MazeBuffer {
        maze_id: Uuid,
        buffer: Vec<u8>,
        dim: Dim,
    },

    /// A reconstructed route, source to target inclusive. Empty for the
    /// `UpdatePaths` acknowledgment.
    Path { maze_id: Uuid, path: Vec<Cell> },
}
