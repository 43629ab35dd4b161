//! The engine instance: one active maze at a time, explicit state, no
//! globals.

use mazepath_core::{eller, MazeError, MinstdRng, PackedGrid, PathTree};
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{Cell, Dim, Request, Response};

/// Engine-level failures. Invalid input is rejected, never clamped, and the
/// engine stays usable afterwards. Staleness is *not* an error; stale
/// requests produce an empty reply set.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad dimensions or out-of-bounds coordinates from the core.
    #[error(transparent)]
    Maze(#[from] MazeError),

    /// Trace/UpdatePaths before any maze has been generated. Distinct from
    /// staleness: there is no identity to compare against yet.
    #[error("no maze has been generated yet")]
    NoMaze,
}

/// The active maze: identity token, packed buffer, and the path tree for
/// the current source. Replaced as a whole on regeneration, so consumers
/// never observe a partial state.
struct ActiveMaze {
    id: Uuid,
    grid: PackedGrid,
    tree: PathTree,
}

/// Single-threaded maze engine processing one request at a time.
pub struct MazeEngine {
    rng: MinstdRng,
    active: Option<ActiveMaze>,
}

impl MazeEngine {
    /// Engine with an entropy-derived generation seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random::<u32>())
    }

    /// Engine with a fixed seed; the whole maze sequence is reproducible.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            rng: MinstdRng::new(seed),
            active: None,
        }
    }

    /// Identity of the active maze, if one has been generated.
    pub fn active_maze_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Process one request and return its replies, in emission order.
    ///
    /// An empty reply vector means the request was dropped as stale.
    pub fn handle(&mut self, request: Request) -> Result<Vec<Response>, EngineError> {
        match request {
            Request::Init { dim, source, trace } => self.init(dim, source, trace),
            Request::UpdatePaths { maze_id, source } => self.update_paths(maze_id, source),
            Request::Trace { maze_id, cell } => self.trace(maze_id, cell),
        }
    }

    fn init(&mut self, dim: Dim, source: Cell, trace: Cell) -> Result<Vec<Response>, EngineError> {
        let [width, height] = dim;
        tracing::info!(width, height, "generating maze");

        // Everything fallible happens before the active maze is replaced,
        // so a rejected request leaves the previous instance intact.
        let grid = eller::generate(width, height, &mut self.rng)?;
        let tree = PathTree::build(&grid, (source[0], source[1]))?;
        let route = tree.trace((trace[0], trace[1]))?;

        let id = Uuid::new_v4();
        let buffer = grid.as_bytes().to_vec();
        self.active = Some(ActiveMaze { id, grid, tree });

        tracing::info!(maze_id = %id, "maze ready");
        Ok(vec![
            Response::MazeBuffer {
                maze_id: id,
                buffer,
                dim,
            },
            Response::Path {
                maze_id: id,
                path: to_cells(&route),
            },
        ])
    }

    fn update_paths(&mut self, maze_id: Uuid, source: Cell) -> Result<Vec<Response>, EngineError> {
        let active = self.active.as_mut().ok_or(EngineError::NoMaze)?;
        if active.id != maze_id {
            tracing::debug!(requested = %maze_id, current = %active.id, "dropping stale UpdatePaths");
            return Ok(Vec::new());
        }

        active.tree = PathTree::build(&active.grid, (source[0], source[1]))?;
        tracing::debug!(maze_id = %maze_id, ?source, "path tree rebuilt");

        // Empty path acknowledges the rebuild.
        Ok(vec![Response::Path {
            maze_id,
            path: Vec::new(),
        }])
    }

    fn trace(&mut self, maze_id: Uuid, cell: Cell) -> Result<Vec<Response>, EngineError> {
        let active = self.active.as_ref().ok_or(EngineError::NoMaze)?;
        if active.id != maze_id {
            tracing::debug!(requested = %maze_id, current = %active.id, "dropping stale Trace");
            return Ok(Vec::new());
        }

        let route = active.tree.trace((cell[0], cell[1]))?;
        Ok(vec![Response::Path {
            maze_id,
            path: to_cells(&route),
        }])
    }
}

impl Default for MazeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_cells(route: &[(u32, u32)]) -> Vec<Cell> {
    route.iter().map(|&(x, y)| [x, y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_request(dim: Dim) -> Request {
        Request::Init {
            dim,
            source: [0, 0],
            trace: [dim[0] - 1, dim[1] - 1],
        }
    }

    fn init(engine: &mut MazeEngine, dim: Cell) -> (Uuid, Vec<u8>) {
        let responses = engine.handle(init_request(dim)).unwrap();
        match &responses[..] {
            [Response::MazeBuffer { maze_id, buffer, dim: out }, Response::Path { maze_id: path_id, path }] =>
            {
                assert_eq!(out, &dim);
                assert_eq!(maze_id, path_id);
                assert_eq!(path.first(), Some(&[0, 0]));
                assert_eq!(path.last(), Some(&[dim[0] - 1, dim[1] - 1]));
                (*maze_id, buffer.clone())
            }
            other => panic!("unexpected Init replies: {other:?}"),
        }
    }

    #[test]
    fn init_replies_buffer_then_path() {
        let mut engine = MazeEngine::with_seed(7);
        let (_, buffer) = init(&mut engine, [8, 8]);
        // 2 bits per cell, so 8x8 packs into 16 bytes with 63 openings.
        assert_eq!(buffer.len(), 16);
        let openings: u32 = buffer.iter().map(|b| b.count_ones()).sum();
        assert_eq!(openings, 63);
    }

    #[test]
    fn regeneration_rotates_identity() {
        let mut engine = MazeEngine::with_seed(7);
        let (first, _) = init(&mut engine, [4, 4]);
        let (second, _) = init(&mut engine, [4, 4]);
        assert_ne!(first, second);
        assert_eq!(engine.active_maze_id(), Some(second));
    }

    #[test]
    fn stale_requests_are_silent_no_ops() {
        let mut engine = MazeEngine::with_seed(9);
        let (_, _) = init(&mut engine, [5, 5]);
        let stale = Uuid::new_v4();

        let replies = engine
            .handle(Request::Trace {
                maze_id: stale,
                cell: [1, 1],
            })
            .unwrap();
        assert!(replies.is_empty());

        let replies = engine
            .handle(Request::UpdatePaths {
                maze_id: stale,
                source: [2, 2],
            })
            .unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn update_paths_is_idempotent() {
        let mut engine = MazeEngine::with_seed(11);
        let (maze_id, _) = init(&mut engine, [6, 6]);

        let update = Request::UpdatePaths {
            maze_id,
            source: [3, 3],
        };
        let ack = engine.handle(update.clone()).unwrap();
        assert_eq!(
            ack,
            vec![Response::Path {
                maze_id,
                path: Vec::new()
            }]
        );

        let trace = Request::Trace {
            maze_id,
            cell: [0, 5],
        };
        let first = engine.handle(trace.clone()).unwrap();
        engine.handle(update).unwrap();
        let second = engine.handle(trace).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn trace_before_init_is_a_distinct_error() {
        let mut engine = MazeEngine::with_seed(3);
        let result = engine.handle(Request::Trace {
            maze_id: Uuid::new_v4(),
            cell: [0, 0],
        });
        assert!(matches!(result, Err(EngineError::NoMaze)));

        // The engine is still usable after the contract violation.
        init(&mut engine, [3, 3]);
    }

    #[test]
    fn failed_init_preserves_the_previous_maze() {
        let mut engine = MazeEngine::with_seed(13);
        let (maze_id, _) = init(&mut engine, [4, 4]);

        // Zero width: rejected before anything is touched.
        let result = engine.handle(Request::Init {
            dim: [0, 4],
            source: [0, 0],
            trace: [0, 0],
        });
        assert!(matches!(
            result,
            Err(EngineError::Maze(MazeError::InvalidDimensions { .. }))
        ));

        // Out-of-bounds source: generation succeeded but the old instance
        // must survive the rejected swap.
        let result = engine.handle(Request::Init {
            dim: [4, 4],
            source: [9, 9],
            trace: [0, 0],
        });
        assert!(matches!(
            result,
            Err(EngineError::Maze(MazeError::OutOfBounds { .. }))
        ));

        assert_eq!(engine.active_maze_id(), Some(maze_id));
        let replies = engine
            .handle(Request::Trace {
                maze_id,
                cell: [3, 3],
            })
            .unwrap();
        assert_eq!(replies.len(), 1);
    }
}
