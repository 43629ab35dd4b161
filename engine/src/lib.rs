//! Maze engine instance, request/response protocol, and worker-thread runner.
//!
//! [`MazeEngine`] owns exactly one active maze (packed buffer, path tree, and
//! an identity token) and processes one request at a time. Requests carrying
//! a maze identity from before the latest regeneration are dropped silently:
//! with the engine on a dedicated thread behind asynchronous channels, stale
//! requests are an expected race, not a fault.

pub mod engine;
pub mod protocol;
pub mod worker;

pub use engine::{EngineError, MazeEngine};
pub use protocol::{Cell, Dim, Request, Response};
pub use worker::{spawn_engine_thread, EngineChannels};
