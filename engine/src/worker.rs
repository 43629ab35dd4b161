//! Dedicated engine thread behind mpsc channels.
//!
//! Generation and tree building are O(W*H) and can take measurable time on
//! large grids, so the engine runs on its own named thread and the
//! interactive side talks to it exclusively through asynchronous messages.
//! There is no cancellation mid-operation; ordering comes from the channel,
//! staleness filtering from the engine itself.

use std::io;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::engine::MazeEngine;
use crate::protocol::{Request, Response};

/// Channel pair for talking to a spawned engine thread.
///
/// Dropping `request_tx` closes the request channel and stops the thread.
pub struct EngineChannels {
    pub request_tx: Sender<Request>,
    pub response_rx: Receiver<Response>,
}

/// Spawn the engine on a dedicated thread and return its channels.
///
/// Handler errors are logged and dropped: an invalid request must never
/// take the engine down, it just produces no reply.
pub fn spawn_engine_thread(mut engine: MazeEngine) -> io::Result<EngineChannels> {
    let (request_tx, request_rx) = channel::<Request>();
    let (response_tx, response_rx) = channel::<Response>();

    thread::Builder::new()
        .name("maze-engine".to_string())
        .spawn(move || {
            tracing::debug!("engine thread started");
            while let Ok(request) = request_rx.recv() {
                match engine.handle(request) {
                    Ok(responses) => {
                        for response in responses {
                            if response_tx.send(response).is_err() {
                                tracing::info!("response channel closed, engine thread exiting");
                                return;
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "request rejected");
                    }
                }
            }
            tracing::debug!("request channel closed, engine thread exiting");
        })?;

    Ok(EngineChannels {
        request_tx,
        response_rx,
    })
}
