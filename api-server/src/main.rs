use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use mazepath_engine::{MazeEngine, Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

// Request/Response types

#[derive(Debug, Deserialize)]
struct InitRequest {
    dim: [u32; 2],
    source: [u32; 2],
    trace: [u32; 2],
}

#[derive(Debug, Serialize)]
struct InitResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    maze_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dim: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buffer: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<[u32; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatePathsRequest {
    maze_id: Uuid,
    source: [u32; 2],
}

#[derive(Debug, Deserialize)]
struct TraceRequest {
    maze_id: Uuid,
    cell: [u32; 2],
}

#[derive(Debug, Serialize)]
struct PathResponse {
    success: bool,
    /// True when the request named a maze identity that is no longer
    /// active and was dropped; an expected race, not a failure.
    stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<[u32; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

type SharedEngine = web::Data<Mutex<MazeEngine>>;

// API Handlers

/// POST /api/init
/// Generate a new maze and trace an initial route
async fn init(engine: SharedEngine, req: web::Json<InitRequest>) -> impl Responder {
    tracing::info!(
        "Received init request: dim {}x{}, source ({}, {})",
        req.dim[0],
        req.dim[1],
        req.source[0],
        req.source[1]
    );

    let Ok(mut engine) = engine.lock() else {
        return HttpResponse::InternalServerError().finish();
    };

    let request = Request::Init {
        dim: req.dim,
        source: req.source,
        trace: req.trace,
    };
    match engine.handle(request) {
        Ok(responses) => {
            let mut response = InitResponse {
                success: true,
                maze_id: None,
                dim: None,
                buffer: None,
                path: None,
                error: None,
            };
            for reply in responses {
                match reply {
                    Response::MazeBuffer { maze_id, buffer, dim } => {
                        response.maze_id = Some(maze_id);
                        response.dim = Some(dim);
                        response.buffer = Some(buffer);
                    }
                    Response::Path { path, .. } => {
                        response.path = Some(path);
                    }
                }
            }
            tracing::info!("Maze generated: {:?}", response.maze_id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::warn!("Init rejected: {}", e);
            HttpResponse::BadRequest().json(InitResponse {
                success: false,
                maze_id: None,
                dim: None,
                buffer: None,
                path: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// POST /api/update-paths
/// Rebuild the path tree for a new source cell
async fn update_paths(engine: SharedEngine, req: web::Json<UpdatePathsRequest>) -> impl Responder {
    tracing::info!(
        "Received update-paths request: maze {}, source ({}, {})",
        req.maze_id,
        req.source[0],
        req.source[1]
    );

    let Ok(mut engine) = engine.lock() else {
        return HttpResponse::InternalServerError().finish();
    };

    let request = Request::UpdatePaths {
        maze_id: req.maze_id,
        source: req.source,
    };
    respond_with_path(engine.handle(request))
}

/// POST /api/trace
/// Reconstruct the route from the current source to a target cell
async fn trace(engine: SharedEngine, req: web::Json<TraceRequest>) -> impl Responder {
    tracing::info!(
        "Received trace request: maze {}, cell ({}, {})",
        req.maze_id,
        req.cell[0],
        req.cell[1]
    );

    let Ok(mut engine) = engine.lock() else {
        return HttpResponse::InternalServerError().finish();
    };

    let request = Request::Trace {
        maze_id: req.maze_id,
        cell: req.cell,
    };
    respond_with_path(engine.handle(request))
}

fn respond_with_path(
    result: Result<Vec<Response>, mazepath_engine::EngineError>,
) -> HttpResponse {
    match result {
        Ok(responses) => {
            // An empty reply set means the identity was stale and the
            // request was dropped without touching the engine.
            let path = responses.into_iter().find_map(|reply| match reply {
                Response::Path { path, .. } => Some(path),
                _ => None,
            });
            HttpResponse::Ok().json(PathResponse {
                success: true,
                stale: path.is_none(),
                path,
                error: None,
            })
        }
        Err(e) => {
            tracing::warn!("Request rejected: {}", e);
            HttpResponse::BadRequest().json(PathResponse {
                success: false,
                stale: false,
                path: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// GET /health
/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "mazepath-api"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting mazepath API server");

    let engine = web::Data::new(Mutex::new(MazeEngine::new()));

    let bind_address = "0.0.0.0:8080";
    tracing::info!("Binding to {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(engine.clone())
            .wrap(Cors::permissive())
            .route("/health", web::get().to(health))
            .route("/api/init", web::post().to(init))
            .route("/api/update-paths", web::post().to(update_paths))
            .route("/api/trace", web::post().to(trace))
    })
    .bind(bind_address)?
    .run()
    .await
}
