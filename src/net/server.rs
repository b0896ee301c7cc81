// net/server.rs
use anyhow::{Context, Result};
use hyper::{
    Method, Request, Response, StatusCode,
    body::Bytes,
    header::{CONTENT_TYPE, HeaderValue},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{convert::Infallible, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{
    config::SimConfig,
    error::SimError,
    memory::{allocator::AllocationStrategy, block::ProcessId},
    paging::{frame_table::PageId, replacement::PagingPolicy},
    session::SimulationSession,
};

#[derive(Clone)]
struct AppState {
    session: Arc<RwLock<SimulationSession>>,
}

#[derive(Serialize, Deserialize)]
pub struct AllocateBody {
    pub strategy: AllocationStrategy,
    pub pid: ProcessId,
    pub size: usize,
}

#[derive(Serialize, Deserialize)]
pub struct AllocateResponse {
    pub pid: ProcessId,
    pub address: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DeallocateBody {
    pub pid: ProcessId,
}

#[derive(Serialize, Deserialize)]
pub struct DeallocateResponse {
    pub pid: ProcessId,
    pub freed: usize,
}

#[derive(Serialize, Deserialize)]
pub struct AccessBody {
    pub policy: PagingPolicy,
    pub page: PageId,
}

#[derive(Serialize, Deserialize)]
pub struct ResetBody {
    pub frames: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

fn respond(status: StatusCode, body: String) -> Response<String> {
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

fn json<T: Serialize>(value: &T) -> Response<String> {
    match serde_json::to_string(value) {
        Ok(body) => respond(StatusCode::OK, body),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string()),
    }
}

fn error_response(status: StatusCode, kind: &str, message: String) -> Response<String> {
    let body = ErrorBody {
        kind: kind.to_string(),
        message,
    };
    respond(status, serde_json::to_string(&body).unwrap_or_default())
}

fn sim_error(e: SimError) -> Response<String> {
    warn!(error = %e, "command rejected");
    let status = match e {
        SimError::InsufficientMemory { .. } => StatusCode::CONFLICT,
        SimError::ProcessNotFound(_) => StatusCode::NOT_FOUND,
        SimError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
    };
    error_response(status, e.kind(), e.to_string())
}

// Helper function to collect the body bytes
async fn collect_body(body: hyper::body::Incoming) -> Result<Bytes, hyper::Error> {
    use http_body_util::BodyExt;

    let collected = body.collect().await?;
    Ok(collected.to_bytes())
}

async fn read_json<T: DeserializeOwned>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, Response<String>> {
    let bytes = collect_body(req.into_body()).await.map_err(|e| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, "invalid_request", e.to_string()))
}

async fn route(req: Request<hyper::body::Incoming>, state: &AppState) -> Response<String> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    match (&method, path.as_str()) {
        (&Method::POST, "/allocate") => {
            let body: AllocateBody = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            let mut session = state.session.write().await;
            match session.allocate(body.strategy, body.pid, body.size) {
                Ok(address) => json(&AllocateResponse {
                    pid: body.pid,
                    address,
                }),
                Err(e) => sim_error(e),
            }
        }

        (&Method::POST, "/deallocate") => {
            let body: DeallocateBody = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            let mut session = state.session.write().await;
            match session.deallocate(body.pid) {
                Ok(freed) => json(&DeallocateResponse {
                    pid: body.pid,
                    freed,
                }),
                Err(e) => sim_error(e),
            }
        }

        (&Method::GET, "/snapshot") => json(&state.session.read().await.snapshot()),
        (&Method::GET, "/stats") => json(&state.session.read().await.stats()),

        (&Method::POST, "/access") => {
            let body: AccessBody = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            let mut session = state.session.write().await;
            match session.access_page(body.policy, body.page) {
                Ok(result) => json(&result),
                Err(e) => sim_error(e),
            }
        }

        (&Method::GET, "/paging/stats") => json(&state.session.read().await.paging_stats()),
        (&Method::GET, "/frames") => json(&state.session.read().await.frames()),

        (&Method::POST, "/paging/reset") => {
            let body: ResetBody = match read_json(req).await {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            let mut session = state.session.write().await;
            match session.reset_paging(body.frames) {
                Ok(()) => json(&session.frames()),
                Err(e) => sim_error(e),
            }
        }

        _ => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("No route for {} {}", method, path),
        ),
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<String>, Infallible> {
    Ok(route(req, &state).await)
}

/// Accept connections on `listener` forever, serving one shared session.
pub async fn serve(listener: TcpListener, session: SimulationSession) -> Result<()> {
    let state = Arc::new(AppState {
        session: Arc::new(RwLock::new(session)),
    });

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(?err, "Error serving connection");
            }
        });
    }
}

// Public function to be called from main
pub async fn run_server(config: &SimConfig) -> Result<()> {
    let session = SimulationSession::from_config(config)?;
    let listener = TcpListener::bind(config.addr)
        .await
        .context("Failed to bind to address")?;
    info!(
        addr = %config.addr,
        total_size = config.total_size,
        frames = config.frames,
        "Listening"
    );
    serve(listener, session).await
}
