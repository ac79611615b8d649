//! HTTP server implementation for the task board.
//!
//! This module provides the axum-based HTTP server that renders the board
//! page, accepts the mutation forms and serves uploaded files.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Form, Multipart, Path, Query, RawQuery, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::flash;
use super::templates::{self, IndexPage};
use crate::board::{Board, IncomingFile, UploadOutcome};
use crate::error::{BoardError, BoardResult};
use crate::types::NewTask;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct BoardServer {
    board: Board,
    /// Largest accepted request body, in bytes.
    max_upload_bytes: usize,
}

impl BoardServer {
    pub fn new(board: Board, max_upload_bytes: usize) -> Self {
        Self {
            board,
            max_upload_bytes,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Query parameters for the board page.
#[derive(Debug, Default, serde::Deserialize)]
struct ListingParams {
    category: Option<String>,
    sort: Option<String>,
}

/// Form data for the status update endpoint.
#[derive(Debug, serde::Deserialize)]
struct StatusForm {
    status: Option<String>,
}

/// Form data for the priority update endpoint.
#[derive(Debug, serde::Deserialize)]
struct PriorityForm {
    priority: Option<String>,
}

/// Redirect to the board, keeping the caller's query string.
fn redirect_home(query: Option<&str>) -> Redirect {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => Redirect::to(&format!("/?{}", q)),
        None => Redirect::to("/"),
    }
}

/// Root endpoint - renders the board for one category.
async fn index(
    State(state): State<BoardServer>,
    Query(params): Query<ListingParams>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> BoardResult<Response> {
    let board = state.board();
    let listing = board.listing(params.category.as_deref(), params.sort.as_deref())?;
    let assignees = board.db().list_assignees()?;
    let notices = flash::read(&headers);

    let html = templates::render_index(&IndexPage {
        listing: &listing,
        assignees: &assignees,
        notices: &notices,
        query: query.as_deref(),
    });

    let mut response = Html(html).into_response();
    if flash::present(&headers) {
        flash::append(response.headers_mut(), flash::clear_cookie());
    }
    Ok(response)
}

/// Create a task from the add form.
async fn add_task(
    State(state): State<BoardServer>,
    RawQuery(query): RawQuery,
    Form(form): Form<NewTask>,
) -> BoardResult<Redirect> {
    state.board().add_task(&form)?;
    Ok(redirect_home(query.as_deref()))
}

/// Pull the `file` part out of an upload form.
async fn read_file_part(mut multipart: Multipart) -> BoardResult<Option<IncomingFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BoardError::invalid_value("file", e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| BoardError::invalid_value("file", e.body_text()))?;
        return Ok(Some(IncomingFile {
            filename,
            contents: contents.to_vec(),
        }));
    }
    Ok(None)
}

/// Attach an uploaded file to a task.
async fn upload_file(
    State(state): State<BoardServer>,
    Path(task_id): Path<i64>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    multipart: Multipart,
) -> BoardResult<Response> {
    let file = read_file_part(multipart).await?;
    // Writing the file and its row is blocking I/O.
    let board = state.board().clone();
    let outcome = tokio::task::spawn_blocking(move || board.upload_file(task_id, file))
        .await
        .map_err(BoardError::internal)??;

    let mut response = redirect_home(query.as_deref()).into_response();
    if let UploadOutcome::Rejected(rejection) = outcome {
        let mut notices = flash::read(&headers);
        notices.push(rejection.notice());
        flash::append(response.headers_mut(), flash::set_cookie(&notices));
    }
    Ok(response)
}

/// Delete a task together with its files.
async fn delete_task(
    State(state): State<BoardServer>,
    Path(task_id): Path<i64>,
    RawQuery(query): RawQuery,
) -> BoardResult<Redirect> {
    state.board().delete_task(task_id)?;
    Ok(redirect_home(query.as_deref()))
}

/// Change a task's status.
async fn update_status(
    State(state): State<BoardServer>,
    Path(task_id): Path<i64>,
    RawQuery(query): RawQuery,
    Form(form): Form<StatusForm>,
) -> BoardResult<Redirect> {
    state
        .board()
        .update_status(task_id, form.status.as_deref())?;
    Ok(redirect_home(query.as_deref()))
}

/// Change a task's priority.
async fn update_priority(
    State(state): State<BoardServer>,
    Path(task_id): Path<i64>,
    RawQuery(query): RawQuery,
    Form(form): Form<PriorityForm>,
) -> BoardResult<Redirect> {
    state
        .board()
        .update_priority(task_id, form.priority.as_deref())?;
    Ok(redirect_home(query.as_deref()))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: BoardServer) -> Router {
    let uploads = ServeDir::new(state.board().store().dir());
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes());

    Router::new()
        .route("/", get(index))
        .route("/add", post(add_task))
        .route("/upload/{task_id}", post(upload_file))
        .route("/delete/{task_id}", post(delete_task))
        .route("/update/status/{task_id}", post(update_status))
        .route("/update/priority/{task_id}", post(update_priority))
        .route("/api/health", get(health))
        .nest_service("/uploads", uploads)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the specified address.
///
/// Returns a oneshot sender that can be used to signal shutdown, the actual
/// address the server is bound to, and the handle of the serving task.
pub async fn start_server(
    state: BoardServer,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr, JoinHandle<()>)> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task board listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task board shutting down");
            })
            .await
        {
            tracing::error!("Task board server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr, handle))
}
