use axum::body::Bytes;
use axum::extract::{OriginalUri, Path};
use axum::http::header::{ACCEPT, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HOST, ORIGIN};
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use axum::Json;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::AppError;
use crate::ids::MAX_ID;
use crate::models::Todo;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo).delete(delete_all_todos),
        )
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            ACCESS_CONTROL_ALLOW_ORIGIN,
            ORIGIN,
            CONTENT_TYPE,
            ACCEPT,
        ])
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state.store.get_all().await?;
    Ok(Json(todos.iter().map(Todo::resolved).collect()))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let id = parse_todo_id(&id)?.ok_or(AppError::NotFound)?;
    let todo = state
        .store
        .get_certain(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo.resolved()))
}

async fn create_todo(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let mut todo = Todo::from_json(&body)?;
    if !(i64::from(i32::MIN)..=MAX_ID).contains(&todo.id) {
        return Err(AppError::BadRequest(format!("Todo id out of range: {}", todo.id)));
    }

    let ids = state.store.ids();
    if todo.id == 0 {
        todo.id = ids.next_id();
    } else {
        ids.observe(todo.id);
    }
    todo.url = Some(resource_url(&uri, &headers, &state.authority, todo.id));

    let todo = state.store.insert(todo).await?;
    debug!("created todo {}", todo.id);
    Ok((StatusCode::CREATED, Json(todo.resolved())))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, AppError> {
    let incoming = Todo::from_json(&body)?;
    let id = parse_todo_id(&id)?.ok_or(AppError::NotFound)?;
    let todo = state
        .store
        .update(id, &incoming)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo.resolved()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // A non-numeric id names nothing, so there is nothing to remove.
    if let Some(id) = parse_todo_id(&id)? {
        state.store.delete(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_todos(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.delete_all().await?;
    debug!("deleted all todos");
    Ok(StatusCode::NO_CONTENT)
}

/// `Err` for a blank id, `Ok(None)` for one that is not an integer.
fn parse_todo_id(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("Missing todo id".to_string()));
    }
    Ok(raw.parse().ok())
}

/// Absolute URL of the created resource: request URI plus `/{id}`.
fn resource_url(uri: &Uri, headers: &HeaderMap, fallback_authority: &str, id: i64) -> String {
    let authority = uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| headers.get(HOST).and_then(|v| v.to_str().ok()))
        .unwrap_or(fallback_authority);
    let scheme = uri.scheme_str().unwrap_or("http");
    format!(
        "{}://{}{}/{}",
        scheme,
        authority,
        uri.path().trim_end_matches('/'),
        id
    )
}
