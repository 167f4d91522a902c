use axum::{
    Router,
    routing::{delete, get, post},
    response::IntoResponse,
    http::{StatusCode, header},
    extract::{Path, Query, State, Multipart},
    Json,
};
use crate::models::{CreateSessionResponse, MessagesPage, MessagesQuery, SessionMeta, SuggestQuery};
use crate::storage::{SessionStorage, StorageError, ingest_analysis};
use omci_parser::query::{filter_messages, group_mib_sequences, service_nodes, suggest_classes, ServiceNodes};
use omci_parser::{EntityStats, ParseError, ParserRegistry};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, debug, warn, error, instrument};

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SessionStorage>,
    pub registry: Arc<ParserRegistry>,
}

impl AppState {
    pub fn new(storage: SessionStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            registry: Arc::new(ParserRegistry::new()),
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/meta", get(get_meta))
        .route("/sessions/:id/analysis", get(get_analysis))
        .route("/sessions/:id/messages", get(get_messages))
        .route("/sessions/:id/packets", get(get_packets))
        .route("/sessions/:id/stats", get(get_stats))
        .route("/sessions/:id/service-model", get(get_service_model))
        .route("/sessions/:id/suggest", get(get_suggestions))
        .route("/sessions/:id/raw/:message_id", get(get_raw))
        .with_state(state)
}

fn storage_error(e: StorageError) -> (StatusCode, String) {
    match e {
        StorageError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
        StorageError::InvalidId(id) => {
            warn!("Rejected message id '{}'", id);
            (StatusCode::BAD_REQUEST, format!("Invalid message id: {}", id))
        }
        other => {
            error!("Storage failure: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage failure: {}", other))
        }
    }
}

fn encode_error(e: serde_json::Error) -> (StatusCode, String) {
    error!("Failed to encode response: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Encode failure: {}", e))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[instrument(skip(state, multipart))]
async fn create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<CreateSessionResponse>> {
    info!("Received capture upload request");

    let mut file_data = Vec::new();
    let mut filename = String::new();

    while let Some(field) = multipart.next_field().await
        .map_err(|e| {
            error!("Multipart error: {}", e);
            (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
        })?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("unknown").to_string();
            info!("Receiving file: {}", filename);

            let data = field.bytes().await
                .map_err(|e| {
                    error!("Failed to read file data: {}", e);
                    (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                })?;
            file_data = data.to_vec();
            info!("File data received: {} bytes", file_data.len());
        }
    }

    if file_data.is_empty() {
        error!("No file data provided in request");
        return Err((StatusCode::BAD_REQUEST, "No file provided".to_string()));
    }

    let (parser, analysis) = state.registry
        .parse_with_hint(Box::new(Cursor::new(file_data)), &filename)
        .map_err(|e| {
            error!("Parse error for file '{}': {}", filename, e);
            match e {
                ParseError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Parse error: {}", e)),
                _ => (StatusCode::BAD_REQUEST, format!("Parse error: {}", e)),
            }
        })?;

    info!("Parsed {} OMCI messages with '{}'", analysis.messages.len(), parser);

    let session_id = state.storage.create_session().map_err(storage_error)?;
    info!("Created session: {}", session_id);

    let meta = ingest_analysis(&state.storage, &session_id, &filename, parser, analysis)
        .map_err(|e| {
            error!("Ingest failed for session {}: {}", session_id, e);
            storage_error(e)
        })?;

    Ok(Json(CreateSessionResponse {
        session_id,
        parser: parser.to_string(),
        message_count: meta.message_count,
    }))
}

async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<SessionMeta>>> {
    let sessions = state.storage.list_sessions().map_err(storage_error)?;
    Ok(Json(sessions))
}

async fn get_meta(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionMeta>> {
    let meta = state.storage.read_meta(&session_id).map_err(storage_error)?;
    Ok(Json(meta))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    Ok(Json(analysis))
}

#[instrument(skip(state, query), fields(session_id = %session_id))]
async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.to_filter().map_err(|e| {
        warn!("Rejected message query: {}", e);
        (StatusCode::BAD_REQUEST, e)
    })?;
    debug!("Message filter: {:?}, cursor={}, limit={}", filter, query.cursor, query.limit);

    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    let matching = filter_messages(&analysis.messages, &filter);
    info!("{} of {} messages match", matching.len(), analysis.messages.len());

    let page = MessagesPage::slice(matching, query.cursor, query.limit);
    let body = serde_json::to_value(&page).map_err(encode_error)?;
    Ok(Json(body))
}

async fn get_packets(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    let views = group_mib_sequences(&analysis.messages);
    let body = serde_json::to_value(&views).map_err(encode_error)?;
    Ok(Json(body))
}

async fn get_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<BTreeMap<String, EntityStats>>> {
    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    Ok(Json(analysis.stats))
}

async fn get_service_model(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ServiceNodes>> {
    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    Ok(Json(service_nodes(&analysis)))
}

async fn get_suggestions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let analysis = state.storage.read_analysis(&session_id).map_err(storage_error)?;
    let names = suggest_classes(&analysis, query.q.trim(), query.limit)
        .into_iter()
        .map(String::from)
        .collect();
    Ok(Json(names))
}

async fn get_raw(
    State(state): State<AppState>,
    Path((session_id, message_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let raw = state.storage.read_payload(&session_id, &message_id).map_err(storage_error)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], raw))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.storage.delete_session(&session_id).map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}
