use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use local_ip_address::local_ip;
use serde::Deserialize;
use serde_json::json;
use shelfmark::{
    export::ExportFormat,
    lookup::{HttpFetcher, MetadataResolver},
    scan::{scan, ScanOutcome},
    store::{CollectionStore, FileBackend},
    types::{
        book::{BookDraft, BookRecord, ReadingStatus, Source},
        isbn::{clean_isbn, to_isbn13},
    },
    webhook, Error,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

pub struct AppState {
    pub store:    CollectionStore<FileBackend>,
    pub resolver: MetadataResolver<HttpFetcher>,
    pub client:   reqwest::Client,
}

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidIsbn
            | Error::Validation(_)
            | Error::UnsupportedImport
            | Error::InvalidImport(_) => StatusCode::BAD_REQUEST,
            Error::BookNotFound | Error::RecordNotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateIsbn(_) => StatusCode::CONFLICT,
            Error::UnsupportedVersion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Webhook(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Json(_) | Error::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Runs a store operation on the blocking thread pool; the store takes a lock
/// and touches the file system.
async fn with_store<T, F>(state: &Arc<AppState>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CollectionStore<FileBackend>) -> shelfmark::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.store))
        .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
        .map_err(ApiError)
}

fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scan/:isbn", get(scan_isbn))
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/:id", put(update_book).delete(delete_book))
        .route("/api/export/:format", get(export).post(push_to_sheets))
        .with_state(state)
}

pub async fn start(state: AppState, address: Option<std::net::IpAddr>, port: u16) -> Result<()> {
    let ip = match address {
        Some(ip) => ip,
        None => local_ip()?,
    };
    let addr = SocketAddr::from((ip, port));
    info!("Listening on {ip}:{port}.");
    axum::Server::bind(&addr)
        .serve(router(Arc::new(state)).into_make_service())
        .await?;
    Ok(())
}

async fn scan_isbn(
    Path(isbn): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ScanOutcome>> {
    info!("Received {}.", isbn);
    // Loads the collection off the runtime threads, the scan then reads the cache
    with_store(&state, |store| store.load().map(drop)).await?;
    Ok(Json(scan(&isbn, &state.store, &state.resolver).await?))
}

async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<BookRecord>>> {
    Ok(Json(with_store(&state, |store| store.books()).await?))
}

async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(mut draft): Json<BookDraft>,
) -> ApiResult<Response> {
    if let Some(isbn13) = draft.isbn13.as_deref().and_then(|i| to_isbn13(&clean_isbn(i))) {
        let lookup = isbn13.clone();
        if let Some(existing) = with_store(&state, move |store| store.find_by_isbn13(&lookup)).await? {
            let message = Error::DuplicateIsbn(isbn13).to_string();
            return Ok((
                StatusCode::CONFLICT,
                Json(json!({ "error": message, "book": existing })),
            )
                .into_response());
        }
        draft.isbn13 = Some(isbn13);
    }
    draft.status.get_or_insert(ReadingStatus::ToRead);
    draft.source.get_or_insert(Source::Manual);
    let book = with_store(&state, move |store| store.add(draft)).await?;
    Ok((StatusCode::CREATED, Json(book)).into_response())
}

async fn update_book(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<BookDraft>,
) -> ApiResult<Json<BookRecord>> {
    Ok(Json(with_store(&state, move |store| store.update(&id, draft)).await?))
}

async fn delete_book(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<serde_json::Value>> {
    let target = id.clone();
    if with_store(&state, move |store| store.remove(&target)).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(Error::RecordNotFound(id).into())
    }
}

async fn export(
    Path(format): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let Ok(format) = format.parse::<ExportFormat>() else {
        return Ok(plain_error(StatusCode::NOT_FOUND, "Unknown export format"));
    };
    let body = with_store(&state, move |store| format.render(&store.load()?)).await?;
    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushRequest {
    #[serde(default)]
    webhook_url: Option<String>,
}

/// Only `google-sheets` accepts a POST under `/api/export`.
async fn push_to_sheets(
    Path(target): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PushRequest>,
) -> ApiResult<Response> {
    if target != "google-sheets" {
        return Ok(plain_error(StatusCode::NOT_FOUND, "Unknown export target"));
    }
    let Some(url) = request.webhook_url.filter(|u| !u.trim().is_empty()) else {
        return Ok(plain_error(StatusCode::BAD_REQUEST, "webhookUrl is required"));
    };
    let books = with_store(&state, |store| store.books()).await?;
    let count = webhook::push_books(&state.client, &url, &books).await?;
    Ok(Json(json!({ "success": true, "count": count })).into_response())
}
