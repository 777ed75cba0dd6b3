use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::ApiContext;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        BoardRecord, ColumnRecord, CommentRecord, DeletedResponse, FolderRecord, GroupRecord,
        LogRecord, Resource, StateRecord, TaskRecord,
    },
};
use storage::{Repository, Storage};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 1024 * 1024;

type HandlerError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new().route("/healthz", get(healthz));
    let router = mount::<GroupRecord>(router);
    let router = mount::<FolderRecord>(router);
    let router = mount::<BoardRecord>(router);
    let router = mount::<ColumnRecord>(router);
    let router = mount::<TaskRecord>(router);
    let router = mount::<StateRecord>(router);
    let router = mount::<CommentRecord>(router);
    let router = mount::<LogRecord>(router);
    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Registers index/store on `/api/<collection>` and show/update/destroy on
/// `/api/<collection>/:id`.
fn mount<R: Resource>(router: Router<Arc<AppState>>) -> Router<Arc<AppState>>
where
    Storage: Repository<R>,
{
    let collection = format!("/api/{}", R::COLLECTION);
    let member = format!("{collection}/:id");
    router.route(&collection, get(index::<R>).post(store::<R>)).route(
        &member,
        get(show::<R>)
            .put(update::<R>)
            .patch(update::<R>)
            .delete(destroy::<R>),
    )
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HandlerError> {
    state.api.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        reject(ApiError::internal(e.to_string()))
    })?;
    Ok("ok")
}

async fn index<R: Resource>(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<Vec<R>>, HandlerError>
where
    Storage: Repository<R>,
{
    let Query(filter) = filter.map_err(|e| malformed(e.body_text()))?;
    let records = server_api::index::<R>(&state.api, &filter)
        .await
        .map_err(reject)?;
    Ok(Json(records))
}

async fn show<R: Resource>(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<R>, HandlerError>
where
    Storage: Repository<R>,
{
    let Path(id) = id.map_err(|e| malformed(e.body_text()))?;
    let record = server_api::show::<R>(&state.api, R::Id::from(id))
        .await
        .map_err(reject)?;
    Ok(Json(record))
}

async fn store<R: Resource>(
    State(state): State<Arc<AppState>>,
    draft: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), HandlerError>
where
    Storage: Repository<R>,
{
    let Json(draft) = draft.map_err(|e| malformed(e.body_text()))?;
    let record = server_api::store::<R>(&state.api, &draft)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<R: Resource>(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, HandlerError>
where
    Storage: Repository<R>,
{
    let Path(id) = id.map_err(|e| malformed(e.body_text()))?;
    let Json(patch) = patch.map_err(|e| malformed(e.body_text()))?;
    let record = server_api::update::<R>(&state.api, R::Id::from(id), &patch)
        .await
        .map_err(reject)?;
    Ok(Json(record))
}

async fn destroy<R: Resource>(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, HandlerError>
where
    Storage: Repository<R>,
{
    let Path(id) = id.map_err(|e| malformed(e.body_text()))?;
    let deleted = server_api::destroy::<R>(&state.api, R::Id::from(id))
        .await
        .map_err(reject)?;
    Ok(Json(deleted))
}

/// Extractor rejections (bad id, unparsable body or query) as a validation error.
fn malformed(message: String) -> HandlerError {
    reject(ApiError::validation(message))
}

fn reject(err: ApiError) -> HandlerError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
