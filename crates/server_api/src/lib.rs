use shared::{
    error::ApiError,
    protocol::{DeletedResponse, Resource},
};
use storage::{Repository, Storage, StorageError};
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn index<R: Resource>(ctx: &ApiContext, filter: &R::Filter) -> Result<Vec<R>, ApiError>
where
    Storage: Repository<R>,
{
    Repository::<R>::list(&ctx.storage, filter)
        .await
        .map_err(internal)
}

pub async fn show<R: Resource>(ctx: &ApiContext, id: R::Id) -> Result<R, ApiError>
where
    Storage: Repository<R>,
{
    Repository::<R>::find(&ctx.storage, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(R::NAME, id.into()))
}

pub async fn store<R: Resource>(ctx: &ApiContext, draft: &R::Draft) -> Result<R, ApiError>
where
    Storage: Repository<R>,
{
    let record = Repository::<R>::insert(&ctx.storage, draft)
        .await
        .map_err(write_failure)?;
    debug!(resource = R::NAME, id = Into::<i64>::into(record.id()), "stored");
    Ok(record)
}

pub async fn update<R: Resource>(
    ctx: &ApiContext,
    id: R::Id,
    patch: &R::Patch,
) -> Result<R, ApiError>
where
    Storage: Repository<R>,
{
    Repository::<R>::update(&ctx.storage, id, patch)
        .await
        .map_err(write_failure)?
        .ok_or_else(|| ApiError::not_found(R::NAME, id.into()))
}

/// Deleting an absent row still succeeds.
pub async fn destroy<R: Resource>(ctx: &ApiContext, id: R::Id) -> Result<DeletedResponse, ApiError>
where
    Storage: Repository<R>,
{
    let removed = Repository::<R>::delete(&ctx.storage, id)
        .await
        .map_err(internal)?;
    debug!(resource = R::NAME, id = Into::<i64>::into(id), removed, "destroyed");
    Ok(DeletedResponse::default())
}

fn write_failure(err: anyhow::Error) -> ApiError {
    match err.downcast_ref::<StorageError>() {
        Some(StorageError::ForeignKey { resource }) => {
            ApiError::validation(format!("{resource} references a row that does not exist"))
        }
        None => internal(err),
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        domain::{BoardId, ColumnId, GroupId},
        error::ErrorCode,
        protocol::{
            BoardPatch, BoardRecord, ColumnRecord, GroupRecord, NewBoard, NewColumn, NewGroup,
        },
    };

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[tokio::test]
    async fn show_missing_record_is_not_found() {
        let ctx = setup().await;
        let err = show::<GroupRecord>(&ctx, GroupId(12))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "group 12 not found");
    }

    #[tokio::test]
    async fn column_for_unknown_board_is_a_validation_error() {
        let ctx = setup().await;
        let err = store::<ColumnRecord>(
            &ctx,
            &NewColumn {
                name: "Doing".into(),
                color: None,
                board_id: BoardId(5),
                position: 0.0,
            },
        )
        .await
        .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn update_renames_board_and_keeps_group() {
        let ctx = setup().await;
        let group = store::<GroupRecord>(
            &ctx,
            &NewGroup {
                name: "Team".into(),
                description: None,
            },
        )
        .await
        .expect("group");
        let board = store::<BoardRecord>(
            &ctx,
            &NewBoard {
                name: "Sprint 1".into(),
                background_color: Some("bg-gray-100".into()),
                group_id: Some(group.id),
                folder_id: None,
            },
        )
        .await
        .expect("board");

        let renamed = update::<BoardRecord>(
            &ctx,
            board.id,
            &BoardPatch {
                name: Some("Sprint 2".into()),
                ..BoardPatch::default()
            },
        )
        .await
        .expect("update");
        assert_eq!(renamed.name, "Sprint 2");
        assert_eq!(renamed.group_id, Some(group.id));
        assert_eq!(renamed.background_color.as_deref(), Some("bg-gray-100"));
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let ctx = setup().await;
        let first = destroy::<ColumnRecord>(&ctx, ColumnId(3))
            .await
            .expect("destroy");
        assert_eq!(first.message, "Deleted");
    }
}
