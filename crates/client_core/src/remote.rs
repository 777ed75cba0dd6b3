use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{BoardId, GroupId},
    error::{ApiError, ErrorCode},
    protocol::{
        BoardPatch, BoardRecord, DeletedResponse, GroupPatch, GroupRecord, NewBoard, NewGroup,
        Resource,
    },
};
use tracing::info;
use url::Url;

use crate::{
    error::{ClientError, Result},
    model::{BoardKey, GroupKey},
    persistence::LocalStore,
    workspace::WorkspaceStore,
};

/// Typed access to the `/api/<collection>` endpoints of a board server.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base: Url,
}

impl ResourceClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base = Url::parse(server_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> Result<()> {
        let res = self.http.get(self.base.join("healthz")?).send().await?;
        check(res).await.map(drop)
    }

    pub async fn list<R: Resource>(&self, filter: &R::Filter) -> Result<Vec<R>> {
        let res = self
            .http
            .get(self.collection_url::<R>()?)
            .query(filter)
            .send()
            .await?;
        decode(res).await
    }

    pub async fn show<R: Resource>(&self, id: R::Id) -> Result<R> {
        let res = self.http.get(self.member_url::<R>(id)?).send().await?;
        decode(res).await
    }

    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R> {
        let res = self
            .http
            .post(self.collection_url::<R>()?)
            .json(draft)
            .send()
            .await?;
        decode(res).await
    }

    /// Partial update: fields left `None` in the patch keep their value.
    pub async fn update<R: Resource>(&self, id: R::Id, patch: &R::Patch) -> Result<R> {
        let res = self
            .http
            .patch(self.member_url::<R>(id)?)
            .json(patch)
            .send()
            .await?;
        decode(res).await
    }

    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<DeletedResponse> {
        let res = self.http.delete(self.member_url::<R>(id)?).send().await?;
        decode(res).await
    }

    fn collection_url<R: Resource>(&self) -> Result<Url> {
        Ok(self.base.join(&format!("api/{}", R::COLLECTION))?)
    }

    fn member_url<R: Resource>(&self, id: R::Id) -> Result<Url> {
        let id: i64 = id.into();
        Ok(self.base.join(&format!("api/{}/{id}", R::COLLECTION))?)
    }
}

async fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        };
        ApiError::new(ErrorCode::Internal, message)
    });
    Err(ClientError::Api {
        status: status.as_u16(),
        error,
    })
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    Ok(check(res).await?.json::<T>().await?)
}

/// Mirrors groups and boards of the local workspace onto the server.
///
/// Server ids are written back into the local tree. There is no retry and no
/// rollback: a failed call leaves local state as it was and callers decide
/// whether to report it.
#[derive(Debug, Clone)]
pub struct WorkspaceSync {
    client: ResourceClient,
}

impl WorkspaceSync {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Creates the group remotely on first push, renames it afterwards.
    pub async fn push_group<S: LocalStore>(
        &self,
        store: &mut WorkspaceStore<S>,
        group: &GroupKey,
    ) -> Result<GroupId> {
        let local = store
            .workspace()
            .group(group)
            .ok_or_else(|| ClientError::GroupNotFound(group.clone()))?;
        let name = local.title.clone();
        let remote_id = local.remote_id;
        let record: GroupRecord = match remote_id {
            None => {
                self.client
                    .create::<GroupRecord>(&NewGroup {
                        name,
                        description: None,
                    })
                    .await?
            }
            Some(remote) => {
                self.client
                    .update::<GroupRecord>(
                        remote,
                        &GroupPatch {
                            name: Some(name),
                            ..GroupPatch::default()
                        },
                    )
                    .await?
            }
        };
        store.set_group_remote_id(group, record.id)?;
        info!(group = %group, remote_id = Into::<i64>::into(record.id), "group synced");
        Ok(record.id)
    }

    /// The owning group has to be pushed first.
    pub async fn push_board<S: LocalStore>(
        &self,
        store: &mut WorkspaceStore<S>,
        board: &BoardKey,
    ) -> Result<BoardId> {
        let workspace = store.workspace();
        let local = workspace
            .board(board)
            .ok_or_else(|| ClientError::BoardNotFound(board.clone()))?;
        let owner = workspace
            .group_of_board(board)
            .ok_or_else(|| ClientError::BoardNotFound(board.clone()))?;
        let group_id = owner
            .remote_id
            .ok_or_else(|| ClientError::NotSynced(format!("group \"{}\"", owner.title)))?;

        let name = local.name.clone();
        let background_color = Some(local.background_color.clone());
        let remote_id = local.remote_id;
        let record: BoardRecord = match remote_id {
            None => {
                self.client
                    .create::<BoardRecord>(&NewBoard {
                        name,
                        background_color,
                        group_id: Some(group_id),
                        folder_id: None,
                    })
                    .await?
            }
            Some(remote) => {
                self.client
                    .update::<BoardRecord>(
                        remote,
                        &BoardPatch {
                            name: Some(name),
                            background_color,
                            group_id: Some(group_id),
                            ..BoardPatch::default()
                        },
                    )
                    .await?
            }
        };
        store.set_board_remote_id(board, record.id)?;
        info!(board = %board, remote_id = Into::<i64>::into(record.id), "board synced");
        Ok(record.id)
    }

    pub async fn delete_group_remote(&self, remote: GroupId) -> Result<()> {
        self.client.delete::<GroupRecord>(remote).await?;
        info!(remote_id = Into::<i64>::into(remote), "remote group deleted");
        Ok(())
    }

    pub async fn delete_board_remote(&self, remote: BoardId) -> Result<()> {
        self.client.delete::<BoardRecord>(remote).await?;
        info!(remote_id = Into::<i64>::into(remote), "remote board deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
