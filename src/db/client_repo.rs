// src/db/client_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::json_store::JsonStore,
    models::{Client, UpdateClientPayload},
};

/// Abstração de armazenamento de clientes. O dispatcher só precisa de
/// `find_by_name`; o restante serve ao CRUD HTTP.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Client>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Client>, AppError>;
    async fn add(&self, client: Client) -> Result<Client, AppError>;
    async fn update(&self, id: &str, payload: UpdateClientPayload)
        -> Result<Option<Client>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct JsonClientRepository {
    store: JsonStore<Client>,
}

impl JsonClientRepository {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
        })
    }
}

#[async_trait]
impl ClientRepository for JsonClientRepository {
    async fn list(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.store.read().await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Client>, AppError> {
        // resolução por nome exato, paridade com o comportamento legado
        Ok(self.store.read().await.into_iter().find(|c| c.name == name))
    }

    async fn add(&self, mut client: Client) -> Result<Client, AppError> {
        if client.id.is_empty() {
            client.id = Uuid::new_v4().to_string();
        }
        self.store
            .mutate(|items| {
                items.push(client.clone());
            })
            .await?;
        Ok(client)
    }

    async fn update(
        &self,
        id: &str,
        payload: UpdateClientPayload,
    ) -> Result<Option<Client>, AppError> {
        self.store
            .mutate(|items| {
                let target = items.iter_mut().find(|c| c.id == id)?;
                payload.apply_to(target);
                Some(target.clone())
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.store
            .mutate(|items| {
                let before = items.len();
                items.retain(|c| c.id != id);
                items.len() != before
            })
            .await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.store.mutate(|items| items.clear()).await
    }
}
