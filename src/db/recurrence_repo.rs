// src/db/recurrence_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, db::json_store::JsonStore, models::RecurringCharge};

#[async_trait]
pub trait RecurrenceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<RecurringCharge>, AppError>;
    async fn get(&self, id: &str) -> Result<Option<RecurringCharge>, AppError>;
    async fn add(&self, rc: RecurringCharge) -> Result<RecurringCharge, AppError>;
    /// Substitui o item de mesmo id pela versão recebida.
    async fn put(&self, rc: RecurringCharge) -> Result<Option<RecurringCharge>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
    /// Grava a coleção inteira de uma vez, como o sistema legado fazia
    /// ao final de cada rodada de varredura.
    async fn replace_all(&self, items: Vec<RecurringCharge>) -> Result<(), AppError>;
}

pub struct JsonRecurrenceRepository {
    store: JsonStore<RecurringCharge>,
}

impl JsonRecurrenceRepository {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
        })
    }
}

#[async_trait]
impl RecurrenceRepository for JsonRecurrenceRepository {
    async fn list(&self) -> Result<Vec<RecurringCharge>, AppError> {
        Ok(self.store.read().await)
    }

    async fn get(&self, id: &str) -> Result<Option<RecurringCharge>, AppError> {
        Ok(self.store.read().await.into_iter().find(|r| r.id == id))
    }

    async fn add(&self, mut rc: RecurringCharge) -> Result<RecurringCharge, AppError> {
        if rc.id.is_empty() {
            rc.id = Uuid::new_v4().to_string();
        }
        self.store
            .mutate(|items| {
                items.push(rc.clone());
            })
            .await?;
        Ok(rc)
    }

    async fn put(&self, rc: RecurringCharge) -> Result<Option<RecurringCharge>, AppError> {
        self.store
            .mutate(|items| {
                let target = items.iter_mut().find(|r| r.id == rc.id)?;
                *target = rc.clone();
                Some(rc)
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.store
            .mutate(|items| {
                let before = items.len();
                items.retain(|r| r.id != id);
                items.len() != before
            })
            .await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.store.mutate(|items| items.clear()).await
    }

    async fn replace_all(&self, items: Vec<RecurringCharge>) -> Result<(), AppError> {
        self.store.mutate(|existing| *existing = items).await
    }
}
