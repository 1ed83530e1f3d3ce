// src/db/log_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use uuid::Uuid;

use crate::{common::error::AppError, db::json_store::JsonStore, models::LogEntry};

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<LogEntry>, AppError>;
    async fn append(&self, entry: LogEntry) -> Result<LogEntry, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct JsonLogRepository {
    store: JsonStore<LogEntry>,
}

impl JsonLogRepository {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
        })
    }
}

#[async_trait]
impl LogRepository for JsonLogRepository {
    async fn list(&self) -> Result<Vec<LogEntry>, AppError> {
        Ok(self.store.read().await)
    }

    async fn append(&self, mut entry: LogEntry) -> Result<LogEntry, AppError> {
        if entry.id.is_empty() {
            entry.id = Uuid::new_v4().to_string();
        }
        if entry.timestamp.is_none() {
            entry.timestamp = Some(Local::now().naive_local());
        }
        self.store
            .mutate(|items| {
                items.push(entry.clone());
            })
            .await?;
        Ok(entry)
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.store.mutate(|items| items.clear()).await
    }
}
