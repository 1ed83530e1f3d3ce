// src/db/settings_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::json_store::JsonDocument,
    models::{Settings, UpdateSettingsPayload},
};

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Settings, AppError>;
    async fn update(&self, payload: UpdateSettingsPayload) -> Result<Settings, AppError>;
    async fn reset(&self) -> Result<(), AppError>;
}

pub struct JsonSettingsRepository {
    store: JsonDocument<Settings>,
}

impl JsonSettingsRepository {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self {
            store: JsonDocument::open(path).await?,
        })
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn get(&self) -> Result<Settings, AppError> {
        Ok(self.store.read().await)
    }

    async fn update(&self, payload: UpdateSettingsPayload) -> Result<Settings, AppError> {
        self.store
            .mutate(|settings| {
                payload.apply_to(settings);
                settings.clone()
            })
            .await
    }

    async fn reset(&self) -> Result<(), AppError> {
        self.store.mutate(|settings| *settings = Settings::default()).await
    }
}
