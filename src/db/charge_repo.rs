// src/db/charge_repo.rs

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::json_store::JsonStore,
    models::{Charge, UpdateChargePayload},
};

#[async_trait]
pub trait ChargeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Charge>, AppError>;
    async fn add(&self, charge: Charge) -> Result<Charge, AppError>;
    async fn update(&self, id: &str, payload: UpdateChargePayload)
        -> Result<Option<Charge>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn clear(&self) -> Result<(), AppError>;
    /// Substitui a coleção inteira; usado pela sincronização com clientes.
    async fn replace_all(&self, charges: Vec<Charge>) -> Result<(), AppError>;
}

pub struct JsonChargeRepository {
    store: JsonStore<Charge>,
}

impl JsonChargeRepository {
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self {
            store: JsonStore::open(path).await?,
        })
    }
}

#[async_trait]
impl ChargeRepository for JsonChargeRepository {
    async fn list(&self) -> Result<Vec<Charge>, AppError> {
        Ok(self.store.read().await)
    }

    async fn add(&self, mut charge: Charge) -> Result<Charge, AppError> {
        if charge.id.is_empty() {
            charge.id = Uuid::new_v4().to_string();
        }
        self.store
            .mutate(|items| {
                items.push(charge.clone());
            })
            .await?;
        Ok(charge)
    }

    async fn update(
        &self,
        id: &str,
        payload: UpdateChargePayload,
    ) -> Result<Option<Charge>, AppError> {
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

    async fn replace_all(&self, charges: Vec<Charge>) -> Result<(), AppError> {
        self.store.mutate(|items| *items = charges).await
    }
}
