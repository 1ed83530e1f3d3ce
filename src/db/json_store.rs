// src/db/json_store.rs
//
// Persistência em arquivos JSON, um arquivo por coleção, no mesmo layout
// dos dados legados (`DATA_DIR/<colecao>.json`). A coleção inteira vive
// em memória atrás de um RwLock e o arquivo é reescrito a cada mutação.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::sync::RwLock;

use crate::common::error::AppError;

/// Coleção (lista) persistida em um arquivo JSON.
pub struct JsonStore<T> {
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Abre a coleção, semeando o arquivo com `[]` quando ausente ou vazio.
    /// Um arquivo presente mas corrompido é erro: não sobrescrevemos dados.
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let items = match fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)?,
            _ => {
                fs::write(&path, b"[]").await?;
                Vec::new()
            }
        };
        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub async fn read(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Aplica a mutação e reescreve o arquivo antes de liberar o lock,
    /// para que nenhum leitor veja um estado que não esteja no disco.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R + Send) -> Result<R, AppError> {
        let mut guard = self.items.write().await;
        let result = f(&mut guard);
        let bytes = serde_json::to_vec_pretty(&*guard)?;
        fs::write(&self.path, bytes).await?;
        Ok(result)
    }
}

/// Documento único (não lista) persistido em um arquivo JSON, usado
/// pelas settings.
pub struct JsonDocument<T> {
    path: PathBuf,
    value: RwLock<T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Clone + Default + Send + Sync,
{
    pub async fn open(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let value = match fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)?,
            _ => {
                let seed = T::default();
                fs::write(&path, serde_json::to_vec_pretty(&seed)?).await?;
                seed
            }
        };
        Ok(Self {
            path,
            value: RwLock::new(value),
        })
    }

    pub async fn read(&self) -> T {
        self.value.read().await.clone()
    }

    pub async fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R + Send) -> Result<R, AppError> {
        let mut guard = self.value.write().await;
        let result = f(&mut guard);
        let bytes = serde_json::to_vec_pretty(&*guard)?;
        fs::write(&self.path, bytes).await?;
        Ok(result)
    }
}
