// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::{
    db::{
        ChargeRepository, ClientRepository, JsonChargeRepository, JsonClientRepository,
        JsonLogRepository, JsonRecurrenceRepository, JsonSettingsRepository, LogRepository,
        SettingsRepository,
    },
    gateway::{MessageGateway, ZapiGateway},
    services::{ChargeService, RecurrenceService},
};

/// Configuração lida do ambiente na inicialização.
pub struct Config {
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub bind_addr: String,
    /// 0 desliga o timer interno; a varredura ainda pode ser disparada
    /// pela rota de processamento.
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir =
            PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definida")?;

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            Err(_) => vec![env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())],
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            data_dir,
            jwt_secret,
            allowed_origins,
            bind_addr,
            sweep_interval_secs,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<dyn ClientRepository>,
    pub charges: Arc<dyn ChargeRepository>,
    pub logs: Arc<dyn LogRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub gateway: Arc<dyn MessageGateway>,
    pub recurrence_service: Arc<RecurrenceService>,
    pub charge_service: Arc<ChargeService>,
    pub jwt_secret: String,
}

impl AppState {
    /// Abre os arquivos de dados e monta o gráfico de dependências.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let clients: Arc<dyn ClientRepository> = Arc::new(
            JsonClientRepository::open(config.data_dir.join("clients.json")).await?,
        );
        let charges: Arc<dyn ChargeRepository> = Arc::new(
            JsonChargeRepository::open(config.data_dir.join("charges.json")).await?,
        );
        let logs: Arc<dyn LogRepository> =
            Arc::new(JsonLogRepository::open(config.data_dir.join("logs.json")).await?);
        let settings: Arc<dyn SettingsRepository> = Arc::new(
            JsonSettingsRepository::open(config.data_dir.join("settings.json")).await?,
        );
        let recurrents = Arc::new(
            JsonRecurrenceRepository::open(config.data_dir.join("recurring_charges.json"))
                .await?,
        );

        tracing::info!("✅ Arquivos de dados abertos em {}", config.data_dir.display());

        let gateway: Arc<dyn MessageGateway> = Arc::new(ZapiGateway::new(settings.clone()));
        let recurrence_service = Arc::new(RecurrenceService::new(
            recurrents,
            clients.clone(),
            logs.clone(),
            settings.clone(),
            gateway.clone(),
        ));
        let charge_service = Arc::new(ChargeService::new(charges.clone(), clients.clone()));

        Ok(Self {
            clients,
            charges,
            logs,
            settings,
            gateway,
            recurrence_service,
            charge_service,
            jwt_secret: config.jwt_secret.clone(),
        })
    }
}
