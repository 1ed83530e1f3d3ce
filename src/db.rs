// src/db.rs

pub mod charge_repo;
pub mod client_repo;
pub mod json_store;
pub mod log_repo;
pub mod recurrence_repo;
pub mod settings_repo;

pub use charge_repo::{ChargeRepository, JsonChargeRepository};
pub use client_repo::{ClientRepository, JsonClientRepository};
pub use log_repo::{JsonLogRepository, LogRepository};
pub use recurrence_repo::{JsonRecurrenceRepository, RecurrenceRepository};
pub use settings_repo::{JsonSettingsRepository, SettingsRepository};
