// src/models.rs

pub mod auth;
pub mod charge;
pub mod client;
pub mod dates;
pub mod log;
pub mod recurrence;
pub mod settings;

pub use charge::{Charge, UpdateChargePayload};
pub use client::{Client, UpdateClientPayload};
pub use log::LogEntry;
pub use recurrence::{
    RecurrenceStatus, RecurrenceType, RecurringCharge, UpdateRecurringChargePayload,
};
pub use settings::{Settings, UpdateSettingsPayload};
