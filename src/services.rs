// src/services.rs

pub mod charge_service;
pub mod recurrence_service;

pub use charge_service::ChargeService;
pub use recurrence_service::{calculate_next_send_date, RecurrenceService};
