// src/handlers.rs

pub mod charges;
pub mod clients;
pub mod logs;
pub mod messaging;
pub mod painel;
pub mod recurrences;
pub mod settings;
