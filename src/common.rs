// src/common.rs

pub mod error;
pub mod format;
pub mod validation;
