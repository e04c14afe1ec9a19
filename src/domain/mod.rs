//! Core domain types and logic.

pub mod allocation;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod manager;
pub mod position;
pub mod record;
pub mod stock;
pub mod universe;
pub mod update;
