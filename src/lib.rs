//! Nhadat ML - Rust библиотека
//!
//! Нормализация сырых объявлений недвижимости и обучение
//! двухслойного регрессора на числовой цели.

pub mod models;
pub mod preprocessing;
pub mod types;

pub use models::*;
pub use preprocessing::*;
pub use types::*;

// Re-export для удобства
pub use models::regressor::TwoLayerRegressor;
pub use types::{NormalizeError, Table, Value};
