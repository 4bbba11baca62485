/// Типы данных для модуля нормализации и ML

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Имена колонок исходного датасета объявлений
pub mod columns {
    pub const LAND_TYPE: &str = "Loại hình đất";
    pub const AREA: &str = "Diện tích";
    pub const PRICE_RAW: &str = "Mức giá";
    pub const PRICE: &str = "Giá";
    pub const PRICE_UNIT: &str = "Đơn vị(Mức giá)";
    pub const BEDROOMS: &str = "Số phòng ngủ";
    pub const BATHROOMS: &str = "Số phòng tắm, vệ sinh";
    pub const FLOORS: &str = "Số tầng";
    pub const FRONTAGE: &str = "Mặt tiền";
    pub const ACCESS_ROAD: &str = "Đường vào";
    pub const POSTED_AT: &str = "Ngày đăng";
}

/// Значение ячейки таблицы.
///
/// JSON-представление без тегов: null, число, строка даты "YYYY-MM-DD"
/// или произвольная строка.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Числовое значение как f64 (Int расширяется до f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Строка таблицы: имя колонки -> значение
pub type Row = HashMap<String, Value>;

/// Упорядоченная коллекция строк.
///
/// Трансформации колонок — чистые функции Table -> Table: каждая
/// переписывает ровно одну именованную колонку и не трогает остальные.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Заменяет значение колонки в каждой строке, где колонка присутствует
    pub fn map_column<F>(mut self, column: &str, f: F) -> Table
    where
        F: Fn(Value) -> Value,
    {
        for row in &mut self.rows {
            if let Some(value) = row.remove(column) {
                row.insert(column.to_string(), f(value));
            }
        }
        self
    }

    /// То же, что `map_column`, но первая ошибка прерывает всю колонку
    pub fn try_map_column<F>(mut self, column: &str, f: F) -> Result<Table, NormalizeError>
    where
        F: Fn(usize, Value) -> Result<Value, NormalizeError>,
    {
        for (idx, row) in self.rows.iter_mut().enumerate() {
            if let Some(value) = row.remove(column) {
                row.insert(column.to_string(), f(idx, value)?);
            }
        }
        Ok(self)
    }
}

/// Ошибки нормализации.
///
/// Единственный жёсткий отказ — колонка числа спален: её контракт
/// требует обязательного целого в каждой строке.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("column '{column}' requires an integer, row {row} has unparsable value '{raw}'")]
    NonNullableColumn {
        column: String,
        row: usize,
        raw: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
    pub epochs: usize,
    pub learning_rate: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub epochs: usize,
    pub final_loss: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Vec<f64>>,
}
