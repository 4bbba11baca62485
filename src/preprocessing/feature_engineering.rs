//! Сборка матриц признаков из нормализованной таблицы

use ndarray::Array2;

use crate::types::{columns, Table, Value};

/// Числовые колонки, которые по умолчанию идут в признаки
pub const DEFAULT_FEATURE_COLUMNS: [&str; 6] = [
    columns::AREA,
    columns::BEDROOMS,
    columns::BATHROOMS,
    columns::FLOORS,
    columns::FRONTAGE,
    columns::ACCESS_ROAD,
];

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Извлекает матрицу признаков и матрицу целей из таблицы.
    ///
    /// Берутся только строки, где все выбранные колонки числовые и
    /// без пропусков; остальные пропускаются.
    pub fn extract_features(
        table: &Table,
        feature_columns: &[&str],
        target_column: &str,
    ) -> Result<(Array2<f64>, Array2<f64>), String> {
        if feature_columns.is_empty() {
            return Err("No feature columns selected".to_string());
        }

        let mut features: Vec<f64> = Vec::new();
        let mut targets: Vec<f64> = Vec::new();
        let mut n_rows = 0;

        for row in &table.rows {
            let mut sample = Vec::with_capacity(feature_columns.len());
            for column in feature_columns {
                match row.get(*column).and_then(Value::as_f64) {
                    Some(v) => sample.push(v),
                    None => {
                        sample.clear();
                        break;
                    }
                }
            }
            if sample.len() != feature_columns.len() {
                continue;
            }

            let target = match row.get(target_column).and_then(Value::as_f64) {
                Some(v) => v,
                None => continue,
            };

            features.extend(sample);
            targets.push(target);
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err("No complete rows to train on".to_string());
        }

        let x = Array2::from_shape_vec((n_rows, feature_columns.len()), features)
            .map_err(|e| e.to_string())?;
        let y = Array2::from_shape_vec((n_rows, 1), targets).map_err(|e| e.to_string())?;
        Ok((x, y))
    }
}
