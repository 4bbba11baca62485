//! Нормализация полей объявлений недвижимости
//!
//! Каждая функция — чистая трансформация Table -> Table над одной
//! колонкой. Неразбираемые значения деградируют в Value::Null, кроме
//! колонки числа спален (см. `normalize_bedrooms`).

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::types::{columns, NormalizeError, Table, Value};

/// Правила категоризации типа недвижимости: (подстрока, метка).
///
/// Порядок — часть контракта: строка получает метку первого
/// совпавшего правила. Не переупорядочивать.
const LAND_TYPE_RULES: [(&str, &str); 15] = [
    ("Nhà biệt thự", "Nhà biệt thự"),
    ("Căn hộ chung cư", "Căn hộ chung cư"),
    ("Nhà mặt phố", "Nhà mặt phố"),
    ("Bán đất", "Bán đất"),
    ("Văn phòng", "Văn phòng"),
    ("Nhà riêng", "Nhà riêng"),
    ("Condotel", "Condotel"),
    ("Đất nền", "Đất nền"),
    ("Shophouse", "Shophouse"),
    ("Nhà trọ", "Nhà trọ"),
    ("Chung cư mini, căn hộ", "Chung cư mini, căn hộ"),
    ("Kho", "Kho"),
    ("Trang trại", "Trang trại"),
    ("Cửa hàng", "Cửa hàng"),
    ("Loại bất động sản khác", "Loại bất động sản khác"),
];

/// Шаблон "число + хвост" для разбора цены: "3.5 tỷ", "15,2 triệu/m²"
fn price_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(.*)").unwrap())
}

/// Категоризация колонки "Loại hình đất".
///
/// Первое правило, чья подстрока встречается в тексте, даёт метку;
/// без совпадений исходное значение остаётся как есть.
pub fn normalize_land_type(table: Table) -> Table {
    table.map_column(columns::LAND_TYPE, |value| match value {
        Value::Text(raw) => {
            for (pattern, label) in LAND_TYPE_RULES {
                if raw.contains(pattern) {
                    return Value::Text(label.to_string());
                }
            }
            Value::Text(raw)
        }
        other => other,
    })
}

/// Колонка "Diện tích": "96 m²" -> 96.0, "120,5 m²" -> 120.5
pub fn normalize_area(table: Table) -> Table {
    table.map_column(columns::AREA, |value| {
        parse_float(value, "m²", FloatOptions {
            lowercase: true,
            comma_to_dot: true,
        })
    })
}

/// Колонка "Mức giá": выделяет величину и единицу в две новые колонки
/// "Giá" (float) и "Đơn vị(Mức giá)" (текст). Строки без ведущего
/// числа получают Null в обеих.
pub fn normalize_price(mut table: Table) -> Table {
    for row in &mut table.rows {
        let raw = match row.get(columns::PRICE_RAW) {
            Some(value) => value.clone(),
            None => continue,
        };

        let (magnitude, unit) = match raw {
            Value::Text(text) => match price_pattern().captures(&text) {
                Some(caps) => {
                    let magnitude = caps[1]
                        .replace(',', ".")
                        .parse::<f64>()
                        .map(Value::Float)
                        .unwrap_or(Value::Null);
                    (magnitude, Value::Text(caps[2].to_string()))
                }
                None => (Value::Null, Value::Null),
            },
            Value::Int(i) => (Value::Float(i as f64), Value::Null),
            Value::Float(f) => (Value::Float(f), Value::Null),
            _ => (Value::Null, Value::Null),
        };

        row.insert(columns::PRICE.to_string(), magnitude);
        row.insert(columns::PRICE_UNIT.to_string(), unit);
    }
    table
}

/// Колонка "Số phòng ngủ": "9 phòng" -> 9.
///
/// Контракт колонки — обязательное целое: неразбираемое или
/// отсутствующее значение прерывает нормализацию всей колонки.
pub fn normalize_bedrooms(table: Table) -> Result<Table, NormalizeError> {
    table.try_map_column(columns::BEDROOMS, |idx, value| {
        match parse_int(value.clone(), "phòng") {
            Value::Int(i) => Ok(Value::Int(i)),
            _ => Err(NormalizeError::NonNullableColumn {
                column: columns::BEDROOMS.to_string(),
                row: idx,
                raw: describe(&value),
            }),
        }
    })
}

/// Колонка "Số phòng tắm, vệ sinh": "2 phòng" -> 2, мусор -> Null
pub fn normalize_bathrooms(table: Table) -> Table {
    table.map_column(columns::BATHROOMS, |value| parse_int(value, "phòng"))
}

/// Колонка "Số tầng": "3 tầng" -> 3, мусор -> Null
pub fn normalize_floors(table: Table) -> Table {
    table.map_column(columns::FLOORS, |value| parse_int(value, "tầng"))
}

/// Колонка "Mặt tiền": "4m" -> 4.0, "5.5 m" -> 5.5
pub fn normalize_frontage(table: Table) -> Table {
    table.map_column(columns::FRONTAGE, |value| {
        parse_float(value, "m", FloatOptions::default())
    })
}

/// Колонка "Đường vào": "3m" -> 3.0
pub fn normalize_access_road(table: Table) -> Table {
    table.map_column(columns::ACCESS_ROAD, |value| {
        parse_float(value, "m", FloatOptions::default())
    })
}

/// Колонка "Ngày đăng": "05-06-2025" и "24/06/2025" — день впереди.
///
/// Принимаются ровно два формата, %d-%m-%Y и %d/%m/%Y; всё прочее
/// (включая плейсхолдер "nan") даёт Null.
pub fn normalize_posting_date(table: Table) -> Table {
    table.map_column(columns::POSTED_AT, |value| match value {
        Value::Date(d) => Value::Date(d),
        Value::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return Value::Null;
            }
            for format in ["%d-%m-%Y", "%d/%m/%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                    return Value::Date(date);
                }
            }
            Value::Null
        }
        _ => Value::Null,
    })
}

/// Полный конвейер нормализации в порядке исходного ETL.
///
/// Колонки независимы, поэтому порядок между функциями на результат
/// не влияет; важен только порядок правил внутри категоризации.
pub fn normalize_listings(table: Table) -> Result<Table, NormalizeError> {
    let table = normalize_land_type(table);
    let table = normalize_area(table);
    let table = normalize_price(table);
    let table = normalize_bedrooms(table)?;
    let table = normalize_bathrooms(table);
    let table = normalize_floors(table);
    let table = normalize_frontage(table);
    let table = normalize_access_road(table);
    Ok(normalize_posting_date(table))
}

#[derive(Default)]
struct FloatOptions {
    lowercase: bool,
    comma_to_dot: bool,
}

/// Убирает единицу измерения и разбирает float; мусор -> Null.
/// Уже числовые значения проходят без изменений.
fn parse_float(value: Value, unit: &str, options: FloatOptions) -> Value {
    match value {
        Value::Float(f) => Value::Float(f),
        Value::Int(i) => Value::Float(i as f64),
        Value::Text(raw) => {
            let mut text = if options.lowercase {
                raw.to_lowercase()
            } else {
                raw
            };
            text = text.replace(unit, "");
            if options.comma_to_dot {
                text = text.replace(',', ".");
            }
            match text.trim().parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Value::Float(parsed),
                _ => Value::Null,
            }
        }
        _ => Value::Null,
    }
}

/// Убирает слово-единицу и разбирает целое; мусор -> Null
fn parse_int(value: Value, unit: &str) -> Value {
    match value {
        Value::Int(i) => Value::Int(i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Value::Int(f as i64),
        Value::Text(raw) => {
            let text = raw.replace(unit, "");
            match text.trim().parse::<i64>() {
                Ok(parsed) => Value::Int(parsed),
                Err(_) => Value::Null,
            }
        }
        _ => Value::Null,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Text(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Date(d) => d.to_string(),
    }
}
