/// Модуль предобработки данных

pub mod feature_engineering;
pub mod normalization;

pub use feature_engineering::FeatureEngineer;
pub use normalization::{
    normalize_access_road, normalize_area, normalize_bathrooms, normalize_bedrooms,
    normalize_floors, normalize_frontage, normalize_land_type, normalize_listings,
    normalize_posting_date, normalize_price,
};
