/// ML модели

pub mod regressor;

pub use regressor::{TwoLayerRegressor, HIDDEN_SIZE};
