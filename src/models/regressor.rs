//! Двухслойная нейронная сеть для регрессии
//!
//! Фиксированная архитектура: скрытый слой ReLU на 50 нейронов,
//! линейный выход, полнобатчевый градиентный спуск по MSE.

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Ширина скрытого слоя фиксирована независимо от задачи
pub const HIDDEN_SIZE: usize = 50;

/// Параметры сети: два слоя весов и смещений
#[derive(Debug, Clone)]
pub struct Parameters {
    pub w1: Array2<f64>,
    pub b1: Array1<f64>,
    pub w2: Array2<f64>,
    pub b2: Array1<f64>,
}

impl Parameters {
    /// Веса из стандартного нормального распределения, смещения нулевые
    fn init(n_input: usize, n_hidden: usize, n_output: usize, rng: &mut StdRng) -> Self {
        Self {
            w1: Array2::from_shape_fn((n_input, n_hidden), |_| {
                rng.sample::<f64, _>(StandardNormal)
            }),
            b1: Array1::zeros(n_hidden),
            w2: Array2::from_shape_fn((n_hidden, n_output), |_| {
                rng.sample::<f64, _>(StandardNormal)
            }),
            b2: Array1::zeros(n_output),
        }
    }

    fn update(&mut self, grads: &Gradients, learning_rate: f64) {
        self.w1.scaled_add(-learning_rate, &grads.dw1);
        self.b1.scaled_add(-learning_rate, &grads.db1);
        self.w2.scaled_add(-learning_rate, &grads.dw2);
        self.b2.scaled_add(-learning_rate, &grads.db2);
    }
}

/// Промежуточные активации одного прямого прохода;
/// живут только до парного обратного прохода
struct ForwardCache {
    z1: Array2<f64>,
    a1: Array2<f64>,
    y_hat: Array2<f64>,
}

struct Gradients {
    dw1: Array2<f64>,
    db1: Array1<f64>,
    dw2: Array2<f64>,
    db2: Array1<f64>,
}

fn forward(X: &Array2<f64>, params: &Parameters) -> ForwardCache {
    let z1 = X.dot(&params.w1) + &params.b1;
    let a1 = z1.mapv(|v| v.max(0.0));
    let y_hat = a1.dot(&params.w2) + &params.b2;
    ForwardCache { z1, a1, y_hat }
}

/// Среднее квадратов ошибок по всем элементам батча
fn mse_loss(y: &Array2<f64>, y_hat: &Array2<f64>) -> f64 {
    (y_hat - y).mapv(|d| d * d).mean().unwrap_or(0.0)
}

fn backward(
    X: &Array2<f64>,
    y: &Array2<f64>,
    cache: &ForwardCache,
    params: &Parameters,
) -> Gradients {
    let n = X.nrows() as f64;

    let dz2 = (&cache.y_hat - y) / n;
    let dw2 = cache.a1.t().dot(&dz2);
    let db2 = dz2.sum_axis(Axis(0));

    // Градиент ReLU: ноль там, где преактивация <= 0
    let mask = cache.z1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
    let dz1 = dz2.dot(&params.w2.t()) * &mask;
    let dw1 = X.t().dot(&dz1);
    let db1 = dz1.sum_axis(Axis(0));

    Gradients { dw1, db1, dw2, db2 }
}

/// Регрессор с одним скрытым слоем.
///
/// Числовая стабильность не контролируется: NaN/Inf от слишком
/// большого шага обучения распространяются дальше.
pub struct TwoLayerRegressor {
    seed: u64,
    params: Option<Parameters>,
}

impl TwoLayerRegressor {
    /// Сид задаётся явно, чтобы обучение было воспроизводимым
    pub fn new(seed: u64) -> Self {
        Self { seed, params: None }
    }

    pub fn is_trained(&self) -> bool {
        self.params.is_some()
    }

    /// Полнобатчевое обучение; возвращает лосс последней эпохи
    pub fn train(
        &mut self,
        X: &Array2<f64>,
        y: &Array2<f64>,
        epochs: usize,
        learning_rate: f64,
    ) -> Result<f64, String> {
        if X.nrows() == 0 || X.ncols() == 0 {
            return Err("Empty dataset".to_string());
        }
        if X.nrows() != y.nrows() {
            return Err(format!(
                "Feature rows {} do not match target rows {}",
                X.nrows(),
                y.nrows()
            ));
        }
        if epochs == 0 {
            return Err("Epochs must be positive".to_string());
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err("Learning rate must be positive".to_string());
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut params = Parameters::init(X.ncols(), HIDDEN_SIZE, y.ncols(), &mut rng);

        let mut loss = 0.0;
        for epoch in 0..epochs {
            let cache = forward(X, &params);
            loss = mse_loss(y, &cache.y_hat);
            let grads = backward(X, y, &cache, &params);
            params.update(&grads, learning_rate);
            tracing::info!("epoch: {}, loss: {}", epoch, loss);
        }

        self.params = Some(params);
        Ok(loss)
    }

    /// Прямой проход без изменения параметров
    pub fn predict(&self, X: &Array2<f64>) -> Result<Array2<f64>, String> {
        let params = self.params.as_ref().ok_or("Model not trained")?;
        if X.ncols() != params.w1.nrows() {
            return Err(format!(
                "Input has {} features, model expects {}",
                X.ncols(),
                params.w1.nrows()
            ));
        }
        Ok(forward(X, params).y_hat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // y = 2*x0 + 3*x1 + 1 на равномерных признаках из [0, 1)
    fn linear_dataset(n: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let X = Array2::from_shape_fn((n, 3), |_| rng.gen::<f64>());
        let y = Array2::from_shape_fn((n, 1), |(i, _)| 2.0 * X[[i, 0]] + 3.0 * X[[i, 1]] + 1.0);
        (X, y)
    }

    #[test]
    fn converges_on_linear_target() {
        let (X, y) = linear_dataset(100, 7);

        let mut early = TwoLayerRegressor::new(42);
        let loss_after_one = early.train(&X, &y, 1, 0.1).unwrap();

        let mut model = TwoLayerRegressor::new(42);
        let final_loss = model.train(&X, &y, 1000, 0.1).unwrap();

        assert!(final_loss < loss_after_one);
        assert!(final_loss < 1e-2, "final loss too high: {final_loss}");

        // Отложенные точки из того же распределения
        let (X_test, y_test) = linear_dataset(20, 8);
        let predictions = model.predict(&X_test).unwrap();
        for i in 0..X_test.nrows() {
            let diff = (predictions[[i, 0]] - y_test[[i, 0]]).abs();
            assert!(diff < 0.3, "prediction off by {diff} at row {i}");
        }
    }

    #[test]
    fn predict_is_deterministic() {
        let (X, y) = linear_dataset(50, 3);
        let mut model = TwoLayerRegressor::new(1);
        model.train(&X, &y, 200, 0.05).unwrap();

        let first = model.predict(&X).unwrap();
        let second = model.predict(&X).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn same_seed_gives_same_training_run() {
        let (X, y) = linear_dataset(50, 3);

        let mut a = TwoLayerRegressor::new(9);
        let mut b = TwoLayerRegressor::new(9);
        let loss_a = a.train(&X, &y, 50, 0.05).unwrap();
        let loss_b = b.train(&X, &y, 50, 0.05).unwrap();

        assert_eq!(loss_a, loss_b);
        assert_eq!(a.predict(&X).unwrap(), b.predict(&X).unwrap());
    }

    #[test]
    fn rejects_bad_inputs() {
        let (X, y) = linear_dataset(10, 2);
        let mut model = TwoLayerRegressor::new(0);

        assert!(model.train(&Array2::zeros((0, 3)), &y, 10, 0.1).is_err());
        assert!(model.train(&X, &Array2::zeros((3, 1)), 10, 0.1).is_err());
        assert!(model.train(&X, &y, 0, 0.1).is_err());
        assert!(model.train(&X, &y, 10, -0.1).is_err());
        assert!(model.train(&X, &y, 10, f64::NAN).is_err());

        assert!(TwoLayerRegressor::new(0).predict(&X).is_err());

        model.train(&X, &y, 10, 0.05).unwrap();
        assert!(model.predict(&Array2::zeros((2, 5))).is_err());
    }
}
