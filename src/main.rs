/// API сервер нормализации и обучения

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use ndarray::Array2;
use tower_http::cors::{Any, CorsLayer};

use nhadat_ml::{
    normalize_listings,
    types::{PredictRequest, PredictResponse, Table, TrainRequest, TrainResponse},
    TwoLayerRegressor,
};

#[derive(Clone)]
struct AppState {
    regressor: std::sync::Arc<tokio::sync::Mutex<TwoLayerRegressor>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let state = AppState {
        regressor: std::sync::Arc::new(tokio::sync::Mutex::new(TwoLayerRegressor::new(42))),
    };

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/normalize", post(normalize))
        .route("/api/train", post(train))
        .route("/api/predict", post(predict))
        .layer(cors)
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 8000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://0.0.0.0:8000");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Nhadat ML API (Rust)",
        "version": "0.1.0"
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn normalize(Json(table): Json<Table>) -> Result<Json<Table>, (StatusCode, String)> {
    tracing::info!("Normalize request: {} rows", table.len());

    normalize_listings(table)
        .map(Json)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

async fn train(
    State(state): State<AppState>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainResponse>, (StatusCode, String)> {
    tracing::info!(
        "Train request: {} samples, {} epochs",
        request.features.len(),
        request.epochs
    );

    let x = to_matrix(&request.features).map_err(bad_request)?;
    let y = to_matrix(&request.targets).map_err(bad_request)?;

    let mut model = state.regressor.lock().await;
    *model = TwoLayerRegressor::new(request.seed);

    match model.train(&x, &y, request.epochs, request.learning_rate) {
        Ok(final_loss) => Ok(Json(TrainResponse {
            epochs: request.epochs,
            final_loss,
        })),
        Err(e) => Err(bad_request(e)),
    }
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    tracing::info!("Predict request: {} samples", request.features.len());

    let x = to_matrix(&request.features).map_err(bad_request)?;

    let model = state.regressor.lock().await;
    match model.predict(&x) {
        Ok(predictions) => Ok(Json(PredictResponse {
            predictions: predictions.outer_iter().map(|row| row.to_vec()).collect(),
        })),
        Err(e) => Err(bad_request(e)),
    }
}

fn bad_request(message: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message)
}

/// Прямоугольный Vec<Vec<f64>> -> Array2
fn to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, String> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err("Rows have inconsistent lengths".to_string());
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| e.to_string())
}
