//! HTTP handlers for prediction endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use prevalence_core::model::{Question, UserAnswers};
use prevalence_core::predict::{PredictionResult, RankedRate};
use prevalence_core::Predictor;

use super::dto::{ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared by every request. The predictor holds the table behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    predictor: Predictor,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self { predictor }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /predict - Rank drugs for a set of answers
pub async fn predict(
    State(state): State<AppState>,
    Json(answers): Json<UserAnswers>,
) -> Response {
    match state.predictor.predict(&answers) {
        Ok(results) => {
            let body: Vec<RankedRate> = results.iter().map(PredictionResult::rounded).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            // Data faults are not the client's to see
            tracing::error!(error = %e, answered = answers.len(), "prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("prediction failed")),
            )
                .into_response()
        }
    }
}

/// GET /questions - Question ids, prompts and options in display order
pub async fn questions(State(state): State<AppState>) -> Json<Vec<Question>> {
    Json(state.predictor.table().questions().to_vec())
}

/// GET /health - Liveness and the table being served
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let table = state.predictor.table();
    Json(HealthResponse {
        status: "ok",
        table: table.name().to_string(),
        version: table.version().to_string(),
    })
}
