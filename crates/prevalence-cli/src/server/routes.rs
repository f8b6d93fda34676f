//! Route configuration for the prediction service.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health, predict, questions, AppState};

/// Creates the router with all endpoints.
///
/// Routes:
/// - `POST /predict` - Ranked adjusted prevalence for a JSON answer object
/// - `GET /questions` - Question schema
/// - `GET /health` - Liveness
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/questions", get(questions))
        .route("/health", get(health))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use prevalence_core::table::builtin::load_default;
    use prevalence_core::table::parse_table_str;
    use prevalence_core::Predictor;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let predictor = Predictor::from(load_default().unwrap());
        router(AppState::new(predictor), Duration::from_secs(5))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn predict_returns_ranked_rates() {
        let response = app()
            .oneshot(post_json(
                "/predict",
                r#"{"age": "20–24", "sex": "Male", "nightclub": "4 or more visits"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 6);

        let rates: Vec<f64> = results.iter().map(|r| r["rate"].as_f64().unwrap()).collect();
        assert!(rates.windows(2).all(|w| w[0] >= w[1]));
        assert!(rates.iter().all(|&r| (0.0..=95.0).contains(&r)));
        assert!(results[0]["classification"].is_string());
        assert!(results[0]["baseline_rate"].is_number());
    }

    #[tokio::test]
    async fn empty_answers_return_baselines() {
        let response = app().oneshot(post_json("/predict", "{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["drug"], "Cannabis");
        assert_eq!(body[0]["rate"], body[0]["baseline_rate"]);
        assert_eq!(body[0]["multiplier"].as_f64(), Some(1.0));
    }

    #[tokio::test]
    async fn unknown_option_is_internal_error() {
        let response = app()
            .oneshot(post_json("/predict", r#"{"region": "Atlantis"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        // Table details stay in the logs
        assert!(!body["message"].as_str().unwrap().contains("Atlantis"));
    }

    #[tokio::test]
    async fn unknown_question_is_ignored() {
        let response = app()
            .oneshot(post_json("/predict", r#"{"foo123": "bar"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let response = app()
            .oneshot(post_json("/predict", r#"["age", "20–24"]"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn questions_lists_schema() {
        let response = app()
            .oneshot(Request::builder().uri("/questions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let questions = body.as_array().unwrap();
        assert_eq!(questions.len(), 13);
        assert_eq!(questions[0]["id"], "age");
        assert!(questions[0]["options"].as_array().unwrap().len() > 1);
    }

    #[tokio::test]
    async fn health_names_table() {
        let json = r#"{
            "name": "Tiny", "version": "7",
            "drugs": [ { "name": "Cannabis", "baseline": "9.4" } ],
            "questions": [ { "id": "sex", "prompt": "?", "options": [
                { "label": "Male", "rates": { "Cannabis": "18.8" } }
            ] } ]
        }"#;
        let predictor = Predictor::from(parse_table_str(json).unwrap());
        let app = router(AppState::new(predictor), Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["table"], "Tiny");
        assert_eq!(body["version"], "7");
    }
}
