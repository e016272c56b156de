pub mod health;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::contact::handlers as contact;
use crate::prediction::handlers as prediction;
use crate::state::AppState;

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::handle_about))
        .route("/visualize", get(pages::handle_visualize))
        // Prediction
        .route("/model", get(prediction::handle_model_page))
        .route("/predict", post(prediction::handle_predict_form))
        .route("/api/v1/predict", post(prediction::handle_api_predict))
        // Contact
        .route(
            "/touch",
            get(contact::handle_contact_page).post(contact::handle_contact_form),
        )
        .route("/contact", get(contact::handle_contact_page))
        .route("/api/v1/contact", post(contact::handle_api_contact))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::contact::store::tests::{MemoryContactStore, UnreachableStore};
    use crate::contact::store::ContactStore;
    use crate::pages::Pages;
    use crate::prediction::model::tests::logistic_model;

    fn state(with_model: bool, store: Option<Arc<dyn ContactStore>>) -> AppState {
        AppState {
            pages: Arc::new(Pages::new().unwrap()),
            model: with_model.then(|| Arc::new(logistic_model())),
            advisor: None,
            contact_store: store,
        }
    }

    fn app(state: AppState) -> Router {
        build_router(state, "static")
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_disabled_features() {
        let response = app(state(false, None)).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["features"]["model"], false);
        assert_eq!(body["features"]["ai_advisory"], false);
        assert!(body["features"]["contact_store"].is_null());
    }

    #[tokio::test]
    async fn test_pages_render() {
        for uri in ["/", "/model", "/visualize", "/touch", "/contact"] {
            let response = app(state(true, None)).oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_model_page_lists_symptoms() {
        let response = app(state(true, None)).oneshot(get("/model")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("name=\"pain_behind_the_eyes\""));
        assert!(!html.contains("name=\"pain_behind_eyes\""));
    }

    #[tokio::test]
    async fn test_predict_form_renders_prediction() {
        let body = "age=30&gender=male&temperature=0&humidity=0&wind_speed=5&cough=1";
        let response = app(state(true, None))
            .oneshot(form_post("/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("You may be facing Common Cold"));
        assert!(!html.contains("Suggested diagnostic tests"));
    }

    #[tokio::test]
    async fn test_predict_form_missing_field_message() {
        let body = "age=30&gender=male&temperature=20&humidity=0.4";
        let response = app(state(true, None))
            .oneshot(form_post("/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("ERROR: The field &#x27;Wind Speed&#x27; is required."));
    }

    #[tokio::test]
    async fn test_predict_form_without_model() {
        let body = "age=30&gender=male&temperature=20&humidity=0.4&wind_speed=3";
        let response = app(state(false, None))
            .oneshot(form_post("/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let html = body_text(response).await;
        assert!(html.contains("Machine Learning model files are not loaded correctly"));
    }

    #[tokio::test]
    async fn test_api_predict_returns_json() {
        let body = r#"{"age": 50, "gender": "female", "temperature": 0, "humidity": 3,
            "wind_speed": 8, "symptoms": ["fatigue"]}"#;
        let response = app(state(true, None))
            .oneshot(json_post("/api/v1/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["prediction"]["predicted_disease"], "Dengue");
        assert_eq!(body["prediction_text"], "You may be facing Dengue");
        assert!(body["advisory"].is_null());
    }

    #[tokio::test]
    async fn test_api_predict_unknown_symptom_is_bad_request() {
        let body = r#"{"age": 50, "gender": "female", "temperature": 0, "humidity": 3,
            "wind_speed": 8, "symptoms": ["hiccups"]}"#;
        let response = app(state(true, None))
            .oneshot(json_post("/api/v1/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_api_predict_missing_field_uses_error_envelope() {
        let body = r#"{"gender": "female", "temperature": 0, "humidity": 3,
            "wind_speed": 8, "symptoms": []}"#;
        let response = app(state(true, None))
            .oneshot(json_post("/api/v1/predict", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("age"));
    }

    #[tokio::test]
    async fn test_api_contact_malformed_body_uses_error_envelope() {
        let store = Arc::new(MemoryContactStore::default());
        let response = app(state(false, Some(store.clone())))
            .oneshot(json_post("/api/v1/contact", "{\"name\": "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_form_redirects_after_insert() {
        let store = Arc::new(MemoryContactStore::default());
        let response = app(state(false, Some(store.clone())))
            .oneshot(form_post(
                "/touch",
                "name=Ana&email=a%40b.com&message_type=bug&message=test",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/contact?status=sent"
        );
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@b.com");
    }

    #[tokio::test]
    async fn test_contact_confirmation_page() {
        let response = app(state(false, None))
            .oneshot(get("/contact?status=sent"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Your message has been received"));
    }

    #[tokio::test]
    async fn test_contact_page_renders_empty_form() {
        for uri in ["/touch", "/contact"] {
            let response = app(state(false, None)).oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let html = body_text(response).await;
            assert!(html.contains("name=\"name\" value=\"\""));
            assert!(!html.contains("Your message has been received"));
        }
    }

    #[tokio::test]
    async fn test_contact_form_validation_keeps_values() {
        let store = Arc::new(MemoryContactStore::default());
        let response = app(state(false, Some(store.clone())))
            .oneshot(form_post("/touch", "name=Ana&email=&message_type=bug&message=hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Please fill in the &#x27;Email&#x27; field."));
        assert!(html.contains("value=\"Ana\""));
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_form_with_unreachable_store_still_responds() {
        let response = app(state(false, Some(Arc::new(UnreachableStore))))
            .oneshot(form_post(
                "/touch",
                "name=Ana&email=a%40b.com&message_type=bug&message=test",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let html = body_text(response).await;
        assert!(html.contains("could not be saved"));
    }

    #[tokio::test]
    async fn test_contact_form_without_store_still_responds() {
        let response = app(state(false, None))
            .oneshot(form_post(
                "/touch",
                "name=Ana&email=a%40b.com&message_type=bug&message=test",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let html = body_text(response).await;
        assert!(html.contains("cannot be received right now"));
    }

    #[tokio::test]
    async fn test_api_contact_created() {
        let store = Arc::new(MemoryContactStore::default());
        let body = r#"{"name": "Ana", "email": "a@b.com", "message_type": "bug", "message": "test"}"#;
        let response = app(state(false, Some(store)))
            .oneshot(json_post("/api/v1/contact", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let row: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(row["id"], 1);
        assert_eq!(row["name"], "Ana");
        assert_eq!(row["message_type"], "bug");
        assert!(row["submitted_at"].is_string());
    }

    #[tokio::test]
    async fn test_api_contact_stores_fields_as_submitted() {
        let store = Arc::new(MemoryContactStore::default());
        let body = r#"{"name": " Ana ", "email": "a@b.com", "message_type": "bug", "message": "test\n"}"#;
        let response = app(state(false, Some(store.clone())))
            .oneshot(json_post("/api/v1/contact", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows[0].name, " Ana ");
        assert_eq!(rows[0].message_type, "bug");
        assert_eq!(rows[0].message, "test\n");
    }

    #[tokio::test]
    async fn test_api_contact_rejects_miscased_message_type() {
        let store = Arc::new(MemoryContactStore::default());
        let body = r#"{"name": "Ana", "email": "a@b.com", "message_type": "Bug", "message": "test"}"#;
        let response = app(state(false, Some(store.clone())))
            .oneshot(json_post("/api/v1/contact", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.rows.lock().unwrap().is_empty());
    }
}
