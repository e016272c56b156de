//! Axum route handlers for disease prediction.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Form, State},
    http::StatusCode,
    response::Html,
    Json,
};
use minijinja::context;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::prediction::advisory::Advisory;
use crate::prediction::features::{symptom_features, PredictRequest};
use crate::prediction::model::Prediction;
use crate::state::AppState;

const MODEL_UNAVAILABLE: &str =
    "ERROR: Machine Learning model files are not loaded correctly on the server.";

#[derive(Debug, Serialize)]
pub struct PredictionResult {
    pub prediction_text: String,
    pub prediction: Prediction,
    /// Present only when the AI advisory is configured and answered.
    pub advisory: Option<Advisory>,
}

/// Features → classifier → optional advisory. Advisory failures never fail
/// the prediction.
async fn run_prediction(
    state: &AppState,
    request: PredictRequest,
) -> Result<PredictionResult, AppError> {
    let features = request
        .to_features()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let Some(model) = &state.model else {
        warn!("Prediction requested but no model is loaded");
        return Err(AppError::Unavailable(MODEL_UNAVAILABLE.to_string()));
    };

    let prediction = model.predict(&features)?;
    info!(
        "Predicted {} ({:.1}% confidence, {} symptoms)",
        prediction.predicted_disease,
        prediction.confidence,
        features.active_symptoms().len()
    );

    let advisory = match &state.advisor {
        Some(advisor) => match advisor.advise(&prediction.predicted_disease, &request).await {
            Ok(advisory) => Some(advisory),
            Err(e) => {
                warn!("AI advisory unavailable: {e}");
                None
            }
        },
        None => None,
    };

    Ok(PredictionResult {
        prediction_text: format!("You may be facing {}", prediction.predicted_disease),
        prediction,
        advisory,
    })
}

/// GET /model
pub async fn handle_model_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let html = state.pages.render(
        "model.html",
        context! { symptom_list => symptom_features() },
    )?;
    Ok(Html(html))
}

/// POST /predict
///
/// Form submission. Input and model problems are rendered into the page in
/// place of the prediction.
pub async fn handle_predict_form(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let outcome = match PredictRequest::from_form(&form) {
        Ok(request) => run_prediction(&state, request).await,
        Err(e) => Err(AppError::Validation(e.to_string())),
    };

    let (status, ctx) = match outcome {
        Ok(result) => (
            StatusCode::OK,
            context! {
                symptom_list => symptom_features(),
                prediction_text => result.prediction_text,
                prediction_data => result.prediction,
                advisory => result.advisory,
            },
        ),
        Err(err) => {
            let (status, _, message) = err.describe();
            (
                status,
                context! {
                    symptom_list => symptom_features(),
                    prediction_text => message,
                },
            )
        }
    };

    let html = state.pages.render("model.html", ctx)?;
    Ok((status, Html(html)))
}

/// POST /api/v1/predict
pub async fn handle_api_predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    let Json(request) = payload?;
    Ok(Json(run_prediction(&state, request).await?))
}
