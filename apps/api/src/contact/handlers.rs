//! Axum route handlers for the contact form.

use axum::{
    extract::{rejection::JsonRejection, Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::contact::validation::{validate, ContactForm, MessageType};
use crate::errors::AppError;
use crate::models::contact::ContactSubmissionRow;
use crate::state::AppState;

const STORE_DISABLED: &str =
    "Sorry, messages cannot be received right now. Please try again later.";

#[derive(Deserialize)]
pub struct ContactPageQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
struct MessageTypeOption {
    value: &'static str,
    label: &'static str,
}

fn message_type_options() -> Vec<MessageTypeOption> {
    MessageType::ALL
        .iter()
        .map(|t| MessageTypeOption {
            value: t.as_str(),
            label: t.label(),
        })
        .collect()
}

/// Validate → insert. No retry; a failed insert is reported, not repeated.
async fn submit(state: &AppState, form: &ContactForm) -> Result<ContactSubmissionRow, AppError> {
    let submission = validate(form).map_err(|e| AppError::Validation(e.to_string()))?;

    let Some(store) = &state.contact_store else {
        warn!(
            "Contact store not configured; dropping {} message",
            submission.message_type
        );
        return Err(AppError::Unavailable(STORE_DISABLED.to_string()));
    };

    let row = store.insert(&submission).await?;
    info!(
        "Stored contact submission {} ({}) via {}",
        row.id,
        row.message_type,
        store.backend()
    );
    Ok(row)
}

/// GET /touch, GET /contact
pub async fn handle_contact_page(
    State(state): State<AppState>,
    Query(query): Query<ContactPageQuery>,
) -> Result<Html<String>, AppError> {
    let html = state.pages.render(
        "contact.html",
        context! {
            sent => query.status.as_deref() == Some("sent"),
            form => ContactForm::default(),
            message_types => message_type_options(),
        },
    )?;
    Ok(Html(html))
}

/// POST /touch
///
/// Redirects to the confirmation page on success. Otherwise re-renders the
/// form with the submitted values and a message.
pub async fn handle_contact_form(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let err = match submit(&state, &form).await {
        Ok(_) => return Ok(Redirect::to("/contact?status=sent").into_response()),
        Err(err) => err,
    };

    let (status, _, message) = err.describe();
    let html = state.pages.render(
        "contact.html",
        context! {
            error => message,
            form => form,
            message_types => message_type_options(),
        },
    )?;
    Ok((status, Html(html)).into_response())
}

/// POST /api/v1/contact
pub async fn handle_api_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactSubmissionRow>), AppError> {
    let Json(form) = payload?;
    let row = submit(&state, &form).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
