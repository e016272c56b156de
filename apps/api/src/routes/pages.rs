use axum::{extract::State, response::Html};
use minijinja::context;

use crate::errors::AppError;
use crate::state::AppState;

/// GET /
pub async fn handle_about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.render("about.html", context! {})?))
}

/// GET /visualize
pub async fn handle_visualize(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.render("visualize.html", context! {})?))
}
