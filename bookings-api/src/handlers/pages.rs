use axum::{extract::State, response::Html};

use super::render;
use crate::error::AppError;
use crate::render::TemplateData;
use crate::session::BookingSession;
use crate::state::AppState;

pub async fn home(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "home.page.html", TemplateData::default()).await
}

pub async fn about(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "about.page.html", TemplateData::default()).await
}

pub async fn villas(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "villas.page.html", TemplateData::default()).await
}

pub async fn suites(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "suites.page.html", TemplateData::default()).await
}

pub async fn contact(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "contact.page.html", TemplateData::default()).await
}

pub async fn search_availability(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Html<String>, AppError> {
    render(&state, &session, "search-availability.page.html", TemplateData::default()).await
}
