use axum::{
    response::Html,
    routing::{get, post},
    Router,
};

use crate::error::AppError;
use crate::render::TemplateData;
use crate::session::BookingSession;
use crate::state::AppState;

pub mod availability;
pub mod pages;
pub mod reservation;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/villas", get(pages::villas))
        .route("/suites", get(pages::suites))
        .route("/contact", get(pages::contact))
        .route(
            "/search-availability",
            get(pages::search_availability).post(availability::post_search_availability),
        )
        .route("/search-availability-json", post(availability::availability_json))
        .route("/choose-room/{id}", get(availability::choose_room))
        .route("/book-room", get(availability::book_room))
        .route(
            "/make-reservation",
            get(reservation::make_reservation).post(reservation::post_reservation),
        )
        .route("/reservation-summary", get(reservation::reservation_summary))
}

/// Renders a page after merging in flash messages and the CSRF token.
pub async fn render(
    state: &AppState,
    session: &BookingSession,
    template: &str,
    mut data: TemplateData,
) -> Result<Html<String>, AppError> {
    session.add_default_data(&mut data).await?;
    let body = state
        .templates
        .render(template, &data)
        .await
        .map_err(AppError::Template)?;
    Ok(Html(body))
}

pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFoundError(uri.path().to_string())
}
