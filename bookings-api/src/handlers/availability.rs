use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use bookings_core::{parse_stay, RepositoryError};
use bookings_shared::models::ReservationDraft;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::render;
use crate::error::AppError;
use crate::render::TemplateData;
use crate::session::{BookingSession, Flash};
use crate::state::AppState;

pub const MSG_NO_ROOMS: &str = "No rooms available for those dates";
pub const MSG_NO_DRAFT: &str = "Can't get reservation from session";

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

pub async fn post_search_availability(
    State(state): State<AppState>,
    session: BookingSession,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let (start, end) = match parse_stay(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(e) => {
            session.flash(Flash::Error, e.to_string()).await?;
            return Ok(Redirect::to("/search-availability").into_response());
        }
    };

    let rooms = state.repo.search_availability_for_all_rooms(start, end).await?;
    if rooms.is_empty() {
        info!(%start, %end, "No rooms available");
        session.flash(Flash::Error, MSG_NO_ROOMS).await?;
        return Ok(Redirect::to("/search-availability").into_response());
    }

    session.put_draft(&ReservationDraft::new(start, end)).await?;

    let data = TemplateData::default()
        .with_string("start_date", form.start.trim())
        .with_string("end_date", form.end.trim())
        .with_data("rooms", &rooms)?;
    Ok(render(&state, &session, "choose-room.page.html", data)
        .await?
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityJsonForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityJsonResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Point check for one room, answered as JSON for the room pages.
pub async fn availability_json(
    State(state): State<AppState>,
    Form(form): Form<AvailabilityJsonForm>,
) -> Json<AvailabilityJsonResponse> {
    let mut resp = AvailabilityJsonResponse {
        ok: false,
        message: String::new(),
        room_id: form.room_id.trim().to_string(),
        start_date: form.start.trim().to_string(),
        end_date: form.end.trim().to_string(),
    };

    let (start, end) = match parse_stay(&form.start, &form.end) {
        Ok(stay) => stay,
        Err(e) => {
            resp.message = e.to_string();
            return Json(resp);
        }
    };
    let Ok(room_id) = resp.room_id.parse::<i32>() else {
        resp.message = "Invalid room id".to_string();
        return Json(resp);
    };

    match state
        .repo
        .search_availability_by_dates_by_room_id(start, end, room_id)
        .await
    {
        Ok(available) => resp.ok = available,
        Err(e) => {
            error!("Availability check failed for room {}: {}", room_id, e);
            resp.message = "Error querying database".to_string();
        }
    }
    Json(resp)
}

/// Attaches the chosen room to the draft started by the search.
pub async fn choose_room(
    session: BookingSession,
    Path(room_id): Path<i32>,
) -> Result<Redirect, AppError> {
    let Some(mut draft) = session.draft().await? else {
        session.flash(Flash::Error, MSG_NO_DRAFT).await?;
        return Ok(Redirect::to("/"));
    };
    if draft.is_persisted() {
        return Ok(Redirect::to("/reservation-summary"));
    }

    draft.select_room(room_id, None);
    session.put_draft(&draft).await?;
    Ok(Redirect::to("/make-reservation"))
}

#[derive(Debug, Deserialize)]
pub struct BookRoomParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub e: String,
}

/// Starts a draft straight from a room page link: `/book-room?id=1&s=..&e=..`.
pub async fn book_room(
    State(state): State<AppState>,
    session: BookingSession,
    Query(params): Query<BookRoomParams>,
) -> Result<Redirect, AppError> {
    let stay = parse_stay(&params.s, &params.e);
    let room_id = params.id.trim().parse::<i32>();
    let ((start, end), room_id) = match (stay, room_id) {
        (Ok(stay), Ok(room_id)) => (stay, room_id),
        (Err(e), _) => {
            session.flash(Flash::Error, e.to_string()).await?;
            return Ok(Redirect::to("/search-availability"));
        }
        (_, Err(_)) => {
            session.flash(Flash::Error, "Invalid room id").await?;
            return Ok(Redirect::to("/search-availability"));
        }
    };

    let room = match state.repo.get_room_by_id(room_id).await {
        Ok(room) => room,
        Err(RepositoryError::NotFound { .. }) => {
            session.flash(Flash::Error, "That room does not exist").await?;
            return Ok(Redirect::to("/search-availability"));
        }
        Err(e) => return Err(e.into()),
    };

    let mut draft = ReservationDraft::new(start, end);
    draft.select_room(room.id, Some(room.room_name));
    session.put_draft(&draft).await?;
    Ok(Redirect::to("/make-reservation"))
}
