use std::collections::HashMap;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use bookings_core::{Form as ReservationForm, RepositoryError};
use bookings_shared::models::ReservationDraft;
use bookings_shared::DATE_LAYOUT;
use tracing::{info, warn};

use super::availability::MSG_NO_DRAFT;
use super::render;
use crate::error::AppError;
use crate::render::TemplateData;
use crate::session::{BookingSession, Flash};
use crate::state::AppState;

pub const MSG_ROOM_TAKEN: &str =
    "Sorry, that room was just booked for those dates. Please search again.";

fn reservation_page(
    draft: &ReservationDraft,
    form: ReservationForm,
) -> Result<TemplateData, AppError> {
    Ok(TemplateData::default()
        .with_string("start_date", draft.start_date.format(DATE_LAYOUT).to_string())
        .with_string("end_date", draft.end_date.format(DATE_LAYOUT).to_string())
        .with_data("reservation", draft)?
        .with_form(form))
}

/// Shows the contact form for the room chosen earlier in the session.
pub async fn make_reservation(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Response, AppError> {
    let draft = session.draft().await?;
    let Some((mut draft, room_id)) = draft.and_then(|d| d.room_id.map(|id| (d, id))) else {
        session.flash(Flash::Error, MSG_NO_DRAFT).await?;
        return Ok(Redirect::temporary("/").into_response());
    };
    if draft.is_persisted() {
        return Ok(Redirect::to("/reservation-summary").into_response());
    }

    if draft.room_name.is_none() {
        match state.repo.get_room_by_id(room_id).await {
            Ok(room) => draft.room_name = Some(room.room_name),
            Err(RepositoryError::NotFound { .. }) => {
                session.flash(Flash::Error, "That room does not exist").await?;
                return Ok(Redirect::temporary("/").into_response());
            }
            Err(e) => return Err(e.into()),
        }
        session.put_draft(&draft).await?;
    }

    let data = reservation_page(&draft, ReservationForm::default())?;
    Ok(render(&state, &session, "make-reservation.page.html", data)
        .await?
        .into_response())
}

pub async fn post_reservation(
    State(state): State<AppState>,
    session: BookingSession,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let Some(mut draft) = session.draft().await?.filter(ReservationDraft::has_room) else {
        session.flash(Flash::Error, MSG_NO_DRAFT).await?;
        return Ok(Redirect::to("/").into_response());
    };
    // resubmitted after a successful booking
    if draft.is_persisted() {
        return Ok(Redirect::to("/reservation-summary").into_response());
    }

    let mut form = ReservationForm::new(values);
    draft.fill_contact(
        form.get("first_name"),
        form.get("last_name"),
        form.get("email"),
        form.get("phone"),
    );

    form.required(&["first_name", "last_name", "email"])
        .min_length("first_name", 3)
        .is_email("email");

    if !form.valid() {
        draft.mark_pending();
        session.put_draft(&draft).await?;
        let data = reservation_page(&draft, form)?;
        return Ok(render(&state, &session, "make-reservation.page.html", data)
            .await?
            .into_response());
    }

    let Some(new_reservation) = draft.to_new_reservation() else {
        session.flash(Flash::Error, MSG_NO_DRAFT).await?;
        return Ok(Redirect::to("/").into_response());
    };

    match state.repo.book_room(&new_reservation).await {
        Ok(reservation_id) => {
            info!(reservation_id, room_id = new_reservation.room_id, "Reservation created");
            draft.mark_persisted(reservation_id);
            session.put_draft(&draft).await?;
            Ok(Redirect::to("/reservation-summary").into_response())
        }
        Err(RepositoryError::Conflict { room_id, start, end }) => {
            warn!(room_id, %start, %end, "Room taken before the reservation was saved");
            session.flash(Flash::Error, MSG_ROOM_TAKEN).await?;
            Ok(Redirect::to("/search-availability").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Shows the saved reservation once, then drops it from the session.
pub async fn reservation_summary(
    State(state): State<AppState>,
    session: BookingSession,
) -> Result<Response, AppError> {
    let persisted = session
        .draft()
        .await?
        .filter(ReservationDraft::is_persisted);
    let Some(draft) = persisted else {
        warn!("Reservation summary requested without a saved reservation");
        session.flash(Flash::Error, MSG_NO_DRAFT).await?;
        return Ok(Redirect::temporary("/").into_response());
    };
    let data = reservation_page(&draft, ReservationForm::default())?;
    let page = render(&state, &session, "reservation-summary.page.html", data).await?;
    session.take_draft().await?;
    Ok(page.into_response())
}
