use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use bookings_shared::models::ReservationDraft;
use tower_sessions::Session;
use uuid::Uuid;

use crate::render::TemplateData;

const RESERVATION_KEY: &str = "reservation";
const CSRF_KEY: &str = "csrf_token";

pub type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// One-time messages shown by the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Info,
    Warning,
    Error,
}

impl Flash {
    fn key(self) -> &'static str {
        match self {
            Flash::Info => "flash",
            Flash::Warning => "warning",
            Flash::Error => "error",
        }
    }
}

/// Typed view over the visitor's session.
pub struct BookingSession(Session);

impl<S> FromRequestParts<S> for BookingSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self(session))
    }
}

impl BookingSession {
    pub async fn draft(&self) -> SessionResult<Option<ReservationDraft>> {
        self.0.get(RESERVATION_KEY).await
    }

    pub async fn put_draft(&self, draft: &ReservationDraft) -> SessionResult<()> {
        self.0.insert(RESERVATION_KEY, draft).await
    }

    pub async fn take_draft(&self) -> SessionResult<Option<ReservationDraft>> {
        self.0.remove(RESERVATION_KEY).await
    }

    pub async fn flash(&self, kind: Flash, message: impl Into<String>) -> SessionResult<()> {
        self.0.insert(kind.key(), message.into()).await
    }

    pub async fn pop_flash(&self, kind: Flash) -> SessionResult<Option<String>> {
        self.0.remove(kind.key()).await
    }

    /// Token issued once per session and echoed in every form.
    pub async fn csrf_token(&self) -> SessionResult<String> {
        if let Some(token) = self.0.get::<String>(CSRF_KEY).await? {
            return Ok(token);
        }
        let token = Uuid::new_v4().simple().to_string();
        self.0.insert(CSRF_KEY, &token).await?;
        Ok(token)
    }

    /// Fills the values every page expects: pending flash messages and the
    /// CSRF token. Reading a flash message clears it.
    pub async fn add_default_data(&self, data: &mut TemplateData) -> SessionResult<()> {
        data.flash = self.pop_flash(Flash::Info).await?;
        data.warning = self.pop_flash(Flash::Warning).await?;
        data.error = self.pop_flash(Flash::Error).await?;
        data.csrf_token = self.csrf_token().await?;
        Ok(())
    }
}
