use std::path::PathBuf;
use std::sync::Arc;

use bookings_core::BookingRepository;
use bookings_store::app_config::SessionConfig;

use crate::render::TemplateCache;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn BookingRepository>,
    pub templates: Arc<TemplateCache>,
    pub session: SessionConfig,
    pub static_dir: PathBuf,
}
