//! Page templates.
//!
//! Every `*.page.html` under the template directory extends a shared
//! `*.layout.html`. Templates are looked up by file name, e.g.
//! `home.page.html`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bookings_core::Form;
use serde::Serialize;
use tera::Tera;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template directory {0:?} is not readable")]
    MissingDirectory(String),
    #[error("No *.page.html templates found in {0:?}")]
    NoPages(String),
    #[error("Can't get template {0:?} from cache")]
    TemplateNotFound(String),
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
}

/// Per-request values handed to a page.
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub string_map: HashMap<String, String>,
    pub int_map: HashMap<String, i64>,
    pub float_map: HashMap<String, f64>,
    pub data: HashMap<String, serde_json::Value>,
    pub csrf_token: String,
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub form: Form,
}

impl TemplateData {
    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_string(), value.into());
        self
    }

    pub fn with_data<T: Serialize>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = form;
        self
    }
}

/// Parsed templates keyed by file name.
///
/// With `use_cache` the set parsed at startup is reused until [`reload`]
/// is called; without it every render re-reads the directory so edits show
/// up without a restart.
///
/// [`reload`]: TemplateCache::reload
pub struct TemplateCache {
    dir: String,
    use_cache: bool,
    tera: RwLock<Arc<Tera>>,
}

impl TemplateCache {
    pub fn new(dir: &str, use_cache: bool) -> Result<Self, RenderError> {
        let tera = Self::parse(dir)?;
        info!(dir, use_cache, "Template cache created");
        Ok(Self {
            dir: dir.to_string(),
            use_cache,
            tera: RwLock::new(Arc::new(tera)),
        })
    }

    fn parse(dir: &str) -> Result<Tera, RenderError> {
        if !Path::new(dir).is_dir() {
            return Err(RenderError::MissingDirectory(dir.to_string()));
        }
        let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
        let tera = Tera::new(&glob)?;
        if !tera.get_template_names().any(|n| n.ends_with(".page.html")) {
            return Err(RenderError::NoPages(dir.to_string()));
        }
        Ok(tera)
    }

    /// Re-reads the template directory and swaps the cached set.
    pub async fn reload(&self) -> Result<Arc<Tera>, RenderError> {
        let tera = Arc::new(Self::parse(&self.dir)?);
        *self.tera.write().await = tera.clone();
        debug!(dir = %self.dir, "Templates reloaded");
        Ok(tera)
    }

    async fn current(&self) -> Result<Arc<Tera>, RenderError> {
        if self.use_cache {
            Ok(self.tera.read().await.clone())
        } else {
            self.reload().await
        }
    }

    pub async fn render(&self, name: &str, data: &TemplateData) -> Result<String, RenderError> {
        let tera = self.current().await?;
        if !tera.get_template_names().any(|n| n == name) {
            return Err(RenderError::TemplateNotFound(name.to_string()));
        }
        let context = tera::Context::from_serialize(data)?;
        Ok(tera.render(name, &context)?)
    }
}
