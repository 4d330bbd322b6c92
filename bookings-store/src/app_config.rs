use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub in_production: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
    #[serde(default = "default_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_timeout")]
    pub query_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 5 }
fn default_max_lifetime() -> u64 { 300 }
fn default_timeout() -> u64 { 3 }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub lifetime_hours: i64,
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_hours: 24,
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub dir: String,
    pub use_cache: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: "templates".into(),
            use_cache: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetConfig {
    pub static_dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `BOOKINGS__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("BOOKINGS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/bookings"
            "#,
        );

        assert_eq!(config.server.port, 8080);
        assert!(!config.app.in_production);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.database.max_lifetime_seconds, 300);
        assert_eq!(config.database.query_timeout_seconds, 3);
        assert!(config.database.run_migrations);
        assert_eq!(config.session.lifetime_hours, 24);
        assert_eq!(config.templates.dir, "templates");
        assert!(config.templates.use_cache);
        assert_eq!(config.assets.static_dir, "static");
    }

    #[test]
    fn test_memory_backend_needs_no_url() {
        let config = parse(
            r#"
            [server]
            port = 9000

            [database]
            backend = "memory"

            [templates]
            dir = "./site"
            use_cache = false
            "#,
        );

        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert!(config.database.url.is_empty());
        assert!(!config.templates.use_cache);
    }
}
