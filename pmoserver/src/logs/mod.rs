//! Initialisation de `tracing` pour le bridge
//!
//! Un [`Registry`] avec un filtre de niveau rechargeable, puis une couche
//! console `fmt` optionnelle. Le niveau peut être changé à chaud via
//! [`LogHandle::set_max_level`] ou la route `/api/log_setup`.

use std::sync::{Arc, RwLock};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use pmoconfig::Config;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{
    Registry,
    filter::LevelFilter,
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

const LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Niveau minimal au démarrage
    pub min_level: Level,
    /// Activer la sortie console
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            min_level: Level::INFO,
            enable_console: true,
        }
    }
}

impl LoggingOptions {
    /// Lit `host.logger.*` ; une valeur invalide retombe sur le défaut
    pub fn from_config(config: &Config) -> Self {
        let default = Self::default();
        Self {
            min_level: string_to_level(&config.get_log_min_level()).unwrap_or(default.min_level),
            enable_console: config.get_log_enable_console(),
        }
    }
}

/// Poignée sur le filtre de niveau installé
#[derive(Clone)]
pub struct LogHandle {
    max_level: Arc<RwLock<Level>>,
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    pub fn new(level: Level, reload_handle: reload::Handle<LevelFilter, Registry>) -> Self {
        Self {
            max_level: Arc::new(RwLock::new(level)),
            reload_handle,
        }
    }

    pub fn set_max_level(&self, level: Level) -> anyhow::Result<()> {
        self.reload_handle.reload(LevelFilter::from_level(level))?;
        if let Ok(mut current) = self.max_level.write() {
            *current = level;
        }
        tracing::info!("Log level filter reloaded to {}", level);
        Ok(())
    }

    pub fn get_max_level(&self) -> Level {
        self.max_level
            .read()
            .map(|l| *l)
            .unwrap_or(Level::INFO)
    }
}

/// Installe le subscriber global
///
/// Échoue si un subscriber global est déjà installé.
pub fn init_logging(options: LoggingOptions) -> anyhow::Result<LogHandle> {
    let (filter, reload_handle) = reload::Layer::new(LevelFilter::from_level(options.min_level));
    let handle = LogHandle::new(options.min_level, reload_handle);

    // Le filtre passe avant toute autre couche
    let subscriber = Registry::default().with(filter);

    if options.enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(handle)
}

pub fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" | "WARNING" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct LogSetupRequest {
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct LogSetupResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

impl LogSetupResponse {
    fn new(level: Level) -> Self {
        Self {
            current_level: level.as_str().to_string(),
            available_levels: LEVELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// GET /api/log_setup
pub async fn log_setup_get(State(handle): State<LogHandle>) -> impl IntoResponse {
    Json(LogSetupResponse::new(handle.get_max_level()))
}

/// POST /api/log_setup
pub async fn log_setup_post(
    State(handle): State<LogHandle>,
    Json(payload): Json<LogSetupRequest>,
) -> impl IntoResponse {
    let Some(level) = string_to_level(&payload.level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid log level. Must be one of: ERROR, WARN, INFO, DEBUG, TRACE"
            })),
        )
            .into_response();
    };

    if let Err(e) = handle.set_max_level(level) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    (StatusCode::OK, Json(LogSetupResponse::new(level))).into_response()
}

/// Router de gestion des logs, à monter sous `/api`
pub fn create_logs_router(handle: LogHandle) -> axum::Router {
    axum::Router::new()
        .route("/log_setup", get(log_setup_get).post(log_setup_post))
        .with_state(handle)
}
