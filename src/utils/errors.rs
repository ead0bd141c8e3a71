//! Sistema de manejo de errores
//!
//! Este módulo define los dos tipos de errores del núcleo:
//! `AppError` (fatal, se propaga al llamador) y `RemoteError`
//! (recuperable, nunca sale del coordinador de sincronización).

use thiserror::Error;

/// Errores fatales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Local store error: {0}")]
    LocalStore(#[from] LocalStoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),
}

/// Fallos del almacenamiento local (disco, Redis, memoria)
#[derive(Error, Debug)]
pub enum LocalStoreError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Redis error on key '{key}': {source}")]
    Redis {
        key: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errores del almacenamiento remoto: siempre recuperables
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("No authenticated session")]
    NoSession,

    #[error("User has no organization")]
    NoOrganization,

    #[error("Remote store not configured")]
    NotConfigured,

    #[error("Remote call timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Indica si el error equivale a "sin sesión" para las lecturas
    pub fn is_session_related(&self) -> bool {
        matches!(self, RemoteError::NoSession | RemoteError::NoOrganization)
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Resultado tipado para llamadas remotas
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Función helper para crear errores de configuración
pub fn config_error(message: &str) -> AppError {
    AppError::Config(message.to_string())
}

/// Función helper para crear errores HTTP a partir de la respuesta
pub fn http_error(status: u16, body: &str) -> RemoteError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Error HTTP {}", status));

    RemoteError::Http { status, message }
}
