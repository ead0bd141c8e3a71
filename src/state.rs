//! Shared application state
//!
//! Este módulo define la sesión del usuario y el estado compartido que
//! conecta almacenamiento local, servidor y coordinador.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{build_store, LocalStore};
use crate::clients::{RemoteStore, RestRemoteStore};
use crate::config::AppConfig;
use crate::models::{EarningsSummary, ExpenseRecord, RideRecord};
use crate::services::{summarize, ConfigService, SyncCoordinator, TemplatesService};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{decode_session_token, get_token_remaining_time, is_token_expired, strip_bearer_prefix};

/// Sesión autenticada: quién es el usuario y con qué credencial llama
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

/// Fuente de la sesión actual
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;

    fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.current_session().map(|session| session.user_id)
    }
}

/// Token de acceso decodificado
#[derive(Clone, Debug)]
pub struct AuthToken {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Sesión basada en el JWT del proveedor de identidad
pub struct SessionState {
    jwt_secret: Option<String>,
    token: RwLock<Option<AuthToken>>,
}

impl SessionState {
    pub fn new(jwt_secret: Option<String>) -> Self {
        Self {
            jwt_secret,
            token: RwLock::new(None),
        }
    }

    /// Almacenar token de acceso (acepta el prefijo "Bearer ")
    pub fn set_token(&self, raw: &str) -> AppResult<()> {
        let token = strip_bearer_prefix(raw);
        let claims = decode_session_token(token, self.jwt_secret.as_deref())?;

        if is_token_expired(&claims) {
            warn!("⏰ Token de {} ya expirado", claims.sub);
        } else {
            debug!("🔑 Token válido por {} s", get_token_remaining_time(&claims));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AppError::Jwt(format!("exp fuera de rango: {}", claims.exp)))?;

        let auth_token = AuthToken {
            token: token.to_string(),
            user_id: claims.sub,
            expires_at,
        };

        let mut guard = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        info!("💾 Sesión almacenada para usuario {}", auth_token.user_id);
        *guard = Some(auth_token);
        Ok(())
    }

    /// Cerrar sesión
    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}

impl SessionProvider for SessionState {
    fn current_session(&self) -> Option<Session> {
        let guard = self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let token = guard.as_ref()?;

        if token.is_expired() {
            debug!("⏰ Sesión de {} expirada", token.user_id);
            return None;
        }

        Some(Session {
            user_id: token.user_id.clone(),
            access_token: token.token.clone(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionState>,
    pub coordinator: Arc<SyncCoordinator>,
    pub settings: Arc<ConfigService>,
    pub templates: Arc<TemplatesService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let local: Arc<dyn LocalStore> = build_store(&config.cache).await?;

        let remote: Option<Arc<dyn RemoteStore>> = match &config.remote_url {
            Some(url) => {
                let client = RestRemoteStore::new(url.clone(), config.remote_api_key.clone(), config.remote_timeout)
                    .map_err(|e| AppError::Config(format!("No se pudo crear el cliente remoto: {}", e)))?;
                Some(Arc::new(client) as Arc<dyn RemoteStore>)
            }
            None => {
                info!("📴 Sin REMOTE_URL: modo solo local");
                None
            }
        };

        let sessions = Arc::new(SessionState::new(config.jwt_secret.clone()));
        if let Some(token) = &config.access_token {
            // Un token inválido deja la app usable en modo local
            if let Err(e) = sessions.set_token(token) {
                warn!("⚠️ SESSION_TOKEN ignorado: {}", e);
            }
        }

        let coordinator = Arc::new(SyncCoordinator::new(
            local,
            remote,
            sessions.clone() as Arc<dyn SessionProvider>,
            config.remote_timeout,
        ));
        let settings = Arc::new(ConfigService::new(coordinator.clone()));
        let templates = Arc::new(TemplatesService::new(coordinator.local().clone()));

        Ok(Self {
            config,
            sessions,
            coordinator,
            settings,
            templates,
        })
    }

    /// Resumen de 30 días sobre la caché local
    pub async fn summary(&self) -> AppResult<EarningsSummary> {
        let rides = self.coordinator.cached::<RideRecord>().await?;
        let expenses = self.coordinator.cached::<ExpenseRecord>().await?;
        Ok(summarize(&rides, &expenses, Utc::now()))
    }
}
