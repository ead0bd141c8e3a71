//! Estrategias de sincronización
//!
//! Cada operación del coordinador elige una estrategia una sola vez:
//! `RemoteBacked` cuando hay sesión y servidor configurado, `LocalOnly`
//! en cualquier otro caso. Así no hay condicionales de sesión dispersos.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::clients::RemoteStore;
use crate::models::{ListFilters, PartialCostConfig, RecordKind};
use crate::state::Session;
use crate::utils::errors::{RemoteError, RemoteResult};

/// Acceso remoto visto desde el coordinador
#[async_trait]
pub trait SyncStrategy: Send + Sync {
    /// `true` si las llamadas pueden llegar al servidor
    fn is_remote(&self) -> bool;

    async fn organization(&self) -> RemoteResult<String>;

    async fn list(&self, kind: RecordKind, filters: &ListFilters) -> RemoteResult<Vec<Value>>;

    async fn save(&self, kind: RecordKind, payload: Value) -> RemoteResult<Value>;

    async fn soft_delete(&self, kind: RecordKind, id: &str) -> RemoteResult<()>;

    async fn soft_delete_by_local_id(&self, kind: RecordKind, local_id: &str) -> RemoteResult<()>;

    async fn fetch_settings(&self) -> RemoteResult<Option<PartialCostConfig>>;
}

/// Estrategia con servidor: sesión fija para toda la operación
pub struct RemoteBacked {
    remote: Arc<dyn RemoteStore>,
    session: Session,
    timeout: Duration,
    organization: OnceCell<String>,
}

impl RemoteBacked {
    pub fn new(remote: Arc<dyn RemoteStore>, session: Session, timeout: Duration) -> Self {
        Self {
            remote,
            session,
            timeout,
            organization: OnceCell::new(),
        }
    }

    async fn bounded<T, F>(&self, call: F) -> RemoteResult<T>
    where
        F: Future<Output = RemoteResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl SyncStrategy for RemoteBacked {
    fn is_remote(&self) -> bool {
        true
    }

    async fn organization(&self) -> RemoteResult<String> {
        // Se resuelve una vez por operación (un lote de sync_pending incluido)
        let organization = self
            .organization
            .get_or_try_init(|| async {
                let organization = self
                    .bounded(self.remote.resolve_organization(&self.session))
                    .await?;
                debug!("🏢 Organización resuelta: {}", organization);
                Ok::<_, RemoteError>(organization)
            })
            .await?;
        Ok(organization.clone())
    }

    async fn list(&self, kind: RecordKind, filters: &ListFilters) -> RemoteResult<Vec<Value>> {
        let organization = self.organization().await?;
        self.bounded(self.remote.list(kind, &organization, filters, &self.session))
            .await
    }

    async fn save(&self, kind: RecordKind, payload: Value) -> RemoteResult<Value> {
        self.bounded(self.remote.save(kind, payload, &self.session)).await
    }

    async fn soft_delete(&self, kind: RecordKind, id: &str) -> RemoteResult<()> {
        self.bounded(self.remote.soft_delete(kind, id, &self.session)).await
    }

    async fn soft_delete_by_local_id(&self, kind: RecordKind, local_id: &str) -> RemoteResult<()> {
        self.bounded(self.remote.soft_delete_by_local_id(kind, local_id, &self.session))
            .await
    }

    async fn fetch_settings(&self) -> RemoteResult<Option<PartialCostConfig>> {
        let organization = self.organization().await?;
        self.bounded(self.remote.fetch_settings(&organization, &self.session))
            .await
    }
}

/// Estrategia sin servidor: toda llamada remota se rechaza sin intentarla
pub struct LocalOnly {
    remote_configured: bool,
}

impl LocalOnly {
    pub fn new(remote_configured: bool) -> Self {
        Self { remote_configured }
    }

    fn reason(&self) -> RemoteError {
        if self.remote_configured {
            RemoteError::NoSession
        } else {
            RemoteError::NotConfigured
        }
    }
}

#[async_trait]
impl SyncStrategy for LocalOnly {
    fn is_remote(&self) -> bool {
        false
    }

    async fn organization(&self) -> RemoteResult<String> {
        Err(self.reason())
    }

    async fn list(&self, _kind: RecordKind, _filters: &ListFilters) -> RemoteResult<Vec<Value>> {
        Err(self.reason())
    }

    async fn save(&self, _kind: RecordKind, _payload: Value) -> RemoteResult<Value> {
        Err(self.reason())
    }

    async fn soft_delete(&self, _kind: RecordKind, _id: &str) -> RemoteResult<()> {
        Err(self.reason())
    }

    async fn soft_delete_by_local_id(&self, _kind: RecordKind, _local_id: &str) -> RemoteResult<()> {
        Err(self.reason())
    }

    async fn fetch_settings(&self) -> RemoteResult<Option<PartialCostConfig>> {
        Err(self.reason())
    }
}
