//! Clients - almacenamiento remoto
//!
//! El servidor guarda carreras y gastos por organización. El coordinador
//! solo conoce el trait `RemoteStore`; `RestRemoteStore` es la
//! implementación HTTP (PostgREST).

pub mod remote_client;

pub use remote_client::RestRemoteStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{ListFilters, PartialCostConfig, RecordKind};
use crate::state::Session;
use crate::utils::errors::RemoteResult;

/// CRUD remoto con alcance de organización; requiere sesión válida
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Organización actual del usuario según su perfil
    async fn resolve_organization(&self, session: &Session) -> RemoteResult<String>;

    /// Registros no borrados de la organización, más recientes primero
    async fn list(
        &self,
        kind: RecordKind,
        organization_id: &str,
        filters: &ListFilters,
        session: &Session,
    ) -> RemoteResult<Vec<Value>>;

    /// Upsert del registro: por `id` si el payload lo trae, si no por
    /// `local_id`. El servidor asigna id y timestamps a los nuevos.
    async fn save(&self, kind: RecordKind, payload: Value, session: &Session) -> RemoteResult<Value>;

    /// Borrado lógico (marca `deleted_at`)
    async fn soft_delete(&self, kind: RecordKind, id: &str, session: &Session) -> RemoteResult<()>;

    /// Borrado lógico por id temporal, para filas cuyo id de servidor
    /// nunca llegó al dispositivo
    async fn soft_delete_by_local_id(&self, kind: RecordKind, local_id: &str, session: &Session) -> RemoteResult<()>;

    /// Configuración de costos de la organización, si existe
    async fn fetch_settings(
        &self,
        organization_id: &str,
        session: &Session,
    ) -> RemoteResult<Option<PartialCostConfig>>;
}
