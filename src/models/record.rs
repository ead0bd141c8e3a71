//! Contrato común de los registros sincronizables
//!
//! Carreras y gastos comparten la misma política de sincronización; el
//! tipo del registro determina su colección (`RecordKind`).

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::filters::ListFilters;
use super::identity::RecordIdentity;

/// Colecciones sincronizadas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Rides,
    Expenses,
}

impl RecordKind {
    /// Clave del array JSON en el almacenamiento local
    pub fn cache_key(&self) -> &'static str {
        match self {
            RecordKind::Rides => "rides",
            RecordKind::Expenses => "expenses",
        }
    }

    /// Tabla remota
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Rides => "rides",
            RecordKind::Expenses => "expenses",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cache_key())
    }
}

/// Registro que el coordinador sabe guardar, listar y reconciliar
pub trait SyncRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn identity(&self) -> &RecordIdentity;

    fn identity_mut(&mut self) -> &mut RecordIdentity;

    fn created_at(&self) -> DateTime<Utc>;

    /// Filtros específicos del tipo (plataforma, categoría)
    fn matches_kind_filters(&self, filters: &ListFilters) -> bool;

    fn matches_filters(&self, filters: &ListFilters) -> bool {
        filters.matches_date(self.created_at()) && self.matches_kind_filters(filters)
    }

    /// Cuerpo para el servidor: `id` solo si ya es del servidor, el id
    /// temporal como clave natural y la organización
    fn to_remote_payload(&self, organization_id: &str) -> Result<Value, serde_json::Error> {
        let mut payload = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut payload {
            map.remove("id");
            map.remove("local_id");
            if let Some(server_id) = self.identity().server_id() {
                map.insert("id".to_string(), Value::String(server_id.to_string()));
            }
            if let Some(local_id) = self.identity().local_id() {
                map.insert("local_id".to_string(), Value::String(local_id.to_string()));
            }
            map.insert(
                "organization_id".to_string(),
                Value::String(organization_id.to_string()),
            );
        }
        Ok(payload)
    }
}

/// Ordena del más reciente al más antiguo; en empate conserva el orden dado
pub fn sort_newest_first<R: SyncRecord>(records: &mut [R]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
