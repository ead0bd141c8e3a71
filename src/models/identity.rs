//! Identidad de registros
//!
//! Un registro nace con un id temporal local y, cuando el servidor lo
//! acepta, pasa a tener el id del servidor conservando el temporal.
//! En JSON la identidad se aplana a `id` + `local_id` opcional.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Estado de identidad de un registro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdentityWire", into = "IdentityWire")]
pub enum RecordIdentity {
    /// Creado localmente, aún sin id de servidor
    Pending { temp_id: String },
    /// Creado localmente y luego aceptado por el servidor
    Reconciled { server_id: String, temp_id: String },
    /// Visto por primera vez en el servidor
    Remote { server_id: String },
}

/// Forma plana en caché y en el servidor
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityWire {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_id: Option<String>,
}

impl From<IdentityWire> for RecordIdentity {
    fn from(wire: IdentityWire) -> Self {
        match wire.local_id {
            Some(temp_id) if is_server_id(&wire.id) => RecordIdentity::Reconciled {
                server_id: wire.id,
                temp_id,
            },
            _ if is_server_id(&wire.id) => RecordIdentity::Remote { server_id: wire.id },
            _ => RecordIdentity::Pending { temp_id: wire.id },
        }
    }
}

impl From<RecordIdentity> for IdentityWire {
    fn from(identity: RecordIdentity) -> Self {
        match identity {
            RecordIdentity::Pending { temp_id } => IdentityWire { id: temp_id, local_id: None },
            RecordIdentity::Reconciled { server_id, temp_id } => IdentityWire {
                id: server_id,
                local_id: Some(temp_id),
            },
            RecordIdentity::Remote { server_id } => IdentityWire { id: server_id, local_id: None },
        }
    }
}

impl RecordIdentity {
    /// Nueva identidad pendiente con id temporal generado
    pub fn pending() -> Self {
        RecordIdentity::Pending { temp_id: next_temp_id() }
    }

    /// Id primario actual (servidor si existe, si no el temporal)
    pub fn id(&self) -> &str {
        match self {
            RecordIdentity::Pending { temp_id } => temp_id,
            RecordIdentity::Reconciled { server_id, .. } | RecordIdentity::Remote { server_id } => server_id,
        }
    }

    /// Id temporal original, si el registro nació offline
    pub fn local_id(&self) -> Option<&str> {
        match self {
            RecordIdentity::Pending { temp_id } | RecordIdentity::Reconciled { temp_id, .. } => Some(temp_id),
            RecordIdentity::Remote { .. } => None,
        }
    }

    /// Id del servidor, si ya existe
    pub fn server_id(&self) -> Option<&str> {
        match self {
            RecordIdentity::Pending { .. } => None,
            RecordIdentity::Reconciled { server_id, .. } | RecordIdentity::Remote { server_id } => Some(server_id),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RecordIdentity::Pending { .. })
    }

    /// El registro responde a `id` por su id primario o por su id temporal
    pub fn matches(&self, id: &str) -> bool {
        self.id() == id || self.local_id() == Some(id)
    }

    /// Combina la identidad devuelta por el servidor con el id temporal local
    pub fn reconcile(self, server: &RecordIdentity) -> RecordIdentity {
        match (self, server.server_id()) {
            (RecordIdentity::Pending { temp_id }, Some(server_id)) => RecordIdentity::Reconciled {
                server_id: server_id.to_string(),
                temp_id,
            },
            (RecordIdentity::Reconciled { temp_id, .. }, Some(server_id)) => RecordIdentity::Reconciled {
                server_id: server_id.to_string(),
                temp_id,
            },
            (_, _) => server.clone(),
        }
    }
}

/// Heurística de id de servidor: UUID de 36 caracteres con guiones
pub fn is_server_id(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

static TEMP_ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Genera un id temporal monótono basado en el reloj
pub fn next_temp_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = TEMP_ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("local-{}-{}", millis, seq)
}
