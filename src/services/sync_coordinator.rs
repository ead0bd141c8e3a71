//! Coordinador de sincronización local-first
//!
//! Lecturas: servidor primero, caché local como respaldo.
//! Escrituras: caché local primero (fatal si falla), servidor después
//! (best-effort). Los errores remotos nunca salen de este módulo.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::sync_strategy::{LocalOnly, RemoteBacked, SyncStrategy};
use crate::cache::LocalStore;
use crate::clients::RemoteStore;
use crate::models::{
    is_server_id, sort_newest_first, ExpenseRecord, ListFilters, RecordIdentity, RecordKind, RideRecord, SyncRecord,
};
use crate::state::SessionProvider;
use crate::utils::errors::{AppResult, RemoteError, RemoteResult};

/// Resultado de una pasada de sincronización explícita
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: RecordKind,
    /// Registros pendientes encontrados en la caché
    pub pending: usize,
    pub synced: usize,
    pub failed: usize,
    /// `true` si no hubo sesión y no se intentó nada
    pub skipped: bool,
}

impl SyncReport {
    fn empty(kind: RecordKind) -> Self {
        Self {
            kind,
            pending: 0,
            synced: 0,
            failed: 0,
            skipped: false,
        }
    }

    /// Registros que siguen sin id de servidor tras la pasada
    pub fn remaining(&self) -> usize {
        self.pending - self.synced
    }
}

/// Orquesta LocalStore y RemoteStore para carreras y gastos
pub struct SyncCoordinator {
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    sessions: Arc<dyn SessionProvider>,
    timeout: Duration,
}

impl SyncCoordinator {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Option<Arc<dyn RemoteStore>>,
        sessions: Arc<dyn SessionProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            local,
            remote,
            sessions,
            timeout,
        }
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Única comprobación de sesión por operación
    pub fn strategy(&self) -> Box<dyn SyncStrategy> {
        match (&self.remote, self.sessions.current_session()) {
            (Some(remote), Some(session)) => {
                Box::new(RemoteBacked::new(remote.clone(), session, self.timeout))
            }
            (remote, _) => Box::new(LocalOnly::new(remote.is_some())),
        }
    }

    /// Lista registros: servidor si hay sesión, caché si no o si falla
    ///
    /// Un listado remoto sin filtros reemplaza la caché, salvo los
    /// registros `Pending` que el servidor todavía no devuelve: esos se
    /// vuelven a añadir al final para no perder trabajo sin sincronizar.
    /// Un listado filtrado nunca toca la caché. El respaldo desde caché
    /// aplica los mismos filtros y, con filtros, ordena del más reciente
    /// al más antiguo como el servidor.
    pub async fn list<R: SyncRecord>(&self, filters: &ListFilters) -> AppResult<Vec<R>> {
        let strategy = self.strategy();

        match self.fetch_remote::<R>(strategy.as_ref(), filters).await {
            Ok(remote) => {
                if !filters.is_empty() {
                    return Ok(remote);
                }

                // Un resultado vacío también es autoritativo; solo sobreviven
                // los pendientes que el servidor aún no conoce
                let cached = self.cached::<R>().await?;
                let mut merged = remote;
                let unsynced: Vec<R> = cached
                    .into_iter()
                    .filter(|record| record.identity().is_pending())
                    .filter(|record| !merged.iter().any(|r| r.identity().local_id() == record.identity().local_id()))
                    .collect();
                merged.extend(unsynced);

                self.write_cache(&merged).await?;
                debug!("🔄 Caché de {} reemplazada con {} registros", R::KIND, merged.len());
                Ok(merged)
            }
            Err(e) => {
                log_remote_failure("list", R::KIND, &e);
                let cached = self.cached::<R>().await?;
                Ok(apply_filters(cached, filters))
            }
        }
    }

    /// Guarda localmente y luego intenta el servidor
    ///
    /// Es un upsert: si la caché ya tiene una entrada con el mismo id se
    /// reemplaza en su sitio, y el servidor actualiza la fila existente.
    pub async fn save<R: SyncRecord>(&self, mut record: R) -> AppResult<R> {
        if record.identity().id().is_empty() {
            *record.identity_mut() = RecordIdentity::pending();
        }

        let mut cache = self.cached::<R>().await?;
        match cache.iter_mut().find(|entry| entry.identity().id() == record.identity().id()) {
            Some(entry) => *entry = record.clone(),
            None => cache.push(record.clone()),
        }
        self.write_cache(&cache).await?;
        info!("💾 {} {} guardado localmente", R::KIND, record.identity().id());

        let strategy = self.strategy();
        match push_record(strategy.as_ref(), &record).await {
            Ok(server) => {
                self.replace_reconciled(std::slice::from_ref(&server)).await?;
                info!("☁️ {} {} sincronizado como {}", R::KIND, record.identity().id(), server.identity().id());
                Ok(server)
            }
            Err(e) => {
                log_remote_failure("save", R::KIND, &e);
                Ok(record)
            }
        }
    }

    /// Borra por id primario o por id temporal; el borrado remoto es best-effort
    ///
    /// Un pendiente también se borra en el servidor por su `local_id`: su
    /// guardado pudo llegar al servidor sin que la respuesta volviera.
    pub async fn delete<R: SyncRecord>(&self, id: &str) -> AppResult<usize> {
        let mut cache = self.cached::<R>().await?;

        let (mut server_ids, mut local_ids) = {
            let matching: Vec<&RecordIdentity> = cache
                .iter()
                .map(|record| record.identity())
                .filter(|identity| identity.matches(id))
                .collect();
            let server_ids: Vec<String> = matching
                .iter()
                .filter_map(|identity| identity.server_id().map(str::to_string))
                .collect();
            let local_ids: Vec<String> = matching
                .iter()
                .filter(|identity| identity.is_pending())
                .filter_map(|identity| identity.local_id().map(str::to_string))
                .collect();
            (server_ids, local_ids)
        };
        if server_ids.is_empty() && local_ids.is_empty() {
            if is_server_id(id) {
                server_ids.push(id.to_string());
            } else {
                local_ids.push(id.to_string());
            }
        }

        let before = cache.len();
        cache.retain(|record| !record.identity().matches(id));
        let removed = before - cache.len();
        self.write_cache(&cache).await?;
        info!("🗑️ {} registro(s) de {} eliminados localmente ({})", removed, R::KIND, id);

        let strategy = self.strategy();
        if !strategy.is_remote() {
            return Ok(removed);
        }

        for server_id in &server_ids {
            if let Err(e) = strategy.soft_delete(R::KIND, server_id).await {
                log_remote_failure("delete", R::KIND, &e);
            }
        }
        for local_id in &local_ids {
            if let Err(e) = strategy.soft_delete_by_local_id(R::KIND, local_id).await {
                log_remote_failure("delete", R::KIND, &e);
            }
        }

        Ok(removed)
    }

    /// Reintenta cada registro pendiente; un fallo no aborta el lote
    pub async fn sync_pending<R: SyncRecord>(&self) -> AppResult<SyncReport> {
        let pending: Vec<R> = self
            .cached::<R>()
            .await?
            .into_iter()
            .filter(|record| !is_server_id(record.identity().id()))
            .collect();

        let mut report = SyncReport::empty(R::KIND);
        report.pending = pending.len();
        if pending.is_empty() {
            return Ok(report);
        }

        let strategy = self.strategy();
        if !strategy.is_remote() {
            debug!("⏸️ {} {} pendientes, sin sesión", report.pending, R::KIND);
            report.skipped = true;
            return Ok(report);
        }

        let mut reconciled = Vec::new();
        for record in &pending {
            match push_record(strategy.as_ref(), record).await {
                Ok(server) => reconciled.push(server),
                Err(e) => {
                    report.failed += 1;
                    log_remote_failure("sync", R::KIND, &e);
                }
            }
        }

        report.synced = reconciled.len();
        if !reconciled.is_empty() {
            self.replace_reconciled(&reconciled).await?;
        }

        info!(
            "🔄 Sync {}: {} sincronizados, {} fallidos de {}",
            R::KIND, report.synced, report.failed, report.pending
        );
        Ok(report)
    }

    /// Pasada de sincronización para carreras y gastos
    pub async fn sync_all_pending(&self) -> AppResult<Vec<SyncReport>> {
        Ok(vec![
            self.sync_pending::<RideRecord>().await?,
            self.sync_pending::<ExpenseRecord>().await?,
        ])
    }

    /// Estado de sincronización: registros sin id de servidor
    pub async fn pending_count<R: SyncRecord>(&self) -> AppResult<usize> {
        Ok(self
            .cached::<R>()
            .await?
            .iter()
            .filter(|record| !is_server_id(record.identity().id()))
            .count())
    }

    /// Contenido actual de la caché, sin tocar el servidor
    pub async fn cached<R: SyncRecord>(&self) -> AppResult<Vec<R>> {
        match self.local.get(R::KIND.cache_key()).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn write_cache<R: SyncRecord>(&self, records: &[R]) -> AppResult<()> {
        let raw = serde_json::to_string(records)?;
        self.local.set(R::KIND.cache_key(), &raw).await?;
        Ok(())
    }

    /// Sustituye en la caché cada entrada por su versión del servidor:
    /// los pendientes por id temporal, el resto por id de servidor
    async fn replace_reconciled<R: SyncRecord>(&self, reconciled: &[R]) -> AppResult<()> {
        let mut cache = self.cached::<R>().await?;
        for server in reconciled {
            for entry in cache.iter_mut() {
                let same = match entry.identity().server_id() {
                    Some(server_id) => server.identity().server_id() == Some(server_id),
                    None => server
                        .identity()
                        .local_id()
                        .is_some_and(|temp_id| entry.identity().matches(temp_id)),
                };
                if same {
                    *entry = server.clone();
                }
            }
        }
        self.write_cache(&cache).await
    }

    async fn fetch_remote<R: SyncRecord>(
        &self,
        strategy: &dyn SyncStrategy,
        filters: &ListFilters,
    ) -> RemoteResult<Vec<R>> {
        let rows = strategy.list(R::KIND, filters).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value::<R>(row).map_err(RemoteError::from))
            .collect()
    }
}

/// Envía un registro y devuelve la versión del servidor reconciliada
async fn push_record<R: SyncRecord>(strategy: &dyn SyncStrategy, record: &R) -> RemoteResult<R> {
    let organization = strategy.organization().await?;
    let payload = record.to_remote_payload(&organization)?;
    let saved: Value = strategy.save(R::KIND, payload).await?;

    let mut server: R = serde_json::from_value(saved)?;
    if server.identity().server_id().is_none() {
        return Err(RemoteError::InvalidResponse(format!(
            "server returned non-UUID id '{}'",
            server.identity().id()
        )));
    }

    let identity = record.identity().clone().reconcile(server.identity());
    *server.identity_mut() = identity;
    Ok(server)
}

/// Sin filtros la caché se devuelve tal cual; con filtros, del más
/// reciente al más antiguo antes de aplicar `limit`
fn apply_filters<R: SyncRecord>(records: Vec<R>, filters: &ListFilters) -> Vec<R> {
    if filters.is_empty() {
        return records;
    }

    let mut filtered: Vec<R> = records
        .into_iter()
        .filter(|record| record.matches_filters(filters))
        .collect();
    sort_newest_first(&mut filtered);
    if let Some(limit) = filters.limit {
        filtered.truncate(limit);
    }
    filtered
}

fn log_remote_failure(operation: &str, kind: RecordKind, error: &RemoteError) {
    if error.is_session_related() || matches!(error, RemoteError::NotConfigured) {
        debug!("📴 {} {} solo local: {}", operation, kind, error);
    } else {
        warn!("⚠️ {} {} remoto falló, usando caché local: {}", operation, kind, error);
    }
}
