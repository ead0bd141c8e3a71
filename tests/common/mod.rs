#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::cmp::Reverse;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use ride_ledger::cache::MemoryStore;
use ride_ledger::clients::RemoteStore;
use ride_ledger::models::{
    CostConfig, ExpenseCategory, ExpenseDraft, ExpenseRecord, ListFilters, PartialCostConfig, Platform,
    RecordKind, RideDraft, RideRecord,
};
use ride_ledger::services::{SyncCoordinator, ViabilityEngine};
use ride_ledger::utils::errors::{RemoteError, RemoteResult};
use ride_ledger::{Session, SessionProvider};

pub const ORG_ID: &str = "org-1";

/// Sesión controlable desde el test
#[derive(Default)]
pub struct TestSession {
    session: Mutex<Option<Session>>,
}

impl TestSession {
    pub fn logged_in() -> Self {
        let state = Self::default();
        state.login();
        state
    }

    pub fn login(&self) {
        *self.session.lock().unwrap() = Some(Session {
            user_id: "user-1".to_string(),
            access_token: "token".to_string(),
        });
    }

    pub fn logout(&self) {
        *self.session.lock().unwrap() = None;
    }
}

impl SessionProvider for TestSession {
    fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }
}

/// Servidor en memoria: upsert por `id` o `local_id`, borrado lógico,
/// listados del más reciente al más antiguo y fallos simulados
#[derive(Default)]
pub struct MockRemoteStore {
    rows: Mutex<Vec<(RecordKind, Value)>>,
    settings: Mutex<Option<PartialCostConfig>>,
    organization: Mutex<Option<String>>,
    fail: AtomicBool,
    fail_saves: AtomicUsize,
    delay_ms: AtomicU64,
    pub saves: AtomicUsize,
    pub lists: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        let store = Self::default();
        *store.organization.lock().unwrap() = Some(ORG_ID.to_string());
        store
    }

    pub fn without_organization() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Las próximas `n` llamadas a `save` fallan
    pub fn fail_next_saves(&self, n: usize) {
        self.fail_saves.store(n, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_settings(&self, settings: PartialCostConfig) {
        *self.settings.lock().unwrap() = Some(settings);
    }

    /// Fila ya existente en el servidor (otro dispositivo)
    pub fn seed(&self, kind: RecordKind, mut row: Value) -> String {
        let id = Uuid::new_v4().to_string();
        row["id"] = json!(id);
        row["organization_id"] = json!(ORG_ID);
        self.rows.lock().unwrap().push((kind, row));
        id
    }

    pub fn live_rows(&self, kind: RecordKind) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, row)| *k == kind && row.get("deleted_at").map_or(true, Value::is_null))
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    async fn simulate(&self) -> RemoteResult<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RemoteError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn resolve_organization(&self, _session: &Session) -> RemoteResult<String> {
        self.simulate().await?;
        self.organization.lock().unwrap().clone().ok_or(RemoteError::NoOrganization)
    }

    async fn list(
        &self,
        kind: RecordKind,
        organization_id: &str,
        filters: &ListFilters,
        _session: &Session,
    ) -> RemoteResult<Vec<Value>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        let mut rows: Vec<Value> = self
            .live_rows(kind)
            .into_iter()
            .filter(|row| row["organization_id"] == organization_id)
            .filter(|row| match (kind, filters.platform) {
                (RecordKind::Rides, Some(platform)) => row["platform"] == platform.as_str(),
                _ => true,
            })
            .collect();
        rows.sort_by_key(|row| Reverse(created_at(row)));
        if let Some(limit) = filters.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn save(&self, kind: RecordKind, mut payload: Value, _session: &Session) -> RemoteResult<Value> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        if self
            .fail_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(RemoteError::Timeout(200));
        }

        let mut rows = self.rows.lock().unwrap();
        let key = if payload.get("id").is_some_and(Value::is_string) { "id" } else { "local_id" };
        let natural = payload.get(key).cloned().filter(|v| !v.is_null());
        if let Some(natural) = &natural {
            if let Some((_, existing)) = rows
                .iter_mut()
                .find(|(k, row)| *k == kind && row.get(key) == Some(natural))
            {
                payload["id"] = existing["id"].clone();
                *existing = payload.clone();
                return Ok(payload);
            }
        }

        payload["id"] = json!(Uuid::new_v4().to_string());
        rows.push((kind, payload.clone()));
        Ok(payload)
    }

    async fn soft_delete(&self, kind: RecordKind, id: &str, _session: &Session) -> RemoteResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        for (k, row) in self.rows.lock().unwrap().iter_mut() {
            if *k == kind && row["id"] == id {
                row["deleted_at"] = json!(Utc::now().to_rfc3339());
            }
        }
        Ok(())
    }

    async fn soft_delete_by_local_id(&self, kind: RecordKind, local_id: &str, _session: &Session) -> RemoteResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        for (k, row) in self.rows.lock().unwrap().iter_mut() {
            if *k == kind && row["local_id"] == local_id {
                row["deleted_at"] = json!(Utc::now().to_rfc3339());
            }
        }
        Ok(())
    }

    async fn fetch_settings(
        &self,
        _organization_id: &str,
        _session: &Session,
    ) -> RemoteResult<Option<PartialCostConfig>> {
        self.simulate().await?;
        Ok(self.settings.lock().unwrap().clone())
    }
}

fn created_at(row: &Value) -> Option<DateTime<FixedOffset>> {
    row["created_at"].as_str().and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
}

pub struct Harness {
    pub local: Arc<MemoryStore>,
    pub remote: Arc<MockRemoteStore>,
    pub session: Arc<TestSession>,
    pub coordinator: Arc<SyncCoordinator>,
}

impl Harness {
    pub fn new(remote: MockRemoteStore, session: TestSession) -> Self {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(remote);
        let session = Arc::new(session);
        let coordinator = Arc::new(SyncCoordinator::new(
            local.clone(),
            Some(remote.clone() as Arc<dyn RemoteStore>),
            session.clone() as Arc<dyn SessionProvider>,
            Duration::from_millis(200),
        ));
        Self {
            local,
            remote,
            session,
            coordinator,
        }
    }

    pub fn online() -> Self {
        Self::new(MockRemoteStore::new(), TestSession::logged_in())
    }

    pub fn offline() -> Self {
        Self::new(MockRemoteStore::new(), TestSession::default())
    }
}

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn ride_draft(amount: &str, km: &str, minutes: u32) -> RideDraft {
    RideDraft {
        platform: Platform::Uber,
        amount: d(amount),
        distance_km: d(km),
        duration_min: minutes,
        origin: Some("Centro".to_string()),
        destination: Some("Aeroporto".to_string()),
        photo_ref: None,
        created_at: None,
    }
}

pub fn new_ride(amount: &str, km: &str, minutes: u32) -> RideRecord {
    let draft = ride_draft(amount, km, minutes);
    let analysis = ViabilityEngine::analyze(&draft.input(), &CostConfig::default());
    RideRecord::new(draft, analysis)
}

pub fn new_expense(amount: &str, description: &str) -> ExpenseRecord {
    ExpenseRecord::new(ExpenseDraft {
        category: ExpenseCategory::Fuel,
        amount: d(amount),
        description: description.to_string(),
        created_at: None,
    })
}
