//! Cliente HTTP para el servidor de datos (API REST estilo PostgREST)
//!
//! Tablas: `user_profiles`, `rides`, `expenses`, `organization_settings`.
//! Cada petición lleva la `apikey` del proyecto y el bearer de la sesión.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::RemoteStore;
use crate::models::{ListFilters, PartialCostConfig, RecordKind};
use crate::state::Session;
use crate::utils::errors::{http_error, RemoteError, RemoteResult};

/// Cliente HTTP del servidor remoto
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    current_organization_id: Option<String>,
}

impl RestRemoteStore {
    /// Crear nuevo cliente con URL base y timeout acotado
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        let request = request
            .header("Accept", "application/json")
            .bearer_auth(&session.access_token);
        match &self.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await.map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_error(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> RemoteResult<T> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| self.map_reqwest(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// PATCH `deleted_at` sobre las filas donde `column = value`
    async fn mark_deleted(&self, kind: RecordKind, column: &str, value: &str, session: &Session) -> RemoteResult<()> {
        let request = self
            .client
            .patch(self.url(kind.table()))
            .query(&[(column, format!("eq.{}", value))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "deleted_at": chrono::Utc::now().to_rfc3339() }));

        self.send(self.authorized(request, session)).await?;
        debug!("🗑️ Borrado lógico en {} donde {} = {}", kind, column, value);
        Ok(())
    }

    fn map_reqwest(&self, error: reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::Timeout(self.timeout.as_millis() as u64)
        } else {
            RemoteError::Network(error)
        }
    }
}

/// Clave natural del upsert: el id del servidor si el registro ya lo tiene
fn conflict_key(payload: &Value) -> &'static str {
    match payload.get("id") {
        Some(Value::String(_)) => "id",
        _ => "local_id",
    }
}

/// Parámetros de consulta para un listado
fn list_query(kind: RecordKind, organization_id: &str, filters: &ListFilters) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", "*".to_string()),
        ("organization_id", format!("eq.{}", organization_id)),
        ("deleted_at", "is.null".to_string()),
        ("order", "created_at.desc".to_string()),
    ];
    if let Some(start) = filters.start_date {
        query.push(("created_at", format!("gte.{}", start.to_rfc3339())));
    }
    if let Some(end) = filters.end_date {
        query.push(("created_at", format!("lte.{}", end.to_rfc3339())));
    }
    match kind {
        RecordKind::Rides => {
            if let Some(platform) = filters.platform {
                query.push(("platform", format!("eq.{}", platform.as_str())));
            }
        }
        RecordKind::Expenses => {
            if let Some(category) = filters.category {
                query.push(("category", format!("eq.{}", category.as_str())));
            }
        }
    }
    if let Some(limit) = filters.limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn resolve_organization(&self, session: &Session) -> RemoteResult<String> {
        let request = self
            .client
            .get(self.url("user_profiles"))
            .query(&[
                ("id", format!("eq.{}", session.user_id)),
                ("select", "current_organization_id".to_string()),
            ]);

        let rows: Vec<ProfileRow> = self.send_json(self.authorized(request, session)).await?;

        rows.into_iter()
            .next()
            .and_then(|row| row.current_organization_id)
            .filter(|org| !org.is_empty())
            .ok_or(RemoteError::NoOrganization)
    }

    async fn list(
        &self,
        kind: RecordKind,
        organization_id: &str,
        filters: &ListFilters,
        session: &Session,
    ) -> RemoteResult<Vec<Value>> {
        let request = self
            .client
            .get(self.url(kind.table()))
            .query(&list_query(kind, organization_id, filters));

        let rows: Vec<Value> = self.send_json(self.authorized(request, session)).await?;
        debug!("📥 {} registros remotos de {}", rows.len(), kind);
        Ok(rows)
    }

    async fn save(&self, kind: RecordKind, payload: Value, session: &Session) -> RemoteResult<Value> {
        // Reenviar el mismo registro no lo duplica
        let request = self
            .client
            .post(self.url(kind.table()))
            .query(&[("on_conflict", conflict_key(&payload))])
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&payload);

        let rows: Vec<Value> = self.send_json(self.authorized(request, session)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::InvalidResponse(format!("empty response saving into {}", kind)))
    }

    async fn soft_delete(&self, kind: RecordKind, id: &str, session: &Session) -> RemoteResult<()> {
        self.mark_deleted(kind, "id", id, session).await
    }

    async fn soft_delete_by_local_id(&self, kind: RecordKind, local_id: &str, session: &Session) -> RemoteResult<()> {
        self.mark_deleted(kind, "local_id", local_id, session).await
    }

    async fn fetch_settings(
        &self,
        organization_id: &str,
        session: &Session,
    ) -> RemoteResult<Option<PartialCostConfig>> {
        let request = self
            .client
            .get(self.url("organization_settings"))
            .query(&[
                ("organization_id", format!("eq.{}", organization_id)),
                ("select", "*".to_string()),
            ]);

        let rows: Vec<PartialCostConfig> = self.send_json(self.authorized(request, session)).await?;
        Ok(rows.into_iter().next().filter(|settings| !settings.is_empty()))
    }
}
