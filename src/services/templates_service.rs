//! Plantillas de gasto guardadas en el almacenamiento local

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::cache::LocalStore;
use crate::models::{ExpenseTemplate, TemplateDraft};
use crate::utils::errors::AppResult;

pub const TEMPLATES_CACHE_KEY: &str = "expense_templates";

/// Cantidad de plantillas que se ofrecen como atajos
pub const DEFAULT_MOST_USED_LIMIT: usize = 5;

pub struct TemplatesService {
    local: Arc<dyn LocalStore>,
}

impl TemplatesService {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self { local }
    }

    pub async fn list(&self) -> AppResult<Vec<ExpenseTemplate>> {
        match self.local.get(TEMPLATES_CACHE_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Valida y guarda una plantilla nueva
    pub async fn save(&self, draft: TemplateDraft) -> AppResult<ExpenseTemplate> {
        draft.validate()?;
        let template = ExpenseTemplate::new(draft);

        let mut templates = self.list().await?;
        templates.push(template.clone());
        self.write(&templates).await?;

        info!("💾 Plantilla {} guardada ({})", template.id, template.description);
        Ok(template)
    }

    /// `true` si existía una plantilla con ese id
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut templates = self.list().await?;
        let before = templates.len();
        templates.retain(|template| template.id != id);
        if templates.len() == before {
            return Ok(false);
        }

        self.write(&templates).await?;
        Ok(true)
    }

    /// Suma un uso y devuelve la plantilla actualizada
    pub async fn record_use(&self, id: &str) -> AppResult<Option<ExpenseTemplate>> {
        let mut templates = self.list().await?;
        let Some(template) = templates.iter_mut().find(|template| template.id == id) else {
            debug!("🔍 Plantilla {} no encontrada", id);
            return Ok(None);
        };

        template.used += 1;
        template.last_used = Some(Utc::now());
        let updated = template.clone();

        self.write(&templates).await?;
        Ok(Some(updated))
    }

    /// Las más usadas primero; en empate, la guardada antes
    pub async fn most_used(&self, limit: usize) -> AppResult<Vec<ExpenseTemplate>> {
        let mut templates = self.list().await?;
        templates.sort_by(|a, b| b.used.cmp(&a.used));
        templates.truncate(limit);
        Ok(templates)
    }

    async fn write(&self, templates: &[ExpenseTemplate]) -> AppResult<()> {
        let raw = serde_json::to_string(templates)?;
        self.local.set(TEMPLATES_CACHE_KEY, &raw).await?;
        Ok(())
    }
}
