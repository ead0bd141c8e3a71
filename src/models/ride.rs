//! Modelo de carrera (Ride)
//!
//! Este módulo contiene el registro de carrera persistido, el borrador que
//! llena la UI y la entrada mínima del motor de viabilidad.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filters::ListFilters;
use super::identity::RecordIdentity;
use super::record::{RecordKind, SyncRecord};
use super::viability::ViabilityResult;
use crate::utils::errors::AppResult;
use crate::utils::validation::validate_non_negative;

/// Plataforma de la carrera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Uber,
    #[serde(rename = "99")]
    NinetyNine,
    #[serde(rename = "ifood")]
    IFood,
    #[serde(other)]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Uber => "uber",
            Platform::NinetyNine => "99",
            Platform::IFood => "ifood",
            Platform::Other => "other",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "uber" => Platform::Uber,
            "99" => Platform::NinetyNine,
            "ifood" => Platform::IFood,
            _ => Platform::Other,
        })
    }
}

/// Entrada del motor de viabilidad: números ya saneados (no negativos)
#[derive(Debug, Clone, PartialEq)]
pub struct RideInput {
    pub amount: Decimal,
    pub distance_km: Decimal,
    pub duration_min: u32,
    pub platform: Platform,
}

/// Borrador de carrera tal como lo captura la UI
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RideDraft {
    pub platform: Platform,

    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,

    #[validate(custom = "validate_non_negative")]
    pub distance_km: Decimal,

    pub duration_min: u32,

    #[validate(length(max = 255))]
    pub origin: Option<String>,

    #[validate(length(max = 255))]
    pub destination: Option<String>,

    pub photo_ref: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl RideDraft {
    pub fn input(&self) -> RideInput {
        RideInput {
            amount: self.amount,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            platform: self.platform,
        }
    }
}

/// Carrera persistida, localmente y en el servidor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    #[serde(flatten)]
    pub identity: RecordIdentity,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub platform: Platform,
    pub amount: Decimal,
    pub distance_km: Decimal,
    pub duration_min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    pub analysis: ViabilityResult,
    pub created_at: DateTime<Utc>,
}

impl RideRecord {
    /// Crea un registro pendiente con el análisis vigente al momento de guardar
    pub fn new(draft: RideDraft, analysis: ViabilityResult) -> Self {
        Self {
            identity: RecordIdentity::pending(),
            organization_id: None,
            platform: draft.platform,
            amount: draft.amount,
            distance_km: draft.distance_km,
            duration_min: draft.duration_min,
            origin: draft.origin,
            destination: draft.destination,
            photo_ref: draft.photo_ref,
            analysis,
            created_at: draft.created_at.unwrap_or_else(Utc::now),
        }
    }

    /// Valida el borrador antes de crear el registro
    pub fn from_draft(draft: RideDraft, analysis: ViabilityResult) -> AppResult<Self> {
        draft.validate()?;
        Ok(Self::new(draft, analysis))
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn input(&self) -> RideInput {
        RideInput {
            amount: self.amount,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            platform: self.platform,
        }
    }
}

impl SyncRecord for RideRecord {
    const KIND: RecordKind = RecordKind::Rides;

    fn identity(&self) -> &RecordIdentity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut RecordIdentity {
        &mut self.identity
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_kind_filters(&self, filters: &ListFilters) -> bool {
        filters.platform.map_or(true, |p| p == self.platform)
    }
}
