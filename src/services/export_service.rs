//! Exportación de carreras y gastos
//!
//! CSV separado por `;` con números en formato brasileño (`1.234,56`),
//! y un resumen en texto por período listo para compartir. Fechas y
//! horas en UTC, igual que el resumen de ganancias.

use chrono::{DateTime, Datelike, Duration, Utc};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::info;

use super::viability_service::round2;
use crate::models::{ExpenseRecord, RideRecord};
use crate::utils::errors::{AppError, AppResult};

const RIDE_HEADERS: [&str; 8] = [
    "Fecha",
    "Hora",
    "Plataforma",
    "Valor (R$)",
    "Distancia (km)",
    "Tiempo (min)",
    "Origen",
    "Destino",
];

const EXPENSE_HEADERS: [&str; 5] = ["Fecha", "Hora", "Categoría", "Descripción", "Valor (R$)"];

const EXPENSES_SEPARATOR: &str = "=== GASTOS ===";

const MISSING: &str = "N/A";

/// Qué registros se exportan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Rides,
    Expenses,
    All,
}

impl ExportScope {
    fn includes_rides(&self) -> bool {
        matches!(self, ExportScope::Rides | ExportScope::All)
    }

    fn includes_expenses(&self) -> bool {
        matches!(self, ExportScope::Expenses | ExportScope::All)
    }

    /// Prefijo del archivo exportado
    pub fn file_stem(&self) -> &'static str {
        match self {
            ExportScope::Rides => "carreras",
            ExportScope::Expenses => "gastos",
            ExportScope::All => "datos",
        }
    }
}

impl std::str::FromStr for ExportScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rides" | "carreras" => Ok(ExportScope::Rides),
            "expenses" | "gastos" => Ok(ExportScope::Expenses),
            "all" | "todo" => Ok(ExportScope::All),
            other => Err(format!("Unknown export scope '{}'", other)),
        }
    }
}

/// Período del resumen en texto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Today,
    Week,
    Month,
}

impl ReportPeriod {
    /// Inicio del período: medianoche de hoy, hace 7 días o el día 1 del mes
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let day = match self {
            ReportPeriod::Today => Some(now.date_naive()),
            ReportPeriod::Week => return now - Duration::days(7),
            ReportPeriod::Month => now.date_naive().with_day(1),
        };

        day.and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "Hoy",
            ReportPeriod::Week => "Últimos 7 días",
            ReportPeriod::Month => "Este mes",
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "hoy" => Ok(ReportPeriod::Today),
            "week" | "semana" => Ok(ReportPeriod::Week),
            "month" | "mes" => Ok(ReportPeriod::Month),
            other => Err(format!("Unknown report period '{}'", other)),
        }
    }
}

pub struct ExportService;

impl ExportService {
    /// Contenido CSV; con `All` los gastos van después de una fila separadora
    pub fn to_csv(rides: &[RideRecord], expenses: &[ExpenseRecord], scope: ExportScope) -> AppResult<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_writer(Vec::new());

        if scope.includes_rides() {
            writer.write_record(RIDE_HEADERS)?;
            for ride in rides {
                writer.write_record([
                    ride.created_at.format("%d/%m/%Y").to_string(),
                    ride.created_at.format("%H:%M").to_string(),
                    ride.platform.as_str().to_string(),
                    format_brl(ride.amount),
                    ride.distance_km.normalize().to_string().replace('.', ","),
                    ride.duration_min.to_string(),
                    ride.origin.clone().unwrap_or_else(|| MISSING.to_string()),
                    ride.destination.clone().unwrap_or_else(|| MISSING.to_string()),
                ])?;
            }
        }

        if scope.includes_expenses() && (scope == ExportScope::Expenses || !expenses.is_empty()) {
            if scope == ExportScope::All {
                writer.write_record([EXPENSES_SEPARATOR])?;
            }
            writer.write_record(EXPENSE_HEADERS)?;
            for expense in expenses {
                writer.write_record([
                    expense.created_at.format("%d/%m/%Y").to_string(),
                    expense.created_at.format("%H:%M").to_string(),
                    expense.category.as_str().to_string(),
                    expense.description.clone(),
                    format_brl(expense.amount),
                ])?;
            }
        }

        writer.flush()?;
        let bytes = writer.into_inner().map_err(|e| AppError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
    }

    /// Escribe el CSV en `dir` como `<prefijo>_<millis>.csv`
    pub async fn write_csv(
        dir: &Path,
        rides: &[RideRecord],
        expenses: &[ExpenseRecord],
        scope: ExportScope,
        now: DateTime<Utc>,
    ) -> AppResult<PathBuf> {
        let content = Self::to_csv(rides, expenses, scope)?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}_{}.csv", scope.file_stem(), now.timestamp_millis()));
        tokio::fs::write(&path, content).await?;

        info!("📤 Exportación escrita en {}", path.display());
        Ok(path)
    }

    /// Resumen en texto de los registros creados desde el inicio del período
    pub fn text_summary(
        rides: &[RideRecord],
        expenses: &[ExpenseRecord],
        scope: ExportScope,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> String {
        let since = period.start(now);
        let rides: Vec<&RideRecord> = rides.iter().filter(|r| r.created_at >= since).collect();
        let expenses: Vec<&ExpenseRecord> = expenses.iter().filter(|e| e.created_at >= since).collect();

        let revenue: Decimal = rides.iter().map(|r| r.amount).sum();
        let spent: Decimal = expenses.iter().map(|e| e.amount).sum();

        let mut text = String::from("📊 *Reporte Ride Ledger*\n\n");

        if scope.includes_rides() {
            let total_km: Decimal = rides.iter().map(|r| r.distance_km).sum();
            let average = if rides.is_empty() {
                Decimal::ZERO
            } else {
                revenue / Decimal::from(rides.len())
            };

            text.push_str("🚗 *CARRERAS*\n");
            text.push_str(&format!("Total: {}\n", rides.len()));
            text.push_str(&format!("Ingresos: {}\n", currency(revenue)));
            text.push_str(&format!("Ticket medio: {}\n", currency(average)));
            text.push_str(&format!("Total KM: {} km\n\n", format_brl(total_km)));
        }

        if scope.includes_expenses() {
            text.push_str("💰 *GASTOS*\n");
            text.push_str(&format!("Total: {}\n", expenses.len()));
            text.push_str(&format!("Gasto total: {}\n\n", currency(spent)));
        }

        if scope == ExportScope::All {
            text.push_str("📈 *RESUMEN*\n");
            text.push_str(&format!("Ingresos: {}\n", currency(revenue)));
            text.push_str(&format!("Gastos: {}\n", currency(spent)));
            text.push_str(&format!("Ganancia: {}\n", currency(revenue - spent)));
        }

        text.push_str(&format!("\n📅 Período: {}\n", period.label()));
        text.push_str(concat!("📱 Ride Ledger v", env!("CARGO_PKG_VERSION")));
        text
    }
}

/// Número con dos decimales en formato brasileño: `1.234,56`
pub fn format_brl(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{},{}", sign, grouped, cents)
}

fn currency(value: Decimal) -> String {
    let formatted = format_brl(value);
    match formatted.strip_prefix('-') {
        Some(positive) => format!("-R$ {}", positive),
        None => format!("R$ {}", formatted),
    }
}
