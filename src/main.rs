use anyhow::{bail, Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ride_ledger::config::AppConfig;
use ride_ledger::models::{
    ExpenseCategory, ExpenseDraft, ExpenseRecord, ListFilters, Platform, RideDraft, RideInput, RideRecord,
    TargetThresholds, TemplateDraft,
};
use ride_ledger::services::history_service::{DEFAULT_RECENT_LIMIT, DEFAULT_SIMILAR_LIMIT};
use ride_ledger::services::templates_service::DEFAULT_MOST_USED_LIMIT;
use ride_ledger::services::{ExportScope, ExportService, HistoryService, ReportPeriod, ViabilityEngine};
use ride_ledger::utils::validation::{sanitize_decimal, sanitize_minutes};
use ride_ledger::{AppState, SessionProvider};

const USAGE: &str = "uso: ride-ledger [sync | list rides|expenses | analyze <valor> <km> <min> [plataforma] \
                     | add-ride <valor> <km> <min> [plataforma] | add-expense <valor> <categoria> <descripcion> \
                     | summary | recent rides|expenses [n] | similar <categoria> [n] | export [rides|expenses|all] [dir] \
                     | report [today|week|month] [rides|expenses|all] \
                     | template list|add <valor> <categoria> <descripcion>|use <id>|delete <id>]";

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = AppConfig::from_env().context("Configuración inválida")?;

    // Configurar logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚗 Ride Ledger ({})", config.environment);

    let state = AppState::new(config).await.context("No se pudo inicializar el estado")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(e) = run(&state, &args).await {
        error!("❌ {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(state: &AppState, args: &[String]) -> Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("sync");

    match command {
        "sync" => {
            if !state.config.has_remote() {
                info!("📴 Sin servidor configurado: los registros quedan pendientes");
            } else if !state.sessions.is_authenticated() {
                info!("📴 Sin sesión: los registros quedan pendientes");
            }
            for report in state.coordinator.sync_all_pending().await? {
                println!(
                    "{}: {} pendientes, {} sincronizados, {} fallidos{}",
                    report.kind,
                    report.pending,
                    report.synced,
                    report.failed,
                    if report.skipped { " (sin sesión)" } else { "" }
                );
            }
        }
        "list" => match args.get(1).map(String::as_str) {
            Some("rides") => {
                let rides = state.coordinator.list::<RideRecord>(&ListFilters::default()).await?;
                println!("{}", serde_json::to_string_pretty(&rides)?);
            }
            Some("expenses") => {
                let expenses = state.coordinator.list::<ExpenseRecord>(&ListFilters::default()).await?;
                println!("{}", serde_json::to_string_pretty(&expenses)?);
            }
            _ => bail!(USAGE),
        },
        "analyze" => {
            let input = ride_input(args)?;
            let config = state.settings.resolve().await;
            let result = ViabilityEngine::analyze(&input, &config);
            let targets = ViabilityEngine::check_targets(&input, &result, &TargetThresholds::default());

            println!("{}", serde_json::to_string_pretty(&result)?);
            for reason in &targets.reasons {
                println!("- {}", reason);
            }
        }
        "add-ride" => {
            let input = ride_input(args)?;
            let config = state.settings.resolve().await;
            let analysis = ViabilityEngine::analyze(&input, &config);
            let draft = RideDraft {
                platform: input.platform,
                amount: input.amount,
                distance_km: input.distance_km,
                duration_min: input.duration_min,
                origin: None,
                destination: None,
                photo_ref: None,
                created_at: None,
            };

            let saved = state.coordinator.save(RideRecord::from_draft(draft, analysis)?).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        "add-expense" => {
            let (amount, category, description) = expense_fields(&args[1..])?;
            let draft = ExpenseDraft {
                category,
                amount,
                description,
                created_at: None,
            };

            let saved = state.coordinator.save(ExpenseRecord::from_draft(draft)?).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        "summary" => {
            let summary = state.summary().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "recent" => {
            let limit = count_arg(args.get(2), DEFAULT_RECENT_LIMIT);
            match args.get(1).map(String::as_str) {
                Some("rides") => {
                    let rides = HistoryService::recent::<RideRecord>(&state.coordinator, limit).await?;
                    println!("{}", serde_json::to_string_pretty(&rides)?);
                }
                Some("expenses") => {
                    let expenses = HistoryService::recent::<ExpenseRecord>(&state.coordinator, limit).await?;
                    println!("{}", serde_json::to_string_pretty(&expenses)?);
                }
                _ => bail!(USAGE),
            }
        }
        "similar" => {
            let Some(category) = args.get(1) else { bail!(USAGE) };
            let category = category.parse().unwrap_or(ExpenseCategory::Other);
            let limit = count_arg(args.get(2), DEFAULT_SIMILAR_LIMIT);
            let expenses = HistoryService::similar(&state.coordinator, category, limit).await?;
            println!("{}", serde_json::to_string_pretty(&expenses)?);
        }
        "export" => {
            let scope = scope_arg(args.get(1))?;
            let dir = match args.get(2) {
                Some(dir) => PathBuf::from(dir),
                None => state.config.cache.data_dir.join("exports"),
            };
            let rides = state.coordinator.cached::<RideRecord>().await?;
            let expenses = state.coordinator.cached::<ExpenseRecord>().await?;

            let path = ExportService::write_csv(&dir, &rides, &expenses, scope, Utc::now()).await?;
            println!("{}", path.display());
        }
        "report" => {
            let period = match args.get(1) {
                Some(raw) => raw.parse::<ReportPeriod>().map_err(anyhow::Error::msg)?,
                None => ReportPeriod::Month,
            };
            let scope = scope_arg(args.get(2))?;
            let rides = state.coordinator.cached::<RideRecord>().await?;
            let expenses = state.coordinator.cached::<ExpenseRecord>().await?;

            println!("{}", ExportService::text_summary(&rides, &expenses, scope, period, Utc::now()));
        }
        "template" => match args.get(1).map(String::as_str) {
            Some("list") | None => {
                let templates = state.templates.most_used(DEFAULT_MOST_USED_LIMIT).await?;
                println!("{}", serde_json::to_string_pretty(&templates)?);
            }
            Some("add") => {
                let (amount, category, description) = expense_fields(&args[2..])?;
                let template = state
                    .templates
                    .save(TemplateDraft {
                        category,
                        amount,
                        description,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&template)?);
            }
            Some("use") => {
                let Some(id) = args.get(2) else { bail!(USAGE) };
                let Some(template) = state.templates.record_use(id).await? else {
                    bail!("Plantilla {} no encontrada", id)
                };

                let saved = state.coordinator.save(ExpenseRecord::from_draft(template.to_draft())?).await?;
                println!("{}", serde_json::to_string_pretty(&saved)?);
            }
            Some("delete") => {
                let Some(id) = args.get(2) else { bail!(USAGE) };
                if !state.templates.delete(id).await? {
                    bail!("Plantilla {} no encontrada", id);
                }
                info!("🗑️ Plantilla {} eliminada", id);
            }
            _ => bail!(USAGE),
        },
        _ => bail!(USAGE),
    }

    Ok(())
}

/// `<valor> <km> <min> [plataforma]` a partir de `args[1..]`
fn ride_input(args: &[String]) -> Result<RideInput> {
    let (amount, km, minutes) = match args.get(1..) {
        Some([amount, km, minutes, ..]) => (amount, km, minutes),
        _ => bail!(USAGE),
    };
    let platform: Platform = match args.get(4) {
        Some(raw) => raw.parse().unwrap_or(Platform::Other),
        None => Platform::Uber,
    };

    Ok(RideInput {
        amount: sanitize_decimal(amount),
        distance_km: sanitize_decimal(km),
        duration_min: sanitize_minutes(minutes),
        platform,
    })
}

/// `<valor> <categoria> <descripcion...>`
fn expense_fields(args: &[String]) -> Result<(Decimal, ExpenseCategory, String)> {
    match args {
        [amount, category, description @ ..] if !description.is_empty() => Ok((
            sanitize_decimal(amount),
            category.parse().unwrap_or(ExpenseCategory::Other),
            description.join(" "),
        )),
        _ => bail!(USAGE),
    }
}

fn count_arg(raw: Option<&String>, default: usize) -> usize {
    raw.and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

fn scope_arg(raw: Option<&String>) -> Result<ExportScope> {
    match raw {
        Some(raw) => raw.parse().map_err(anyhow::Error::msg),
        None => Ok(ExportScope::All),
    }
}
