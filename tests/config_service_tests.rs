mod common;

use common::{d, Harness};
use ride_ledger::cache::LocalStore;
use ride_ledger::models::{CostConfig, PartialCostConfig};
use ride_ledger::services::config_service::CONFIG_CACHE_KEY;
use ride_ledger::services::ConfigService;

fn custom_config() -> CostConfig {
    CostConfig {
        cost_per_km: d("0.35"),
        cost_per_hour: d("18"),
        km_per_liter: d("14"),
        fuel_price_per_liter: d("5.89"),
    }
}

#[tokio::test]
async fn test_remote_settings_win_and_are_cached() {
    let harness = Harness::online();
    harness.remote.set_settings(PartialCostConfig {
        cost_per_km: Some(d("0.40")),
        km_per_liter: Some(d("10")),
        ..PartialCostConfig::default()
    });
    let service = ConfigService::new(harness.coordinator.clone());
    service.save_local(&custom_config()).await.unwrap();

    let resolved = service.resolve().await;

    let defaults = CostConfig::default();
    assert_eq!(resolved.cost_per_km, d("0.40"));
    assert_eq!(resolved.km_per_liter, d("10"));
    assert_eq!(resolved.cost_per_hour, defaults.cost_per_hour);
    assert_eq!(resolved.fuel_price_per_liter, defaults.fuel_price_per_liter);

    let cached = harness.local.get(CONFIG_CACHE_KEY).await.unwrap().unwrap();
    assert_eq!(serde_json::from_str::<CostConfig>(&cached).unwrap(), resolved);
}

#[tokio::test]
async fn test_cached_config_used_when_remote_fails() {
    let harness = Harness::online();
    harness.remote.set_failing(true);
    let service = ConfigService::new(harness.coordinator.clone());
    service.save_local(&custom_config()).await.unwrap();

    assert_eq!(service.resolve().await, custom_config());
}

#[tokio::test]
async fn test_cached_config_used_offline() {
    let harness = Harness::offline();
    let service = ConfigService::new(harness.coordinator.clone());
    service.save_local(&custom_config()).await.unwrap();

    assert_eq!(service.resolve().await, custom_config());
}

#[tokio::test]
async fn test_defaults_when_nothing_available() {
    let harness = Harness::online();
    let service = ConfigService::new(harness.coordinator.clone());

    assert_eq!(service.resolve().await, CostConfig::default());
}

#[tokio::test]
async fn test_incomplete_or_corrupt_cache_never_fails() {
    let harness = Harness::offline();
    let service = ConfigService::new(harness.coordinator.clone());

    harness
        .local
        .set(CONFIG_CACHE_KEY, r#"{"cost_per_km":"0.70","km_per_liter":"0"}"#)
        .await
        .unwrap();
    let resolved = service.resolve().await;
    assert_eq!(resolved.cost_per_km, d("0.70"));
    assert_eq!(resolved.km_per_liter, CostConfig::default().km_per_liter);

    harness.local.set(CONFIG_CACHE_KEY, "not json").await.unwrap();
    assert_eq!(service.resolve().await, CostConfig::default());
}

#[tokio::test]
async fn test_save_local_failure_is_reported() {
    let harness = Harness::offline();
    harness.local.set_fail_writes(true);
    let service = ConfigService::new(harness.coordinator.clone());

    assert!(service.save_local(&custom_config()).await.is_err());
}
