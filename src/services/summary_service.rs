//! Resumen de ganancias de los últimos 30 días
//!
//! Horas y "hoy" se calculan en UTC.

use chrono::{DateTime, Duration, Timelike, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::viability_service::round2;
use crate::models::{EarningsSummary, ExpenseRecord, Platform, RideRecord};

pub const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Franjas de 4 horas: 0h-4h, 4h-8h, ... 20h-24h
const TIME_WINDOW_HOURS: u32 = 4;

#[derive(Default)]
struct Bucket {
    total: Decimal,
    count: u32,
}

impl Bucket {
    fn add(&mut self, amount: Decimal) {
        self.total += amount;
        self.count += 1;
    }

    fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(self.count)
        }
    }
}

/// Calcula el resumen sobre los registros creados en los últimos 30 días
pub fn summarize(rides: &[RideRecord], expenses: &[ExpenseRecord], now: DateTime<Utc>) -> EarningsSummary {
    if rides.is_empty() {
        return EarningsSummary::default();
    }

    let since = now - Duration::days(SUMMARY_WINDOW_DAYS);
    let recent: Vec<&RideRecord> = rides.iter().filter(|r| r.created_at >= since).collect();

    let total_revenue: Decimal = recent.iter().map(|r| r.amount).sum();
    let total_expenses: Decimal = expenses
        .iter()
        .filter(|e| e.created_at >= since)
        .map(|e| e.amount)
        .sum();
    let net_profit = total_revenue - total_expenses;
    let total_km: Decimal = recent.iter().map(|r| r.distance_km).sum();

    let average_ride_value = if recent.is_empty() {
        Decimal::ZERO
    } else {
        total_revenue / Decimal::from(recent.len())
    };

    let profit_margin = if total_revenue > Decimal::ZERO {
        round2(net_profit * Decimal::ONE_HUNDRED / total_revenue)
    } else {
        Decimal::ZERO
    };

    let start_of_today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);
    let rides_today = rides.iter().filter(|r| r.created_at >= start_of_today).count();

    EarningsSummary {
        total_revenue: round2(total_revenue),
        total_expenses: round2(total_expenses),
        net_profit: round2(net_profit),
        total_rides: recent.len(),
        total_km: round2(total_km),
        average_ride_value: round2(average_ride_value),
        best_time_window: best_time_window(&recent),
        best_platform: best_platform(&recent),
        rides_today,
        profit_margin,
    }
}

/// Franja con mayor valor medio por carrera; en empate gana la más temprana
fn best_time_window(rides: &[&RideRecord]) -> Option<String> {
    let mut buckets: BTreeMap<u32, Bucket> = BTreeMap::new();
    for ride in rides {
        let start = ride.created_at.hour() / TIME_WINDOW_HOURS * TIME_WINDOW_HOURS;
        buckets.entry(start).or_default().add(ride.amount);
    }

    best_by_average(buckets.into_iter())
        .map(|start| format!("{}h-{}h", start, start + TIME_WINDOW_HOURS))
}

/// Plataforma con mayor valor medio; en empate gana la primera vista
fn best_platform(rides: &[&RideRecord]) -> Option<Platform> {
    let mut buckets: Vec<(Platform, Bucket)> = Vec::new();
    for ride in rides {
        match buckets.iter_mut().find(|(platform, _)| *platform == ride.platform) {
            Some((_, bucket)) => bucket.add(ride.amount),
            None => {
                let mut bucket = Bucket::default();
                bucket.add(ride.amount);
                buckets.push((ride.platform, bucket));
            }
        }
    }

    best_by_average(buckets.into_iter())
}

fn best_by_average<K>(buckets: impl Iterator<Item = (K, Bucket)>) -> Option<K> {
    let mut best: Option<(K, Decimal)> = None;
    for (key, bucket) in buckets {
        let average = bucket.average();
        let current = best.as_ref().map_or(Decimal::ZERO, |(_, value)| *value);
        if average > current {
            best = Some((key, average));
        }
    }
    best.map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostConfig, ExpenseCategory, ExpenseDraft, RideDraft};
    use crate::services::viability_service::ViabilityEngine;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 21, 0, 0).unwrap()
    }

    fn ride(platform: Platform, amount: &str, km: &str, at: DateTime<Utc>) -> RideRecord {
        let draft = RideDraft {
            platform,
            amount: d(amount),
            distance_km: d(km),
            duration_min: 20,
            origin: None,
            destination: None,
            photo_ref: None,
            created_at: Some(at),
        };
        let analysis = ViabilityEngine::analyze(&draft.input(), &CostConfig::default());
        RideRecord::new(draft, analysis)
    }

    fn expense(amount: &str, at: DateTime<Utc>) -> ExpenseRecord {
        ExpenseRecord::new(ExpenseDraft {
            category: ExpenseCategory::Fuel,
            amount: d(amount),
            description: "Posto".to_string(),
            created_at: Some(at),
        })
    }

    #[test]
    fn test_no_rides_is_all_zero() {
        let summary = summarize(&[], &[expense("50", now())], now());
        assert_eq!(summary, EarningsSummary::default());
    }

    #[test]
    fn test_totals_only_count_last_30_days() {
        let old = now() - Duration::days(31);
        let rides = vec![
            ride(Platform::Uber, "30.00", "10", now() - Duration::hours(2)),
            ride(Platform::Uber, "20.00", "5.5", now() - Duration::days(3)),
            ride(Platform::Uber, "999.00", "100", old),
        ];
        let expenses = vec![expense("10.00", now() - Duration::days(1)), expense("500", old)];

        let summary = summarize(&rides, &expenses, now());
        assert_eq!(summary.total_rides, 2);
        assert_eq!(summary.total_revenue, d("50.00"));
        assert_eq!(summary.total_expenses, d("10.00"));
        assert_eq!(summary.net_profit, d("40.00"));
        assert_eq!(summary.total_km, d("15.50"));
        assert_eq!(summary.average_ride_value, d("25.00"));
        assert_eq!(summary.profit_margin, d("80.00"));
        assert_eq!(summary.rides_today, 1);
    }

    #[test]
    fn test_best_window_and_platform_by_average() {
        let day = Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap();
        let rides = vec![
            ride(Platform::Uber, "15.00", "5", day + Duration::hours(9)),
            ride(Platform::Uber, "25.00", "5", day + Duration::hours(10)),
            ride(Platform::NinetyNine, "40.00", "5", day + Duration::hours(17)),
            ride(Platform::NinetyNine, "10.00", "5", day + Duration::hours(19)),
            ride(Platform::IFood, "12.00", "5", day + Duration::hours(22)),
        ];

        let summary = summarize(&rides, &[], now());
        assert_eq!(summary.best_time_window.as_deref(), Some("16h-20h"));
        assert_eq!(summary.best_platform, Some(Platform::NinetyNine));
    }

    #[test]
    fn test_zero_value_rides_have_no_best() {
        let rides = vec![ride(Platform::Uber, "0", "3", now() - Duration::hours(1))];
        let summary = summarize(&rides, &[], now());
        assert_eq!(summary.best_time_window, None);
        assert_eq!(summary.best_platform, None);
        assert_eq!(summary.profit_margin, Decimal::ZERO);
    }
}
