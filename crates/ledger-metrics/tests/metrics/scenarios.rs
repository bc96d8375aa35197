// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{sync::Arc, time::Duration};

use chrono::Weekday;
use ledger_metrics::{
    activity::{self, ActivityCell},
    db::{LedgerError, TransactionRecord},
    metrics::SuccessRate,
    Granularity, MetricsError, MetricsService, MetricsServiceConfig,
};
use tracing_test::traced_test;

use crate::common::{add_day, at, date, sample_records, service_for, BrokenLedger, StalledLedger};

#[tokio::test]
#[traced_test]
async fn test_all_successful_day() {
    let mut records = Vec::new();
    add_day(&mut records, date(2024, 1, 1), 10, 0);
    let service = service_for(records);

    let day = date(2024, 1, 1);
    assert_eq!(service.success_rate(day, day).await.unwrap(), SuccessRate(100.0));
    assert_eq!(service.total_transactions(day, day).await.unwrap(), 10);
}

#[tokio::test]
#[traced_test]
async fn test_empty_range() {
    let service = service_for(sample_records());
    let (start, end) = (date(2030, 1, 1), date(2030, 1, 2));

    assert!(matches!(
        service.success_rate(start, end).await,
        Err(MetricsError::EmptyRange { .. })
    ));
    assert_eq!(service.total_transactions(start, end).await.unwrap(), 0);
    assert!(service.aggregate(Granularity::Week, start, end).await.unwrap().is_empty());
    assert!(service.throughput(Granularity::Day, start, end).await.unwrap().is_empty());
    assert!(matches!(
        service.peak_activity(start, end).await,
        Err(MetricsError::EmptyRange { .. })
    ));
}

#[tokio::test]
async fn test_constant_failures_correlation_undefined() {
    let mut records = Vec::new();
    for d in 1..=3 {
        add_day(&mut records, date(2024, 1, d), 5, 1);
    }
    let service = service_for(records);

    assert!(matches!(
        service.failure_correlation(date(2024, 1, 1), date(2024, 1, 3)).await,
        Err(MetricsError::UndefinedCorrelation(_))
    ));
}

#[tokio::test]
async fn test_peak_tie_prefers_monday() {
    let mut records = Vec::new();
    // 2024-01-01 is a Monday, 2024-01-02 a Tuesday
    for i in 0..42 {
        records.push(TransactionRecord::new(format!("mon-{i}"), at(2024, 1, 1, 10), true));
        records.push(TransactionRecord::new(format!("tue-{i}"), at(2024, 1, 2, 9), true));
    }
    let service = service_for(records);

    let matrix = service.activity_matrix(date(2024, 1, 1), date(2024, 1, 2)).await.unwrap();
    assert_eq!(
        matrix,
        vec![
            ActivityCell { hour: 10, day_of_week: Weekday::Mon, count: 42 },
            ActivityCell { hour: 9, day_of_week: Weekday::Tue, count: 42 },
        ]
    );

    let peak = service.peak_activity(date(2024, 1, 1), date(2024, 1, 2)).await.unwrap();
    assert_eq!(peak.day_of_week, Weekday::Mon);
    assert_eq!(peak.hour, 10);
    assert_eq!(peak.count, 42);

    // Reversed input order gives the same answer
    let reversed: Vec<_> = matrix.into_iter().rev().collect();
    assert_eq!(activity::peak(&reversed).unwrap(), peak);
}

#[tokio::test]
async fn test_end_date_is_inclusive() {
    let records = vec![
        TransactionRecord::new("late", date(2024, 1, 3).and_hms_opt(23, 59, 59).unwrap(), true),
        TransactionRecord::new("next", date(2024, 1, 4).and_hms_opt(0, 0, 0).unwrap(), true),
    ];
    let service = service_for(records);
    assert_eq!(service.total_transactions(date(2024, 1, 1), date(2024, 1, 3)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_monthly_buckets() {
    let mut records = sample_records();
    add_day(&mut records, date(2024, 2, 29), 8, 8);
    let service = service_for(records);

    let rows =
        service.aggregate(Granularity::Month, date(2024, 1, 1), date(2024, 2, 29)).await.unwrap();
    // January has both outcomes, February only failures
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].bucket.start, date(2024, 1, 1));
    assert_eq!(rows[0].count, 12);
    assert_eq!(rows[1].count, 68);
    assert_eq!(rows[2].bucket.start, date(2024, 2, 1));
    assert!(!rows[2].succeeded);
    assert_eq!(rows[2].count, 8);

    let shares = service
        .percentage_breakdown(Granularity::Month, date(2024, 1, 1), date(2024, 2, 29))
        .await
        .unwrap();
    assert_eq!(shares[0].percentage, 15.0);
    assert_eq!(shares[1].percentage, 85.0);
    assert_eq!(shares[2].percentage, 100.0);
}

#[tokio::test]
#[traced_test]
async fn test_ledger_timeout_is_reported() {
    let config = MetricsServiceConfig { fetch_timeout: Duration::from_millis(20) };
    let service =
        MetricsService::new(Arc::new(StalledLedger { delay: Duration::from_secs(5) }), config);

    let result = service.total_transactions(date(2024, 1, 1), date(2024, 1, 1)).await;
    assert!(matches!(result, Err(MetricsError::LedgerUnavailable(LedgerError::Timeout(_)))));
}

#[tokio::test]
async fn test_report_isolates_failures() {
    let mut records = Vec::new();
    for d in 1..=3 {
        add_day(&mut records, date(2024, 1, d), 5, 1);
    }
    let service = service_for(records);

    let report =
        service.network_report(Granularity::Day, date(2024, 1, 1), date(2024, 1, 3)).await.unwrap();

    // Correlation is undefined but everything else is computed
    assert!(!report.failure_correlation.is_available());
    assert_eq!(report.success_rate.value(), Some(&SuccessRate(80.0)));
    assert_eq!(report.total_transactions.value(), Some(&15));
    assert_eq!(report.buckets.value().map(Vec::len), Some(6));
    assert!(report.throughput.is_available());
    assert!(report.activity.is_available());
    assert!(report.peak_activity.is_available());
}

#[tokio::test]
async fn test_report_with_broken_ledger() {
    let service = MetricsService::new(Arc::new(BrokenLedger), MetricsServiceConfig::default());
    let (start, end) = (date(2024, 1, 1), date(2024, 1, 31));
    let report = service.network_report(Granularity::Week, start, end).await.unwrap();

    assert!(!report.success_rate.is_available());
    assert!(!report.total_transactions.is_available());
    assert!(!report.activity.is_available());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_transactions"]["status"], "unavailable");
    assert!(json["total_transactions"]["reason"].as_str().unwrap().contains("connection reset"));
}
