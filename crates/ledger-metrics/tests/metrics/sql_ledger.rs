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

use std::sync::Arc;

use ledger_metrics::{
    db::{AnyLedger, FilterSet, LedgerError, LedgerQuery, MemoryLedger, TransactionRecord},
    metrics::SuccessRate,
    DateRange, Granularity, MetricsError, MetricsService, MetricsServiceConfig,
};
use tempfile::NamedTempFile;
use tracing_test::traced_test;

use crate::common::{at, date, sample_records};

struct TestLedger {
    ledger: AnyLedger,
    _temp_file: NamedTempFile,
}

async fn create_ledger() -> TestLedger {
    let temp_file = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_file.path().display());
    let ledger = AnyLedger::new(&db_url).await.unwrap();

    sqlx::query(
        "CREATE TABLE fact_transactions (
            tx_id TEXT NOT NULL,
            block_timestamp BIGINT NOT NULL,
            tx_succeeded TEXT NOT NULL
        )",
    )
    .execute(ledger.pool())
    .await
    .unwrap();

    TestLedger { ledger, _temp_file: temp_file }
}

async fn insert(ledger: &AnyLedger, id: &str, timestamp: chrono::NaiveDateTime, flag: &str) {
    sqlx::query(
        "INSERT INTO fact_transactions (tx_id, block_timestamp, tx_succeeded)
         VALUES ($1, $2, $3)",
    )
    .bind(id.to_string())
    .bind(timestamp.and_utc().timestamp())
    .bind(flag.to_string())
    .execute(ledger.pool())
    .await
    .unwrap();
}

async fn insert_records(ledger: &AnyLedger, records: &[TransactionRecord]) {
    // Alternate the flag spellings found in the source data
    for (i, record) in records.iter().enumerate() {
        let flag = match (record.succeeded, i % 2) {
            (true, 0) => "TRUE",
            (true, _) => "true",
            (false, 0) => "FALSE",
            (false, _) => "false",
        };
        insert(ledger, &record.id, record.timestamp, flag).await;
    }
}

#[tokio::test]
#[traced_test]
async fn test_sql_ledger_matches_memory_ledger() {
    let test = create_ledger().await;
    let records = sample_records();
    insert_records(&test.ledger, &records).await;
    let memory = MemoryLedger::new(records);

    let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 8)).unwrap();
    for filters in [FilterSet::all(), FilterSet::succeeded_only(), FilterSet::failed_only()] {
        let mut from_sql = test.ledger.fetch(&range, &filters).await.unwrap();
        let mut from_memory = memory.fetch(&range, &filters).await.unwrap();
        from_sql.sort_by(|a, b| a.id.cmp(&b.id));
        from_memory.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(from_sql, from_memory);
    }
}

#[tokio::test]
async fn test_sql_ledger_date_inclusion() {
    let test = create_ledger().await;
    insert(&test.ledger, "before", date(2024, 1, 1).and_hms_opt(23, 59, 59).unwrap(), "true").await;
    insert(&test.ledger, "first", date(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap(), "true").await;
    insert(&test.ledger, "last", date(2024, 1, 3).and_hms_opt(23, 59, 59).unwrap(), "false").await;
    insert(&test.ledger, "after", date(2024, 1, 4).and_hms_opt(0, 0, 0).unwrap(), "true").await;

    let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 3)).unwrap();
    let records = test.ledger.fetch(&range, &FilterSet::all()).await.unwrap();
    let ids: Vec<_> = records.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "last"]);
}

#[tokio::test]
async fn test_sql_ledger_rejects_unknown_flag() {
    let test = create_ledger().await;
    insert(&test.ledger, "odd", at(2024, 1, 1, 1), "maybe").await;

    let range = DateRange::single_day(date(2024, 1, 1));
    assert!(matches!(
        test.ledger.fetch(&range, &FilterSet::all()).await,
        Err(LedgerError::BadRecord(_))
    ));
}

#[tokio::test]
async fn test_service_over_sql_ledger() {
    let test = create_ledger().await;
    insert_records(&test.ledger, &sample_records()).await;
    let service =
        MetricsService::new(Arc::new(test.ledger.clone()), MetricsServiceConfig::default());

    let (start, end) = (date(2024, 1, 1), date(2024, 1, 31));
    assert_eq!(service.success_rate(start, end).await.unwrap(), SuccessRate(85.0));
    assert_eq!(service.total_transactions(start, end).await.unwrap(), 80);

    let weekly = service.aggregate(Granularity::Week, start, end).await.unwrap();
    let weeks: Vec<_> = weekly.iter().map(|row| row.bucket.start).collect();
    assert_eq!(
        weeks,
        vec![date(2024, 1, 1), date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 8)]
    );

    assert!(matches!(
        service.success_rate(date(2030, 1, 1), date(2030, 1, 2)).await,
        Err(MetricsError::EmptyRange { .. })
    ));
}
