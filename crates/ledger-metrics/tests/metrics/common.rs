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

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use ledger_metrics::{
    db::{FilterSet, LedgerError, LedgerQuery, MemoryLedger, TransactionRecord},
    DateRange, MetricsService, MetricsServiceConfig,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 15, 0).unwrap()
}

/// Appends `total` records on the given day, the first `failed` of them failing.
pub fn add_day(records: &mut Vec<TransactionRecord>, day: NaiveDate, total: usize, failed: usize) {
    for i in 0..total {
        let ts = day.and_hms_opt((i % 24) as u32, 0, 0).unwrap();
        records.push(TransactionRecord::new(format!("{day}-{i}"), ts, i >= failed));
    }
}

/// A small two-week ledger in January 2024 (2024-01-01 is a Monday).
pub fn sample_records() -> Vec<TransactionRecord> {
    let mut records = Vec::new();
    add_day(&mut records, date(2024, 1, 1), 10, 1);
    add_day(&mut records, date(2024, 1, 2), 20, 4);
    add_day(&mut records, date(2024, 1, 3), 15, 0);
    add_day(&mut records, date(2024, 1, 8), 30, 6);
    add_day(&mut records, date(2024, 1, 14), 5, 1);
    records
}

pub fn service_for(records: Vec<TransactionRecord>) -> MetricsService {
    MetricsService::new(Arc::new(MemoryLedger::new(records)), MetricsServiceConfig::default())
}

/// Ledger whose fetch never completes in time.
pub struct StalledLedger {
    pub delay: Duration,
}

#[async_trait]
impl LedgerQuery for StalledLedger {
    async fn fetch(
        &self,
        _range: &DateRange,
        _filters: &FilterSet,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

/// Ledger that fails every fetch.
pub struct BrokenLedger;

#[async_trait]
impl LedgerQuery for BrokenLedger {
    async fn fetch(
        &self,
        _range: &DateRange,
        _filters: &FilterSet,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Err(LedgerError::BadRecord("connection reset".to_string()))
    }
}
