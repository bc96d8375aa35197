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

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime};
use sqlx::{
    any::{install_default_drivers, AnyConnectOptions, AnyPoolOptions},
    AnyPool, Row,
};

use super::{parse_succeeded, FilterSet, LedgerError, LedgerQuery, TransactionRecord};
use crate::time_boundaries::DateRange;

const MAX_CONNECTIONS: u32 = 7;

/// Ledger backed by a `fact_transactions` table reachable through sqlx's Any driver.
///
/// Expected columns: `tx_id TEXT`, `block_timestamp BIGINT` (seconds since the
/// epoch, read as a naive calendar timestamp) and `tx_succeeded TEXT`.
#[derive(Debug, Clone)]
pub struct AnyLedger {
    pool: AnyPool,
}

impl AnyLedger {
    /// For SQLite use a `sqlite:file_path` URL; for Postgres `postgres://`.
    pub async fn new(conn_str: &str) -> Result<Self, LedgerError> {
        install_default_drivers();
        let opts = AnyConnectOptions::from_str(conn_str)?;

        let pool = AnyPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerQuery for AnyLedger {
    async fn fetch(
        &self,
        range: &DateRange,
        filters: &FilterSet,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        // Inclusive date range as a half-open epoch interval
        let from_ts = range.start().and_time(NaiveTime::MIN).and_utc().timestamp();
        let to_ts = range.end_exclusive().and_utc().timestamp();

        tracing::debug!(
            "Fetching transactions from {} to {} (block_timestamp in [{}, {}))",
            range.start(),
            range.end(),
            from_ts,
            to_ts
        );

        let rows = sqlx::query(
            "SELECT tx_id, block_timestamp, tx_succeeded FROM fact_transactions
             WHERE block_timestamp >= $1 AND block_timestamp < $2
             ORDER BY block_timestamp ASC",
        )
        .bind(from_ts)
        .bind(to_ts)
        .fetch_all(&self.pool)
        .await?;

        // The success flag is filtered after normalization; its stored casing varies.
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("tx_id")?;
            let block_timestamp: i64 = row.try_get("block_timestamp")?;
            let flag: String = row.try_get("tx_succeeded")?;

            let timestamp = DateTime::from_timestamp(block_timestamp, 0)
                .ok_or_else(|| {
                    LedgerError::BadRecord(format!(
                        "Invalid block_timestamp {} for tx {}",
                        block_timestamp, id
                    ))
                })?
                .naive_utc();
            let record = TransactionRecord { id, timestamp, succeeded: parse_succeeded(&flag)? };

            if filters.matches(&record) {
                records.push(record);
            }
        }

        tracing::debug!("Fetched {} transactions", records.len());
        Ok(records)
    }
}
