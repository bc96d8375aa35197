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

//! Read access to the transaction ledger.

pub mod any;
pub mod memory;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time_boundaries::DateRange;

pub use any::AnyLedger;
pub use memory::MemoryLedger;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("SQL error {0:?}")]
    SqlErr(#[from] sqlx::Error),

    #[error("Invalid record: {0}")]
    BadRecord(String),

    #[error("Ledger fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// A single transaction as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub succeeded: bool,
}

impl TransactionRecord {
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, succeeded: bool) -> Self {
        Self { id: id.into(), timestamp, succeeded }
    }
}

/// Optional restrictions applied on top of the date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSet {
    pub succeeded: Option<bool>,
}

impl FilterSet {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn succeeded_only() -> Self {
        Self { succeeded: Some(true) }
    }

    pub fn failed_only() -> Self {
        Self { succeeded: Some(false) }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.succeeded.map_or(true, |wanted| wanted == record.succeeded)
    }
}

/// Read interface into the ledger.
///
/// `fetch` returns every record whose calendar date lies in the inclusive
/// range and that matches `filters`. Implementations must be free of
/// observable side effects so that results can be cached.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn fetch(
        &self,
        range: &DateRange,
        filters: &FilterSet,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;
}

pub type LedgerObj = Arc<dyn LedgerQuery>;

/// Normalizes the textual success flag found in the ledger.
///
/// Matching is case-insensitive so `TRUE`, `true` and `True` are equivalent.
pub fn parse_succeeded(value: &str) -> Result<bool, LedgerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        other => Err(LedgerError::BadRecord(format!("Invalid success flag: {}", other))),
    }
}
