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

use async_trait::async_trait;

use super::{FilterSet, LedgerError, LedgerQuery, TransactionRecord};
use crate::time_boundaries::DateRange;

/// In-memory ledger, used as a fake in tests and for fixture data.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<TransactionRecord>,
}

impl MemoryLedger {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<TransactionRecord> for MemoryLedger {
    fn from_iter<I: IntoIterator<Item = TransactionRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

#[async_trait]
impl LedgerQuery for MemoryLedger {
    async fn fetch(
        &self,
        range: &DateRange,
        filters: &FilterSet,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .records
            .iter()
            .filter(|record| range.contains(&record.timestamp) && filters.matches(record))
            .cloned()
            .collect())
    }
}
