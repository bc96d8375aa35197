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

//! Bucketed success/failure counts and the views derived from them.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    db::TransactionRecord,
    error::MetricsError,
    time_boundaries::{Bucket, Granularity},
};

/// Distinct transaction count for one `(bucket, succeeded)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketedCount {
    pub bucket: Bucket,
    pub succeeded: bool,
    pub count: u64,
}

/// Share of a bucket's transactions with a given outcome, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketShare {
    pub bucket: Bucket,
    pub succeeded: bool,
    pub percentage: f64,
}

/// Counts per outcome summed across all buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessTotals {
    pub succeeded: u64,
    pub failed: u64,
}

/// Groups records by `(bucket, succeeded)` and counts distinct ids per group.
///
/// Rows are ordered by bucket start, failures before successes. A bucket only
/// gets rows for the outcomes actually observed in it.
pub fn aggregate(records: &[TransactionRecord], granularity: Granularity) -> Vec<BucketedCount> {
    let mut groups: BTreeMap<(Bucket, bool), HashSet<&str>> = BTreeMap::new();
    for record in records {
        let bucket = Bucket::containing(&record.timestamp, granularity);
        groups.entry((bucket, record.succeeded)).or_default().insert(record.id.as_str());
    }

    groups
        .into_iter()
        .map(|((bucket, succeeded), ids)| BucketedCount {
            bucket,
            succeeded,
            count: ids.len() as u64,
        })
        .collect()
}

/// Converts bucket counts into per-bucket percentages.
///
/// A missing outcome in a bucket simply has no row. A bucket whose counts sum
/// to zero yields `DivisionUndefined`; `aggregate` never emits such a bucket.
pub fn percentage_breakdown(buckets: &[BucketedCount]) -> Result<Vec<BucketShare>, MetricsError> {
    let mut bucket_totals: HashMap<Bucket, u64> = HashMap::new();
    for row in buckets {
        *bucket_totals.entry(row.bucket).or_default() += row.count;
    }

    buckets
        .iter()
        .map(|row| {
            let total = bucket_totals.get(&row.bucket).copied().unwrap_or_default();
            if total == 0 {
                return Err(MetricsError::DivisionUndefined(row.bucket));
            }
            Ok(BucketShare {
                bucket: row.bucket,
                succeeded: row.succeeded,
                percentage: 100.0 * row.count as f64 / total as f64,
            })
        })
        .collect()
}

pub fn totals_by_success(buckets: &[BucketedCount]) -> SuccessTotals {
    buckets.iter().fold(SuccessTotals::default(), |mut totals, row| {
        if row.succeeded {
            totals.succeeded += row.count;
        } else {
            totals.failed += row.count;
        }
        totals
    })
}
