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

//! Scalar and time-series network health metrics.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    db::TransactionRecord,
    error::MetricsError,
    time_boundaries::{Bucket, DateRange, Granularity, SECONDS_PER_DAY},
};

/// Percentage of succeeded transactions, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuccessRate(pub f64);

/// Pearson coefficient between daily totals and daily failures, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationCoefficient(pub f64);

/// Average daily transactions per second within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSample {
    pub bucket: Bucket,
    pub tps: f64,
}

/// Transaction counts for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    pub date: NaiveDate,
    pub total: u64,
    pub failed: u64,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn distinct_ids<'a>(records: impl Iterator<Item = &'a TransactionRecord>) -> usize {
    records.map(|record| record.id.as_str()).collect::<HashSet<_>>().len()
}

pub fn total_transactions(records: &[TransactionRecord]) -> u64 {
    distinct_ids(records.iter()) as u64
}

/// `100 * succeeded / total` over the whole range.
pub fn success_rate(
    records: &[TransactionRecord],
    range: &DateRange,
) -> Result<SuccessRate, MetricsError> {
    let total = distinct_ids(records.iter());
    if total == 0 {
        return Err(MetricsError::EmptyRange { start: range.start(), end: range.end() });
    }
    let succeeded = distinct_ids(records.iter().filter(|record| record.succeeded));

    Ok(SuccessRate(round2(100.0 * succeeded as f64 / total as f64)))
}

/// Successful transactions per second for each day that had any.
pub fn daily_throughput(records: &[TransactionRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut per_day: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
    for record in records.iter().filter(|record| record.succeeded) {
        per_day.entry(record.timestamp.date()).or_default().insert(record.id.as_str());
    }

    per_day
        .into_iter()
        .map(|(day, ids)| (day, ids.len() as f64 / SECONDS_PER_DAY as f64))
        .collect()
}

/// Daily TPS values averaged per bucket.
///
/// Rates are computed per day first and only then averaged, so a bucket
/// reports its typical daily throughput rather than one rate over the
/// whole bucket.
pub fn throughput(
    records: &[TransactionRecord],
    granularity: Granularity,
) -> Vec<ThroughputSample> {
    let mut per_bucket: BTreeMap<Bucket, Vec<f64>> = BTreeMap::new();
    for (day, tps) in daily_throughput(records) {
        let bucket = Bucket::containing(&day.and_time(chrono::NaiveTime::MIN), granularity);
        per_bucket.entry(bucket).or_default().push(tps);
    }

    per_bucket
        .into_iter()
        .map(|(bucket, rates)| ThroughputSample {
            bucket,
            tps: round2(rates.iter().sum::<f64>() / rates.len() as f64),
        })
        .collect()
}

/// Totals and failures for every day with at least one transaction.
/// Days without failures report `failed: 0`.
pub fn daily_counts(records: &[TransactionRecord]) -> Vec<DailyCounts> {
    let mut per_day: BTreeMap<NaiveDate, (HashSet<&str>, HashSet<&str>)> = BTreeMap::new();
    for record in records {
        let (all, failed) = per_day.entry(record.timestamp.date()).or_default();
        all.insert(record.id.as_str());
        if !record.succeeded {
            failed.insert(record.id.as_str());
        }
    }

    per_day
        .into_iter()
        .map(|(date, (all, failed))| DailyCounts {
            date,
            total: all.len() as u64,
            failed: failed.len() as u64,
        })
        .collect()
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Pearson correlation coefficient. Returns `None` when either series has
/// zero variance or the lengths differ.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some((sxy / denominator).clamp(-1.0, 1.0))
}

/// Correlation between the daily total and daily failed transaction series.
pub fn failure_correlation(
    records: &[TransactionRecord],
) -> Result<CorrelationCoefficient, MetricsError> {
    let days = daily_counts(records);
    let totals: Vec<f64> = days.iter().map(|day| day.total as f64).collect();
    let failures: Vec<f64> = days.iter().map(|day| day.failed as f64).collect();

    if is_constant(&totals) {
        return Err(MetricsError::UndefinedCorrelation("daily total"));
    }
    if is_constant(&failures) {
        return Err(MetricsError::UndefinedCorrelation("daily failed"));
    }

    pearson(&totals, &failures)
        .map(|value| CorrelationCoefficient(round2(value)))
        .ok_or(MetricsError::UndefinedCorrelation("daily"))
}
