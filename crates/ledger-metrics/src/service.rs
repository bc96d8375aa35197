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

use std::{future::Future, sync::Arc, time::Duration};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    activity::{self, ActivityCell, ActivityHeatmap, HourTotal, PeakActivity, WeekdayTotal},
    aggregation::{self, BucketShare, BucketedCount, SuccessTotals},
    caching::{CacheKey, CacheStorage},
    db::{FilterSet, LedgerError, LedgerObj, TransactionRecord},
    error::MetricsError,
    metrics::{self, CorrelationCoefficient, SuccessRate, ThroughputSample},
    time_boundaries::{DateRange, Granularity},
};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct MetricsServiceConfig {
    /// Upper bound for a single ledger fetch.
    pub fetch_timeout: Duration,
}

impl Default for MetricsServiceConfig {
    fn default() -> Self {
        Self { fetch_timeout: DEFAULT_FETCH_TIMEOUT }
    }
}

/// Activity matrix together with its summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub matrix: Vec<ActivityCell>,
    pub hourly: Vec<HourTotal>,
    pub weekdays: Vec<WeekdayTotal>,
    pub heatmap: ActivityHeatmap,
}

impl ActivityProfile {
    fn from_matrix(matrix: Vec<ActivityCell>) -> Self {
        Self {
            hourly: activity::hourly_totals(&matrix),
            weekdays: activity::weekday_totals(&matrix),
            heatmap: activity::heatmap(&matrix),
            matrix,
        }
    }
}

/// Result of a single metric inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome<T> {
    Available { value: T },
    Unavailable { reason: String },
}

impl<T> MetricOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            MetricOutcome::Available { value } => Some(value),
            MetricOutcome::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            MetricOutcome::Available { .. } => None,
            MetricOutcome::Unavailable { reason } => Some(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricOutcome::Available { .. })
    }
}

impl<T> From<Result<T, MetricsError>> for MetricOutcome<T> {
    fn from(result: Result<T, MetricsError>) -> Self {
        match result {
            Ok(value) => MetricOutcome::Available { value },
            Err(err) => MetricOutcome::Unavailable { reason: err.to_string() },
        }
    }
}

/// Every metric for one `(granularity, start, end)` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub granularity: Granularity,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub success_rate: MetricOutcome<SuccessRate>,
    pub total_transactions: MetricOutcome<u64>,
    pub buckets: MetricOutcome<Vec<BucketedCount>>,
    pub bucket_shares: MetricOutcome<Vec<BucketShare>>,
    pub totals_by_success: MetricOutcome<SuccessTotals>,
    pub throughput: MetricOutcome<Vec<ThroughputSample>>,
    pub failure_correlation: MetricOutcome<CorrelationCoefficient>,
    pub activity: MetricOutcome<ActivityProfile>,
    pub peak_activity: MetricOutcome<PeakActivity>,
}

impl NetworkReport {
    /// Derives every field from a single set of fetched records.
    fn from_records(
        granularity: Granularity,
        range: &DateRange,
        records: &[TransactionRecord],
    ) -> Self {
        let buckets = aggregation::aggregate(records, granularity);
        let bucket_shares = aggregation::percentage_breakdown(&buckets);
        let totals_by_success = aggregation::totals_by_success(&buckets);
        let matrix = activity::activity_matrix(records);
        let peak_activity = activity::peak(&matrix)
            .ok_or(MetricsError::EmptyRange { start: range.start(), end: range.end() });

        Self {
            granularity,
            start_date: range.start(),
            end_date: range.end(),
            success_rate: metrics::success_rate(records, range).into(),
            total_transactions: MetricOutcome::Available {
                value: metrics::total_transactions(records),
            },
            buckets: MetricOutcome::Available { value: buckets },
            bucket_shares: bucket_shares.into(),
            totals_by_success: MetricOutcome::Available { value: totals_by_success },
            throughput: MetricOutcome::Available {
                value: metrics::throughput(records, granularity),
            },
            failure_correlation: metrics::failure_correlation(records).into(),
            activity: MetricOutcome::Available { value: ActivityProfile::from_matrix(matrix) },
            peak_activity: peak_activity.into(),
        }
    }

    /// A report whose metrics all failed with the same error.
    fn unavailable(granularity: Granularity, range: &DateRange, err: &MetricsError) -> Self {
        let reason = err.to_string();
        Self {
            granularity,
            start_date: range.start(),
            end_date: range.end(),
            success_rate: MetricOutcome::Unavailable { reason: reason.clone() },
            total_transactions: MetricOutcome::Unavailable { reason: reason.clone() },
            buckets: MetricOutcome::Unavailable { reason: reason.clone() },
            bucket_shares: MetricOutcome::Unavailable { reason: reason.clone() },
            totals_by_success: MetricOutcome::Unavailable { reason: reason.clone() },
            throughput: MetricOutcome::Unavailable { reason: reason.clone() },
            failure_correlation: MetricOutcome::Unavailable { reason: reason.clone() },
            activity: MetricOutcome::Unavailable { reason: reason.clone() },
            peak_activity: MetricOutcome::Unavailable { reason },
        }
    }

    /// Names and reasons of the metrics that could not be computed.
    pub fn unavailable_metrics(&self) -> Vec<(&'static str, &str)> {
        [
            ("success_rate", self.success_rate.reason()),
            ("total_transactions", self.total_transactions.reason()),
            ("buckets", self.buckets.reason()),
            ("bucket_shares", self.bucket_shares.reason()),
            ("totals_by_success", self.totals_by_success.reason()),
            ("throughput", self.throughput.reason()),
            ("failure_correlation", self.failure_correlation.reason()),
            ("activity", self.activity.reason()),
            ("peak_activity", self.peak_activity.reason()),
        ]
        .into_iter()
        .filter_map(|(name, reason)| reason.map(|reason| (name, reason)))
        .collect()
    }
}

/// Runs the metric calculators against an injected ledger.
///
/// Each operation fetches exactly the slice it needs. Results are looked up in
/// and written to the optional cache; a cache fault never fails an operation.
#[derive(Clone)]
pub struct MetricsService {
    ledger: LedgerObj,
    cache: Option<Arc<dyn CacheStorage>>,
    config: MetricsServiceConfig,
}

impl MetricsService {
    pub fn new(ledger: LedgerObj, config: MetricsServiceConfig) -> Self {
        Self { ledger, cache: None, config }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStorage>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn fetch(
        &self,
        range: &DateRange,
        filters: FilterSet,
    ) -> Result<Vec<TransactionRecord>, MetricsError> {
        let timeout = self.config.fetch_timeout;
        match tokio::time::timeout(timeout, self.ledger.fetch(range, &filters)).await {
            Ok(records) => Ok(records?),
            Err(_) => {
                tracing::warn!(
                    "Ledger fetch for {} to {} timed out after {:?}",
                    range.start(),
                    range.end(),
                    timeout
                );
                Err(LedgerError::Timeout(timeout).into())
            }
        }
    }

    async fn cached<T, F, Fut>(&self, key: CacheKey, compute: F) -> Result<T, MetricsError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MetricsError>>,
    {
        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                    Ok(value) => {
                        tracing::debug!(
                            "Cache hit for {} ({} to {})",
                            key.operation,
                            key.start,
                            key.end
                        );
                        return Ok(value);
                    }
                    Err(err) => tracing::warn!(
                        "Discarding unreadable cache entry for {}: {}",
                        key.operation,
                        err
                    ),
                },
                Ok(None) => {}
                Err(err) => tracing::warn!("Cache lookup for {} failed: {}", key.operation, err),
            }
        }

        let value = compute().await?;

        if let Some(cache) = &self.cache {
            match serde_json::to_vec(&value) {
                Ok(bytes) => {
                    if let Err(err) = cache.put(&key, &bytes).await {
                        tracing::warn!("Failed to cache {}: {}", key.operation, err);
                    }
                }
                Err(err) => {
                    tracing::warn!("Failed to serialize {} for caching: {}", key.operation, err)
                }
            }
        }

        Ok(value)
    }

    pub async fn aggregate(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BucketedCount>, MetricsError> {
        let range = DateRange::new(start, end)?;
        let key = CacheKey::new("aggregate", start, end).with_granularity(granularity);
        self.cached(key, move || async move {
            let records = self.fetch(&range, FilterSet::all()).await?;
            Ok(aggregation::aggregate(&records, granularity))
        })
        .await
    }

    pub async fn percentage_breakdown(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BucketShare>, MetricsError> {
        let buckets = self.aggregate(granularity, start, end).await?;
        aggregation::percentage_breakdown(&buckets)
    }

    pub async fn totals_by_success(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SuccessTotals, MetricsError> {
        let buckets = self.aggregate(granularity, start, end).await?;
        Ok(aggregation::totals_by_success(&buckets))
    }

    pub async fn success_rate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SuccessRate, MetricsError> {
        let range = DateRange::new(start, end)?;
        self.cached(CacheKey::new("success_rate", start, end), move || async move {
            let records = self.fetch(&range, FilterSet::all()).await?;
            metrics::success_rate(&records, &range)
        })
        .await
    }

    pub async fn total_transactions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, MetricsError> {
        let range = DateRange::new(start, end)?;
        self.cached(CacheKey::new("total_transactions", start, end), move || async move {
            let records = self.fetch(&range, FilterSet::all()).await?;
            Ok(metrics::total_transactions(&records))
        })
        .await
    }

    pub async fn throughput(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ThroughputSample>, MetricsError> {
        let range = DateRange::new(start, end)?;
        let filters = FilterSet::succeeded_only();
        let key = CacheKey::new("throughput", start, end)
            .with_granularity(granularity)
            .with_filters(filters);
        self.cached(key, move || async move {
            let records = self.fetch(&range, filters).await?;
            Ok(metrics::throughput(&records, granularity))
        })
        .await
    }

    pub async fn failure_correlation(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorrelationCoefficient, MetricsError> {
        let range = DateRange::new(start, end)?;
        self.cached(CacheKey::new("failure_correlation", start, end), move || async move {
            let records = self.fetch(&range, FilterSet::all()).await?;
            metrics::failure_correlation(&records)
        })
        .await
    }

    pub async fn activity_matrix(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityCell>, MetricsError> {
        let range = DateRange::new(start, end)?;
        self.cached(CacheKey::new("activity_matrix", start, end), move || async move {
            let records = self.fetch(&range, FilterSet::all()).await?;
            Ok(activity::activity_matrix(&records))
        })
        .await
    }

    pub async fn activity_profile(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ActivityProfile, MetricsError> {
        let matrix = self.activity_matrix(start, end).await?;
        Ok(ActivityProfile::from_matrix(matrix))
    }

    pub async fn peak_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeakActivity, MetricsError> {
        let matrix = self.activity_matrix(start, end).await?;
        activity::peak(&matrix).ok_or(MetricsError::EmptyRange { start, end })
    }

    /// Computes every metric from one ledger snapshot.
    ///
    /// The range is fetched once and all fields are derived from those records,
    /// so bucket counts, shares and totals always agree. A failing metric is
    /// reported in its own field; a failed fetch marks every field unavailable.
    pub async fn network_report(
        &self,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NetworkReport, MetricsError> {
        let range = DateRange::new(start, end)?;
        let started = std::time::Instant::now();

        tracing::debug!("Computing {} report from {} to {}", granularity, start, end);

        let key = CacheKey::new("network_report", start, end).with_granularity(granularity);
        let computed = self
            .cached(key, move || async move {
                let records = self.fetch(&range, FilterSet::all()).await?;
                Ok(NetworkReport::from_records(granularity, &range, &records))
            })
            .await;

        let report = match computed {
            Ok(report) => report,
            Err(err) => NetworkReport::unavailable(granularity, &range, &err),
        };

        for (name, reason) in report.unavailable_metrics() {
            tracing::warn!("{} not available for {} to {}: {}", name, start, end, reason);
        }

        tracing::info!("network_report completed in {:?}", started.elapsed());
        Ok(report)
    }
}
