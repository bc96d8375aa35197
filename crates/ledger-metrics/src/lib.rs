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

//! Time-windowed analytics over a ledger of transaction events.
//!
//! The calculators in [aggregation], [metrics] and [activity] are pure
//! functions over fetched records. [service::MetricsService] binds them to an
//! injected [db::LedgerQuery] and an optional [caching::CacheStorage].

pub mod activity;
pub mod aggregation;
pub mod caching;
pub mod db;
pub mod error;
pub mod metrics;
pub mod service;
pub mod time_boundaries;

pub use error::MetricsError;
pub use service::{MetricOutcome, MetricsService, MetricsServiceConfig, NetworkReport};
pub use time_boundaries::{Bucket, DateRange, Granularity};
