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

use chrono::NaiveDate;
use thiserror::Error;

use crate::{db::LedgerError, time_boundaries::Bucket};

/// Failures surfaced by the aggregation and metric calculators.
///
/// Undefined ratios and correlations are always reported through this type.
/// No calculator substitutes a default numeric value.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid range: start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No transactions between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("Correlation undefined: {0} series has zero variance")]
    UndefinedCorrelation(&'static str),

    #[error("Percentage undefined: bucket starting {} has zero transactions", .0.start)]
    DivisionUndefined(Bucket),

    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),
}
