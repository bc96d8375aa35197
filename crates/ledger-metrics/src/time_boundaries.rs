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

//! Calendar bucketing for aggregation periods.
//!
//! Buckets are calendar aligned (day, ISO week starting Monday, calendar month)
//! and are computed on the record's own calendar date. No timezone conversion
//! takes place.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

pub const SECONDS_PER_DAY: u64 = 86400;

/// Bucket size selector for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            _ => Err(format!("Invalid granularity: {}. Use 'day', 'week' or 'month'", s)),
        }
    }
}

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, MetricsError> {
        if start > end {
            return Err(MetricsError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering a single calendar day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant after the range, i.e. midnight of the day following `end`.
    pub fn end_exclusive(&self) -> NaiveDateTime {
        get_next_day(self.end).and_time(chrono::NaiveTime::MIN)
    }

    /// Inclusion is date-level: any time of day on `end` is inside the range.
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

/// A half-open interval `[start, start + granularity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub granularity: Granularity,
}

impl Bucket {
    pub fn containing(timestamp: &NaiveDateTime, granularity: Granularity) -> Self {
        Self { start: truncate(timestamp, granularity), granularity }
    }

    /// Exclusive end of the bucket.
    pub fn end(&self) -> NaiveDate {
        next_bucket_start(self.start, self.granularity)
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date < self.end()
    }
}

/// Returns the start of the bucket containing `timestamp`.
pub fn truncate(timestamp: &NaiveDateTime, granularity: Granularity) -> NaiveDate {
    truncate_date(timestamp.date(), granularity)
}

pub fn truncate_date(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => get_week_start(date),
        Granularity::Month => get_month_start(date),
    }
}

/// Returns the Monday on or before `date`.
/// Uses ISO 8601 standard where Monday is the first day of the week
pub fn get_week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday();
    date - Days::new(days_from_monday as u64)
}

/// Returns the 1st of the calendar month containing `date`
pub fn get_month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

pub fn get_next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

pub fn get_next_week(date: NaiveDate) -> NaiveDate {
    get_week_start(date).checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX)
}

pub fn get_next_month(date: NaiveDate) -> NaiveDate {
    get_month_start(date).checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX)
}

/// Start of the bucket following the one containing `date`.
pub fn next_bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => get_next_day(date),
        Granularity::Week => get_next_week(date),
        Granularity::Month => get_next_month(date),
    }
}

/// Returns an iterator over the buckets touching `range`.
/// Each iteration yields (bucket_start, bucket_end) where bucket_end is the start of the
/// next bucket.
pub fn iter_buckets(
    range: &DateRange,
    granularity: Granularity,
) -> impl Iterator<Item = (NaiveDate, NaiveDate)> {
    let first = truncate_date(range.start(), granularity);
    let last = truncate_date(range.end(), granularity);

    // Months and clamped dates have variable lengths, so walk with next_bucket_start
    let mut periods = Vec::new();
    let mut bucket = first;
    while bucket <= last {
        let next = next_bucket_start(bucket, granularity);
        periods.push((bucket, next));
        if next <= bucket {
            break;
        }
        bucket = next;
    }

    periods.into_iter()
}
