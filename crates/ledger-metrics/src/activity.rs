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

//! Hour-of-day by day-of-week activity profile.
//!
//! Weeks are ordered Monday first. That order is also the tie-break used when
//! several cells share the peak count.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashSet},
    fmt,
};

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::db::TransactionRecord;

const HOURS_PER_DAY: usize = 24;
const DAYS_PER_WEEK: usize = 7;

/// Weekdays in the fixed Monday-first order.
pub const WEEK_ORDER: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCell {
    pub hour: u32,
    pub day_of_week: Weekday,
    pub count: u64,
}

impl ActivityCell {
    fn order_key(&self) -> (u32, u32) {
        (self.day_of_week.num_days_from_monday(), self.hour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakActivity {
    pub hour: u32,
    pub day_of_week: Weekday,
    pub count: u64,
}

impl fmt::Display for PeakActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Hour {} ({} TXs)", day_label(self.day_of_week), self.hour, self.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourTotal {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayTotal {
    pub day_of_week: Weekday,
    pub count: u64,
}

/// Dense activity grid indexed by `[weekday from Monday][hour]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHeatmap {
    pub counts: [[u64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

/// Label of a weekday as `"<n> - <Name>"` with Monday as 1 and Sunday as 7.
pub fn day_label(day: Weekday) -> String {
    let name = match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    format!("{} - {}", day.number_from_monday(), name)
}

/// Distinct transaction count per `(weekday, hour)`, sorted Monday first, then by hour.
/// Cells without transactions are omitted.
pub fn activity_matrix(records: &[TransactionRecord]) -> Vec<ActivityCell> {
    let mut cells: BTreeMap<(u32, u32), (Weekday, HashSet<&str>)> = BTreeMap::new();
    for record in records {
        let day = record.timestamp.weekday();
        let hour = record.timestamp.hour();
        cells
            .entry((day.num_days_from_monday(), hour))
            .or_insert_with(|| (day, HashSet::new()))
            .1
            .insert(record.id.as_str());
    }

    cells
        .into_iter()
        .map(|((_, hour), (day_of_week, ids))| ActivityCell {
            hour,
            day_of_week,
            count: ids.len() as u64,
        })
        .collect()
}

/// The cell with the highest count. Ties go to the earliest weekday, then the
/// earliest hour. Returns `None` for an empty matrix.
pub fn peak(matrix: &[ActivityCell]) -> Option<PeakActivity> {
    matrix.iter().min_by_key(|cell| (Reverse(cell.count), cell.order_key())).map(|cell| {
        PeakActivity { hour: cell.hour, day_of_week: cell.day_of_week, count: cell.count }
    })
}

/// Totals per hour of day, one row for each of the 24 hours.
pub fn hourly_totals(matrix: &[ActivityCell]) -> Vec<HourTotal> {
    let mut totals = [0u64; HOURS_PER_DAY];
    for cell in matrix {
        totals[cell.hour as usize % HOURS_PER_DAY] += cell.count;
    }
    totals.iter().enumerate().map(|(hour, &count)| HourTotal { hour: hour as u32, count }).collect()
}

/// Totals per weekday, Monday first.
pub fn weekday_totals(matrix: &[ActivityCell]) -> Vec<WeekdayTotal> {
    let mut totals = [0u64; DAYS_PER_WEEK];
    for cell in matrix {
        totals[cell.day_of_week.num_days_from_monday() as usize] += cell.count;
    }
    WEEK_ORDER
        .iter()
        .zip(totals)
        .map(|(&day_of_week, count)| WeekdayTotal { day_of_week, count })
        .collect()
}

pub fn heatmap(matrix: &[ActivityCell]) -> ActivityHeatmap {
    let mut counts = [[0u64; HOURS_PER_DAY]; DAYS_PER_WEEK];
    for cell in matrix {
        counts[cell.day_of_week.num_days_from_monday() as usize]
            [cell.hour as usize % HOURS_PER_DAY] += cell.count;
    }
    ActivityHeatmap { counts }
}
