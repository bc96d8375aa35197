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

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use ledger_metrics::{
    caching::cache_storage_from_uri, db::AnyLedger, Granularity, MetricsService,
    MetricsServiceConfig,
};

/// Arguments of the metrics report.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// Ledger DB connection string.
    #[clap(long, env = "DATABASE_URL")]
    db: String,
    /// Bucket size: "day", "week" or "month".
    #[clap(short, long, env, default_value = "day")]
    granularity: Granularity,
    /// First calendar date of the range (YYYY-MM-DD), inclusive.
    #[clap(long, env)]
    start_date: NaiveDate,
    /// Last calendar date of the range (YYYY-MM-DD), inclusive. Defaults to today (UTC).
    #[clap(long, env)]
    end_date: Option<NaiveDate>,
    /// Timeout in seconds for a single ledger fetch.
    #[clap(long, env, default_value = "30")]
    fetch_timeout: u64,
    /// Optional cache storage URI (e.g., memory:// or file:///path/to/cache).
    #[clap(long, env)]
    cache_uri: Option<String>,
    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = MainArgs::parse();

    // stdout carries the report, so logs go to stderr
    if args.log_json {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let end_date = args.end_date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let config = MetricsServiceConfig { fetch_timeout: Duration::from_secs(args.fetch_timeout) };

    let ledger = AnyLedger::new(&args.db).await.context("Failed to connect to the ledger")?;
    let mut service = MetricsService::new(Arc::new(ledger), config);

    if let Some(cache_uri) = &args.cache_uri {
        tracing::info!("Using result cache at: {}", cache_uri);
        service = service.with_cache(cache_storage_from_uri(cache_uri)?);
    }

    tracing::info!(
        "Computing {} metrics from {} to {}",
        args.granularity,
        args.start_date,
        end_date
    );

    let report = service.network_report(args.granularity, args.start_date, end_date).await?;
    if let Some(peak) = report.peak_activity.value() {
        tracing::info!("Peak activity: {}", peak);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
