//! Client for the upstream coding-stats API.
//!
//! Every public fetch degrades to a safe default (zero, empty, `None`) and
//! logs the reason; no upstream failure reaches the metric layer.

use crate::calendar::{each_day, local_range_iso, year_start};
use crate::models::{DailySeries, DaySeconds, DayStats, SeriesSnapshot};
use chrono::NaiveDate;
use chrono_tz::Tz;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(StatusCode),

    #[error("upstream base url cannot take path segments: {0}")]
    BaseUrl(String),
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    #[serde(default)]
    data: Option<DayStats>,
}

#[derive(Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    base_url: Url,
    tz: Tz,
    batch_size: usize,
}

impl StatsClient {
    pub fn new(base_url: Url, tz: Tz, batch_size: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            tz,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches series, year total and today's snapshot concurrently, then
    /// folds the realtime value into the series.
    pub async fn load_snapshot(&self, user: &str, today: NaiveDate) -> SeriesSnapshot {
        let start = year_start(today);
        let (series, year_total_seconds, realtime) = tokio::join!(
            self.fetch_daily_series(user, start, today),
            self.fetch_authoritative_total(user, start, today),
            self.fetch_realtime_today(user, today),
        );

        let realtime_loaded = realtime.is_some();
        let snapshot = assemble_snapshot(user, today, series, year_total_seconds, realtime);

        info!(
            user,
            days = snapshot.series.len(),
            year_total_seconds,
            realtime = realtime_loaded,
            "loaded coding stats"
        );
        snapshot
    }

    /// One request per local day in `[start, today]`, issued in fixed-size
    /// concurrent batches. Days that fail stay at zero.
    pub async fn fetch_daily_series(&self, user: &str, start: NaiveDate, today: NaiveDate) -> DailySeries {
        let days = each_day(start, today);
        let mut series = zeroed_series(&days);

        for batch in days.chunks(self.batch_size) {
            let mut join_set = JoinSet::new();
            for date in batch.iter().copied() {
                let client = self.clone();
                let user = user.to_string();
                join_set.spawn(async move {
                    let seconds = match client.fetch_range(&user, date, date).await {
                        Ok(Some(stats)) => stats.whole_seconds(),
                        Ok(None) => 0,
                        Err(err) => {
                            warn!(user = %user, %date, "day fetch failed: {err}");
                            0
                        }
                    };
                    (date, seconds)
                });
            }

            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok((date, seconds)) => series.insert(date, seconds),
                    Err(err) => warn!("day fetch task aborted: {err}"),
                }
            }
        }

        series
    }

    /// Aggregate seconds from Jan 1 through the end of `today`.
    pub async fn fetch_authoritative_total(&self, user: &str, start: NaiveDate, today: NaiveDate) -> u64 {
        match self.fetch_range(user, start, today).await {
            Ok(stats) => stats.map(|stats| stats.whole_seconds()).unwrap_or(0),
            Err(err) => {
                warn!(user, "failed to fetch yearly total: {err}");
                0
            }
        }
    }

    pub async fn fetch_realtime_today(&self, user: &str, today: NaiveDate) -> Option<DayStats> {
        match self.fetch_range(user, today, today).await {
            Ok(stats) => Some(stats.unwrap_or_default()),
            Err(err) => {
                warn!(user, "failed to fetch today's stats: {err}");
                None
            }
        }
    }

    async fn fetch_range(&self, user: &str, first: NaiveDate, last: NaiveDate) -> Result<Option<DayStats>, FetchError> {
        let (start_date, end_date) = local_range_iso(self.tz, first, last);
        let response = self
            .http
            .get(self.stats_url(user)?)
            .query(&[("start_date", start_date), ("end_date", end_date)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let envelope: StatsEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    fn stats_url(&self, user: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(user)
            .push("stats");
        Ok(url)
    }
}

/// Builds the snapshot for one load. Today's realtime value, when it
/// arrived, replaces whatever the per-day batch recorded for today.
fn assemble_snapshot(
    user: &str,
    today: NaiveDate,
    mut series: DailySeries,
    year_total_seconds: u64,
    realtime: Option<DayStats>,
) -> SeriesSnapshot {
    series.reconcile_today(realtime.as_ref().map(|stats| DaySeconds {
        date: today,
        total_seconds: stats.whole_seconds(),
    }));

    SeriesSnapshot {
        username: user.to_string(),
        fetched_on: today,
        series,
        year_total_seconds,
        today: realtime,
    }
}

/// A series with every requested day present at zero.
fn zeroed_series(days: &[NaiveDate]) -> DailySeries {
    days.iter()
        .map(|date| DaySeconds { date: *date, total_seconds: 0 })
        .collect()
}
