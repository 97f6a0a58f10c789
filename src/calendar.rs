use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolves "today" in a fixed reference timezone instead of process-local time.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    tz: Tz,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn today(&self) -> NaiveDate {
        today_in(self.tz, Utc::now())
    }
}

pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

pub fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

pub fn year_length(year: i32) -> i64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Whole days after `today` up to and including Dec 31.
pub fn days_remaining_in_year(today: NaiveDate) -> i64 {
    (year_end(today) - today).num_days()
}

/// Days from Jan 1 through `today`, both inclusive.
pub fn days_elapsed_in_year(today: NaiveDate) -> i64 {
    (today - year_start(today)).num_days() + 1
}

/// Every date in `[start, end]`, ascending. Empty when `end < start`.
pub fn each_day(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}

/// The UTC instant at which `date` begins in `tz`.
///
/// When local midnight falls into a DST gap the first valid instant after it is used.
pub fn local_day_start(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }
    (1..=24)
        .map(|hours| midnight + Duration::hours(hours))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Half-open `[start of first, start of day after last)` in ISO-8601, as the upstream expects.
pub fn local_range_iso(tz: Tz, first: NaiveDate, last: NaiveDate) -> (String, String) {
    let end = last.succ_opt().unwrap_or(last);
    (
        iso_instant(local_day_start(tz, first)),
        iso_instant(local_day_start(tz, end)),
    )
}

fn iso_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
