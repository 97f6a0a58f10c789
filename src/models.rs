use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySeconds {
    pub date: NaiveDate,
    pub total_seconds: u64,
}

/// Seconds of activity per local calendar day, one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeries {
    days: BTreeMap<NaiveDate, u64>,
}

impl DailySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds recorded on `date`; a missing date counts as no activity.
    pub fn seconds_on(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn insert(&mut self, date: NaiveDate, total_seconds: u64) {
        self.days.insert(date, total_seconds);
    }

    /// Overwrites (or inserts) today's entry with the realtime value.
    /// `None` leaves the batch value untouched.
    pub fn reconcile_today(&mut self, today: Option<DaySeconds>) {
        if let Some(snapshot) = today {
            self.days.insert(snapshot.date, snapshot.total_seconds);
        }
    }

    pub fn max_seconds(&self) -> u64 {
        self.days.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = DaySeconds> + '_ {
        self.days.iter().map(|(date, seconds)| DaySeconds {
            date: *date,
            total_seconds: *seconds,
        })
    }
}

impl FromIterator<DaySeconds> for DailySeries {
    fn from_iter<I: IntoIterator<Item = DaySeconds>>(iter: I) -> Self {
        let mut series = DailySeries::new();
        for day in iter {
            series.insert(day.date, day.total_seconds);
        }
        series
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalMode {
    Daily,
    Total,
}

impl FromStr for GoalMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(GoalMode::Daily),
            "total" => Ok(GoalMode::Total),
            other => Err(format!("goal mode must be 'daily' or 'total', got '{other}'")),
        }
    }
}

impl fmt::Display for GoalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalMode::Daily => f.write_str("daily"),
            GoalMode::Total => f.write_str("total"),
        }
    }
}

/// Year length used for the linear pace line in `total` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaceYear {
    /// 365 or 366 depending on the actual year.
    #[default]
    Calendar,
    /// Always 366, matching the numbers of the older dashboard.
    FixedLeap,
}

impl FromStr for PaceYear {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calendar" => Ok(PaceYear::Calendar),
            "fixed-leap" | "366" => Ok(PaceYear::FixedLeap),
            other => Err(format!("pace year must be 'calendar' or 'fixed-leap', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub mode: GoalMode,
    pub daily_goal_hours: f64,
    pub target_total_hours: f64,
    pub streak_min_minutes: u32,
    #[serde(default)]
    pub pace_year: PaceYear,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            mode: GoalMode::Total,
            daily_goal_hours: 1.0,
            target_total_hours: 225.0,
            streak_min_minutes: 1,
            pace_year: PaceYear::Calendar,
        }
    }
}

impl GoalConfig {
    /// Rejects values that cannot be shown as metrics.
    pub fn validate(&self) -> Result<(), String> {
        check_hours("daily_goal_hours", self.daily_goal_hours)?;
        check_hours("target_total_hours", self.target_total_hours)?;
        Ok(())
    }

    /// Copy with every non-finite or negative hour value replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            daily_goal_hours: non_negative(self.daily_goal_hours),
            target_total_hours: non_negative(self.target_total_hours),
            ..*self
        }
    }

    pub fn apply(&mut self, update: &GoalConfigUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(hours) = update.daily_goal_hours {
            self.daily_goal_hours = hours;
        }
        if let Some(hours) = update.target_total_hours {
            self.target_total_hours = hours;
        }
        if let Some(minutes) = update.streak_min_minutes {
            self.streak_min_minutes = minutes;
        }
        if let Some(pace_year) = update.pace_year {
            self.pace_year = pace_year;
        }
    }
}

fn check_hours(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field} must be a number"));
    }
    if value <= 0.0 {
        return Err(format!("{field} must be greater than zero"));
    }
    Ok(())
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalConfigUpdate {
    pub mode: Option<GoalMode>,
    pub daily_goal_hours: Option<f64>,
    pub target_total_hours: Option<f64>,
    pub streak_min_minutes: Option<u32>,
    pub pace_year: Option<PaceYear>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedDuration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_seconds: f64,
}

/// Aggregate for one upstream query range, under the response's `data` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    #[serde(default)]
    pub total_seconds: f64,
    #[serde(default)]
    pub languages: Vec<NamedDuration>,
    #[serde(default)]
    pub editors: Vec<NamedDuration>,
    #[serde(default)]
    pub operating_systems: Vec<NamedDuration>,
}

impl DayStats {
    pub fn whole_seconds(&self) -> u64 {
        if self.total_seconds.is_finite() && self.total_seconds > 0.0 {
            self.total_seconds as u64
        } else {
            0
        }
    }
}

/// Everything fetched for one user in one load. Replaced whole, never edited.
#[derive(Debug, Clone)]
pub struct SeriesSnapshot {
    pub username: String,
    pub fetched_on: NaiveDate,
    pub series: DailySeries,
    pub year_total_seconds: u64,
    pub today: Option<DayStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weekday: String,
    pub hours: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub year_to_date_hours: f64,
    pub today_hours: f64,
    pub current_streak: u32,
    pub streak_average_hours: f64,
    pub high_score_hours: f64,
    pub required_daily_hours: f64,
    pub projection_or_deviation: f64,
    pub hours_left_to_target: Option<f64>,
    pub days_remaining: i64,
    pub days_elapsed: i64,
    pub last_7_days: Vec<ChartPoint>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub username: String,
    pub today: NaiveDate,
    pub fetched_on: NaiveDate,
    pub timezone: String,
    pub goal: GoalConfig,
    pub metrics: DerivedMetrics,
    pub top_languages: Vec<NamedDuration>,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub username: String,
}
