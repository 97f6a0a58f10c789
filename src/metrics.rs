use crate::calendar::{days_elapsed_in_year, days_remaining_in_year, each_day, year_length};
use crate::models::{ChartPoint, DailySeries, DerivedMetrics, GoalConfig, GoalMode, PaceYear};
use chrono::{Datelike, Duration, NaiveDate};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Safety bound on the backward streak walk.
pub const STREAK_LOOKBACK_DAYS: u32 = 365;

pub const CHART_DAYS: i64 = 7;

pub fn build_metrics_at(
    today: NaiveDate,
    series: &DailySeries,
    year_total_seconds: u64,
    config: &GoalConfig,
) -> DerivedMetrics {
    let config = config.sanitized();
    let days_remaining = days_remaining_in_year(today);
    let days_elapsed = days_elapsed_in_year(today);

    let ytd_hours = year_to_date_hours(year_total_seconds);
    let required = required_daily_hours(&config, ytd_hours, days_remaining);
    let streak = current_streak(series, config.streak_min_minutes, today);

    DerivedMetrics {
        year_to_date_hours: ytd_hours,
        today_hours: to_hours(series.seconds_on(today)),
        current_streak: streak,
        streak_average_hours: streak_average_hours(series, streak, config.streak_min_minutes, today),
        high_score_hours: high_score_hours(series),
        required_daily_hours: required,
        projection_or_deviation: projection_or_deviation(
            &config,
            ytd_hours,
            days_remaining,
            days_elapsed,
            pace_year_length(config.pace_year, today),
        ),
        hours_left_to_target: match config.mode {
            GoalMode::Total => Some(config.target_total_hours - ytd_hours),
            GoalMode::Daily => None,
        },
        days_remaining,
        days_elapsed,
        last_7_days: seven_day_chart(series, required, today),
    }
}

pub fn year_to_date_hours(total_seconds: u64) -> f64 {
    to_hours(total_seconds)
}

pub fn required_daily_hours(config: &GoalConfig, ytd_hours: f64, days_remaining: i64) -> f64 {
    match config.mode {
        GoalMode::Daily => config.daily_goal_hours,
        GoalMode::Total => {
            let remaining = (config.target_total_hours - ytd_hours).max(0.0);
            if days_remaining > 0 {
                remaining / days_remaining as f64
            } else {
                remaining
            }
        }
    }
}

pub fn current_streak(series: &DailySeries, threshold_minutes: u32, today: NaiveDate) -> u32 {
    let threshold = u64::from(threshold_minutes) * 60;
    streak_days(series, threshold, today)
        .take(STREAK_LOOKBACK_DAYS as usize)
        .take_while(|date| series.seconds_on(*date) >= threshold)
        .count() as u32
}

pub fn streak_average_hours(
    series: &DailySeries,
    streak_length: u32,
    threshold_minutes: u32,
    today: NaiveDate,
) -> f64 {
    if streak_length == 0 {
        return 0.0;
    }
    let threshold = u64::from(threshold_minutes) * 60;
    let total: u64 = streak_days(series, threshold, today)
        .take(streak_length as usize)
        .map(|date| series.seconds_on(date))
        .sum();
    to_hours(total) / f64::from(streak_length)
}

pub fn high_score_hours(series: &DailySeries) -> f64 {
    to_hours(series.max_seconds())
}

pub fn projection_or_deviation(
    config: &GoalConfig,
    ytd_hours: f64,
    days_remaining: i64,
    days_elapsed: i64,
    year_length_days: i64,
) -> f64 {
    match config.mode {
        GoalMode::Daily => ytd_hours + config.daily_goal_hours * days_remaining as f64,
        GoalMode::Total => {
            let per_day = config.target_total_hours / year_length_days.max(1) as f64;
            ytd_hours - per_day * days_elapsed as f64
        }
    }
}

pub fn pace_year_length(pace_year: PaceYear, today: NaiveDate) -> i64 {
    match pace_year {
        PaceYear::Calendar => year_length(today.year()),
        PaceYear::FixedLeap => 366,
    }
}

pub fn seven_day_chart(series: &DailySeries, required_hours: f64, today: NaiveDate) -> Vec<ChartPoint> {
    each_day(today - Duration::days(CHART_DAYS - 1), today)
        .into_iter()
        .map(|date| {
            let hours = to_hours(series.seconds_on(date));
            ChartPoint {
                date,
                weekday: date.format("%a").to_string(),
                hours,
                deviation: hours - required_hours,
            }
        })
        .collect()
}

/// Dates walked backward from the streak anchor: today if it already
/// qualifies, otherwise yesterday.
fn streak_days(series: &DailySeries, threshold: u64, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let anchor = if series.seconds_on(today) >= threshold {
        Some(today)
    } else {
        today.pred_opt()
    };
    std::iter::successors(anchor, |date| date.pred_opt())
}

fn to_hours(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series_ending(today: NaiveDate, newest_first: &[u64]) -> DailySeries {
        let mut series = DailySeries::new();
        for (offset, seconds) in newest_first.iter().enumerate() {
            series.insert(today - Duration::days(offset as i64), *seconds);
        }
        series
    }

    fn total(target: f64) -> GoalConfig {
        GoalConfig {
            mode: GoalMode::Total,
            target_total_hours: target,
            ..GoalConfig::default()
        }
    }

    fn daily(hours: f64) -> GoalConfig {
        GoalConfig {
            mode: GoalMode::Daily,
            daily_goal_hours: hours,
            ..GoalConfig::default()
        }
    }

    #[test]
    fn streak_anchors_on_yesterday_when_today_is_short() {
        let today = date(2025, 6, 15);
        let series = series_ending(today, &[0, 4000, 100]);
        assert_eq!(current_streak(&series, 60, today), 1);
    }

    #[test]
    fn streak_includes_today_when_it_qualifies() {
        let today = date(2025, 6, 15);
        let series = series_ending(today, &[3600, 3600, 3600, 0, 3600]);
        assert_eq!(current_streak(&series, 60, today), 3);
    }

    #[test]
    fn streak_is_zero_when_neither_today_nor_yesterday_qualifies() {
        let today = date(2025, 6, 15);
        let series = series_ending(today, &[30, 59, 3600, 3600]);
        assert_eq!(current_streak(&series, 1, today), 0);

        let qualifying_yesterday = series_ending(today, &[30, 60]);
        assert_eq!(current_streak(&qualifying_yesterday, 1, today), 1);
    }

    #[test]
    fn streak_treats_missing_days_as_zero() {
        let today = date(2025, 6, 15);
        let mut series = DailySeries::new();
        series.insert(today, 600);
        series.insert(today - Duration::days(2), 600);
        assert_eq!(current_streak(&series, 5, today), 1);
    }

    #[test]
    fn streak_grows_when_earlier_days_are_filled_in() {
        let today = date(2025, 6, 15);
        let mut series = series_ending(today, &[600, 600]);
        let before = current_streak(&series, 5, today);
        series.insert(today - Duration::days(2), 900);
        series.insert(today - Duration::days(3), 900);
        let after = current_streak(&series, 5, today);
        assert_eq!(before, 2);
        assert_eq!(after, 4);
    }

    #[test]
    fn streak_walk_stops_at_lookback_bound() {
        let today = date(2025, 12, 31);
        let series = DailySeries::new();
        // A zero-minute threshold lets every day qualify, including missing ones.
        assert_eq!(current_streak(&series, 0, today), STREAK_LOOKBACK_DAYS);
    }

    #[test]
    fn streak_crosses_year_boundary() {
        let today = date(2025, 1, 2);
        let series = series_ending(today, &[120, 120, 120, 0]);
        assert_eq!(current_streak(&series, 1, today), 3);
    }

    #[test]
    fn streak_average_sums_the_streak_window() {
        let today = date(2025, 6, 15);
        let series = series_ending(today, &[0, 7200, 3600, 10]);
        let streak = current_streak(&series, 1, today);
        assert_eq!(streak, 2);
        assert_eq!(streak_average_hours(&series, streak, 1, today), 1.5);
    }

    #[test]
    fn streak_average_of_empty_streak_is_zero() {
        let today = date(2025, 6, 15);
        let series = series_ending(today, &[7200]);
        assert_eq!(streak_average_hours(&series, 0, 1, today), 0.0);
    }

    #[test]
    fn high_score_uses_the_best_day() {
        let series = series_ending(date(2025, 1, 2), &[3600 * 5, 0]);
        assert_eq!(high_score_hours(&series), 5.0);
        assert_eq!(high_score_hours(&DailySeries::new()), 0.0);
    }

    #[test]
    fn required_hours_in_total_mode() {
        assert_eq!(required_daily_hours(&total(225.0), 100.0, 50), 2.5);
        assert_eq!(required_daily_hours(&total(225.0), 230.0, 50), 0.0);
        assert_eq!(required_daily_hours(&total(225.0), 225.0, 10), 0.0);
        assert_eq!(required_daily_hours(&total(225.0), 200.0, 0), 25.0);
    }

    #[test]
    fn required_hours_in_daily_mode_is_the_goal() {
        assert_eq!(required_daily_hours(&daily(2.0), 9999.0, 0), 2.0);
    }

    #[test]
    fn projection_in_daily_mode_is_linear() {
        assert_eq!(projection_or_deviation(&daily(2.0), 50.0, 30, 335, 365), 110.0);
    }

    #[test]
    fn deviation_in_total_mode_compares_against_pace() {
        // 73 of 365 days elapsed: a fifth of the year, so the pace line is at 73h.
        let deviation = projection_or_deviation(&total(365.0), 80.0, 292, 73, 365);
        assert!((deviation - 7.0).abs() < 1e-9);

        let behind = projection_or_deviation(&total(365.0), 60.0, 292, 73, 365);
        assert!(behind < 0.0);
    }

    #[test]
    fn pace_year_length_can_be_pinned() {
        let today = date(2025, 5, 1);
        assert_eq!(pace_year_length(PaceYear::Calendar, today), 365);
        assert_eq!(pace_year_length(PaceYear::FixedLeap, today), 366);
        assert_eq!(pace_year_length(PaceYear::Calendar, date(2024, 5, 1)), 366);
    }

    #[test]
    fn chart_has_seven_ordered_points_for_sparse_series() {
        let today = date(2025, 3, 2);
        let mut series = DailySeries::new();
        series.insert(date(2025, 2, 27), 3600 * 3);

        let chart = seven_day_chart(&series, 2.0, today);
        assert_eq!(chart.len(), 7);
        assert_eq!(chart.first().unwrap().date, date(2025, 2, 24));
        assert_eq!(chart.last().unwrap().date, today);
        assert!(chart.windows(2).all(|pair| pair[0].date < pair[1].date));

        let point = chart.iter().find(|p| p.date == date(2025, 2, 27)).unwrap();
        assert_eq!(point.hours, 3.0);
        assert_eq!(point.deviation, 1.0);
        assert_eq!(point.weekday, "Thu");

        let empty = chart.iter().find(|p| p.date == today).unwrap();
        assert_eq!(empty.deviation, -2.0);
    }

    #[test]
    fn chart_for_empty_series_still_has_seven_points() {
        let chart = seven_day_chart(&DailySeries::new(), 0.0, date(2025, 1, 1));
        assert_eq!(chart.len(), 7);
        assert!(chart.iter().all(|p| p.hours == 0.0));
    }

    #[test]
    fn build_metrics_uses_authoritative_total() {
        let today = date(2025, 12, 21);
        let series = series_ending(today, &[3600, 3600]);
        let metrics = build_metrics_at(today, &series, 100 * 3600, &total(150.0));

        assert_eq!(metrics.year_to_date_hours, 100.0);
        assert_eq!(metrics.days_remaining, 10);
        assert_eq!(metrics.required_daily_hours, 5.0);
        assert_eq!(metrics.hours_left_to_target, Some(50.0));
        assert_eq!(metrics.current_streak, 2);
        assert_eq!(metrics.today_hours, 1.0);
        assert_eq!(metrics.last_7_days.len(), 7);
    }

    #[test]
    fn build_metrics_survives_invalid_config() {
        let today = date(2025, 6, 1);
        let config = GoalConfig {
            mode: GoalMode::Daily,
            daily_goal_hours: f64::NAN,
            ..GoalConfig::default()
        };
        let metrics = build_metrics_at(today, &DailySeries::new(), 0, &config);
        assert_eq!(metrics.required_daily_hours, 0.0);
        assert!(metrics.projection_or_deviation.is_finite());
        assert!(metrics.last_7_days.iter().all(|p| p.deviation.is_finite()));
        assert_eq!(metrics.hours_left_to_target, None);
    }
}
