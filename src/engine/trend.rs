use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::sleep_log::SleepLog;

/// One calendar day in a trend window. Days without a log keep the date and
/// carry no score or minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub score: Option<i32>,
    pub total_minutes: Option<i32>,
}

/// Fixed-length calendar window ending at `reference_date`, oldest first.
/// The result always has exactly `n` slots no matter how sparse `logs` is;
/// alignment is by date, not by insertion order, so the same inputs always
/// produce the same window.
pub fn build_window(logs: &[SleepLog], n: usize, reference_date: NaiveDate) -> Vec<DaySlot> {
    let by_date: HashMap<NaiveDate, &SleepLog> = logs.iter().map(|l| (l.date, l)).collect();

    (0..n)
        .map(|i| {
            let date = reference_date - Duration::days((n - 1 - i) as i64);
            match by_date.get(&date) {
                Some(log) => DaySlot {
                    date,
                    score: Some(log.score),
                    total_minutes: Some(log.total_minutes),
                },
                None => DaySlot {
                    date,
                    score: None,
                    total_minutes: None,
                },
            }
        })
        .collect()
}

/// Rounded mean score, 0 when no logs are present.
pub fn average_score(logs: &[SleepLog]) -> i32 {
    if logs.is_empty() {
        return 0;
    }
    let sum: i64 = logs.iter().map(|l| i64::from(l.score)).sum();
    (sum as f64 / logs.len() as f64).round() as i32
}

/// Rounded mean sleep duration in minutes. An empty history defaults to 480
/// (8h), a product policy rather than a computed fallback.
pub fn average_minutes(logs: &[SleepLog]) -> i32 {
    if logs.is_empty() {
        return 480;
    }
    let sum: i64 = logs.iter().map(|l| i64::from(l.total_minutes)).sum();
    (sum as f64 / logs.len() as f64).round() as i32
}

/// Highest score in the given history, 0 when empty.
pub fn personal_best(logs: &[SleepLog]) -> i32 {
    logs.iter().map(|l| l.score).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    fn log(date: &str, score: i32, minutes: i32) -> SleepLog {
        SleepLog {
            id: Uuid::new_v4(),
            user_id: 1,
            date: date.parse().unwrap(),
            bedtime: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            wake_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            total_minutes: minutes,
            quality: 4,
            wake_ups: 0,
            symptoms: vec![],
            score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_window_has_exact_length_and_consecutive_dates() {
        let logs = vec![log("2026-02-09", 70, 450)];
        for n in [1, 7, 30] {
            let window = build_window(&logs, n, reference());
            assert_eq!(window.len(), n);
            for pair in window.windows(2) {
                assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
            assert_eq!(window.last().unwrap().date, reference());
        }
    }

    #[test]
    fn test_window_fills_gaps_with_empty_slots() {
        let logs = vec![log("2026-02-10", 80, 480), log("2026-02-07", 60, 360)];
        let window = build_window(&logs, 7, reference());

        assert_eq!(window[6].score, Some(80));
        assert_eq!(window[3].score, Some(60));
        assert_eq!(window[3].total_minutes, Some(360));
        for i in [0, 1, 2, 4, 5] {
            assert_eq!(window[i].score, None);
            assert_eq!(window[i].total_minutes, None);
        }
    }

    #[test]
    fn test_window_ignores_log_order() {
        let asc = vec![log("2026-02-08", 55, 400), log("2026-02-09", 65, 420)];
        let desc: Vec<SleepLog> = asc.iter().rev().cloned().collect();
        assert_eq!(build_window(&asc, 7, reference()), build_window(&desc, 7, reference()));
    }

    #[test]
    fn test_window_is_restartable() {
        let logs = vec![log("2026-02-10", 80, 480)];
        let first = build_window(&logs, 30, reference());
        let second = build_window(&logs, 30, reference());
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_empty_history() {
        let window = build_window(&[], 7, reference());
        assert_eq!(window.len(), 7);
        assert!(window.iter().all(|slot| slot.score.is_none()));
    }

    #[test]
    fn test_average_score_rounds() {
        let logs = vec![log("2026-02-08", 70, 480), log("2026-02-09", 71, 480)];
        // 70.5 rounds up.
        assert_eq!(average_score(&logs), 71);
    }

    #[test]
    fn test_average_score_empty_defaults_to_zero() {
        assert_eq!(average_score(&[]), 0);
    }

    #[test]
    fn test_average_minutes_empty_defaults_to_eight_hours() {
        assert_eq!(average_minutes(&[]), 480);
    }

    #[test]
    fn test_average_minutes() {
        let logs = vec![log("2026-02-08", 60, 360), log("2026-02-09", 70, 480)];
        assert_eq!(average_minutes(&logs), 420);
    }

    #[test]
    fn test_personal_best() {
        assert_eq!(personal_best(&[]), 0);
        let logs = vec![
            log("2026-02-07", 62, 420),
            log("2026-02-08", 85, 510),
            log("2026-02-09", 71, 450),
        ];
        assert_eq!(personal_best(&logs), 85);
    }
}
