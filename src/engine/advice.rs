use serde::Serialize;

use crate::models::sleep_log::SleepLog;

/// Nights below this duration count toward the deprivation alert.
pub const MIN_NIGHT_MINUTES: i32 = 360;
const DEPRIVATION_NIGHTS: usize = 5;

/// Aggregate inputs the rules evaluate against. Computed once per analytics
/// pass from the fetched history.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    pub avg_score: i32,
    pub avg_minutes: i32,
    pub personal_best: i32,
}

/// One rule-triggered recommendation. New rules become new variants; the
/// message text is handed to the localization collaborator unmodified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    LowDuration { message: String, estimated_gain: i32 },
    Oversleep { message: String },
    LowAverage { message: String },
    Improvement { message: String },
    Maintain { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeprivationAlert {
    pub message: String,
}

/// Independent threshold rules over the stats snapshot. Order only affects
/// message ordering. The maintain message is emitted exactly once and only
/// when nothing else fired.
pub fn optimization_tips(stats: &StatsSnapshot, last_score: Option<i32>) -> Vec<Advisory> {
    let mut tips = Vec::new();
    let avg_hours = stats.avg_minutes as f64 / 60.0;

    if avg_hours < 7.0 {
        let estimated_gain = ((7.5 - avg_hours) * 10.0).round() as i32;
        let target = if avg_hours < 6.5 { "7-7.5" } else { "7.5-8" };
        tips.push(Advisory::LowDuration {
            message: format!(
                "Getting {target} hours could add ~{estimated_gain} points to your score"
            ),
            estimated_gain,
        });
    }
    if avg_hours > 9.0 {
        tips.push(Advisory::Oversleep {
            message: "Sleeping over 9 hours may indicate poor sleep quality. Aim for 7-8.5 hours."
                .into(),
        });
    }
    if stats.avg_score < 60 {
        tips.push(Advisory::LowAverage {
            message: "Focus on consistent bedtimes. A regular schedule can improve sleep quality by 20-30%."
                .into(),
        });
    }
    if let Some(last) = last_score {
        if last > stats.avg_score + 10 {
            tips.push(Advisory::Improvement {
                message: "Great improvement! Keep repeating last night's routine.".into(),
            });
        }
    }
    if tips.is_empty() {
        tips.push(Advisory::Maintain {
            message: "You're doing great! Maintain your current sleep routine for best results."
                .into(),
        });
    }
    tips
}

/// High-priority alert when the five most recent nights are all short.
/// `recent` must be ordered date-descending, the way the storage list
/// operation returns it. Fewer than five logs never raises the alert.
pub fn deprivation_alert(recent: &[SleepLog]) -> Option<DeprivationAlert> {
    if recent.len() < DEPRIVATION_NIGHTS {
        return None;
    }
    let all_short = recent[..DEPRIVATION_NIGHTS]
        .iter()
        .all(|l| l.total_minutes < MIN_NIGHT_MINUTES);
    all_short.then(|| DeprivationAlert {
        message: "You've had 5+ consecutive nights under 6 hours. Sleep deprivation significantly increases relapse risk."
            .into(),
    })
}

/// One-shot celebration check. `prior_best` is the personal best computed
/// before the new log was incorporated.
pub fn is_new_personal_best(new_score: i32, prior_best: i32) -> bool {
    new_score > prior_best
}
