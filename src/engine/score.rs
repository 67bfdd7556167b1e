use serde::{Deserialize, Serialize};

/// Normalized 0-100 sleep score.
///
/// Duration contributes up to 60 points from a base of 50: half-hour steps
/// beyond 8h add 5 points each (capped at +10), half-hour steps short of 8h
/// subtract 5 each. Quality adds `quality * 4`, each mid-night wake-up costs
/// 3 points and each reported symptom costs 2. The discrete step behavior of
/// `floor(x * 2) * 5` is observable product behavior and must not be
/// smoothed into a linear curve.
pub fn sleep_score(total_minutes: i32, quality: i32, wake_ups: i32, symptoms: &[String]) -> i32 {
    let hours = total_minutes as f64 / 60.0;

    let mut duration_points = 50;
    if hours > 8.0 {
        duration_points += (((hours - 8.0) * 2.0).floor() as i32 * 5).min(10);
    } else if hours < 8.0 {
        duration_points -= ((8.0 - hours) * 2.0).floor() as i32 * 5;
    }
    let duration_points = duration_points.clamp(0, 60);

    let quality_points = quality * 4;
    let wake_up_penalty = wake_ups * 3;
    let symptom_penalty = symptoms.len() as i32 * 2;

    (duration_points + quality_points - wake_up_penalty - symptom_penalty).clamp(0, 100)
}

/// Qualitative score band. Band upper bounds are inclusive: 50 is still
/// `poor`, 85 is still `good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreTier {
    pub fn for_score(score: i32) -> Self {
        if score <= 50 {
            Self::Poor
        } else if score <= 70 {
            Self::Fair
        } else if score <= 85 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Poor => "Needs Improvement",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}
