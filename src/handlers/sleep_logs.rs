use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::engine::score::ScoreTier;
use crate::engine::{advice, duration, score};
use crate::error::{AppError, AppResult};
use crate::models::sleep_log::{SleepLog, SleepLogQuery, UpsertSleepLogRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UpsertSleepLogResponse {
    pub log: SleepLog,
    pub tier: ScoreTier,
    pub tier_label: &'static str,
    pub duration_label: String,
    pub new_personal_best: bool,
}

/// Accepts "23:00" (the form clients send) and "23:00:00".
fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Submission with ranges checked, clock strings parsed, and optional
/// fields defaulted. The engine only ever sees values that came through
/// here.
#[derive(Debug)]
struct ValidatedSubmission {
    date: Option<chrono::NaiveDate>,
    bedtime: NaiveTime,
    wake_time: NaiveTime,
    quality: i32,
    wake_ups: i32,
    symptoms: Vec<String>,
}

fn validate_submission(body: UpsertSleepLogRequest) -> AppResult<ValidatedSubmission> {
    if !(1..=5).contains(&body.quality) {
        return Err(AppError::Validation(
            "Quality must be between 1 and 5".into(),
        ));
    }
    let wake_ups = body.wake_ups.unwrap_or(0);
    if wake_ups < 0 {
        return Err(AppError::Validation("Wake-ups must not be negative".into()));
    }
    let bedtime = parse_clock(&body.bedtime)
        .ok_or_else(|| AppError::Validation("Bedtime must be a HH:MM clock time".into()))?;
    let wake_time = parse_clock(&body.wake_time)
        .ok_or_else(|| AppError::Validation("Wake time must be a HH:MM clock time".into()))?;

    Ok(ValidatedSubmission {
        date: body.date,
        bedtime,
        wake_time,
        quality: body.quality,
        wake_ups,
        symptoms: body.symptoms.unwrap_or_default(),
    })
}

pub async fn upsert_sleep_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertSleepLogRequest>,
) -> AppResult<Json<UpsertSleepLogResponse>> {
    let submission = validate_submission(body)?;
    let date = submission.date.unwrap_or_else(|| Utc::now().date_naive());

    // Derived fields are always recomputed; a client-sent score is never
    // trusted or even representable in the request.
    let total_minutes = duration::duration_minutes(submission.bedtime, submission.wake_time);
    let log_score = score::sleep_score(
        total_minutes,
        submission.quality,
        submission.wake_ups,
        &submission.symptoms,
    );

    // Personal best before this submission; the celebration check must not
    // see the new log.
    let prior_best = sqlx::query_scalar::<_, Option<i32>>(
        "SELECT MAX(score) FROM sleep_logs WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?
    .unwrap_or(0);

    // Re-logging a date replaces the record wholesale, not field by field.
    let log = sqlx::query_as::<_, SleepLog>(
        r#"
        INSERT INTO sleep_logs (id, user_id, date, bedtime, wake_time, total_minutes, quality, wake_ups, symptoms, score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, date) DO UPDATE SET
            bedtime = EXCLUDED.bedtime,
            wake_time = EXCLUDED.wake_time,
            total_minutes = EXCLUDED.total_minutes,
            quality = EXCLUDED.quality,
            wake_ups = EXCLUDED.wake_ups,
            symptoms = EXCLUDED.symptoms,
            score = EXCLUDED.score,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(date)
    .bind(submission.bedtime)
    .bind(submission.wake_time)
    .bind(total_minutes)
    .bind(submission.quality)
    .bind(submission.wake_ups)
    .bind(&submission.symptoms)
    .bind(log_score)
    .fetch_one(&state.db)
    .await?;

    let tier = ScoreTier::for_score(log.score);
    Ok(Json(UpsertSleepLogResponse {
        tier,
        tier_label: tier.label(),
        duration_label: duration::format_duration(log.total_minutes),
        new_personal_best: advice::is_new_personal_best(log.score, prior_best),
        log,
    }))
}

pub async fn list_sleep_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<SleepLogQuery>,
) -> AppResult<Json<Vec<SleepLog>>> {
    let limit = query.limit.unwrap_or(30).clamp(1, 365);

    let logs = sqlx::query_as::<_, SleepLog>(
        "SELECT * FROM sleep_logs WHERE user_id = $1 ORDER BY date DESC LIMIT $2",
    )
    .bind(auth_user.id)
    .bind(limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(logs))
}

pub async fn today_sleep_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Option<SleepLog>>> {
    let today = Utc::now().date_naive();

    let log = sqlx::query_as::<_, SleepLog>(
        "SELECT * FROM sleep_logs WHERE user_id = $1 AND date = $2",
    )
    .bind(auth_user.id)
    .bind(today)
    .fetch_optional(&state.db)
    .await?;

    Ok(Json(log))
}

pub async fn weekly_sleep_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<SleepLog>>> {
    let since = Utc::now().date_naive() - chrono::Duration::days(7);

    let logs = sqlx::query_as::<_, SleepLog>(
        "SELECT * FROM sleep_logs WHERE user_id = $1 AND date >= $2 ORDER BY date ASC",
    )
    .bind(auth_user.id)
    .bind(since)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::identity::SessionCache;
    use crate::config::Config;
    use crate::handlers::translate::TranslationCache;

    fn submission(quality: i32, wake_ups: Option<i32>) -> UpsertSleepLogRequest {
        UpsertSleepLogRequest {
            date: None,
            bedtime: "23:00".into(),
            wake_time: "07:00".into(),
            quality,
            wake_ups,
            symptoms: None,
        }
    }

    #[test]
    fn test_validation_accepts_quality_bounds() {
        for quality in [1, 5] {
            assert!(
                validate_submission(submission(quality, Some(0))).is_ok(),
                "quality {quality} should be accepted"
            );
        }
    }

    #[test]
    fn test_validation_rejects_out_of_range_quality() {
        for quality in [0, 6, -3] {
            match validate_submission(submission(quality, None)) {
                Err(AppError::Validation(msg)) => assert!(msg.contains("Quality")),
                other => panic!("quality {quality} produced {other:?}"),
            }
        }
    }

    #[test]
    fn test_validation_rejects_negative_wake_ups() {
        match validate_submission(submission(3, Some(-1))) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Wake-ups")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_defaults_optional_fields() {
        let validated = validate_submission(submission(4, None)).unwrap();
        assert_eq!(validated.wake_ups, 0);
        assert!(validated.symptoms.is_empty());
        assert_eq!(validated.date, None);
    }

    #[test]
    fn test_validation_rejects_unparseable_times() {
        let mut body = submission(4, None);
        body.bedtime = "late".into();
        assert!(matches!(
            validate_submission(body),
            Err(AppError::Validation(_))
        ));
    }

    // A lazy pool never connects, so rejected submissions must fail before
    // any query runs for this to return at all.
    fn test_app() -> Router {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/sleepscore_test")
            .unwrap();
        let state = AppState {
            db,
            config: Arc::new(Config {
                database_url: String::new(),
                host: "127.0.0.1".into(),
                port: 0,
                frontend_url: "http://localhost:3000".into(),
                identity_api_url: String::new(),
                translate_api_url: String::new(),
                translate_api_key: String::new(),
            }),
            http: reqwest::Client::new(),
            sessions: SessionCache::new(),
            translations: TranslationCache::new(),
        };
        Router::new()
            .route("/api/sleep-logs", post(upsert_sleep_log))
            .layer(Extension(AuthUser { id: 1 }))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_quality_over_http() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/sleep-logs")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "bedtime": "23:00",
                    "wake_time": "07:00",
                    "quality": 6,
                })
                .to_string(),
            ))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Quality must be between 1 and 5");
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_upsert_rejects_negative_wake_ups_over_http() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/sleep-logs")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "bedtime": "23:00",
                    "wake_time": "07:00",
                    "quality": 3,
                    "wake_ups": -1,
                })
                .to_string(),
            ))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_parse_clock_short_form() {
        assert_eq!(
            parse_clock("23:00"),
            Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap())
        );
        assert_eq!(
            parse_clock("07:30"),
            Some(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_clock_with_seconds() {
        assert_eq!(
            parse_clock("06:45:00"),
            Some(NaiveTime::from_hms_opt(6, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("23:61"), None);
        assert_eq!(parse_clock("bedtime"), None);
    }
}
