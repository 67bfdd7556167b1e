use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sleepscore-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness covers both connectivity and schema: the count comes from the
/// migrations ledger, so a pool pointed at an unmigrated database reports
/// not_ready even though it can answer queries.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let applied = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
    )
    .fetch_one(&state.db)
    .await;

    match applied {
        Ok(count) if count > 0 => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": {
                    "database": "ok",
                    "migrations_applied": count,
                },
            })),
        ),
        Ok(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "checks": {
                    "database": "ok",
                    "migrations_applied": 0,
                },
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "checks": { "database": "failed" },
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_service_identity() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "sleepscore-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
