use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::identity::{hash_token, resolve_user_id};
use crate::error::AppError;
use crate::AppState;

/// Identity resolved for the current request. The id is opaque; the service
/// never authenticates beyond the external handshake.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let token_hash = hash_token(token);
    let user_id = match state.sessions.get(&token_hash).await {
        Some(id) => id,
        None => {
            let id = resolve_user_id(&state, token).await?;

            // First sight of this session: the user row must exist before
            // any log operation references it.
            sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
                .bind(id)
                .execute(&state.db)
                .await?;

            state.sessions.insert(token_hash, id).await;
            tracing::info!(user_id = id, "Identity handshake completed");
            id
        }
    };

    req.extensions_mut().insert(AuthUser { id: user_id });
    Ok(next.run(req).await)
}
