use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// SHA-256 of a raw bearer token, lowercase hex. Raw tokens are never kept
/// as map keys or logged.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory session map (token hash -> user id) for single-instance
/// deployments. For multi-instance, use Redis or similar.
#[derive(Clone, Default)]
pub struct SessionCache {
    entries: Arc<Mutex<HashMap<String, i64>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, token_hash: &str) -> Option<i64> {
        self.entries.lock().await.get(token_hash).copied()
    }

    pub async fn insert(&self, token_hash: String, user_id: i64) {
        self.entries.lock().await.insert(token_hash, user_id);
    }
}

/// Exchange an opaque token for a user id at the external identity service.
/// The service replies with `user_id` as a number or a numeric string;
/// anything else is a rejected handshake.
pub async fn resolve_user_id(state: &AppState, token: &str) -> AppResult<i64> {
    let response = state
        .http
        .post(&state.config.identity_api_url)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("identity service unreachable: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::Unauthorized);
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("identity service returned invalid JSON: {e}")))?;

    let user_id = match &body["user_id"] {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    };

    match user_id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::Unauthorized),
    }
}
