use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Language codes the clients offer in their selector.
pub const SUPPORTED_LANGS: [&str; 10] = [
    "en", "es", "fr", "de", "hi", "ta", "te", "kn", "ml", "mr",
];

/// In-memory translation memo keyed "lang:text". Translated UI strings are
/// few and repeat constantly, so this never needs eviction.
#[derive(Clone, Default)]
pub struct TranslationCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn key(lang: &str, text: &str) -> String {
        format!("{lang}:{text}")
    }

    pub async fn get(&self, lang: &str, text: &str) -> Option<String> {
        self.entries.lock().await.get(&Self::key(lang, text)).cloned()
    }

    pub async fn insert(&self, lang: &str, text: &str, translated: String) {
        self.entries
            .lock()
            .await
            .insert(Self::key(lang, text), translated);
    }
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub texts: Vec<String>,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub target: String,
    /// Source text -> translated text. Untranslatable entries fall back to
    /// the source text so clients can always render something.
    pub translations: HashMap<String, String>,
}

pub async fn translate_batch(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<TranslateRequest>,
) -> AppResult<Json<TranslateResponse>> {
    if !SUPPORTED_LANGS.contains(&body.target.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported target language: {}",
            body.target
        )));
    }

    let mut translations: HashMap<String, String> = HashMap::new();

    // English is the source language; nothing to do.
    if body.target == "en" {
        for text in body.texts {
            translations.insert(text.clone(), text);
        }
        return Ok(Json(TranslateResponse {
            target: body.target,
            translations,
        }));
    }

    let mut misses = Vec::new();
    for text in &body.texts {
        match state.translations.get(&body.target, text).await {
            Some(cached) => {
                translations.insert(text.clone(), cached);
            }
            None => misses.push(text.clone()),
        }
    }

    if !misses.is_empty() {
        match call_translate_api(&state, &misses, &body.target).await {
            Ok(results) => {
                for (source, translated) in misses.iter().zip(results) {
                    state
                        .translations
                        .insert(&body.target, source, translated.clone())
                        .await;
                    translations.insert(source.clone(), translated);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Translation API unavailable, falling back to source text");
            }
        }
    }

    // Anything still missing renders as English.
    for text in body.texts {
        translations.entry(text.clone()).or_insert(text);
    }

    Ok(Json(TranslateResponse {
        target: body.target,
        translations,
    }))
}

async fn call_translate_api(
    state: &AppState,
    texts: &[String],
    target: &str,
) -> Result<Vec<String>, anyhow::Error> {
    if state.config.translate_api_key.is_empty() {
        anyhow::bail!("TRANSLATE_API_KEY is not configured");
    }

    let url = format!(
        "{}?key={}",
        state.config.translate_api_url, state.config.translate_api_key
    );
    let response = state
        .http
        .post(&url)
        .json(&serde_json::json!({
            "q": texts,
            "target": target,
            "source": "en",
            "format": "text",
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Translation API error {}: {}", status, body);
    }

    let body: serde_json::Value = response.json().await?;
    let items = body["data"]["translations"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    if items.len() != texts.len() {
        anyhow::bail!(
            "Translation API returned {} items for {} inputs",
            items.len(),
            texts.len()
        );
    }

    Ok(items
        .iter()
        .map(|item| item["translatedText"].as_str().unwrap_or_default().to_string())
        .collect())
}
