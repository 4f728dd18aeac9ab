use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{CONFIG, SYSTEM_INSTRUCTION};
use crate::llm::media::MediaFile;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

/// Returned verbatim whenever the remote call fails for any reason. Transport
/// and API errors never cross the client boundary.
pub const GENERATION_ERROR_TEXT: &str =
    "Error occurred while processing the image. Please try again.";

/// Returned when the API answers successfully but without any text part.
pub const EMPTY_RESPONSE_TEXT: &str = "Failed to generate prompt.";

const MAX_RETRY_ATTEMPTS: usize = 2;
const RETRY_BASE_DELAY_MS: u64 = 900;

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn retry_delay(attempt: usize) -> Duration {
    let attempt = attempt.max(1) as u64;
    Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(attempt))
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.pointer("/error/message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    truncate_for_log(trimmed, 2000)
}

fn extract_text(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        if let Some(content) = candidate.content {
            for part in content.parts.unwrap_or_default() {
                if let Some(text) = part.text {
                    if !text.trim().is_empty() {
                        text_parts.push(text);
                    }
                }
            }
        }
    }
    text_parts.join("\n")
}

fn build_payload(image: &MediaFile, compiled_prompt: &str) -> Value {
    let encoded = general_purpose::STANDARD.encode(&image.bytes);
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{
            "role": "user",
            "parts": [
                { "inlineData": { "mimeType": image.mime_type, "data": encoded } },
                { "text": compiled_prompt }
            ]
        }],
        "generationConfig": {
            "temperature": CONFIG.gemini_temperature,
            "topK": CONFIG.gemini_top_k,
            "topP": CONFIG.gemini_top_p,
            "maxOutputTokens": CONFIG.gemini_max_output_tokens,
        },
    })
}

async fn call_generate_content(base_url: &str, payload: &Value) -> Result<GeminiResponse> {
    let client = get_http_client();
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        base_url.trim_end_matches('/'),
        CONFIG.gemini_model,
        CONFIG.gemini_api_key
    );

    let mut attempt = 0usize;
    loop {
        attempt += 1;
        let response = match client
            .post(&url)
            .timeout(Duration::from_secs(CONFIG.request_timeout_secs))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err_text = redact_api_key(&err.to_string());
                let should_retry = should_retry_error(&err) && attempt < MAX_RETRY_ATTEMPTS;
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={}, retrying={})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    should_retry
                );
                if should_retry {
                    tokio::time::sleep(retry_delay(attempt)).await;
                    continue;
                }
                return Err(anyhow!("Gemini request failed: {}", err_text));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = summarize_error_body(&body);
            let should_retry = should_retry_status(status) && attempt < MAX_RETRY_ATTEMPTS;
            warn!(
                "Gemini API error: status={}, detail={}, retrying={}",
                status, detail, should_retry
            );
            if should_retry {
                tokio::time::sleep(retry_delay(attempt)).await;
                continue;
            }
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                detail
            ));
        }

        return Ok(response.json::<GeminiResponse>().await?);
    }
}

async fn request_prompt(base_url: &str, image: &MediaFile, compiled_prompt: &str) -> Result<String> {
    let payload = build_payload(image, compiled_prompt);
    debug!(
        target: "llm.gemini",
        model = %CONFIG.gemini_model,
        image_mime = %image.mime_type,
        image_bytes = image.bytes.len(),
        prompt_chars = compiled_prompt.chars().count(),
        "sending generation request"
    );

    let model = CONFIG.gemini_model.clone();
    log_llm_timing("gemini", &model, "generate_prompt", move || async move {
        let response = call_generate_content(base_url, &payload).await?;
        Ok(extract_text(response))
    })
    .await
}

async fn generate_prompt_at(base_url: &str, image: &MediaFile, compiled_prompt: &str) -> String {
    match request_prompt(base_url, image, compiled_prompt).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                EMPTY_RESPONSE_TEXT.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(err) => {
            warn!("Prompt generation failed: {err:#}");
            GENERATION_ERROR_TEXT.to_string()
        }
    }
}

/// Sends the image and compiled prompt to Gemini and returns the generated
/// prompt text. Total: every failure degrades to a fixed error string.
pub async fn generate_prompt(image: &MediaFile, compiled_prompt: &str) -> String {
    generate_prompt_at(&CONFIG.gemini_base_url, image, compiled_prompt).await
}
