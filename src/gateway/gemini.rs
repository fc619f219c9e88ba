//! Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, warn};

use super::prompt::{SYSTEM_INSTRUCTIONS, audio_request, response_schema, text_request};
use super::{AnalysisGateway, AudioAnalysis};
use crate::capture::AudioPayload;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{SceneMode, StructuredAnalysis};
use crate::telemetry::{genai, metrics};

const PROVIDER: &str = "gemini";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Connection settings for [`GeminiGateway`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api_key: config.require_api_key()?.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

pub struct GeminiGateway {
    settings: GeminiSettings,
    client: Client,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Gateway(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }

    async fn generate(
        &self,
        parts: Vec<Part>,
        schema: Option<serde_json::Value>,
    ) -> Result<StructuredAnalysis> {
        let span = genai::start_chat_span(&self.settings.model, PROVIDER);
        let started = Instant::now();

        let result = self
            .send(parts, schema, &span)
            .instrument(span.clone())
            .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::gateway_duration_ms().record(
            started.elapsed().as_secs_f64() * 1000.0,
            &[
                opentelemetry::KeyValue::new("provider", PROVIDER),
                opentelemetry::KeyValue::new("outcome", outcome),
            ],
        );
        result
    }

    async fn send(
        &self,
        parts: Vec<Part>,
        schema: Option<serde_json::Value>,
        span: &tracing::Span,
    ) -> Result<StructuredAnalysis> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: SYSTEM_INSTRUCTIONS.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Gateway("request timed out".to_string())
                } else {
                    Error::Gateway(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gateway returned an error status");
            return Err(Error::Gateway(format!("HTTP {status}: {detail}")));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Gateway(format!("malformed response envelope: {e}")))?;

        if let Some(usage) = &reply.usage_metadata {
            genai::record_token_usage(span, usage.prompt_token_count, usage.candidates_token_count);
        }

        let text = reply_text(&reply)
            .ok_or_else(|| Error::Gateway("response carried no content".to_string()))?;
        debug!(bytes = text.len(), "gateway reply received");

        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }
}

/// Concatenate the non-thought text parts of the first candidate.
fn reply_text(reply: &GenerateResponse) -> Option<String> {
    let parts = &reply.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts
        .iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text.as_deref())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// Models occasionally wrap JSON in a markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    async fn analyze_text(
        &self,
        transcript: &str,
        hint: SceneMode,
        today: NaiveDate,
    ) -> Result<StructuredAnalysis> {
        let parts = vec![Part::Text {
            text: text_request(transcript, hint, today),
        }];
        self.generate(parts, Some(response_schema())).await
    }

    async fn transcribe_and_analyze(
        &self,
        audio: &AudioPayload,
        hint: SceneMode,
        today: NaiveDate,
    ) -> Result<AudioAnalysis> {
        if audio.is_empty() {
            return Err(Error::Gateway("audio payload is empty".to_string()));
        }
        let parts = vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: audio.mime_type.clone(),
                    data: audio.to_base64(),
                },
            },
            Part::Text {
                text: audio_request(hint, today),
            },
        ];
        let analysis = self.generate(parts, None).await?;
        Ok(AudioAnalysis::from_analysis(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn inline_data_serializes_camel_case() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "audio/mp3".to_string(),
                data: "AAAA".to_string(),
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "audio/mp3");
    }
}
