//! The analysis gateway: the external service that turns raw text or audio
//! into a [`StructuredAnalysis`].
//!
//! Callers trust the gateway's output shape. Anything the gateway gets wrong
//! is absorbed by the lenient decoding in [`crate::model::analysis`], and any
//! failure is the caller's cue to degrade the memo rather than retry.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::capture::AudioPayload;
use crate::error::Result;
use crate::model::{SceneMode, StructuredAnalysis};

pub use gemini::GeminiGateway;

/// Transcript used when an audio analysis comes back without a summary.
pub const AUDIO_FALLBACK_TRANSCRIPT: &str = "Audio processed.";

/// Result of an audio analysis: the transcript and its structure.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAnalysis {
    pub transcript: String,
    pub analysis: StructuredAnalysis,
}

impl AudioAnalysis {
    /// The summary doubles as the transcript of an audio capture.
    pub fn from_analysis(analysis: StructuredAnalysis) -> Self {
        let transcript = if analysis.summary.trim().is_empty() {
            AUDIO_FALLBACK_TRANSCRIPT.to_string()
        } else {
            analysis.summary.clone()
        };
        Self {
            transcript,
            analysis,
        }
    }
}

#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Structure a typed or already-transcribed note.
    ///
    /// `hint` is the scene the capture was made under; `today` anchors
    /// relative dates ("tomorrow", "next Tuesday") in the content.
    async fn analyze_text(
        &self,
        transcript: &str,
        hint: SceneMode,
        today: NaiveDate,
    ) -> Result<StructuredAnalysis>;

    /// Transcribe and structure an audio capture in one call.
    async fn transcribe_and_analyze(
        &self,
        audio: &AudioPayload,
        hint: SceneMode,
        today: NaiveDate,
    ) -> Result<AudioAnalysis>;
}
