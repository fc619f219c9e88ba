//! Core data model.
//!
//! A memo is one user capture: raw text (typed, or transcribed from audio),
//! the scene it belongs to, and the structured analysis the gateway returned
//! for it once processing settles.

pub mod analysis;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use analysis::{MemoType, MindMapNode, StructuredAnalysis};

// ---------------------------------------------------------------------------
// Scene Mode
// ---------------------------------------------------------------------------

/// A named lens over the memo list.
///
/// `All` is only a lens; the other five double as the primary category a memo
/// is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneMode {
    All,
    Idea,
    Meeting,
    Study,
    Personal,
    #[serde(rename = "To-do")]
    Todo,
}

impl SceneMode {
    /// Every mode, in the order the scene picker shows them.
    pub const ALL_MODES: [SceneMode; 6] = [
        SceneMode::All,
        SceneMode::Idea,
        SceneMode::Meeting,
        SceneMode::Study,
        SceneMode::Personal,
        SceneMode::Todo,
    ];

    /// Display name, also the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            SceneMode::All => "All",
            SceneMode::Idea => "Idea",
            SceneMode::Meeting => "Meeting",
            SceneMode::Study => "Study",
            SceneMode::Personal => "Personal",
            SceneMode::Todo => "To-do",
        }
    }

    /// The hint passed to the gateway for a capture started under this lens.
    /// `All` is not a category, so captures made from it are hinted as ideas.
    pub fn capture_hint(self) -> SceneMode {
        match self {
            SceneMode::All => SceneMode::Idea,
            other => other,
        }
    }
}

impl std::fmt::Display for SceneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SceneMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SceneMode::All),
            "idea" => Ok(SceneMode::Idea),
            "meeting" => Ok(SceneMode::Meeting),
            "study" => Ok(SceneMode::Study),
            "personal" => Ok(SceneMode::Personal),
            "to-do" | "todo" => Ok(SceneMode::Todo),
            _ => {
                let known: Vec<&str> = Self::ALL_MODES.iter().map(|m| m.as_str()).collect();
                Err(format!(
                    "unknown scene mode: {s} (expected one of {})",
                    known.join(", ")
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Newtype for memo IDs.
///
/// Generated IDs are UUIDs, but any string loaded from storage is accepted
/// (the seeded welcome memo uses `"welcome"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoId(pub String);

impl MemoId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for compact listings.
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Display for MemoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One user capture.
///
/// A memo is either processing (`is_processing` set, no analysis) or settled.
/// Only the store mutates memos, and it never sets an analysis on a memo
/// that stays in the processing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: MemoId,

    /// Creation instant, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Where the captured audio lives, for voice memos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    pub transcription: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StructuredAnalysis>,

    /// Scene the memo was captured under, replaced by the classified primary
    /// mode once analysis succeeds.
    pub scene_mode: SceneMode,

    #[serde(default)]
    pub is_processing: bool,
}

impl Memo {
    /// A provisional record created the moment a capture is submitted.
    pub fn placeholder(
        transcription: impl Into<String>,
        hint: SceneMode,
        audio_url: Option<String>,
    ) -> Self {
        Self {
            id: MemoId::generate(),
            timestamp: Utc::now(),
            audio_url,
            transcription: transcription.into(),
            analysis: None,
            scene_mode: hint,
            is_processing: true,
        }
    }

    /// The memo a fresh store is seeded with.
    pub fn welcome(now: DateTime<Utc>) -> Self {
        Self {
            id: MemoId::from("welcome"),
            timestamp: now,
            audio_url: None,
            transcription: "Welcome to VoxMind. Record your first thought or type a quick note."
                .to_string(),
            analysis: Some(StructuredAnalysis {
                title: "Welcome to your Second Brain".to_string(),
                summary: "VoxMind uses Gemini AI to organize your thoughts (voice or text) into actionable wisdom."
                    .to_string(),
                categories: vec!["Idea".to_string()],
                memo_type: MemoType::Note,
                due_date: None,
                key_points: vec![
                    "Voice capturing".to_string(),
                    "Text manual entry".to_string(),
                    "AI auto-organization".to_string(),
                    "Scene mode optimization".to_string(),
                ],
                action_items: vec![
                    "Record a 30-second idea".to_string(),
                    "Type a quick task with `voxmind note`".to_string(),
                ],
                mind_map_nodes: None,
            }),
            scene_mode: SceneMode::Idea,
            is_processing: false,
        }
    }

    /// Tags to display: the analysis categories, or the scene mode when the
    /// memo has no analysis.
    pub fn display_categories(&self) -> Vec<String> {
        match &self.analysis {
            Some(analysis) => analysis.categories.clone(),
            None => vec![self.scene_mode.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_parses_from_its_display_name() {
        for mode in SceneMode::ALL_MODES {
            assert_eq!(mode.as_str().parse::<SceneMode>(), Ok(mode));
        }
        assert_eq!("todo".parse::<SceneMode>(), Ok(SceneMode::Todo));
    }

    #[test]
    fn unknown_mode_lists_the_choices() {
        let err = "errands".parse::<SceneMode>().unwrap_err();
        assert!(err.contains("errands"));
        assert!(err.contains("All, Idea, Meeting, Study, Personal, To-do"));
    }
}
