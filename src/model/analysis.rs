//! Structured analysis returned by the gateway.
//!
//! Decoding is lenient: the gateway is asked for a schema but nothing
//! enforces it, so list fields default to empty, a blank due date is
//! treated as absent, and a missing or null type reads as a note.

use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::{TODO_MARKER, normalize_tag};

/// Whether the gateway saw the capture as a plain note or a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum MemoType {
    #[default]
    Note,
    Todo,
}

impl From<String> for MemoType {
    fn from(s: String) -> Self {
        if normalize_tag(&s).contains(TODO_MARKER) {
            MemoType::Todo
        } else {
            MemoType::Note
        }
    }
}

impl<'de> Deserialize<'de> for MemoType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map_or(MemoType::Note, MemoType::from))
    }
}

impl From<MemoType> for String {
    fn from(t: MemoType) -> Self {
        match t {
            MemoType::Note => "Note".to_string(),
            MemoType::Todo => "Todo".to_string(),
        }
    }
}

/// A mind map node. The gateway returns a flat list; `children` is accepted
/// on input but never populated by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MindMapNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    #[serde(default)]
    pub title: String,

    /// Literal transcription of the source, not a paraphrase.
    #[serde(default)]
    pub summary: String,

    /// One primary tag (Idea, Meeting, Study, Personal) plus an optional
    /// To-do marker, as requested of the gateway. Not validated.
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(rename = "type", default)]
    pub memo_type: MemoType,

    /// `YYYY-MM-DD`, meaningful when a To-do tag is present.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,

    #[serde(default)]
    pub key_points: Vec<String>,

    #[serde(default)]
    pub action_items: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mind_map_nodes: Option<Vec<MindMapNode>>,
}

impl StructuredAnalysis {
    /// Any category reads as a to-do tag.
    pub fn is_todo(&self) -> bool {
        self.categories
            .iter()
            .any(|cat| normalize_tag(cat).contains(TODO_MARKER))
    }

    /// Study and idea memos carry a mind map worth rendering.
    pub fn shows_mind_map(&self) -> bool {
        let tagged = self.categories.iter().any(|cat| {
            let cat = cat.to_lowercase();
            cat.contains("study") || cat.contains("idea")
        });
        tagged && self.mind_map_nodes.as_ref().is_some_and(|n| !n.is_empty())
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null")))
}
