//! Primary-category derivation.
//!
//! The gateway returns free-form category tags. Matching is by
//! case-insensitive substring so tags like "Idea/Brainstorm" still land in
//! the right scene. Precedence lives in ordered rule tables rather than
//! chains of conditionals.

use crate::model::SceneMode;

/// Marker that identifies a to-do tag after normalization.
pub(crate) const TODO_MARKER: &str = "todo";

/// Primary-category rules, checked in order against the first non-todo tag.
const PRIMARY_RULES: &[(&str, SceneMode)] = &[
    ("study", SceneMode::Study),
    ("meeting", SceneMode::Meeting),
    ("personal", SceneMode::Personal),
    ("idea", SceneMode::Idea),
];

/// Lower-case a tag and fold the hyphenated "to-do" spelling into "todo".
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase().replace("to-do", TODO_MARKER)
}

fn is_todo_tag(normalized: &str) -> bool {
    normalized.contains(TODO_MARKER)
}

/// Derive the single primary scene from a gateway category list.
///
/// The first tag that is not a to-do marker decides the scene; a tag that
/// matches no rule falls back to `Idea`. A list holding only to-do markers
/// yields `Todo`, and an empty list yields `Idea`. Total over any input.
pub fn derive_primary_mode<S: AsRef<str>>(categories: &[S]) -> SceneMode {
    let normalized: Vec<String> = categories
        .iter()
        .map(|cat| normalize_tag(cat.as_ref()))
        .collect();

    if let Some(primary) = normalized.iter().find(|cat| !is_todo_tag(cat)) {
        return PRIMARY_RULES
            .iter()
            .find(|(needle, _)| primary.contains(needle))
            .map_or(SceneMode::Idea, |(_, mode)| *mode);
    }

    if normalized.iter().any(|cat| is_todo_tag(cat)) {
        SceneMode::Todo
    } else {
        SceneMode::Idea
    }
}

/// Display tone of a single tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTone {
    Study,
    Meeting,
    Todo,
    Idea,
    Personal,
    Neutral,
}

impl CategoryTone {
    /// ANSI colour code used by the CLI.
    pub fn ansi(self) -> &'static str {
        match self {
            CategoryTone::Study => "34",
            CategoryTone::Meeting => "35",
            CategoryTone::Todo => "33",
            CategoryTone::Idea => "32",
            CategoryTone::Personal => "31",
            CategoryTone::Neutral => "37",
        }
    }
}

const TONE_RULES: &[(&str, CategoryTone)] = &[
    ("study", CategoryTone::Study),
    ("meeting", CategoryTone::Meeting),
    (TODO_MARKER, CategoryTone::Todo),
    ("idea", CategoryTone::Idea),
    ("personal", CategoryTone::Personal),
];

/// Tone for a tag. Note the order differs from [`PRIMARY_RULES`]: a to-do
/// marker outranks idea and personal here.
pub fn category_tone(tag: &str) -> CategoryTone {
    let tag = normalize_tag(tag);
    TONE_RULES
        .iter()
        .find(|(needle, _)| tag.contains(needle))
        .map_or(CategoryTone::Neutral, |(_, tone)| *tone)
}
