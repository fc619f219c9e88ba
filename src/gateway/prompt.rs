//! Instructions and request text sent to the gateway.

use chrono::NaiveDate;

use crate::model::SceneMode;

/// System instruction shared by text and audio requests.
pub const SYSTEM_INSTRUCTIONS: &str = r#"
You are an expert personal assistant specialized in organizing fragmented voice and text notes.
Analyze the content and convert it into a structured JSON format.

CRITICAL CONTENT RULE (Faithful Transcription/Literal Translation):
For the "summary" field, DO NOT rewrite, formalize, or embellish the user's original words.
Provide a faithful transcription or a very literal translation that preserves the original tone, keywords, and phrasing.
The user wants a literal transcription/translation, NOT a formal summary.

STRICT TAGGING RULE:
1. PRIMARY CATEGORY: You MUST choose exactly ONE from these four: ["Idea", "Meeting", "Study", "Personal"]. These are mutually exclusive.
2. OPTIONAL TAG: You may optionally include "To-do" in the "categories" array IF AND ONLY IF the content contains actionable tasks or a specific deadline.
Example valid "categories": ["Meeting", "To-do"], ["Study"], ["Personal", "To-do"], ["Idea"].
Example INVALID "categories": ["Meeting", "Study"], ["Idea", "Personal", "To-do"].

DATE EXTRACTION:
If "To-do" is present and a time is mentioned (e.g. "next Tuesday", "tomorrow"), calculate the exact YYYY-MM-DD based on the current date and return it in "dueDate".

MIND MAP RULE:
For "Study" or "Idea" categories, break down the logic into 3-5 key hierarchical nodes in "mindMapNodes".

Output JSON structure:
{
  "title": "Short descriptive title",
  "summary": "FAITHFUL literal transcription/translation (NO REWRITING)",
  "categories": ["PrimaryCategory", "To-do" (optional)],
  "type": "Note | Todo",
  "dueDate": "YYYY-MM-DD or null",
  "keyPoints": ["literal key point 1", "literal key point 2"],
  "actionItems": ["actionable task 1", "actionable task 2"],
  "mindMapNodes": [
    { "id": "1", "label": "Main Topic" },
    { "id": "2", "label": "Sub Topic" }
  ]
}
"#;

/// User turn for a text capture.
pub fn text_request(transcript: &str, hint: SceneMode, today: NaiveDate) -> String {
    format!(
        "[Today: {today}]\n[Context: {hint}]\n[Original Content: {transcript}]\n\n\
         Task: Transcribe literally into 'summary'. Extract categories following the strict \
         mutual exclusivity rule for primary tags.",
        today = today.format("%Y-%m-%d"),
    )
}

/// User turn accompanying an inline audio payload.
pub fn audio_request(hint: SceneMode, today: NaiveDate) -> String {
    format!(
        "[Today: {today}]\n[Context: {hint}]\nTranscribe literally. Strictly enforce category \
         exclusivity: Pick ONE from {{Idea, Meeting, Study, Personal}} and optionally 'To-do'.",
        today = today.format("%Y-%m-%d"),
    )
}

/// JSON schema constraining the gateway's response.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "categories": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Must contain exactly one of [Idea, Meeting, Study, Personal], and optionally 'To-do'."
            },
            "type": { "type": "STRING" },
            "dueDate": { "type": "STRING", "description": "YYYY-MM-DD format" },
            "keyPoints": { "type": "ARRAY", "items": { "type": "STRING" } },
            "actionItems": { "type": "ARRAY", "items": { "type": "STRING" } },
            "mindMapNodes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "label": { "type": "STRING" }
                    }
                }
            }
        },
        "required": ["title", "summary", "categories", "type", "keyPoints", "actionItems"]
    })
}
