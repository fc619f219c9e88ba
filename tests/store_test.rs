//! Tests for the memo store and its key-value backends.

use std::sync::Arc;

use voxmind::error::{Error, Result};
use voxmind::model::{MemoId, MemoType, SceneMode, StructuredAnalysis};
use voxmind::storage::{FileBackend, KvBackend, MemoryBackend};
use voxmind::store::{FAILED_TRANSCRIPTION, MEMOS_KEY, MemoStore, Settlement};

fn analysis(categories: &[&str], due: Option<&str>) -> StructuredAnalysis {
    StructuredAnalysis {
        title: "Call Bob".to_string(),
        summary: "remind me tomorrow to call Bob".to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        memo_type: MemoType::Todo,
        due_date: due.map(str::to_string),
        key_points: vec!["call Bob".to_string()],
        action_items: vec!["Call Bob".to_string()],
        mind_map_nodes: None,
    }
}

fn fresh_store() -> MemoStore<Arc<MemoryBackend>> {
    MemoStore::open(Arc::new(MemoryBackend::new())).unwrap()
}

/// A backend whose writes always fail.
struct ReadOnlyBackend {
    inner: MemoryBackend,
}

impl KvBackend for ReadOnlyBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Storage(std::io::Error::other("disk full")))
    }
}

// ---------------------------------------------------------------------------
// Seeding and loading
// ---------------------------------------------------------------------------

#[test]
fn first_open_seeds_a_single_welcome_memo() {
    let backend = Arc::new(MemoryBackend::new());
    let store = MemoStore::open(Arc::clone(&backend)).unwrap();

    let memos = store.list();
    assert_eq!(memos.len(), 1);
    let welcome = &memos[0];
    assert!(!welcome.is_processing);
    assert_eq!(welcome.scene_mode, SceneMode::Idea);
    assert_eq!(
        welcome.analysis.as_ref().unwrap().categories,
        vec!["Idea".to_string()]
    );

    // The seed is persisted, so a second open does not seed again.
    assert!(backend.get(MEMOS_KEY).unwrap().is_some());
    let reopened = MemoStore::open(backend).unwrap();
    assert_eq!(reopened.list().len(), 1);
}

#[test]
fn stored_empty_list_is_not_reseeded() {
    let backend = MemoryBackend::with_value(MEMOS_KEY, "[]");
    let store = MemoStore::open(backend).unwrap();
    assert!(store.list().is_empty());
}

#[test]
fn malformed_stored_value_is_a_serialization_error() {
    let backend = MemoryBackend::with_value(MEMOS_KEY, "{not json");
    let result = MemoStore::open(backend);
    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn loads_lists_written_by_earlier_sessions() {
    let stored = r#"[
        {
            "id": "1709251200000",
            "timestamp": 1709251200000,
            "transcription": "team sync next tuesday",
            "analysis": {
                "title": "Sync",
                "summary": "team sync next tuesday",
                "categories": ["Meeting", "To-do"],
                "type": "Todo",
                "dueDate": "2024-03-05",
                "keyPoints": [],
                "actionItems": ["Book room"]
            },
            "sceneMode": "Meeting",
            "isProcessing": false
        },
        {
            "id": "welcome",
            "timestamp": 1709164800000,
            "transcription": "hi",
            "sceneMode": "To-do",
            "isProcessing": false
        }
    ]"#;
    let store = MemoStore::open(MemoryBackend::with_value(MEMOS_KEY, stored)).unwrap();

    let memos = store.list();
    assert_eq!(memos.len(), 2);
    assert_eq!(memos[0].timestamp.timestamp_millis(), 1_709_251_200_000);
    let analysis = memos[0].analysis.as_ref().unwrap();
    assert_eq!(analysis.memo_type, MemoType::Todo);
    assert_eq!(analysis.due_date.as_deref(), Some("2024-03-05"));
    assert_eq!(memos[1].scene_mode, SceneMode::Todo);
    assert!(memos[1].analysis.is_none());
}

// ---------------------------------------------------------------------------
// Create and settle
// ---------------------------------------------------------------------------

#[test]
fn create_prepends_a_processing_placeholder() {
    let mut store = fresh_store();
    let first = store.create("first", SceneMode::Study).unwrap();
    let second = store.create("second", SceneMode::Idea).unwrap();
    assert_ne!(first, second);

    let memos = store.list();
    assert_eq!(memos.len(), 3);
    assert_eq!(memos[0].id, second);
    assert_eq!(memos[1].id, first);
    assert!(memos[0].is_processing);
    assert!(memos[0].analysis.is_none());
    assert_eq!(memos[1].scene_mode, SceneMode::Study);
}

#[test]
fn every_mutation_is_persisted() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = MemoStore::open(Arc::clone(&backend)).unwrap();

    let id = store.create("remind me tomorrow to call Bob", SceneMode::Idea).unwrap();
    let after_create = MemoStore::open(Arc::clone(&backend)).unwrap();
    assert!(after_create.get(&id).unwrap().is_processing);

    store
        .settle(
            &id,
            Settlement::Analyzed {
                transcription: "remind me tomorrow to call Bob".to_string(),
                analysis: analysis(&["Personal", "To-do"], Some("2024-03-02")),
            },
        )
        .unwrap();
    let after_settle = MemoStore::open(backend).unwrap();
    let memo = after_settle.get(&id).unwrap();
    assert!(!memo.is_processing);
    assert_eq!(memo.scene_mode, SceneMode::Personal);
}

#[test]
fn settle_with_analysis_reclassifies_the_memo() {
    let mut store = fresh_store();
    let id = store.create("standup notes", SceneMode::Idea).unwrap();

    let changed = store
        .settle(
            &id,
            Settlement::Analyzed {
                transcription: "standup notes".to_string(),
                analysis: analysis(&["Meeting", "To-do"], None),
            },
        )
        .unwrap();
    assert!(changed);

    let memo = store.get(&id).unwrap();
    assert_eq!(memo.scene_mode, SceneMode::Meeting);
    assert!(!memo.is_processing);
    assert!(memo.analysis.is_some());
}

#[test]
fn failed_settlement_keeps_raw_text_and_scene() {
    let mut store = fresh_store();
    let id = store.create("half a thought", SceneMode::Study).unwrap();

    store
        .settle(
            &id,
            Settlement::Failed {
                transcription: "half a thought".to_string(),
            },
        )
        .unwrap();

    let memo = store.get(&id).unwrap();
    assert!(!memo.is_processing);
    assert!(memo.analysis.is_none());
    assert_eq!(memo.transcription, "half a thought");
    assert_eq!(memo.scene_mode, SceneMode::Study);
}

#[test]
fn failed_settlement_without_text_uses_fallback() {
    let mut store = fresh_store();
    let id = store.create("", SceneMode::Idea).unwrap();
    store
        .settle(&id, Settlement::Failed { transcription: String::new() })
        .unwrap();
    assert_eq!(store.get(&id).unwrap().transcription, FAILED_TRANSCRIPTION);

    // Only empty text falls back; anything else is kept as submitted.
    let padded = store.create(" ", SceneMode::Idea).unwrap();
    store
        .settle(&padded, Settlement::Failed { transcription: " ".to_string() })
        .unwrap();
    assert_eq!(store.get(&padded).unwrap().transcription, " ");
}

#[test]
fn settling_twice_keeps_the_last_settlement() {
    let mut store = fresh_store();
    let id = store.create("draft", SceneMode::Idea).unwrap();

    store
        .settle(&id, Settlement::Failed { transcription: "draft".to_string() })
        .unwrap();
    store
        .settle(
            &id,
            Settlement::Analyzed {
                transcription: "draft v2".to_string(),
                analysis: analysis(&["Study"], None),
            },
        )
        .unwrap();

    let matching: Vec<_> = store.list().iter().filter(|m| m.id == id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].transcription, "draft v2");
    assert_eq!(matching[0].scene_mode, SceneMode::Study);
    assert_eq!(store.list().len(), 2);
}

#[test]
fn settling_an_unknown_id_is_a_no_op() {
    let mut store = fresh_store();
    let before = store.list().to_vec();
    let changed = store
        .settle(
            &MemoId::from("missing"),
            Settlement::Failed { transcription: "x".to_string() },
        )
        .unwrap();
    assert!(!changed);
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn failed_write_rolls_the_mutation_back() {
    let inner = MemoryBackend::with_value(MEMOS_KEY, "[]");
    let mut store = MemoStore::open(ReadOnlyBackend { inner }).unwrap();

    let result = store.create("lost", SceneMode::Idea);
    assert!(matches!(result, Err(Error::Storage(_))));
    assert!(store.list().is_empty());
}

#[test]
fn find_by_prefix_requires_a_unique_match() {
    let mut store = fresh_store();
    let id = store.create("note", SceneMode::Idea).unwrap();

    let found = store.find_by_prefix(&id.as_str()[..8]).unwrap();
    assert_eq!(found.id, id);
    assert_eq!(store.find_by_prefix("welcome").unwrap().id.as_str(), "welcome");
    assert!(matches!(store.find_by_prefix("zzzz"), Err(Error::NotFound(_))));
    assert!(store.find_by_prefix("").is_err());
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

#[test]
fn file_backend_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("data");

    let id = {
        let mut store = MemoStore::open(FileBackend::new(&data_dir)).unwrap();
        store.create("persist me", SceneMode::Personal).unwrap()
    };

    assert!(data_dir.join(format!("{MEMOS_KEY}.json")).exists());
    let store = MemoStore::open(FileBackend::new(&data_dir)).unwrap();
    assert_eq!(store.list().len(), 2);
    assert_eq!(store.get(&id).unwrap().transcription, "persist me");
}

#[test]
fn file_backend_reports_missing_keys_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path());
    assert!(backend.get("absent").unwrap().is_none());
    assert!(backend.set("../escape", "x").is_err());
}
