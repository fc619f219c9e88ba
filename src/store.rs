//! The memo store: an ordered, newest-first memo list mirrored to a durable
//! key-value slot.
//!
//! The list is the unit of persistence. Every mutation serializes the whole
//! list and writes it under [`MEMOS_KEY`]; a mutation whose write fails is
//! rolled back so memory and storage never disagree.

use chrono::Utc;
use tracing::{debug, info};

use crate::classify::derive_primary_mode;
use crate::error::{Error, Result};
use crate::model::{Memo, MemoId, SceneMode, StructuredAnalysis};
use crate::storage::KvBackend;

/// Namespace key of the memo list.
pub const MEMOS_KEY: &str = "voxmind_memos";

/// Transcription kept when a capture fails with no usable input text.
pub const FAILED_TRANSCRIPTION: &str = "Failed to process content.";

/// How a processing memo resolves.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The gateway returned a structured record.
    Analyzed {
        transcription: String,
        analysis: StructuredAnalysis,
    },
    /// The gateway failed; keep the raw input and no analysis.
    Failed { transcription: String },
}

pub struct MemoStore<B: KvBackend> {
    backend: B,
    memos: Vec<Memo>,
}

impl<B: KvBackend> MemoStore<B> {
    /// Load the memo list from `backend`, seeding a welcome memo when the
    /// slot has never been written.
    pub fn open(backend: B) -> Result<Self> {
        let (memos, seeded) = match backend.get(MEMOS_KEY)? {
            Some(raw) => (serde_json::from_str::<Vec<Memo>>(&raw)?, false),
            None => (vec![Memo::welcome(Utc::now())], true),
        };

        let store = Self { backend, memos };
        if seeded {
            store.persist()?;
            info!("seeded new memo store with welcome memo");
        } else {
            debug!(count = store.memos.len(), "loaded memo store");
        }
        Ok(store)
    }

    /// Insert a processing placeholder at the front and return its id.
    pub fn create(&mut self, transcription: &str, hint: SceneMode) -> Result<MemoId> {
        self.insert(Memo::placeholder(transcription, hint, None))
    }

    /// Like [`create`](Self::create), recording where the captured audio lives.
    pub fn create_with_audio(
        &mut self,
        transcription: &str,
        hint: SceneMode,
        audio_url: impl Into<String>,
    ) -> Result<MemoId> {
        self.insert(Memo::placeholder(
            transcription,
            hint,
            Some(audio_url.into()),
        ))
    }

    fn insert(&mut self, memo: Memo) -> Result<MemoId> {
        let id = memo.id.clone();
        self.memos.insert(0, memo);
        if let Err(e) = self.persist() {
            self.memos.remove(0);
            return Err(e);
        }
        debug!(memo.id = %id, "created placeholder memo");
        Ok(id)
    }

    /// Resolve the memo with `id` in place.
    ///
    /// Returns `false` without writing when no memo has that id. Settling the
    /// same id again overwrites the earlier settlement.
    pub fn settle(&mut self, id: &MemoId, settlement: Settlement) -> Result<bool> {
        let Some(index) = self.memos.iter().position(|m| &m.id == id) else {
            debug!(memo.id = %id, "settle for unknown memo ignored");
            return Ok(false);
        };

        let previous = self.memos[index].clone();
        let memo = &mut self.memos[index];
        match settlement {
            Settlement::Analyzed {
                transcription,
                analysis,
            } => {
                memo.scene_mode = derive_primary_mode(&analysis.categories);
                memo.transcription = transcription;
                memo.analysis = Some(analysis);
            }
            Settlement::Failed { transcription } => {
                memo.transcription = if transcription.is_empty() {
                    FAILED_TRANSCRIPTION.to_string()
                } else {
                    transcription
                };
                memo.analysis = None;
            }
        }
        memo.is_processing = false;

        if let Err(e) = self.persist() {
            self.memos[index] = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// All memos, newest first.
    pub fn list(&self) -> &[Memo] {
        &self.memos
    }

    pub fn get(&self, id: &MemoId) -> Option<&Memo> {
        self.memos.iter().find(|m| &m.id == id)
    }

    /// Find the single memo whose id starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Memo> {
        if let Some(exact) = self.memos.iter().find(|m| m.id.as_str() == prefix) {
            return Ok(exact);
        }
        let matches: Vec<&Memo> = self
            .memos
            .iter()
            .filter(|m| m.id.as_str().starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [] => Err(Error::NotFound(prefix.to_string())),
            [memo] => Ok(*memo),
            many => Err(Error::Other(format!(
                "{} memos match prefix '{prefix}', be more specific",
                many.len()
            ))),
        }
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.memos)?;
        self.backend.set(MEMOS_KEY, &raw)?;
        debug!(count = self.memos.len(), bytes = raw.len(), "persisted memo list");
        Ok(())
    }
}
