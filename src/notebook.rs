//! Capture orchestration: placeholder, gateway call, settlement.
//!
//! A [`Notebook`] owns the memo store and the gateway. Each capture inserts a
//! processing placeholder, calls the gateway, and settles the placeholder by
//! id. A process-wide flag allows one capture in flight at a time; it is
//! released whether the gateway succeeds or fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};
use opentelemetry::KeyValue;
use tracing::{info, warn};

use crate::capture::CaptureDevice;
use crate::error::{Error, Result};
use crate::filter::{CalendarDay, CalendarView, calendar_strip, filter_memos};
use crate::gateway::{AnalysisGateway, AudioAnalysis};
use crate::model::{Memo, MemoId, SceneMode};
use crate::storage::KvBackend;
use crate::store::{MemoStore, Settlement};
use crate::telemetry::metrics;

/// Transcription shown on an audio placeholder until it settles.
pub const AUDIO_PLACEHOLDER_TEXT: &str = "Transcribing and processing audio...";

/// Clears the processing flag when dropped.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Notebook<B: KvBackend> {
    store: Mutex<MemoStore<B>>,
    gateway: Arc<dyn AnalysisGateway>,
    processing: AtomicBool,
}

impl<B: KvBackend> Notebook<B> {
    pub fn new(store: MemoStore<B>, gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self {
            store: Mutex::new(store),
            gateway,
            processing: AtomicBool::new(false),
        }
    }

    /// True while a capture is waiting on the gateway.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Capture typed text under `mode`.
    ///
    /// Surrounding whitespace is trimmed; blank text is rejected with
    /// [`Error::EmptyInput`] before any memo exists. Returns the settled memo.
    /// A gateway failure is not an error here: the memo settles with the
    /// submitted text and no analysis.
    pub async fn submit_text(&self, text: &str, mode: SceneMode) -> Result<Memo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        let _guard = self.claim()?;
        let hint = mode.capture_hint();

        let id = self.with_store(|store| store.create(text, hint))?;
        metrics::memo_created().add(1, &[KeyValue::new("source", "text")]);

        let today = Local::now().date_naive();
        let settlement = match self.gateway.analyze_text(text, hint, today).await {
            Ok(analysis) => Settlement::Analyzed {
                transcription: text.to_string(),
                analysis,
            },
            Err(e) => {
                warn!(memo.id = %id, error = %e, "analysis failed, keeping raw text");
                Settlement::Failed {
                    transcription: text.to_string(),
                }
            }
        };

        self.finish(&id, settlement)
    }

    /// Record from `device` and capture the audio under `mode`.
    ///
    /// If the device cannot be acquired the error is returned and no memo is
    /// created.
    pub async fn submit_audio(
        &self,
        device: &mut dyn CaptureDevice,
        mode: SceneMode,
    ) -> Result<Memo> {
        let _guard = self.claim()?;
        let audio = device.start()?.stop();
        let hint = mode.capture_hint();

        let id = self.with_store(|store| match &audio.source {
            Some(source) => store.create_with_audio(AUDIO_PLACEHOLDER_TEXT, hint, source.clone()),
            None => store.create(AUDIO_PLACEHOLDER_TEXT, hint),
        })?;
        metrics::memo_created().add(1, &[KeyValue::new("source", "audio")]);

        let today = Local::now().date_naive();
        let settlement = match self.gateway.transcribe_and_analyze(&audio, hint, today).await {
            Ok(AudioAnalysis {
                transcript,
                analysis,
            }) => Settlement::Analyzed {
                transcription: transcript,
                analysis,
            },
            Err(e) => {
                warn!(memo.id = %id, error = %e, "audio analysis failed");
                Settlement::Failed {
                    transcription: String::new(),
                }
            }
        };

        self.finish(&id, settlement)
    }

    /// Snapshot of every memo, newest first.
    pub fn memos(&self) -> Result<Vec<Memo>> {
        self.with_store(|store| Ok(store.list().to_vec()))
    }

    /// Memos visible under `mode` and `calendar` at `now`.
    pub fn filtered<Tz: TimeZone>(
        &self,
        mode: SceneMode,
        calendar: CalendarView,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Memo>>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.with_store(|store| {
            Ok(filter_memos(store.list(), mode, calendar, now)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// The to-do schedule strip at `now`.
    pub fn calendar<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Vec<CalendarDay>>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.with_store(|store| Ok(calendar_strip(store.list(), now)))
    }

    /// Look a memo up by full id or unique prefix.
    pub fn find(&self, prefix: &str) -> Result<Memo> {
        self.with_store(|store| store.find_by_prefix(prefix).cloned())
    }

    fn claim(&self) -> Result<ProcessingGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(ProcessingGuard(&self.processing))
    }

    fn finish(&self, id: &MemoId, settlement: Settlement) -> Result<Memo> {
        let outcome = match settlement {
            Settlement::Analyzed { .. } => "analyzed",
            Settlement::Failed { .. } => "degraded",
        };
        let memo = self.with_store(|store| {
            store.settle(id, settlement)?;
            store
                .get(id)
                .cloned()
                .ok_or_else(|| Error::NotFound(id.to_string()))
        })?;
        metrics::memo_settled().add(1, &[KeyValue::new("outcome", outcome)]);
        info!(memo.id = %id, scene = %memo.scene_mode, outcome, "memo settled");
        Ok(memo)
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut MemoStore<B>) -> Result<T>) -> Result<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| Error::Other("memo store lock poisoned".to_string()))?;
        f(&mut store)
    }
}
