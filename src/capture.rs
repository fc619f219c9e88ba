//! Audio capture surface.
//!
//! A device hands out a [`Recording`] when capture starts; the recording
//! accumulates binary chunks until it is stopped, which finalizes them into
//! a single [`AudioPayload`]. Failing to acquire the device is reported as
//! [`Error::Capture`] before any memo exists.

use std::io::Read;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// MIME type assumed when nothing better is known.
pub const DEFAULT_AUDIO_MIME: &str = "audio/mp3";

const FILE_CHUNK_BYTES: usize = 64 * 1024;

/// A finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub mime_type: String,
    pub data: Vec<u8>,
    /// Where the audio came from, kept on the memo as its audio reference.
    pub source: Option<String>,
}

impl AudioPayload {
    /// Inline encoding for the gateway.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An in-progress recording.
#[derive(Debug)]
pub struct Recording {
    mime_type: String,
    source: Option<String>,
    chunks: Vec<Vec<u8>>,
}

impl Recording {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source: None,
            chunks: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Append a chunk. Empty chunks are dropped.
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_vec());
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Finalize the accumulated chunks into one payload.
    pub fn stop(self) -> AudioPayload {
        AudioPayload {
            mime_type: self.mime_type,
            data: self.chunks.concat(),
            source: self.source,
        }
    }
}

/// Something that can record audio.
pub trait CaptureDevice: Send {
    /// Acquire the device and begin a recording.
    fn start(&mut self) -> Result<Recording>;
}

/// A capture device backed by an existing audio file.
///
/// Starting the capture opens the file and streams it into the recording in
/// fixed-size chunks, the way a live device would deliver data.
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CaptureDevice for FileCapture {
    fn start(&mut self) -> Result<Recording> {
        let mut file = std::fs::File::open(&self.path)
            .map_err(|e| Error::Capture(format!("cannot open {}: {e}", self.path.display())))?;

        let mut recording = Recording::new(mime_for_path(&self.path))
            .with_source(self.path.display().to_string());
        let mut buf = vec![0u8; FILE_CHUNK_BYTES];
        loop {
            let n = file
                .read(&mut buf)
                .map_err(|e| Error::Capture(format!("read {}: {e}", self.path.display())))?;
            if n == 0 {
                break;
            }
            recording.push_chunk(&buf[..n]);
        }
        Ok(recording)
    }
}

/// Guess an audio MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("ogg" | "oga") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => DEFAULT_AUDIO_MIME,
    }
}
