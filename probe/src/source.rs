use std::sync::atomic::{AtomicU64, Ordering};

use frame_quality_common::frame::{CapturedFrame, FrameError};

static SEQ_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next capture sequence number, shared by every source in the process.
pub fn next_seq() -> u64 {
    SEQ_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Where frames come from.
///
/// The probe takes a frame, scores it and hands it straight back; sources
/// may recycle released buffers for the next capture.
pub trait FrameSource {
    /// Next capture, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError>;

    /// Return a frame after scoring.
    fn release(&mut self, frame: CapturedFrame) {
        drop(frame);
    }

    fn name(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image {0}: {1}")]
    Image(String, image::ImageError),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("source config error: {0}")]
    Config(String),
}
