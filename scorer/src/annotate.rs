use std::collections::BTreeMap;

use frame_quality_common::frame::CapturedFrame;
use serde::Serialize;
use tracing::{debug, warn};

use crate::score::{FrameScorer, ScoreError};

/// Scores attached to one captured frame.
///
/// A metric that failed on this frame is recorded as `null`; the frame itself
/// is still reported.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub seq: u64,
    pub captured_at_ms: i64,
    pub width: usize,
    pub height: usize,
    pub scores: BTreeMap<String, Option<f32>>,
}

impl QualityReport {
    pub fn score(&self, metric: &str) -> Option<f32> {
        self.scores.get(metric).copied().flatten()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Run every scorer over `frame`. Scorer failures are logged and skipped.
pub fn annotate(frame: &CapturedFrame, scorers: &[Box<dyn FrameScorer>]) -> QualityReport {
    let mut scores = BTreeMap::new();

    match frame.view() {
        Ok(view) => {
            for scorer in scorers {
                let score = match scorer.score(&view) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        skip_warning(frame, scorer.name(), &e);
                        None
                    }
                };
                scores.insert(scorer.name().to_string(), score);
            }
        }
        Err(e) => {
            let e = ScoreError::from(e);
            for scorer in scorers {
                skip_warning(frame, scorer.name(), &e);
                scores.insert(scorer.name().to_string(), None);
            }
        }
    }

    debug!(seq = frame.seq, ?scores, "frame annotated");

    QualityReport {
        seq: frame.seq,
        captured_at_ms: frame.captured_at_ms,
        width: frame.width,
        height: frame.height,
        scores,
    }
}

fn skip_warning(frame: &CapturedFrame, metric: &str, error: &ScoreError) {
    warn!(
        seq = frame.seq,
        metric,
        error = %error,
        "scoring failed, skipping quality annotation"
    );
}
