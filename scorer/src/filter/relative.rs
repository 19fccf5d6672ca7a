use tracing::debug;

use super::traits::FrameGate;

/// Scene-relative quality gate.
///
/// Absolute scores depend on the scene (a blank wall is never "sharp"), so
/// this gate compares each frame against an exponential moving average of
/// the scores that came before it. A frame is kept when
/// `score >= keep_ratio * ema`, i.e. when it is not markedly worse than the
/// recent baseline.
pub struct RelativeGate {
    /// Exponential moving average of recent scores.
    avg_score: f64,
    /// EMA smoothing factor (0..1). Lower = smoother/slower adaptation.
    alpha: f64,
    keep_ratio: f64,
    /// Total frames seen (for warmup period).
    frames_seen: u64,
    /// Number of frames before the gate starts rejecting (warmup).
    warmup_frames: u64,
}

impl RelativeGate {
    pub fn new(keep_ratio: f64) -> Self {
        Self::with_smoothing(keep_ratio, 0.05, 30)
    }

    pub fn with_smoothing(keep_ratio: f64, alpha: f64, warmup_frames: u64) -> Self {
        Self {
            avg_score: 0.0,
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            keep_ratio,
            frames_seen: 0,
            warmup_frames,
        }
    }

    pub fn baseline(&self) -> f64 {
        self.avg_score
    }

    fn update_ema(&mut self, score: f64) {
        if self.frames_seen <= 1 {
            self.avg_score = score;
        } else {
            self.avg_score = self.alpha * score + (1.0 - self.alpha) * self.avg_score;
        }
    }
}

impl FrameGate for RelativeGate {
    /// - During warmup every frame is kept while the EMA stabilises.
    /// - Afterwards a frame is kept if it reaches `keep_ratio` of the EMA.
    /// - The EMA absorbs every score, kept or not, so the baseline follows
    ///   scene changes.
    fn should_keep(&mut self, score: f32) -> bool {
        self.frames_seen += 1;
        let score = score as f64;

        if self.frames_seen <= self.warmup_frames {
            self.update_ema(score);
            debug!(
                score,
                ema = self.avg_score,
                frames_seen = self.frames_seen,
                "warmup, keeping"
            );
            return true;
        }

        let threshold = self.keep_ratio * self.avg_score;
        let keep = score >= threshold;

        debug!(
            score = format!("{:.2}", score),
            ema = format!("{:.2}", self.avg_score),
            threshold = format!("{:.2}", threshold),
            keep,
            "relative quality check"
        );

        self.update_ema(score);
        keep
    }

    fn name(&self) -> &str {
        "relative"
    }
}
