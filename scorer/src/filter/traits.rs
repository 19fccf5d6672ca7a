/// Decides whether a scored frame is worth keeping.
///
/// Gates see one score per frame, always from the same scorer, and may keep
/// state across frames (e.g. a running baseline).
pub trait FrameGate: Send + Sync {
    /// Returns `true` to keep the frame, `false` to mark it as below par.
    fn should_keep(&mut self, score: f32) -> bool;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
