use tracing::debug;

use super::traits::FrameGate;

/// Keeps frames scoring at least `min_score`.
pub struct ThresholdGate {
    min_score: f32,
}

impl ThresholdGate {
    pub fn new(min_score: f32) -> Self {
        Self { min_score }
    }
}

impl FrameGate for ThresholdGate {
    fn should_keep(&mut self, score: f32) -> bool {
        let keep = score >= self.min_score;
        debug!(score, min_score = self.min_score, keep, "threshold check");
        keep
    }

    fn name(&self) -> &str {
        "threshold"
    }
}

/// Keeps every frame.
pub struct PassGate;

impl FrameGate for PassGate {
    fn should_keep(&mut self, _score: f32) -> bool {
        true
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let mut gate = ThresholdGate::new(5.0);
        assert!(gate.should_keep(5.0));
        assert!(gate.should_keep(12.5));
        assert!(!gate.should_keep(4.99));
    }

    #[test]
    fn pass_keeps_zero() {
        assert!(PassGate.should_keep(0.0));
    }
}
