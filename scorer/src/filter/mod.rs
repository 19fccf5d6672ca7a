pub mod relative;
pub mod threshold;
pub mod traits;

use frame_quality_common::config::GateConfig;

use crate::BuildError;
use relative::RelativeGate;
use threshold::{PassGate, ThresholdGate};
use traits::FrameGate;

/// Build the gate named by `config.kind`.
pub fn build_gate(config: &GateConfig) -> Result<Box<dyn FrameGate>, BuildError> {
    match config.kind.as_str() {
        "none" => Ok(Box::new(PassGate)),
        "threshold" => Ok(Box::new(ThresholdGate::new(config.min_score))),
        "relative" => Ok(Box::new(RelativeGate::with_smoothing(
            config.keep_ratio,
            config.alpha,
            config.warmup_frames,
        ))),
        other => Err(BuildError::UnknownGate(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_kind() {
        for kind in ["none", "threshold", "relative"] {
            let config = GateConfig {
                kind: kind.into(),
                ..GateConfig::default()
            };
            assert_eq!(build_gate(&config).unwrap().name(), kind);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let config = GateConfig {
            kind: "phash".into(),
            ..GateConfig::default()
        };
        assert!(matches!(build_gate(&config), Err(BuildError::UnknownGate(_))));
    }
}
