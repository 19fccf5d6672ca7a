pub mod composite;
pub mod gradient;
pub mod laplacian;
pub mod region;
pub mod sobel;

use std::fmt;
use std::str::FromStr;

use frame_quality_common::config::ScoringConfig;
use frame_quality_common::frame::{FrameBuffer, FrameError};
use serde::{Deserialize, Serialize};

pub use composite::{Quality, QualityTerms};
pub use gradient::gradient;
pub use laplacian::Sharpness;
pub use region::{SamplingRegion, SamplingStride};
pub use sobel::TextSharpness;

/// A per-frame quality metric.
///
/// Implementations are pure functions of the frame and their own fixed
/// parameters. Scores are non-negative and only comparable with other scores
/// from the same scorer configured the same way.
pub trait FrameScorer: Send + Sync {
    fn score(&self, frame: &FrameBuffer<'_>) -> Result<f32, ScoreError>;

    /// Human-readable name for logging and reports.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Weighted Laplacian sharpness with the default stride.
pub fn sharpness(frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
    Sharpness::default().score(frame)
}

/// Sobel + contrast text sharpness with the default stride.
pub fn text_sharpness(frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
    TextSharpness::default().score(frame)
}

/// Composite contrast/edge/deviation quality with the default stride.
pub fn quality(frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
    Quality::default().score(frame)
}

/// Individual quality terms with the default stride.
pub fn quality_terms(frame: &FrameBuffer<'_>) -> Result<QualityTerms, ScoreError> {
    Quality::default().terms(frame)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sharpness,
    TextSharpness,
    Quality,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Sharpness => "sharpness",
            Metric::TextSharpness => "text_sharpness",
            Metric::Quality => "quality",
        }
    }

    /// Build the scorer for this metric with the configured stride.
    pub fn scorer(self, config: &ScoringConfig) -> Box<dyn FrameScorer> {
        match self {
            Metric::Sharpness => Box::new(Sharpness::new(config.sharpness_stride.into())),
            Metric::TextSharpness => Box::new(TextSharpness::new(config.text_stride.into())),
            Metric::Quality => Box::new(Quality::new(config.quality_stride.into())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = crate::BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharpness" => Ok(Metric::Sharpness),
            "text_sharpness" => Ok(Metric::TextSharpness),
            "quality" => Ok(Metric::Quality),
            other => Err(crate::BuildError::UnknownMetric(other.to_string())),
        }
    }
}

/// Build every scorer listed in `config.metrics`, in order.
pub fn build_scorers(
    config: &ScoringConfig,
) -> Result<Vec<Box<dyn FrameScorer>>, crate::BuildError> {
    config
        .metrics
        .iter()
        .map(|name| name.parse::<Metric>().map(|m| m.scorer(config)))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("pixel ({x}, {y}) is outside the interior of the {width}x{height} frame")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("unsupported frame: {0}")]
    UnsupportedFormat(String),
}

impl From<FrameError> for ScoreError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::OutOfRange {
                x,
                y,
                width,
                height,
            } => ScoreError::OutOfRange {
                x,
                y,
                width,
                height,
            },
            FrameError::UnsupportedFormat(_) => ScoreError::UnsupportedFormat(e.to_string()),
            FrameError::Malformed { .. } => ScoreError::MalformedFrame(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_quality_common::synthetic;
    use proptest::prelude::*;

    #[test]
    fn mid_gray_vga_scores_zero_everywhere() {
        let data = synthetic::flat(640, 480, 128);
        let frame = FrameBuffer::new(&data, 640, 480);
        assert_eq!(sharpness(&frame).unwrap(), 0.0);
        assert_eq!(text_sharpness(&frame).unwrap(), 0.0);
        assert_eq!(quality(&frame).unwrap(), 0.0);
        assert_eq!(gradient(&frame, 320, 240).unwrap(), 0.0);
    }

    #[test]
    fn null_and_zero_length_frames_score_zero() {
        for frame in [
            FrameBuffer::new(&[], 0, 0),
            FrameBuffer::new(&[], 640, 480),
            FrameBuffer::new(&[1, 2, 3, 4], 0, 4),
        ] {
            assert_eq!(sharpness(&frame).unwrap(), 0.0);
            assert_eq!(text_sharpness(&frame).unwrap(), 0.0);
            assert_eq!(quality(&frame).unwrap(), 0.0);
            assert_eq!(gradient(&frame, 1, 1).unwrap(), 0.0);
        }
    }

    #[test]
    fn flat_frame_quality_terms() {
        let data = synthetic::flat(64, 48, 77);
        let terms = quality_terms(&FrameBuffer::new(&data, 64, 48)).unwrap();
        assert_eq!(terms.edge, 0.0);
        assert_eq!(terms.contrast, 0.0);
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in [Metric::Sharpness, Metric::TextSharpness, Metric::Quality] {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
        assert!("focus".parse::<Metric>().is_err());
        assert_eq!(
            serde_json::to_string(&Metric::TextSharpness).unwrap(),
            "\"text_sharpness\""
        );
    }

    #[test]
    fn build_scorers_follows_config_order() {
        let config = ScoringConfig {
            metrics: vec!["quality".into(), "sharpness".into()],
            ..ScoringConfig::default()
        };
        let scorers = build_scorers(&config).unwrap();
        let names: Vec<_> = scorers.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["quality", "sharpness"]);
    }

    #[test]
    fn build_scorers_rejects_unknown() {
        let config = ScoringConfig {
            metrics: vec!["sharpness".into(), "bogus".into()],
            ..ScoringConfig::default()
        };
        assert!(build_scorers(&config).is_err());
    }

    #[test]
    fn frame_error_maps_to_score_error() {
        let e: ScoreError = FrameError::OutOfRange {
            x: 9,
            y: 1,
            width: 4,
            height: 4,
        }
        .into();
        assert!(matches!(e, ScoreError::OutOfRange { x: 9, .. }));

        let e: ScoreError = FrameError::Malformed {
            width: 4,
            height: 4,
            len: 3,
        }
        .into();
        assert!(matches!(e, ScoreError::MalformedFrame(_)));
    }

    #[test]
    fn scorers_are_shareable_across_threads() {
        let data = synthetic::checker(64, 48, 3, 0, 255);
        let scorers = build_scorers(&ScoringConfig::default()).unwrap();
        let expected: Vec<f32> = scorers
            .iter()
            .map(|s| s.score(&FrameBuffer::new(&data, 64, 48)).unwrap())
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        scorers
                            .iter()
                            .map(|s| s.score(&FrameBuffer::new(&data, 64, 48)).unwrap())
                            .collect::<Vec<f32>>()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn oversized_dimensions_are_malformed() {
        let data = [0u8; 16];
        for (w, h) in [(usize::MAX / 2, 2), (2, usize::MAX / 2), (usize::MAX, usize::MAX)] {
            let frame = FrameBuffer::new(&data, w, h);
            assert!(matches!(sharpness(&frame), Err(ScoreError::MalformedFrame(_))));
            assert!(matches!(text_sharpness(&frame), Err(ScoreError::MalformedFrame(_))));
            assert!(matches!(quality(&frame), Err(ScoreError::MalformedFrame(_))));
            assert!(matches!(quality_terms(&frame), Err(ScoreError::MalformedFrame(_))));
            assert!(matches!(gradient(&frame, 1, 1), Err(ScoreError::MalformedFrame(_))));
        }
    }

    fn frame_strategy() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
        (6usize..48, 6usize..48).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), prop::collection::vec(any::<u8>(), w * h))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn scores_are_non_negative((w, h, data) in frame_strategy()) {
            let frame = FrameBuffer::new(&data, w, h);
            prop_assert!(sharpness(&frame).unwrap() >= 0.0);
            prop_assert!(text_sharpness(&frame).unwrap() >= 0.0);
            prop_assert!(quality(&frame).unwrap() >= 0.0);
            prop_assert!(gradient(&frame, w / 2, h / 2).unwrap() >= 0.0);
        }

        #[test]
        fn scores_are_deterministic((w, h, data) in frame_strategy()) {
            let frame = FrameBuffer::new(&data, w, h);
            prop_assert_eq!(
                sharpness(&frame).unwrap().to_bits(),
                sharpness(&frame).unwrap().to_bits()
            );
            prop_assert_eq!(
                text_sharpness(&frame).unwrap().to_bits(),
                text_sharpness(&frame).unwrap().to_bits()
            );
            prop_assert_eq!(quality(&frame).unwrap().to_bits(), quality(&frame).unwrap().to_bits());
        }

        #[test]
        fn undersized_buffers_never_panic(
            w in 0usize..64,
            h in 0usize..64,
            len in 0usize..512,
        ) {
            let data = vec![200u8; len];
            let frame = FrameBuffer::new(&data, w, h);
            let _ = sharpness(&frame);
            let _ = text_sharpness(&frame);
            let _ = quality(&frame);
            let _ = gradient(&frame, w / 2, h / 2);
        }
    }
}
