//! Frame-quality scoring over luma buffers.
//!
//! The [`score`] module holds the four pixel-level scorers (point gradient,
//! weighted Laplacian, Sobel text sharpness and the composite quality
//! metric). [`annotate`] runs a configured set of scorers over a capture and
//! [`filter`] turns a score stream into keep/skip decisions.

pub mod annotate;
pub mod filter;
pub mod score;

pub use annotate::{annotate, QualityReport};
pub use filter::build_gate;
pub use filter::traits::FrameGate;
pub use score::{
    build_scorers, gradient, quality, quality_terms, sharpness, text_sharpness, FrameScorer,
    Metric, ScoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("unknown metric {0}, expected sharpness, text_sharpness or quality")]
    UnknownMetric(String),
    #[error("unknown gate {0}, expected none, threshold or relative")]
    UnknownGate(String),
}
