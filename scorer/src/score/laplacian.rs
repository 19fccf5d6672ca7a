use frame_quality_common::frame::FrameBuffer;
use tracing::trace;

use super::region::{SamplingRegion, SamplingStride};
use super::{FrameScorer, ScoreError};

/// Weight of samples outside the central third of the frame.
const PERIPHERY_WEIGHT: f32 = 0.5;

/// Position-weighted Laplacian sharpness over the central half of the frame.
///
/// Samples a coarse grid (at most ~20x15 points with the default stride),
/// takes the absolute 4-neighbour Laplacian at each point and averages them,
/// counting points inside the central third fully and the rest at half
/// weight.
#[derive(Debug, Clone, Copy)]
pub struct Sharpness {
    stride: SamplingStride,
}

impl Default for Sharpness {
    fn default() -> Self {
        Self {
            stride: SamplingStride::Adaptive {
                columns: 20,
                rows: 15,
            },
        }
    }
}

impl Sharpness {
    pub fn new(stride: SamplingStride) -> Self {
        Self { stride }
    }

    pub fn region(&self, width: usize, height: usize) -> SamplingRegion {
        SamplingRegion::new(
            width / 4..width * 3 / 4,
            height / 4..height * 3 / 4,
            self.stride.steps(width, height),
        )
    }

    /// Full weight inside `[width/3, width*2/3] x [height/3, height*2/3]`,
    /// bounds inclusive.
    fn weight(x: usize, y: usize, width: usize, height: usize) -> f32 {
        if x < width / 3 || x > width * 2 / 3 || y < height / 3 || y > height * 2 / 3 {
            PERIPHERY_WEIGHT
        } else {
            1.0
        }
    }
}

impl FrameScorer for Sharpness {
    fn score(&self, frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
        if frame.is_empty() {
            return Ok(0.0);
        }
        frame.validate()?;
        let (width, height) = (frame.width(), frame.height());
        let region = self.region(width, height);
        region.check(frame, 1)?;

        let mut total_sharpness = 0.0f32;
        let mut total_weight = 0.0f32;
        for (x, y) in region.points() {
            let laplacian = (4 * frame.sample(x, y)
                - frame.sample(x - 1, y)
                - frame.sample(x + 1, y)
                - frame.sample(x, y - 1)
                - frame.sample(x, y + 1))
            .abs();

            let weight = Self::weight(x, y, width, height);
            total_sharpness += laplacian as f32 * weight;
            total_weight += weight;
        }

        let score = if total_weight > 0.0 {
            total_sharpness / total_weight
        } else {
            0.0
        };
        trace!(samples = region.sample_count(), score, "laplacian sharpness");
        Ok(score)
    }

    fn name(&self) -> &str {
        "sharpness"
    }
}
