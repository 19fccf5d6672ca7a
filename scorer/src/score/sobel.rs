use frame_quality_common::frame::FrameBuffer;
use tracing::trace;

use super::region::{window, SamplingRegion, SamplingStride};
use super::{FrameScorer, ScoreError};

/// Sobel edge strength weighted by local contrast, tuned for text.
///
/// Walks the central two thirds of the frame with a fixed 5-pixel step. Each
/// sample is the Sobel gradient magnitude scaled by `0.3 + 0.7 * contrast`,
/// where contrast is the normalised 3x3 min/max spread, so crisp edges in
/// high-contrast neighbourhoods dominate low-contrast noise.
#[derive(Debug, Clone, Copy)]
pub struct TextSharpness {
    stride: SamplingStride,
}

impl Default for TextSharpness {
    fn default() -> Self {
        Self {
            stride: SamplingStride::Fixed(5),
        }
    }
}

impl TextSharpness {
    pub fn new(stride: SamplingStride) -> Self {
        Self { stride }
    }

    pub fn region(&self, width: usize, height: usize) -> SamplingRegion {
        SamplingRegion::new(
            width / 6..width * 5 / 6,
            height / 6..height * 5 / 6,
            self.stride.steps(width, height),
        )
    }
}

fn sobel(n: &[i32; 9]) -> (i32, i32) {
    let gx = -n[0] + n[2] - 2 * n[3] + 2 * n[5] - n[6] + n[8];
    let gy = -n[0] - 2 * n[1] - n[2] + n[6] + 2 * n[7] + n[8];
    (gx, gy)
}

impl FrameScorer for TextSharpness {
    fn score(&self, frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
        if frame.is_empty() {
            return Ok(0.0);
        }
        frame.validate()?;
        let region = self.region(frame.width(), frame.height());
        region.check(frame, 1)?;

        let mut total_sharpness = 0.0f32;
        let mut samples = 0u32;
        for (x, y) in region.points() {
            let n = window(frame, x, y);
            let (gx, gy) = sobel(&n);
            let gradient = ((gx * gx + gy * gy) as f64).sqrt() as f32;

            let (min, max) = n
                .iter()
                .fold((255, 0), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let contrast = (max - min) as f32 / 255.0;

            let sharpness = (gradient as f64 * (0.3 + 0.7 * contrast as f64)) as f32;
            total_sharpness += sharpness;
            samples += 1;
        }

        let score = if samples > 0 {
            total_sharpness / samples as f32
        } else {
            0.0
        };
        trace!(samples, score, "text sharpness");
        Ok(score)
    }

    fn name(&self) -> &str {
        "text_sharpness"
    }
}
