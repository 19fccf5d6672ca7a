use frame_quality_common::frame::FrameBuffer;
use serde::Serialize;
use tracing::trace;

use super::region::{window, SamplingRegion, SamplingStride};
use super::{FrameScorer, ScoreError};

const CONTRAST_WEIGHT: f64 = 0.3;
const EDGE_WEIGHT: f64 = 0.4;
const DEVIATION_WEIGHT: f64 = 0.3;

/// Mean of each quality term over the sampled points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QualityTerms {
    /// Composite `0.3 * contrast + 0.4 * edge + 0.3 * deviation`, averaged
    /// per sample.
    pub score: f32,
    pub contrast: f32,
    pub edge: f32,
    /// Standard deviation of the 3x3 neighbourhood.
    pub deviation: f32,
    pub samples: u32,
}

/// Composite of local contrast, edge strength and local deviation over the
/// central 40% of the frame, sampled every 10 pixels.
#[derive(Debug, Clone, Copy)]
pub struct Quality {
    stride: SamplingStride,
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            stride: SamplingStride::Fixed(10),
        }
    }
}

impl Quality {
    pub fn new(stride: SamplingStride) -> Self {
        Self { stride }
    }

    pub fn region(&self, width: usize, height: usize) -> SamplingRegion {
        SamplingRegion::new(
            width * 3 / 10..width * 7 / 10,
            height * 3 / 10..height * 7 / 10,
            self.stride.steps(width, height),
        )
    }

    pub fn terms(&self, frame: &FrameBuffer<'_>) -> Result<QualityTerms, ScoreError> {
        if frame.is_empty() {
            return Ok(QualityTerms::default());
        }
        frame.validate()?;
        let region = self.region(frame.width(), frame.height());
        region.check(frame, 1)?;

        let mut total = QualityTerms::default();
        for (x, y) in region.points() {
            let center = frame.sample(x, y);
            let right = frame.sample(x + 1, y);
            let below = frame.sample(x, y + 1);

            let local_contrast = (center - right).abs() + (center - below).abs();

            let gx = right - frame.sample(x - 1, y);
            let gy = below - frame.sample(x, y - 1);
            let edge = ((gx * gx + gy * gy) as f64).sqrt() as f32;

            let n = window(frame, x, y);
            let mut local_mean = 0.0f32;
            for &v in &n {
                local_mean += v as f32;
            }
            local_mean /= 9.0;
            let mut local_var = 0.0f32;
            for &v in &n {
                let diff = v as f32 - local_mean;
                local_var += diff * diff;
            }
            local_var /= 9.0;
            let deviation = (local_var as f64).sqrt();

            let quality = (local_contrast as f64 * CONTRAST_WEIGHT
                + edge as f64 * EDGE_WEIGHT
                + deviation * DEVIATION_WEIGHT) as f32;

            total.score += quality;
            total.contrast += local_contrast as f32;
            total.edge += edge;
            total.deviation += deviation as f32;
            total.samples += 1;
        }

        if total.samples == 0 {
            return Ok(QualityTerms::default());
        }
        let n = total.samples as f32;
        let terms = QualityTerms {
            score: total.score / n,
            contrast: total.contrast / n,
            edge: total.edge / n,
            deviation: total.deviation / n,
            samples: total.samples,
        };
        trace!(
            samples = terms.samples,
            score = terms.score,
            contrast = terms.contrast,
            edge = terms.edge,
            deviation = terms.deviation,
            "composite quality"
        );
        Ok(terms)
    }
}

impl FrameScorer for Quality {
    fn score(&self, frame: &FrameBuffer<'_>) -> Result<f32, ScoreError> {
        self.terms(frame).map(|t| t.score)
    }

    fn name(&self) -> &str {
        "quality"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_quality_common::synthetic;

    fn terms(data: &[u8], width: usize, height: usize) -> Result<QualityTerms, ScoreError> {
        Quality::default().terms(&FrameBuffer::new(data, width, height))
    }

    #[test]
    fn vga_region() {
        let region = Quality::default().region(640, 480);
        assert_eq!(region.x, 192..448);
        assert_eq!(region.y, 144..336);
        // 26 columns x 20 rows
        assert_eq!(region.sample_count(), 520);
    }

    #[test]
    fn mid_gray_vga_is_zero() {
        let data = synthetic::flat(640, 480, 128);
        let t = terms(&data, 640, 480).unwrap();
        assert_eq!(t.score, 0.0);
        assert_eq!(t.contrast, 0.0);
        assert_eq!(t.edge, 0.0);
        assert_eq!(t.deviation, 0.0);
        assert_eq!(t.samples, 520);
    }

    #[test]
    fn single_sample_by_hand() {
        // 4x4 frame samples only (1, 1).
        #[rustfmt::skip]
        let data = [
            0,  0,  0, 0,
            0, 10, 30, 0,
            0, 20,  0, 0,
            0,  0,  0, 0,
        ];
        let t = terms(&data, 4, 4).unwrap();
        assert_eq!(t.samples, 1);
        // |10-30| + |10-20|
        assert_eq!(t.contrast, 30.0);
        // gx = 30 - 0, gy = 20 - 0
        assert!((t.edge - 36.05551).abs() < 1e-4);

        // Six zeros plus 10, 30 and 20 in the window.
        let mean = 60.0f64 / 9.0;
        let var = (6.0 * mean * mean
            + (10.0 - mean).powi(2)
            + (30.0 - mean).powi(2)
            + (20.0 - mean).powi(2))
            / 9.0;
        assert!((t.deviation as f64 - var.sqrt()).abs() < 1e-3);

        let expected = 0.3 * 30.0 + 0.4 * 36.05551 + 0.3 * var.sqrt();
        assert!((t.score as f64 - expected).abs() < 1e-3);
    }

    #[test]
    fn step_through_region_scores_positive() {
        let data = synthetic::vertical_step(640, 480, 193, 0, 255);
        let t = terms(&data, 640, 480).unwrap();
        assert!(t.score > 0.0);
        assert!(t.edge > 0.0);
    }

    #[test]
    fn minimum_size() {
        let data = synthetic::flat(4, 4, 0);
        assert!(terms(&data, 4, 4).is_ok());
        let data = synthetic::flat(3, 4, 0);
        assert!(matches!(terms(&data, 3, 4), Err(ScoreError::MalformedFrame(_))));
        let data = synthetic::flat(4, 3, 0);
        assert!(matches!(terms(&data, 4, 3), Err(ScoreError::MalformedFrame(_))));
    }

    #[test]
    fn empty_frame_is_zero() {
        assert_eq!(terms(&[], 640, 480).unwrap(), QualityTerms::default());
        assert_eq!(Quality::default().score(&FrameBuffer::new(&[], 0, 0)).unwrap(), 0.0);
    }
}
