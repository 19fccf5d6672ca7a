use std::ops::Range;

use frame_quality_common::config::StrideConfig;
use frame_quality_common::frame::FrameBuffer;

use super::ScoreError;

/// Spacing between analysed sample points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStride {
    /// Same step on both axes regardless of resolution.
    Fixed(usize),
    /// Step derived from the frame size: `max(1, width / columns)` and
    /// `max(1, height / rows)`, so the sample count stays bounded.
    Adaptive { columns: usize, rows: usize },
}

impl SamplingStride {
    pub fn steps(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            SamplingStride::Fixed(step) => (step.max(1), step.max(1)),
            SamplingStride::Adaptive { columns, rows } => (
                (width / columns.max(1)).max(1),
                (height / rows.max(1)).max(1),
            ),
        }
    }
}

impl From<StrideConfig> for SamplingStride {
    fn from(config: StrideConfig) -> Self {
        match config {
            StrideConfig::Fixed { step } => SamplingStride::Fixed(step),
            StrideConfig::Adaptive { columns, rows } => SamplingStride::Adaptive { columns, rows },
        }
    }
}

/// Half-open rectangle of sample points walked row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingRegion {
    pub x: Range<usize>,
    pub y: Range<usize>,
    pub step_x: usize,
    pub step_y: usize,
}

impl SamplingRegion {
    pub fn new(x: Range<usize>, y: Range<usize>, (step_x, step_y): (usize, usize)) -> Self {
        Self {
            x,
            y,
            step_x: step_x.max(1),
            step_y: step_y.max(1),
        }
    }

    /// Verify that every sample and its `margin`-pixel neighbourhood lies
    /// inside the frame, and that the buffer covers the declared area.
    pub fn check(&self, frame: &FrameBuffer<'_>, margin: usize) -> Result<(), ScoreError> {
        frame.validate()?;
        let fits = self.x.start >= margin
            && self.y.start >= margin
            && self.x.end + margin <= frame.width()
            && self.y.end + margin <= frame.height();
        if !fits {
            return Err(ScoreError::MalformedFrame(format!(
                "{}x{} frame is too small for sampling region x={:?} y={:?} with margin {}",
                frame.width(),
                frame.height(),
                self.x,
                self.y,
                margin
            )));
        }
        Ok(())
    }

    /// Sample points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.y.clone().step_by(self.step_y).flat_map(move |y| {
            self.x
                .clone()
                .step_by(self.step_x)
                .map(move |x| (x, y))
        })
    }

    pub fn sample_count(&self) -> usize {
        let along = |r: &Range<usize>, step: usize| r.len().div_ceil(step);
        along(&self.x, self.step_x) * along(&self.y, self.step_y)
    }
}

/// 3x3 neighbourhood of `(x, y)`, row-major from the top-left corner.
pub(crate) fn window(frame: &FrameBuffer<'_>, x: usize, y: usize) -> [i32; 9] {
    [
        frame.sample(x - 1, y - 1),
        frame.sample(x, y - 1),
        frame.sample(x + 1, y - 1),
        frame.sample(x - 1, y),
        frame.sample(x, y),
        frame.sample(x + 1, y),
        frame.sample(x - 1, y + 1),
        frame.sample(x, y + 1),
        frame.sample(x + 1, y + 1),
    ]
}
