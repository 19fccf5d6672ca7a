use frame_quality_common::frame::{CapturedFrame, PixelFormat};
use frame_quality_common::synthetic;
use tracing::info;

use crate::source::{next_seq, FrameSource, SourceError};

/// Every fourth frame is box-blurred, so gates have something to drop.
const BLUR_EVERY: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Flat,
    Step,
    Checker,
}

/// Generated test patterns, for running the probe without a camera.
pub struct SyntheticSource {
    pattern: Pattern,
    width: usize,
    height: usize,
    frames: u64,
    produced: u64,
}

impl SyntheticSource {
    pub fn new(
        pattern: &str,
        width: usize,
        height: usize,
        frames: u64,
    ) -> Result<Self, SourceError> {
        let pattern = match pattern {
            "flat" => Pattern::Flat,
            "step" => Pattern::Step,
            "checker" => Pattern::Checker,
            other => {
                return Err(SourceError::Config(format!(
                    "unknown synthetic pattern '{other}', expected flat, step or checker"
                )))
            }
        };
        info!(?pattern, width, height, frames, "synthetic source ready");
        Ok(Self {
            pattern,
            width,
            height,
            frames,
            produced: 0,
        })
    }

    fn render(&self) -> Vec<u8> {
        let (w, h) = (self.width, self.height);
        match self.pattern {
            Pattern::Flat => synthetic::flat(w, h, 128),
            Pattern::Step => synthetic::vertical_step(w, h, w / 2, 16, 235),
            Pattern::Checker => synthetic::checker(w, h, (w / 16).max(2), 16, 235),
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        if self.produced >= self.frames {
            return Ok(None);
        }
        self.produced += 1;

        let mut data = self.render();
        if self.produced % BLUR_EVERY == 0 {
            data = synthetic::box_blur(&data, self.width, self.height);
        }

        Ok(Some(CapturedFrame::now(
            data,
            self.width,
            self.height,
            PixelFormat::Grayscale,
            next_seq(),
        )))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
