use std::path::{Path, PathBuf};

use frame_quality_common::frame::{CapturedFrame, PixelFormat};
use image::{ImageFormat, ImageReader};
use tracing::{debug, info};

use crate::source::{next_seq, FrameSource, SourceError};

/// Still images decoded one per frame and converted to 8-bit luma.
pub struct ImageFileSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageFileSource {
    /// Open a single image, or every image in a directory sorted by file name.
    /// Files whose extension is not a known image format are ignored.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let paths = if path.is_dir() {
            let mut paths = Vec::new();
            for entry in std::fs::read_dir(path)? {
                let p = entry?.path();
                if p.is_file() && ImageFormat::from_path(&p).is_ok() {
                    paths.push(p);
                }
            }
            paths.sort();
            if paths.is_empty() {
                return Err(SourceError::Config(format!(
                    "no images found in {}",
                    path.display()
                )));
            }
            paths
        } else {
            vec![path.to_path_buf()]
        };

        info!(path = %path.display(), images = paths.len(), "opened image source");
        Ok(Self { paths, next: 0 })
    }

    fn decode(path: &Path) -> Result<image::GrayImage, SourceError> {
        let image_err = |e| SourceError::Image(path.display().to_string(), e);
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let image = reader.decode().map_err(image_err)?;
        Ok(image.to_luma8())
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let luma = Self::decode(path)?;
        let (width, height) = (luma.width() as usize, luma.height() as usize);
        debug!(path = %path.display(), width, height, "decoded image");

        Ok(Some(CapturedFrame::now(
            luma.into_raw(),
            width,
            height,
            PixelFormat::Grayscale,
            next_seq(),
        )))
    }

    fn name(&self) -> &str {
        "image"
    }
}
