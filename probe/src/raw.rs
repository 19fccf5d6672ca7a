use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use frame_quality_common::frame::{CapturedFrame, FrameError, PixelFormat};
use tracing::{debug, info, warn};

use crate::source::{next_seq, FrameSource, SourceError};

/// Fixed-size frames read back to back from a raw video file, e.g. the
/// output of `ffmpeg -pix_fmt gray -f rawvideo`.
pub struct RawFileSource<R = BufReader<File>> {
    reader: R,
    path: PathBuf,
    width: usize,
    height: usize,
    format: PixelFormat,
    frame_len: usize,
    /// Buffers handed back through `release`, reused for later reads.
    spare: Vec<Vec<u8>>,
}

impl RawFileSource {
    pub fn open(
        path: &Path,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        info!(
            path = %path.display(),
            width,
            height,
            pixel_format = format.as_str(),
            "opened raw frame file"
        );
        Self::from_reader(BufReader::new(file), path, width, height, format)
    }
}

impl<R: Read> RawFileSource<R> {
    pub fn from_reader(
        reader: R,
        path: &Path,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, SourceError> {
        let frame_len = format
            .frame_len(width, height)
            .ok_or(FrameError::UnsupportedFormat(format.as_str()))?;
        if frame_len == 0 {
            return Err(SourceError::Config(format!(
                "raw frames must have a non-zero size, got {width}x{height}"
            )));
        }
        Ok(Self {
            reader,
            path: path.to_path_buf(),
            width,
            height,
            format,
            frame_len,
            spare: Vec::new(),
        })
    }

    /// Fill `buf` completely; returns the number of bytes read before EOF.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> FrameSource for RawFileSource<R> {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        let mut buf = self.spare.pop().unwrap_or_default();
        buf.resize(self.frame_len, 0);

        let filled = self.read_full(&mut buf)?;
        if filled == 0 {
            debug!(path = %self.path.display(), "end of raw frame file");
            return Ok(None);
        }
        if filled < self.frame_len {
            warn!(
                path = %self.path.display(),
                got = filled,
                expected = self.frame_len,
                "trailing partial frame, stopping"
            );
            return Ok(None);
        }

        Ok(Some(CapturedFrame::now(
            buf,
            self.width,
            self.height,
            self.format,
            next_seq(),
        )))
    }

    fn release(&mut self, frame: CapturedFrame) {
        if frame.data.capacity() >= self.frame_len {
            self.spare.push(frame.data);
        }
    }

    fn name(&self) -> &str {
        "raw"
    }
}
