use serde::Deserialize;

/// Pixel layout reported by the frame source.
///
/// Only single-channel luma, or the luma plane of a planar YUV format, can be
/// scored. Packed and compressed layouts are rejected instead of being
/// misread as one byte per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit luma, one byte per pixel.
    Grayscale,
    /// Planar YUV 4:2:0: full-size Y plane followed by quarter-size U and V.
    Yuv420p,
    /// Semi-planar YUV 4:2:0: full-size Y plane followed by interleaved UV.
    Nv12,
    /// Packed YUYV 4:2:2.
    Yuv422,
    /// Packed 16-bit RGB.
    Rgb565,
    /// Compressed JPEG bitstream.
    Jpeg,
}

impl PixelFormat {
    /// Byte size of one whole frame in this format, or `None` when the size
    /// is not determined by the dimensions (JPEG).
    pub fn frame_len(self, width: usize, height: usize) -> Option<usize> {
        let area = width.checked_mul(height)?;
        match self {
            PixelFormat::Grayscale => Some(area),
            PixelFormat::Yuv420p | PixelFormat::Nv12 => area.checked_mul(3).map(|n| n / 2),
            PixelFormat::Yuv422 | PixelFormat::Rgb565 => area.checked_mul(2),
            PixelFormat::Jpeg => None,
        }
    }

    /// Whether the first `width * height` bytes of a frame are a luma plane.
    pub fn has_luma_plane(self) -> bool {
        matches!(
            self,
            PixelFormat::Grayscale | PixelFormat::Yuv420p | PixelFormat::Nv12
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelFormat::Grayscale => "grayscale",
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Yuv422 => "yuv422",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Jpeg => "jpeg",
        }
    }
}

/// Read-only view over a single-channel luma raster in row-major order.
///
/// `data[y * width + x]` addresses pixel `(x, y)`. The view never owns the
/// bytes; it lives only as long as the capture it was taken from.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// View the luma plane of a frame captured in `format`.
    ///
    /// For planar formats the luma plane is the leading `width * height`
    /// bytes; anything after it (chroma) is not part of the view.
    pub fn luma_plane(
        data: &'a [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        if !format.has_luma_plane() {
            return Err(FrameError::UnsupportedFormat(format.as_str()));
        }
        let luma_len = width.saturating_mul(height);
        let data = if format == PixelFormat::Grayscale || data.len() < luma_len {
            data
        } else {
            &data[..luma_len]
        };
        Ok(Self::new(data, width, height))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// True for a null, zero-length or zero-area frame. Such frames score
    /// `0` everywhere rather than being treated as errors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }

    /// Check that the buffer holds at least the declared `width * height`
    /// samples.
    pub fn validate(&self) -> Result<(), FrameError> {
        let expected = self
            .width
            .checked_mul(self.height)
            .ok_or(FrameError::Malformed {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            })?;
        if self.data.len() < expected {
            return Err(FrameError::Malformed {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            });
        }
        Ok(())
    }

    /// Bounds-checked pixel read.
    pub fn pixel_at(&self, x: usize, y: usize) -> Result<u8, FrameError> {
        if x >= self.width || y >= self.height {
            return Err(FrameError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.data
            .get(y * self.width + x)
            .copied()
            .ok_or(FrameError::Malformed {
                width: self.width,
                height: self.height,
                len: self.data.len(),
            })
    }

    /// Unchecked-by-contract pixel read for sampling loops.
    ///
    /// Callers derive their sampling region from the frame dimensions and
    /// validate it first, so `(x, y)` is always inside a validated buffer.
    /// Slice indexing still guards memory safety.
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x] as i32
    }
}

/// An owned capture handed out by a frame source.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub captured_at_ms: i64,
    pub seq: u64,
}

impl CapturedFrame {
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        format: PixelFormat,
        captured_at_ms: i64,
        seq: u64,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            captured_at_ms,
            seq,
        }
    }

    /// Stamp a capture with the current wall-clock time.
    pub fn now(data: Vec<u8>, width: usize, height: usize, format: PixelFormat, seq: u64) -> Self {
        let captured_at_ms = chrono::Utc::now().timestamp_millis();
        Self::new(data, width, height, format, captured_at_ms, seq)
    }

    /// Luma view of this capture.
    pub fn view(&self) -> Result<FrameBuffer<'_>, FrameError> {
        FrameBuffer::luma_plane(&self.data, self.width, self.height, self.format)
    }

    pub fn payload_size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame: {width}x{height} needs more than the {len} bytes supplied")]
    Malformed {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("pixel format {0} has no luma plane")]
    UnsupportedFormat(&'static str),
}
