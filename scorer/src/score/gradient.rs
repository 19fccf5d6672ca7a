use frame_quality_common::frame::FrameBuffer;

use super::ScoreError;

/// Two-point gradient magnitude at `(x, y)`.
///
/// Half the absolute central difference on each axis, combined as a
/// Euclidean norm. Only interior pixels (`1 <= x < width - 1`,
/// `1 <= y < height - 1`) have both neighbours; anything else is
/// `OutOfRange`. An empty frame scores `0`.
pub fn gradient(frame: &FrameBuffer<'_>, x: usize, y: usize) -> Result<f32, ScoreError> {
    if frame.is_empty() {
        return Ok(0.0);
    }
    frame.validate()?;

    let (width, height) = (frame.width(), frame.height());
    if x == 0 || y == 0 || x >= width - 1 || y >= height - 1 {
        return Err(ScoreError::OutOfRange {
            x,
            y,
            width,
            height,
        });
    }

    let dx = (frame.sample(x + 1, y) - frame.sample(x - 1, y)).abs() as f32 / 2.0;
    let dy = (frame.sample(x, y + 1) - frame.sample(x, y - 1)).abs() as f32 / 2.0;
    Ok((dx * dx + dy * dy).sqrt())
}
