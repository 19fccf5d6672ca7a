//! Synthetic luma test patterns.
//!
//! Used by the synthetic frame source and by tests that need frames with a
//! known edge layout without a camera attached.

/// Constant-value frame.
pub fn flat(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// Hard vertical edge: columns `< edge_x` are `low`, the rest `high`.
pub fn vertical_step(width: usize, height: usize, edge_x: usize, low: u8, high: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..height {
        data.extend((0..width).map(|x| if x < edge_x { low } else { high }));
    }
    data
}

/// One-pixel-wide vertical line at `line_x` on a uniform background.
pub fn vertical_line(
    width: usize,
    height: usize,
    line_x: usize,
    background: u8,
    line: u8,
) -> Vec<u8> {
    let mut data = flat(width, height, background);
    if line_x < width {
        for y in 0..height {
            data[y * width + line_x] = line;
        }
    }
    data
}

/// Checkerboard with square cells of `cell` pixels.
pub fn checker(width: usize, height: usize, cell: usize, low: u8, high: u8) -> Vec<u8> {
    let cell = cell.max(1);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        data.extend((0..width).map(|x| {
            if (x / cell + y / cell) % 2 == 0 {
                low
            } else {
                high
            }
        }));
    }
    data
}

/// 3x3 box blur; the window is clipped at the frame border.
pub fn box_blur(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u32;
            let mut count = 0u32;
            for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                    sum += data[ny * width + nx] as u32;
                    count += 1;
                }
            }
            out[y * width + x] = (sum / count) as u8;
        }
    }
    out
}
