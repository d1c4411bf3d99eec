use dinobot_stats::descriptive::DescriptiveStats;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("frame buffer has {actual} pixels, expected {width}x{height}")]
pub struct FrameSizeError {
    width: usize,
    height: usize,
    actual: usize,
}

/// An immutable grayscale capture of the board region.
///
/// Pixels are stored row-major, one intensity byte per pixel (0 = black, 255 = white).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wraps a row-major pixel buffer.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, FrameSizeError> {
        if pixels.len() != width * height {
            return Err(FrameSizeError {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel.
    #[must_use]
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> u8,
    {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Builds a frame where every pixel has the same intensity.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mean and spread of every pixel intensity, `None` for an empty frame.
    #[must_use]
    pub fn intensity_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.pixels.iter().copied().map(f32::from))
    }

    /// Mean intensity of each column, left to right.
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    #[must_use]
    pub fn column_means(&self) -> Vec<f32> {
        if self.width == 0 || self.height == 0 {
            return vec![];
        }
        let mut sums = vec![0_u64; self.width];
        for row in self.pixels.chunks_exact(self.width) {
            for (sum, pixel) in sums.iter_mut().zip(row) {
                *sum += u64::from(*pixel);
            }
        }
        let height = self.height as f64;
        sums.into_iter()
            .map(|sum| (sum as f64 / height) as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_buffer() {
        assert!(Frame::new(3, 2, vec![0; 6]).is_ok());
        let err = Frame::new(3, 2, vec![0; 5]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "frame buffer has 5 pixels, expected 3x2"
        );
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let frame = Frame::from_fn(3, 2, |x, y| u8::try_from(y * 10 + x).unwrap());
        assert_eq!(frame.pixels(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!((frame.width(), frame.height()), (3, 2));
    }

    #[test]
    fn test_column_means() {
        let frame = Frame::new(3, 2, vec![10, 0, 255, 20, 1, 255]).unwrap();
        assert_eq!(frame.column_means(), vec![15.0, 0.5, 255.0]);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::filled(0, 0, 0);
        assert!(frame.column_means().is_empty());
        assert!(frame.intensity_stats().is_none());
    }
}
