//! Color frame container and grayscale conversion.

use ndarray::{Array2, Array3};

/// A color video frame: `(height, width, 3)` grid of `u8` samples in RGB
/// channel order.
///
/// The Lucas-Kanade tracker consumes the [`to_gray`](Frame::to_gray)
/// derivation; the Meanshift tracker consumes the color grid directly.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Array3<u8>,
}

impl Frame {
    /// Create a black frame with the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array3::zeros((height, width, 3)),
        }
    }

    /// Wrap an existing `(height, width, 3)` pixel grid.
    ///
    /// # Panics
    /// Panics if the innermost dimension is not 3.
    pub fn from_array(data: Array3<u8>) -> Self {
        assert_eq!(data.dim().2, 3, "frame data must have 3 channels");
        Self { data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Get the RGB pixel at (x, y). x is column, y is row.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }

    /// Set the RGB pixel at (x, y).
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        self.data[[y, x, 0]] = rgb[0];
        self.data[[y, x, 1]] = rgb[1];
        self.data[[y, x, 2]] = rgb[2];
    }

    /// Convert to a single-channel float intensity grid using the standard
    /// luma weights (0.299 R + 0.587 G + 0.114 B). Values stay in the raw
    /// [0, 255] range; they are not normalized to [0, 1].
    pub fn to_gray(&self) -> Array2<f32> {
        let (h, w, _) = self.data.dim();
        let mut gray = Array2::zeros((h, w));
        for y in 0..h {
            for x in 0..w {
                let r = self.data[[y, x, 0]] as f32;
                let g = self.data[[y, x, 1]] as f32;
                let b = self.data[[y, x, 2]] as f32;
                gray[[y, x]] = 0.299 * r + 0.587 * g + 0.114 * b;
            }
        }
        gray
    }
}
