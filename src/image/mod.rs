//! Image views and owned float buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! `OwnedImage` is the contiguous `f32` buffer every matcher works on. Pixel
//! values are intensities; `NaN` marks "no sample" where a caller needs it.

use crate::util::{BlockMatchError, BlockMatchResult};

pub mod filter;
#[cfg(feature = "image-io")]
pub mod io;
pub mod mapping;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> BlockMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> BlockMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(BlockMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns `true` if a `width x height` block anchored at `(x, y)` lies
    /// fully inside the image.
    pub fn contains_block(&self, x: i64, y: i64, width: usize, height: usize) -> bool {
        x >= 0
            && y >= 0
            && (x as u64).saturating_add(width as u64) <= self.width as u64
            && (y as u64).saturating_add(height as u64) <= self.height as u64
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> BlockMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(BlockMatchError::InvalidDimensions { width, height });
        }

        let out_of_bounds = BlockMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or(out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or(out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(BlockMatchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(BlockMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl ImageView<'_, f32> {
    /// Samples the image at a real-valued position with bilinear interpolation.
    ///
    /// Pixel centers sit on integer coordinates. Positions outside
    /// `[0, width - 1] x [0, height - 1]` (with a small tolerance) yield `None`.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> Option<f32> {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let epsilon = 1e-4;
        if !x.is_finite()
            || !y.is_finite()
            || x < -epsilon
            || y < -epsilon
            || x > max_x + epsilon
            || y > max_y + epsilon
        {
            return None;
        }

        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let row0 = self.row(y0)?;
        let row1 = self.row(y1)?;
        let top = row0[x0] + (row0[x1] - row0[x0]) * fx;
        let bottom = row1[x0] + (row1[x1] - row1[x0]) * fx;
        Some(top + (bottom - top) * fy)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> BlockMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(BlockMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(BlockMatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(BlockMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous grayscale `f32` image.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> BlockMatchResult<Self> {
        let needed = checked_area(width, height)?;
        if data.len() < needed {
            return Err(BlockMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(BlockMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> BlockMatchResult<Self> {
        let len = checked_area(width, height)?;
        Self::new(vec![value; len], width, height)
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> BlockMatchResult<Self>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let len = checked_area(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Copies a (possibly strided) view into a contiguous image.
    pub fn from_view(view: ImageView<'_, f32>) -> BlockMatchResult<Self> {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(checked_area(width, height)?);
        for y in 0..height {
            let row = view.row(y).ok_or(BlockMatchError::BufferTooSmall {
                needed: (y + 1).saturating_mul(view.stride()),
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major sample buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the row-major sample buffer for in-place edits.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Writes the sample at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

fn checked_area(width: usize, height: usize) -> BlockMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(BlockMatchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(BlockMatchError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage};

    #[test]
    fn bilinear_sampling_interpolates_between_pixels() {
        let img = OwnedImage::from_fn(3, 2, |x, y| (x + 10 * y) as f32).unwrap();
        let view = img.view();
        assert_eq!(view.sample_bilinear(1.0, 1.0), Some(11.0));
        let v = view.sample_bilinear(0.5, 0.5).unwrap();
        assert!((v - 5.5).abs() < 1e-6);
        assert!(view.sample_bilinear(2.5, 0.0).is_none());
        assert!(view.sample_bilinear(-0.1, 0.0).is_none());
    }

    #[test]
    fn contains_block_checks_all_edges() {
        let data = vec![0.0f32; 20];
        let view = ImageView::from_slice(&data, 5, 4).unwrap();
        assert!(view.contains_block(0, 0, 5, 4));
        assert!(view.contains_block(2, 1, 3, 3));
        assert!(!view.contains_block(3, 1, 3, 3));
        assert!(!view.contains_block(-1, 0, 2, 2));
        assert!(!view.contains_block(0, 2, 2, 3));
    }

    #[test]
    fn from_view_copies_strided_rows() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let view = ImageView::new(&data, 3, 3, 4).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.data(), &[0.0, 1.0, 2.0, 4.0, 5.0, 6.0, 8.0, 9.0, 10.0]);
    }
}
