//! Inverse-mapping rasterization through a coordinate transform.

use crate::image::{ImageView, OwnedImage};
use crate::transform::CoordinateTransform;

/// Renders `source` into `target` by inverse mapping.
///
/// Each target pixel center `(x, y)` is mapped by `transform` into `source`
/// coordinates and sampled with bilinear interpolation. Target pixels whose
/// mapped position falls outside `source` keep their current value, so the
/// caller pre-fills `target` with the desired "unmapped" content.
///
/// Returns a coverage mask in target layout: `1` where a sample was written,
/// `0` where the pixel kept its fill value.
pub fn map_inverse_interpolated<T>(
    transform: &T,
    source: ImageView<'_, f32>,
    target: &mut OwnedImage,
) -> Vec<u8>
where
    T: CoordinateTransform + ?Sized,
{
    let width = target.width();
    let height = target.height();
    let mut mask = vec![0u8; width * height];
    let out = target.data_mut();

    for y in 0..height {
        for x in 0..width {
            let [sx, sy] = transform.apply([x as f32, y as f32]);
            if let Some(value) = source.sample_bilinear(sx, sy) {
                let idx = y * width + x;
                out[idx] = value;
                mask[idx] = 1;
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::map_inverse_interpolated;
    use crate::image::OwnedImage;
    use crate::transform::{Identity2D, Translation2D};

    #[test]
    fn identity_mapping_copies_and_marks_coverage() {
        let src = OwnedImage::from_fn(4, 3, |x, y| (x * 3 + y) as f32).unwrap();
        let mut dst = OwnedImage::filled(4, 3, -1.0).unwrap();
        let mask = map_inverse_interpolated(&Identity2D, src.view(), &mut dst);
        assert_eq!(dst, src);
        assert!(mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn shifted_mapping_keeps_fill_outside_source() {
        let src = OwnedImage::from_fn(4, 4, |x, y| (x + 10 * y) as f32).unwrap();
        let mut dst = OwnedImage::filled(6, 6, f32::NAN).unwrap();
        let shift = Translation2D::new(-1.0, -1.0);
        let mask = map_inverse_interpolated(&shift, src.view(), &mut dst);

        assert_eq!(mask[0], 0);
        assert!(dst.get(0, 0).unwrap().is_nan());
        assert_eq!(mask[6 + 1], 1);
        assert_eq!(dst.get(1, 1), Some(0.0));
        assert_eq!(dst.get(4, 2), Some(13.0));
        assert!(dst.get(5, 5).unwrap().is_nan());
    }
}
