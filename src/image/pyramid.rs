//! Blur-then-downscale image pyramids.

use image::DynamicImage;
use log::debug;

use super::transform::scale_image;

/// Builds a pyramid of `count` progressively smaller, blurrier images.
///
/// Element 0 is the unmodified input. Each subsequent element is a Gaussian
/// blur (sigma `blur_radius`) of its predecessor, downscaled by
/// `scale_factor`.
///
/// Precondition: with `scale_factor < 1`, `count` must be small enough that
/// every level keeps both dimensions at least 1. A `scale_factor >= 1` is
/// accepted and produces a growing pyramid.
pub fn build_pyramid(
    image: &DynamicImage,
    count: usize,
    scale_factor: f32,
    blur_radius: f32,
) -> Vec<DynamicImage> {
    let mut levels = Vec::with_capacity(count);
    if count == 0 {
        return levels;
    }

    levels.push(image.clone());
    for level in 1..count {
        let blurred = levels[level - 1].blur(blur_radius);
        let scaled = scale_image(&blurred, scale_factor);
        debug!(
            "Pyramid level {}/{}: {}x{}",
            level + 1,
            count,
            scaled.width(),
            scaled.height()
        );
        levels.push(scaled);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(size, size))
    }

    #[test]
    fn returns_exactly_count_levels() {
        let pyramid = build_pyramid(&blank(64), 4, 0.5, 2.0);
        assert_eq!(pyramid.len(), 4);
    }

    #[test]
    fn level_zero_keeps_input_dimensions() {
        let pyramid = build_pyramid(&blank(64), 3, 0.5, 2.0);
        assert_eq!((pyramid[0].width(), pyramid[0].height()), (64, 64));
    }

    #[test]
    fn shrink_is_strictly_monotonic() {
        let pyramid = build_pyramid(&blank(256), 4, 0.7, 2.0);
        for pair in pyramid.windows(2) {
            assert!(pair[1].width() < pair[0].width());
            assert!(pair[1].height() < pair[0].height());
        }
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(build_pyramid(&blank(8), 0, 0.5, 2.0).is_empty());
    }

    #[test]
    fn growth_factor_produces_growing_levels() {
        let pyramid = build_pyramid(&blank(8), 3, 2.0, 1.0);
        assert_eq!(pyramid[2].width(), 32);
    }
}
