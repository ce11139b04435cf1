//! Host-side image handling: tensor conversions, pyramids and blending.

pub mod pyramid;
pub mod transform;

pub use pyramid::build_pyramid;
pub use transform::{clip, scale_image, to_image, to_tensor};

use image::RgbImage;
use imageproc::pixelops::interpolate;

/// Linearly blends `overlay` into `base`.
///
/// `overlay_weight` of 0.0 returns `base` unchanged, 1.0 returns `overlay`.
/// Both images must share the same dimensions.
pub fn blend_images(base: &RgbImage, overlay: &RgbImage, overlay_weight: f32) -> RgbImage {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());

    let mut blended = RgbImage::new(base.width(), base.height());
    for (x, y, pixel) in blended.enumerate_pixels_mut() {
        *pixel = interpolate(*overlay.get_pixel(x, y), *base.get_pixel(x, y), overlay_weight);
    }
    blended
}
