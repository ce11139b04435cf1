//! Multi-scale orchestration of the dream pipeline.

use burn::tensor::backend::AutodiffBackend;
use image::{imageops::FilterType, DynamicImage, RgbImage};
use log::{debug, info};

use super::optimizer::ScaleOptimizer;
use crate::config::DreamParams;
use crate::error::{DreamError, Result};
use crate::image::{blend_images, build_pyramid, transform};
use crate::model::{Backbone, TappedBackbone};

/// Runs the full dream pipeline: pyramid construction, per-scale gradient
/// ascent from the smallest level upward, and blending of each intermediate
/// dream into the next level.
#[derive(Debug)]
pub struct DreamEngine<B: AutodiffBackend, N: Backbone<B>> {
    tapped: TappedBackbone<B, N>,
    device: B::Device,
}

impl<B: AutodiffBackend, N: Backbone<B>> DreamEngine<B, N> {
    /// Wraps `net` with activation taps on `monitored_layers`.
    ///
    /// Unknown layer names fail here, before any image is processed.
    pub fn new(net: N, monitored_layers: &[impl AsRef<str>], device: B::Device) -> Result<Self> {
        let tapped = TappedBackbone::new(net, monitored_layers)?;
        info!(
            "Initialising dream engine with {} monitored layers",
            monitored_layers.len()
        );
        Ok(Self { tapped, device })
    }

    /// Dreams over `image` and returns the result at the input's dimensions.
    ///
    /// Levels are visited from the smallest up. Each level after the first
    /// is blended toward the previous level's dream (weight
    /// `blend_factor`), optimised at `working_size` with a step damped by
    /// the per-level learning weight, and converted back to an image at the
    /// level's own dimensions. The last level is the unmodified input, so
    /// the output keeps the input's dimensions.
    pub fn run(&mut self, image: &DynamicImage, params: &DreamParams) -> Result<RgbImage> {
        params.validate()?;

        info!(
            "Creating {} pyramid levels (scale factor {})",
            params.inception_count, params.scale_factor
        );
        let pyramid = build_pyramid(
            image,
            params.inception_count,
            params.scale_factor,
            params.blur_radius,
        );

        let total = pyramid.len();
        let mut dream: Option<RgbImage> = None;

        for (weight, level) in pyramid.iter().rev().enumerate() {
            let (width, height) = (level.width(), level.height());
            debug!(
                "Optimising level {}/{} at {}x{}",
                weight + 1,
                total,
                width,
                height
            );

            let base = level.to_rgb8();
            let blended = match &dream {
                Some(previous) => {
                    let upsampled = DynamicImage::ImageRgb8(previous.clone())
                        .resize_exact(width, height, FilterType::Triangle)
                        .to_rgb8();
                    blend_images(&base, &upsampled, params.blend_factor)
                }
                None => base,
            };

            let target = transform::to_tensor::<B>(
                &DynamicImage::ImageRgb8(blended),
                params.working_size,
                &self.device,
            )?;

            let mut optimizer = ScaleOptimizer::new(&mut self.tapped);
            let optimised = optimizer.optimize(
                target,
                params.epochs,
                params.learning_rate,
                (weight + 1) as f32,
            )?;

            let dreamed = transform::to_image(optimised.inner())?;
            let restored = DynamicImage::ImageRgb8(dreamed)
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8();
            dream = Some(restored);
        }

        dream.ok_or_else(|| DreamError::Other("pyramid produced no levels".to_string()))
    }

    /// Drops the taps and returns the wrapped backbone.
    pub fn release(self) -> N {
        self.tapped.release()
    }
}
