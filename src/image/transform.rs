//! Conversions between host images and normalised network tensors.
//!
//! The tensor side uses the standard ImageNet channel statistics. Conversions
//! always produce a new value; nothing is mutated in place.

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::error::{DreamError, Result};

/// Per-channel means the backbone was trained with.
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviations the backbone was trained with.
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Converts an image into a normalised `[1, 3, size, size]` tensor ready for
/// gradient ascent.
///
/// The image is resized to a `size` square (bilinear), converted to RGB if it
/// is not already, scaled to `[0, 1]` and normalised per channel with
/// [`MEAN`] and [`STD`]. The returned tensor is marked as requiring
/// gradients.
pub fn to_tensor<B: Backend>(
    image: &DynamicImage,
    size: u32,
    device: &B::Device,
) -> Result<Tensor<B, 4>> {
    let resized = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();
    let (width, height) = resized.dimensions();

    let data = TensorData::new(
        resized.into_raw(),
        [height as usize, width as usize, 3],
    )
    .convert::<B::FloatElem>();

    // [H, W, C] -> [C, H, W], then batch dim in front.
    let tensor = Tensor::<B, 3>::from_data(data, device)
        .swap_dims(0, 1)
        .swap_dims(0, 2)
        .div_scalar(255.0)
        .unsqueeze::<4>();

    let mean = Tensor::<B, 1>::from_floats(MEAN, device).reshape([1, 3, 1, 1]);
    let std = Tensor::<B, 1>::from_floats(STD, device).reshape([1, 3, 1, 1]);

    Ok(tensor.sub(mean).div(std).require_grad())
}

/// Converts a normalised `[1, 3, H, W]` tensor back into an 8-bit RGB image.
///
/// Inverse of [`to_tensor`]: the normalisation is undone with the reciprocal
/// constants, values are clamped to `[0, 1]` and rescaled to bytes. The input
/// must already be detached from any autodiff graph.
pub fn to_image<B: Backend>(tensor: Tensor<B, 4>) -> Result<RgbImage> {
    let device = tensor.device();
    let [_, _, height, width] = tensor.dims();

    let imean = Tensor::<B, 1>::from_floats(
        [-MEAN[0] / STD[0], -MEAN[1] / STD[1], -MEAN[2] / STD[2]],
        &device,
    )
    .reshape([1, 3, 1, 1]);
    let istd = Tensor::<B, 1>::from_floats(
        [1.0 / STD[0], 1.0 / STD[1], 1.0 / STD[2]],
        &device,
    )
    .reshape([1, 3, 1, 1]);

    let pixels = tensor
        .sub(imean)
        .div(istd)
        .clamp(0.0, 1.0)
        .mul_scalar(255.0)
        // [1, C, H, W] -> [H, W, C] for the row-major pixel buffer.
        .squeeze::<3>(0)
        .swap_dims(0, 2)
        .swap_dims(0, 1)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| DreamError::TensorDataError(format!("{e:?}")))?;

    let bytes: Vec<u8> = pixels
        .into_iter()
        .map(|value| value.round().clamp(0.0, 255.0) as u8)
        .collect();

    RgbImage::from_raw(width as u32, height as u32, bytes).ok_or_else(|| {
        DreamError::TensorDataError("pixel buffer does not match image dimensions".to_string())
    })
}

/// Clamps every channel of a normalised tensor to the representable pixel
/// range.
///
/// In normalised space a pixel value of 0 maps to `-mean/std` and 255 maps to
/// `(1 - mean)/std`, so the bounds differ per channel. Idempotent.
pub fn clip<B: Backend>(tensor: Tensor<B, 4>) -> Tensor<B, 4> {
    let [batch, channels, height, width] = tensor.dims();
    let mut clipped = tensor;
    for channel in 0..channels {
        let low = -MEAN[channel] / STD[channel];
        let high = (1.0 - MEAN[channel]) / STD[channel];
        let bounded = clipped
            .clone()
            .slice([0..batch, channel..channel + 1, 0..height, 0..width])
            .clamp(low, high);
        clipped = clipped.slice_assign(
            [0..batch, channel..channel + 1, 0..height, 0..width],
            bounded,
        );
    }
    clipped
}

/// Resizes an image by `factor` in both dimensions, truncating to whole
/// pixels.
///
/// Precondition: `factor` must keep both dimensions at least 1; this is the
/// caller's responsibility and is not checked here.
pub fn scale_image(image: &DynamicImage, factor: f32) -> DynamicImage {
    let width = (image.width() as f32 * factor) as u32;
    let height = (image.height() as f32 * factor) as u32;
    image.resize_exact(width, height, FilterType::Triangle)
}
