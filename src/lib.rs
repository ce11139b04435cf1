//! Deep Dream Engine
//!
//! Multi-scale gradient-ascent image synthesis: an input image is perturbed
//! to maximise the activations of selected internal layers of a pretrained
//! convolutional classifier, producing the characteristic "dream" textures.
//!
//! ## Pipeline Structure
//!
//! The crate implements the classic four-stage pipeline:
//!
//! 1. **Pyramid Construction** (`image::build_pyramid`)
//!    - Builds a chain of progressively blurred and downscaled copies of the
//!      input, level 0 being the untouched original.
//!
//! 2. **Activation Capture** (`model::TappedBackbone`)
//!    - Wraps any [`model::Backbone`] and records the output of the
//!      monitored stages on every forward pass. Layer names are validated
//!      up front, before any tensor work.
//!
//! 3. **Per-Scale Gradient Ascent** (`dream::ScaleOptimizer`)
//!    - Maximises the sum of the monitored layers' mean activations by
//!      repeatedly stepping the input along its standardised gradient and
//!      clipping back to the representable pixel range.
//!
//! 4. **Multi-Scale Orchestration** (`dream::DreamEngine`)
//!    - Visits the pyramid from the smallest level up, blending each
//!      intermediate dream into the next level so detail accumulates across
//!      scales. The output keeps the input's dimensions.
//!
//! The tensor and autodiff runtime is `burn`; the shipped backbone is an
//! inception-style classifier ([`model::GoogleNet`]) with frozen pretrained
//! weights, but any network implementing [`model::Backbone`] can be dreamed
//! through.

pub mod config;
pub mod dream;
pub mod error;
pub mod image;
pub mod model;

pub use crate::config::DreamParams;
pub use crate::dream::{activation_objective, DreamEngine, GradState, ScaleOptimizer};
pub use crate::error::{DreamError, Result};
pub use crate::image::{
    blend_images, build_pyramid, clip, scale_image, to_image, to_tensor,
};
pub use crate::model::{Backbone, GoogleNet, GoogleNetConfig, TappedBackbone, STAGES};
