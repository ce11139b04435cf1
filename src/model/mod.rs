//! Backbone networks and activation capture.

pub mod backbone;
pub mod googlenet;

pub use backbone::{Backbone, TappedBackbone};
pub use googlenet::{GoogleNet, GoogleNetConfig, STAGES};
