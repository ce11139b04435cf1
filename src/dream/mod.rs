//! Gradient-ascent dreaming: objective, per-scale optimiser and the
//! multi-scale engine.

pub mod engine;
pub mod objective;
pub mod optimizer;

pub use engine::DreamEngine;
pub use objective::activation_objective;
pub use optimizer::{GradState, ScaleOptimizer};
