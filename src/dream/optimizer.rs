//! Single-scale gradient ascent over a normalised image tensor.

use burn::tensor::{backend::AutodiffBackend, ElementConversion, Tensor};
use log::debug;

use super::objective::activation_objective;
use crate::error::{DreamError, Result};
use crate::image::transform::clip;
use crate::model::{Backbone, TappedBackbone};

/// Progress of gradient computation within one optimisation run.
///
/// The autodiff runtime builds a fresh graph per forward pass and hands back
/// a fresh gradient map per backward pass, so there is no gradient buffer to
/// zero between iterations; this state machine is the whole story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradState {
    NotYetComputed,
    Computed { steps: usize },
}

/// Maximises the activation objective over a single pyramid level.
pub struct ScaleOptimizer<'a, B: AutodiffBackend, N: Backbone<B>> {
    tapped: &'a mut TappedBackbone<B, N>,
    grad_state: GradState,
}

impl<'a, B: AutodiffBackend, N: Backbone<B>> ScaleOptimizer<'a, B, N> {
    pub fn new(tapped: &'a mut TappedBackbone<B, N>) -> Self {
        Self {
            tapped,
            grad_state: GradState::NotYetComputed,
        }
    }

    pub fn grad_state(&self) -> GradState {
        self.grad_state
    }

    /// Runs `epochs` iterations of gradient ascent on `target` and returns
    /// the optimised tensor, still attached to the autodiff graph.
    ///
    /// Each iteration standardises the input gradient by its own standard
    /// deviation (plus 1e-8) and takes a step of
    /// `learning_rate / learning_weight` in the ascent direction, then clips
    /// back to the representable pixel range. With `epochs` of 0 the target
    /// is returned unchanged.
    ///
    /// Non-finite values are not detected; a degenerate backbone can degrade
    /// the image silently.
    pub fn optimize(
        &mut self,
        mut target: Tensor<B, 4>,
        epochs: usize,
        learning_rate: f32,
        learning_weight: f32,
    ) -> Result<Tensor<B, 4>> {
        self.grad_state = GradState::NotYetComputed;
        let step = learning_rate / learning_weight;

        for epoch in 0..epochs {
            let objective = activation_objective(self.tapped, target.clone());
            let grads = objective.backward();
            let grad = target.grad(&grads).ok_or(DreamError::MissingGradient)?;

            let sd = grad
                .clone()
                .flatten::<1>(0, 3)
                .var(0)
                .sqrt()
                .into_scalar()
                .elem::<f32>();
            let standardised = grad.div_scalar(sd + 1e-8);

            let ascended = target.inner().add(standardised.mul_scalar(step));
            target = Tensor::from_inner(clip(ascended)).require_grad();

            self.grad_state = GradState::Computed { steps: epoch + 1 };
            debug!("Ascent epoch {}/{} complete", epoch + 1, epochs);
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    /// Single linear convolution-free stage so the ascent direction is
    /// constant and the objective moves predictably.
    struct Linear;

    impl Backbone<TestBackend> for Linear {
        fn stage_names(&self) -> &'static [&'static str] {
            &["identity"]
        }

        fn forward_stage(
            &self,
            _index: usize,
            input: Tensor<TestBackend, 4>,
        ) -> Tensor<TestBackend, 4> {
            input
        }

        fn forward_head(&self, features: Tensor<TestBackend, 4>) -> Tensor<TestBackend, 2> {
            features.flatten(1, 3)
        }
    }

    fn mid_gray(device: &<TestBackend as burn::tensor::backend::Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::zeros([1, 3, 4, 4], device).require_grad()
    }

    #[test]
    fn zero_epochs_returns_the_target_unchanged() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Linear, &["identity"]).unwrap();
        let mut optimizer = ScaleOptimizer::new(&mut tapped);

        let target = mid_gray(&device);
        let result = optimizer.optimize(target.clone(), 0, 1.0, 1.0).unwrap();

        assert_eq!(optimizer.grad_state(), GradState::NotYetComputed);
        let before = target.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        let after = result.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn grad_state_counts_completed_steps() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Linear, &["identity"]).unwrap();
        let mut optimizer = ScaleOptimizer::new(&mut tapped);
        assert_eq!(optimizer.grad_state(), GradState::NotYetComputed);

        let _ = optimizer.optimize(mid_gray(&device), 3, 0.1, 1.0).unwrap();
        assert_eq!(optimizer.grad_state(), GradState::Computed { steps: 3 });
    }

    #[test]
    fn objective_increases_under_ascent() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Linear, &["identity"]).unwrap();

        let before: f32 = activation_objective(&mut tapped, mid_gray(&device))
            .into_scalar()
            .elem();

        let mut optimizer = ScaleOptimizer::new(&mut tapped);
        let optimised = optimizer.optimize(mid_gray(&device), 5, 0.5, 1.0).unwrap();

        let after: f32 = activation_objective(&mut tapped, optimised)
            .into_scalar()
            .elem();
        assert!(after > before, "objective did not improve: {before} -> {after}");
    }

    #[test]
    fn detached_target_reports_missing_gradient() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Linear, &["identity"]).unwrap();
        let mut optimizer = ScaleOptimizer::new(&mut tapped);

        let detached = Tensor::<TestBackend, 4>::zeros([1, 3, 4, 4], &device);
        let err = optimizer.optimize(detached, 1, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, DreamError::MissingGradient));
    }
}
