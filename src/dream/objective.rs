//! The maximisation objective driving gradient ascent.

use burn::tensor::{backend::Backend, Tensor};

use crate::model::{Backbone, TappedBackbone};

/// Runs one forward pass and returns the unweighted sum of the per-layer
/// mean activations of every monitored stage.
///
/// Every monitored layer contributes equally; there is no cross-layer
/// weighting. The classification output of the pass is discarded.
pub fn activation_objective<B: Backend, N: Backbone<B>>(
    tapped: &mut TappedBackbone<B, N>,
    target: Tensor<B, 4>,
) -> Tensor<B, 1> {
    let device = target.device();
    let _ = tapped.forward(target);

    let mut objective = Tensor::<B, 1>::zeros([1], &device);
    for activation in tapped.captured() {
        objective = objective + activation.clone().mean();
    }
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Backbone;
    use burn::backend::NdArray;

    struct Scaler;

    impl Backbone<NdArray> for Scaler {
        fn stage_names(&self) -> &'static [&'static str] {
            &["half", "double"]
        }

        fn forward_stage(&self, index: usize, input: Tensor<NdArray, 4>) -> Tensor<NdArray, 4> {
            match index {
                0 => input.mul_scalar(0.5),
                _ => input.mul_scalar(2.0),
            }
        }

        fn forward_head(&self, features: Tensor<NdArray, 4>) -> Tensor<NdArray, 2> {
            features.flatten(1, 3)
        }
    }

    #[test]
    fn sums_the_mean_of_every_monitored_layer() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Scaler, &["half", "double"]).unwrap();

        // Input of ones: stage outputs have means 0.5 and 1.0.
        let input = Tensor::<NdArray, 4>::ones([1, 3, 2, 2], &device);
        let objective: f32 = activation_objective(&mut tapped, input).into_scalar();
        assert!((objective - 1.5).abs() < 1e-6);
    }

    #[test]
    fn single_layer_objective_is_that_layers_mean() {
        let device = Default::default();
        let mut tapped = TappedBackbone::new(Scaler, &["double"]).unwrap();

        let input = Tensor::<NdArray, 4>::ones([1, 3, 2, 2], &device);
        let objective: f32 = activation_objective(&mut tapped, input).into_scalar();
        assert!((objective - 1.0).abs() < 1e-6);
    }
}
