//! Stage-wise backbone execution with activation capture.

use burn::tensor::{backend::Backend, Tensor};
use log::debug;

use crate::error::{DreamError, Result};

/// Capability contract for classifiers that can be executed stage by stage.
///
/// A stage is any point in the network whose output is worth capturing. The
/// stage list is ordered; running every stage in order followed by
/// [`Backbone::forward_head`] must be equivalent to the network's full
/// forward pass.
pub trait Backbone<B: Backend> {
    /// Ordered names of the tappable stages.
    fn stage_names(&self) -> &'static [&'static str];

    /// Runs stage `index` on the previous stage's output.
    fn forward_stage(&self, index: usize, input: Tensor<B, 4>) -> Tensor<B, 4>;

    /// Runs the classification head on the final stage output.
    fn forward_head(&self, features: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Wraps a [`Backbone`] and records the output of selected stages on every
/// forward pass.
///
/// The capture buffer is cleared at the start of each pass, so after a pass
/// it holds exactly one activation per monitored stage, in stage order.
/// `forward` takes `&mut self`, which rules out concurrent passes over the
/// same wrapper.
#[derive(Debug)]
pub struct TappedBackbone<B: Backend, N: Backbone<B>> {
    net: N,
    taps: Vec<usize>,
    captured: Vec<Tensor<B, 4>>,
}

impl<B: Backend, N: Backbone<B>> TappedBackbone<B, N> {
    /// Validates every monitored layer name against the backbone's stage
    /// list and installs the taps.
    ///
    /// Fails with [`DreamError::UnknownLayer`] on the first name the
    /// backbone does not expose, before any forward pass runs.
    pub fn new(net: N, monitored_layers: &[impl AsRef<str>]) -> Result<Self> {
        if monitored_layers.is_empty() {
            return Err(DreamError::ConfigError(
                "at least one monitored layer is required".to_string(),
            ));
        }

        let stage_names = net.stage_names();
        let mut taps = Vec::with_capacity(monitored_layers.len());
        for name in monitored_layers {
            let name = name.as_ref();
            let index = stage_names
                .iter()
                .position(|stage| *stage == name)
                .ok_or_else(|| DreamError::UnknownLayer(name.to_string()))?;
            taps.push(index);
        }
        taps.sort_unstable();
        taps.dedup();

        debug!(
            "Tapping {} of {} backbone stages",
            taps.len(),
            stage_names.len()
        );

        Ok(Self {
            net,
            taps,
            captured: Vec::new(),
        })
    }

    /// Runs a full forward pass, capturing the monitored activations.
    ///
    /// The classification output is returned for completeness; dream callers
    /// only care about the side effect on the capture buffer.
    pub fn forward(&mut self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        self.captured.clear();

        let mut features = input;
        for index in 0..self.net.stage_names().len() {
            features = self.net.forward_stage(index, features);
            if self.taps.binary_search(&index).is_ok() {
                self.captured.push(features.clone());
            }
        }
        self.net.forward_head(features)
    }

    /// Activations captured by the most recent forward pass, in stage order.
    pub fn captured(&self) -> &[Tensor<B, 4>] {
        &self.captured
    }

    /// Number of monitored stages.
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    /// Drops the taps and returns the wrapped network.
    pub fn release(self) -> N {
        self.net
    }
}
