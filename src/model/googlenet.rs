//! Inception-style image classifier used as the default dream backbone.
//!
//! The architecture follows the classic 22-layer inception design: a
//! convolutional stem, nine inception blocks interleaved with max pooling,
//! then average pooling and a linear head. Convolutions use bias plus ReLU,
//! which keeps the frozen forward pass free of batch statistics.

use std::path::Path;

use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{
    AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig,
};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::{backend::Backend, Tensor};
use log::info;

use super::backbone::Backbone;
use crate::error::Result as DreamResult;

/// Tappable stages of [`GoogleNet`], in execution order.
pub const STAGES: [&str; 16] = [
    "conv1",
    "maxpool1",
    "conv2",
    "conv3",
    "maxpool2",
    "inception3a",
    "inception3b",
    "maxpool3",
    "inception4a",
    "inception4b",
    "inception4c",
    "inception4d",
    "inception4e",
    "maxpool4",
    "inception5a",
    "inception5b",
];

/// Convolution followed by ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    fn new(
        channels: [usize; 2],
        kernel: usize,
        stride: usize,
        padding: usize,
        device: &B::Device,
    ) -> Self {
        let conv = Conv2dConfig::new(channels, [kernel, kernel])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(padding, padding))
            .init(device);
        Self {
            conv,
            activation: Relu::new(),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.activation.forward(self.conv.forward(input))
    }
}

/// Four-branch inception block: 1x1, 1x1-3x3, 1x1-5x5 and pool-1x1 branches
/// concatenated along the channel dimension.
#[derive(Module, Debug)]
pub struct Inception<B: Backend> {
    branch1: ConvBlock<B>,
    branch2_reduce: ConvBlock<B>,
    branch2: ConvBlock<B>,
    branch3_reduce: ConvBlock<B>,
    branch3: ConvBlock<B>,
    branch4_pool: MaxPool2d,
    branch4: ConvBlock<B>,
}

impl<B: Backend> Inception<B> {
    /// `channels` is `[ch1x1, ch3x3_reduce, ch3x3, ch5x5_reduce, ch5x5,
    /// pool_proj]`; the block outputs their concatenation
    /// `ch1x1 + ch3x3 + ch5x5 + pool_proj`.
    fn new(input: usize, channels: [usize; 6], device: &B::Device) -> Self {
        let [ch1, ch3_reduce, ch3, ch5_reduce, ch5, pool_proj] = channels;
        Self {
            branch1: ConvBlock::new([input, ch1], 1, 1, 0, device),
            branch2_reduce: ConvBlock::new([input, ch3_reduce], 1, 1, 0, device),
            branch2: ConvBlock::new([ch3_reduce, ch3], 3, 1, 1, device),
            branch3_reduce: ConvBlock::new([input, ch5_reduce], 1, 1, 0, device),
            branch3: ConvBlock::new([ch5_reduce, ch5], 5, 1, 2, device),
            branch4_pool: MaxPool2dConfig::new([3, 3])
                .with_strides([1, 1])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(),
            branch4: ConvBlock::new([input, pool_proj], 1, 1, 0, device),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let branch1 = self.branch1.forward(input.clone());
        let branch2 = self.branch2.forward(self.branch2_reduce.forward(input.clone()));
        let branch3 = self.branch3.forward(self.branch3_reduce.forward(input.clone()));
        let branch4 = self.branch4.forward(self.branch4_pool.forward(input));
        Tensor::cat(vec![branch1, branch2, branch3, branch4], 1)
    }
}

/// Configuration for [`GoogleNet`].
#[derive(Config, Debug)]
pub struct GoogleNetConfig {
    #[config(default = 1000)]
    pub num_classes: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl GoogleNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GoogleNet<B> {
        GoogleNet {
            conv1: ConvBlock::new([3, 64], 7, 2, 3, device),
            maxpool1: downsample_pool(),
            conv2: ConvBlock::new([64, 64], 1, 1, 0, device),
            conv3: ConvBlock::new([64, 192], 3, 1, 1, device),
            maxpool2: downsample_pool(),
            inception3a: Inception::new(192, [64, 96, 128, 16, 32, 32], device),
            inception3b: Inception::new(256, [128, 128, 192, 32, 96, 64], device),
            maxpool3: downsample_pool(),
            inception4a: Inception::new(480, [192, 96, 208, 16, 48, 64], device),
            inception4b: Inception::new(512, [160, 112, 224, 24, 64, 64], device),
            inception4c: Inception::new(512, [128, 128, 256, 24, 64, 64], device),
            inception4d: Inception::new(512, [112, 144, 288, 32, 64, 64], device),
            inception4e: Inception::new(528, [256, 160, 320, 32, 128, 128], device),
            maxpool4: downsample_pool(),
            inception5a: Inception::new(832, [256, 160, 320, 32, 128, 128], device),
            inception5b: Inception::new(832, [384, 192, 384, 48, 128, 128], device),
            avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc: LinearConfig::new(1024, self.num_classes).init(device),
        }
    }
}

fn downsample_pool() -> MaxPool2d {
    MaxPool2dConfig::new([3, 3])
        .with_strides([2, 2])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init()
}

/// Inception classifier with named, tappable stages.
#[derive(Module, Debug)]
pub struct GoogleNet<B: Backend> {
    conv1: ConvBlock<B>,
    maxpool1: MaxPool2d,
    conv2: ConvBlock<B>,
    conv3: ConvBlock<B>,
    maxpool2: MaxPool2d,
    inception3a: Inception<B>,
    inception3b: Inception<B>,
    maxpool3: MaxPool2d,
    inception4a: Inception<B>,
    inception4b: Inception<B>,
    inception4c: Inception<B>,
    inception4d: Inception<B>,
    inception4e: Inception<B>,
    maxpool4: MaxPool2d,
    inception5a: Inception<B>,
    inception5b: Inception<B>,
    avgpool: AdaptiveAvgPool2d,
    dropout: Dropout,
    fc: Linear<B>,
}

impl<B: Backend> GoogleNet<B> {
    /// Loads pretrained weights from a named message-pack record file and
    /// freezes the parameters.
    ///
    /// A missing or malformed file is fatal and surfaces as
    /// [`crate::DreamError::WeightsError`].
    pub fn load_file<P: AsRef<Path>>(path: P, device: &B::Device) -> DreamResult<Self> {
        info!("Loading backbone weights from {:?}", path.as_ref());
        let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(path.as_ref().to_path_buf(), device)?;
        let net = GoogleNetConfig::new()
            .init(device)
            .load_record(record)
            .no_grad();
        Ok(net)
    }

    /// Writes the current weights to a named message-pack record file.
    pub fn save_file<P: AsRef<Path>>(self, path: P) -> DreamResult<()> {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder.record(self.into_record(), path.as_ref().to_path_buf())?;
        Ok(())
    }

    /// Full classification forward pass.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut features = input;
        for index in 0..STAGES.len() {
            features = self.forward_stage(index, features);
        }
        self.forward_head(features)
    }
}

impl<B: Backend> Backbone<B> for GoogleNet<B> {
    fn stage_names(&self) -> &'static [&'static str] {
        &STAGES
    }

    // The arms must stay in the same order as STAGES.
    fn forward_stage(&self, index: usize, input: Tensor<B, 4>) -> Tensor<B, 4> {
        match index {
            0 => self.conv1.forward(input),
            1 => self.maxpool1.forward(input),
            2 => self.conv2.forward(input),
            3 => self.conv3.forward(input),
            4 => self.maxpool2.forward(input),
            5 => self.inception3a.forward(input),
            6 => self.inception3b.forward(input),
            7 => self.maxpool3.forward(input),
            8 => self.inception4a.forward(input),
            9 => self.inception4b.forward(input),
            10 => self.inception4c.forward(input),
            11 => self.inception4d.forward(input),
            12 => self.inception4e.forward(input),
            13 => self.maxpool4.forward(input),
            14 => self.inception5a.forward(input),
            15 => self.inception5b.forward(input),
            _ => panic!("stage index {index} out of range"),
        }
    }

    fn forward_head(&self, features: Tensor<B, 4>) -> Tensor<B, 2> {
        let pooled = self.avgpool.forward(features);
        let flattened: Tensor<B, 2> = pooled.flatten(1, 3);
        self.fc.forward(self.dropout.forward(flattened))
    }
}
