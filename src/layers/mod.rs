pub mod conv;
pub mod dense;
pub mod pool;

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::tensor::FeatureMap;

pub use conv::{Conv2dLayer, Padding};
pub use dense::DenseLayer;
pub use pool::MaxPool2dLayer;

/// One stage of a `Network`.  Serialized with a `"type"` tag so saved models
/// read as a flat list of layer objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    Conv2d(Conv2dLayer),
    MaxPool2d(MaxPool2dLayer),
    GlobalAvgPool,
    Dense(DenseLayer),
}

impl Layer {
    pub fn feed_from(&self, input: &FeatureMap) -> Result<FeatureMap> {
        match self {
            Layer::Conv2d(l)     => l.feed_from(input),
            Layer::MaxPool2d(l)  => l.feed_from(input),
            Layer::GlobalAvgPool => pool::global_avg_pool(input),
            Layer::Dense(l)      => l.feed_from(input),
        }
    }

    /// Shape propagation without touching any data.  Used to validate a
    /// loaded model against its declared input size, so every failure is
    /// reported as `Error::InvalidModel`.
    pub fn output_shape(&self, shape: (usize, usize, usize)) -> Result<(usize, usize, usize)> {
        let (h, w, c) = shape;
        let as_invalid = |e: Error| match e {
            Error::Inference(msg) => Error::InvalidModel(msg),
            other                 => other,
        };
        match self {
            Layer::Conv2d(l) => {
                if c != l.in_channels {
                    return Err(Error::InvalidModel(format!(
                        "conv layer expects {} channels but receives {}",
                        l.in_channels, c
                    )));
                }
                l.output_shape(h, w).map_err(as_invalid)
            }
            Layer::MaxPool2d(l)  => l.output_shape(h, w, c).map_err(as_invalid),
            Layer::GlobalAvgPool => Ok((1, 1, c)),
            Layer::Dense(l) => {
                if h * w * c != l.input_size() {
                    return Err(Error::InvalidModel(format!(
                        "dense layer expects {} inputs but receives {}",
                        l.input_size(),
                        h * w * c
                    )));
                }
                Ok((1, 1, l.size))
            }
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        match self {
            Layer::Conv2d(l) => l.check(),
            Layer::Dense(l)  => l.check(),
            _                => Ok(()),
        }
    }
}
