use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::{Conv2dLayer, DenseLayer, Layer, MaxPool2dLayer, Padding};
use crate::network::metadata::{InputType, ModelMetadata};
use crate::network::network::Network;

/// Describes one layer of a `NetworkSpec`.  Input dimensions are not
/// stored; `NetworkSpec::build` derives them by propagating the input shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerSpec {
    Conv2d {
        filters: usize,
        kernel_size: usize,
        padding: Padding,
        activation: ActivationFunction,
    },
    MaxPool2d { size: usize },
    GlobalAvgPool,
    Dense { size: usize, activation: ActivationFunction },
}

/// A serializable description of a network architecture, independent of
/// any trained weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name stored in the built model's metadata.
    pub name: String,
    /// Square RGB input edge length.
    pub input_size: u32,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// The small leaf-disease CNN used for mock models:
    /// conv 3→8, pool, conv 8→16, pool, global average, dense 32, dense N.
    pub fn leaf_cnn(num_classes: usize, input_size: u32) -> NetworkSpec {
        let conv = |filters| LayerSpec::Conv2d {
            filters,
            kernel_size: 3,
            padding: Padding::Same,
            activation: ActivationFunction::ReLU,
        };
        NetworkSpec {
            name: "leaf_disease_cnn".into(),
            input_size,
            layers: vec![
                conv(8),
                LayerSpec::MaxPool2d { size: 2 },
                conv(16),
                LayerSpec::MaxPool2d { size: 2 },
                LayerSpec::GlobalAvgPool,
                LayerSpec::Dense { size: 32, activation: ActivationFunction::ReLU },
                LayerSpec::Dense { size: num_classes, activation: ActivationFunction::Softmax },
            ],
        }
    }

    /// Instantiates the architecture with freshly initialised weights.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        let input_type = InputType::ImageRgb { width: self.input_size, height: self.input_size };
        let mut shape = input_type.shape();
        let mut layers = Vec::with_capacity(self.layers.len());

        for spec in &self.layers {
            let (h, w, c) = shape;
            let layer = match spec {
                LayerSpec::Conv2d { filters, kernel_size, padding, activation } => {
                    Layer::Conv2d(Conv2dLayer::new(c, *filters, *kernel_size, *padding, activation.clone(), rng))
                }
                LayerSpec::MaxPool2d { size } => Layer::MaxPool2d(MaxPool2dLayer { size: *size }),
                LayerSpec::GlobalAvgPool => Layer::GlobalAvgPool,
                LayerSpec::Dense { size, activation } => {
                    Layer::Dense(DenseLayer::new(*size, h * w * c, activation.clone(), rng))
                }
            };
            shape = layer
                .output_shape(shape)
                .map_err(|e| Error::InvalidModel(format!("spec '{}': {}", self.name, e)))?;
            layers.push(layer);
        }

        let metadata = ModelMetadata {
            name: Some(self.name.clone()),
            description: None,
            input_type: Some(input_type),
        };
        let network = Network::new(layers, metadata);
        network.validate()?;
        Ok(network)
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &Path) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
