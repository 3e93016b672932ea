use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::network::metadata::ModelMetadata;
use crate::tensor::{FeatureMap, ImageTensor};

/// A feed-forward stack of layers with its weights.  This is the on-disk
/// classifier artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub layers: Vec<Layer>,
}

impl Network {
    pub fn new(layers: Vec<Layer>, metadata: ModelMetadata) -> Network {
        Network { metadata, layers }
    }

    /// Forward pass for a single image; returns the last layer's activations.
    pub fn forward(&self, input: &FeatureMap) -> Result<Vec<f64>> {
        let mut layers = self.layers.iter();
        let first = layers
            .next()
            .ok_or_else(|| Error::Inference("network has no layers".into()))?;
        let mut current = first.feed_from(input)?;
        for layer in layers {
            current = layer.feed_from(&current)?;
        }
        Ok(current.data)
    }

    /// Structural checks: every layer's weights are self-consistent and, when
    /// the metadata declares an input shape, the layers chain together.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::InvalidModel("network has no layers".into()));
        }
        for layer in &self.layers {
            layer.check()?;
        }
        if let Some(input) = &self.metadata.input_type {
            let mut shape = input.shape();
            for layer in &self.layers {
                shape = layer.output_shape(shape)?;
            }
        }
        Ok(())
    }

    /// Number of values the network emits per sample, if it can be known
    /// without running it.
    pub fn output_len(&self) -> Option<usize> {
        if let Some(input) = &self.metadata.input_type {
            let shape = self
                .layers
                .iter()
                .try_fold(input.shape(), |s, l| l.output_shape(s))
                .ok()?;
            return Some(shape.0 * shape.1 * shape.2);
        }
        match self.layers.last()? {
            Layer::Dense(d) => Some(d.size),
            _ => None,
        }
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a network previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.validate()?;
        Ok(network)
    }
}

impl Classifier for Network {
    fn output_size(&self) -> Option<usize> {
        self.output_len()
    }

    fn classify(&self, input: &ImageTensor) -> Result<Vec<Vec<f64>>> {
        (0..input.batch_size())
            .map(|i| {
                let sample = input
                    .sample(i)
                    .ok_or_else(|| Error::Inference(format!("batch index {} out of range", i)))?;
                self.forward(&sample)
            })
            .collect()
    }
}
