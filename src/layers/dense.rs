use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{Error, Result};
use crate::tensor::FeatureMap;

/// Fully connected layer.  The incoming feature map is flattened (HWC order)
/// into a single row before the affine transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub size: usize,
    /// Shape `(input_size, size)`.
    pub weights: Matrix,
    /// Shape `(1, size)`.
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> DenseLayer {
        let weights = match activation {
            ActivationFunction::ReLU
            | ActivationFunction::LeakyReLU { .. }
            | ActivationFunction::Elu { .. } => Matrix::he(input_size, size, input_size, rng),
            _ => Matrix::xavier(input_size, size, input_size, rng),
        };

        DenseLayer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn feed_from(&self, input: &FeatureMap) -> Result<FeatureMap> {
        if input.len() != self.input_size() {
            return Err(Error::Inference(format!(
                "dense layer expects {} inputs, got {}",
                self.input_size(),
                input.len()
            )));
        }
        let z = Matrix::row(input.data.clone()) * &self.weights + self.biases.clone();
        let mut a = z.into_flat();
        self.activator.apply(&mut a);
        Ok(FeatureMap::from_vector(a))
    }

    pub(crate) fn check(&self) -> Result<()> {
        let ok = self.weights.is_well_formed()
            && self.biases.is_well_formed()
            && self.weights.cols == self.size
            && self.biases.rows == 1
            && self.biases.cols == self.size;
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidModel(format!(
                "dense layer of size {} has inconsistent weight/bias shapes",
                self.size
            )))
        }
    }
}
