use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{Error, Result};
use crate::tensor::FeatureMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Padding {
    /// Zero-pad so the output keeps the input's height and width.
    Same,
    /// No padding; output shrinks by `kernel_size - 1`.
    Valid,
}

/// Stride-1 2-D convolution over an HWC feature map.
///
/// `weights` has one row per filter; each row is the flattened kernel in
/// `(ky, kx, in_channel)` order, i.e. `k * k * in_channels` columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2dLayer {
    pub in_channels: usize,
    pub filters:     usize,
    pub kernel_size: usize,
    pub padding:     Padding,
    pub weights:     Matrix,
    pub biases:      Vec<f64>,
    pub activator:   ActivationFunction,
}

impl Conv2dLayer {
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        filters: usize,
        kernel_size: usize,
        padding: Padding,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Conv2dLayer {
        let fan_in = kernel_size * kernel_size * in_channels;
        Conv2dLayer {
            in_channels,
            filters,
            kernel_size,
            padding,
            weights: Matrix::he(filters, fan_in, fan_in, rng),
            biases: vec![0.0; filters],
            activator: activation,
        }
    }

    /// `(height, width, channels)` produced for an input of the given size.
    pub fn output_shape(&self, height: usize, width: usize) -> Result<(usize, usize, usize)> {
        match self.padding {
            Padding::Same => Ok((height, width, self.filters)),
            Padding::Valid => {
                if height < self.kernel_size || width < self.kernel_size {
                    return Err(Error::Inference(format!(
                        "{}x{} input is smaller than the {}x{} kernel",
                        height, width, self.kernel_size, self.kernel_size
                    )));
                }
                Ok((height - self.kernel_size + 1, width - self.kernel_size + 1, self.filters))
            }
        }
    }

    pub fn feed_from(&self, input: &FeatureMap) -> Result<FeatureMap> {
        if input.channels != self.in_channels {
            return Err(Error::Inference(format!(
                "conv layer expects {} channels, got {}",
                self.in_channels, input.channels
            )));
        }
        let (out_h, out_w, _) = self.output_shape(input.height, input.width)?;
        let k = self.kernel_size;
        let pad = match self.padding {
            Padding::Same  => (k as isize - 1) / 2,
            Padding::Valid => 0,
        };

        let mut out = FeatureMap::zeros(out_h, out_w, self.filters);
        for oy in 0..out_h {
            for ox in 0..out_w {
                for f in 0..self.filters {
                    let kernel = &self.weights.data[f];
                    let mut sum = self.biases[f];
                    for ky in 0..k {
                        let iy = oy as isize + ky as isize - pad;
                        if iy < 0 || iy >= input.height as isize {
                            continue;
                        }
                        for kx in 0..k {
                            let ix = ox as isize + kx as isize - pad;
                            if ix < 0 || ix >= input.width as isize {
                                continue;
                            }
                            let base = input.index(iy as usize, ix as usize, 0);
                            let kbase = (ky * k + kx) * self.in_channels;
                            for c in 0..self.in_channels {
                                sum += input.data[base + c] * kernel[kbase + c];
                            }
                        }
                    }
                    let idx = out.index(oy, ox, f);
                    out.data[idx] = self.activator.function(sum);
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn check(&self) -> Result<()> {
        let fan_in = self.kernel_size * self.kernel_size * self.in_channels;
        let ok = self.kernel_size > 0
            && self.weights.is_well_formed()
            && self.weights.rows == self.filters
            && self.weights.cols == fan_in
            && self.biases.len() == self.filters;
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidModel(format!(
                "conv layer ({} filters, {}x{} kernel, {} channels) has inconsistent weights",
                self.filters, self.kernel_size, self.kernel_size, self.in_channels
            )))
        }
    }
}
