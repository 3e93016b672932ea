use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::tensor::FeatureMap;

/// Non-overlapping max pooling (stride equals window size).  Trailing rows
/// and columns that do not fill a whole window are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPool2dLayer {
    pub size: usize,
}

impl MaxPool2dLayer {
    pub fn output_shape(&self, height: usize, width: usize, channels: usize) -> Result<(usize, usize, usize)> {
        if self.size == 0 || height < self.size || width < self.size {
            return Err(Error::Inference(format!(
                "cannot max-pool a {}x{} map with window {}",
                height, width, self.size
            )));
        }
        Ok((height / self.size, width / self.size, channels))
    }

    pub fn feed_from(&self, input: &FeatureMap) -> Result<FeatureMap> {
        let (out_h, out_w, channels) = self.output_shape(input.height, input.width, input.channels)?;
        let mut out = FeatureMap::zeros(out_h, out_w, channels);
        for oy in 0..out_h {
            for ox in 0..out_w {
                for c in 0..channels {
                    let mut best = f64::NEG_INFINITY;
                    for dy in 0..self.size {
                        for dx in 0..self.size {
                            best = best.max(input.get(oy * self.size + dy, ox * self.size + dx, c));
                        }
                    }
                    let idx = out.index(oy, ox, c);
                    out.data[idx] = best;
                }
            }
        }
        Ok(out)
    }
}

/// Averages each channel over the spatial dimensions, producing `1 × 1 × C`.
pub fn global_avg_pool(input: &FeatureMap) -> Result<FeatureMap> {
    let area = input.height * input.width;
    if area == 0 || input.channels == 0 {
        return Err(Error::Inference("global average pool over an empty map".into()));
    }
    let mut sums = vec![0.0; input.channels];
    for px in input.data.chunks(input.channels) {
        for (s, v) in sums.iter_mut().zip(px) {
            *s += v;
        }
    }
    Ok(FeatureMap::from_vector(sums.into_iter().map(|s| s / area as f64).collect()))
}
