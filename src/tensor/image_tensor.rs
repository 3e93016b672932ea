use crate::tensor::feature_map::FeatureMap;

/// Batched image input, laid out as `(batch, height, width, channels)` with
/// values normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    batch:    usize,
    height:   usize,
    width:    usize,
    channels: usize,
    data:     Vec<f64>,
}

impl ImageTensor {
    /// Builds a tensor from flat NHWC data.  Returns `None` when the data
    /// length disagrees with the shape.
    pub fn new(batch: usize, height: usize, width: usize, channels: usize, data: Vec<f64>) -> Option<ImageTensor> {
        if batch * height * width * channels != data.len() {
            return None;
        }
        Some(ImageTensor { batch, height, width, channels, data })
    }

    /// Adds a leading batch dimension of size 1 to a single image.
    pub fn from_single(image: FeatureMap) -> ImageTensor {
        ImageTensor {
            batch:    1,
            height:   image.height,
            width:    image.width,
            channels: image.channels,
            data:     image.data,
        }
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.batch, self.height, self.width, self.channels)
    }

    pub fn batch_size(&self) -> usize {
        self.batch
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Copies out the `i`-th image of the batch.
    pub fn sample(&self, i: usize) -> Option<FeatureMap> {
        if i >= self.batch {
            return None;
        }
        let stride = self.height * self.width * self.channels;
        Some(FeatureMap {
            height:   self.height,
            width:    self.width,
            channels: self.channels,
            data:     self.data[i * stride..(i + 1) * stride].to_vec(),
        })
    }

    /// Population standard deviation of each channel over every pixel of
    /// the batch.  `None` for an empty tensor.
    pub fn channel_std_devs(&self) -> Option<Vec<f64>> {
        if self.data.is_empty() || self.channels == 0 {
            return None;
        }
        let n = (self.data.len() / self.channels) as f64;
        let mut sums = vec![0.0; self.channels];
        for px in self.data.chunks(self.channels) {
            for (s, v) in sums.iter_mut().zip(px) {
                *s += v;
            }
        }
        let means: Vec<f64> = sums.iter().map(|s| s / n).collect();
        let mut vars = vec![0.0; self.channels];
        for px in self.data.chunks(self.channels) {
            for ((var, v), mean) in vars.iter_mut().zip(px).zip(&means) {
                *var += (v - mean) * (v - mean);
            }
        }
        Some(vars.into_iter().map(|v| (v / n).sqrt()).collect())
    }
}
