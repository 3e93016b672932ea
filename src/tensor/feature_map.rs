/// A single image-shaped activation volume stored in HWC order
/// (`data[(y * width + x) * channels + c]`).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    pub height:   usize,
    pub width:    usize,
    pub channels: usize,
    pub data:     Vec<f64>,
}

impl FeatureMap {
    pub fn zeros(height: usize, width: usize, channels: usize) -> FeatureMap {
        FeatureMap { height, width, channels, data: vec![0.0; height * width * channels] }
    }

    /// Wraps a flat vector as a `1 × 1 × len` map, the shape dense layers use.
    pub fn from_vector(data: Vec<f64>) -> FeatureMap {
        FeatureMap { height: 1, width: 1, channels: data.len(), data }
    }

    #[inline]
    pub fn index(&self, y: usize, x: usize, c: usize) -> usize {
        (y * self.width + x) * self.channels + c
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize, c: usize) -> f64 {
        self.data[self.index(y, x, c)]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
