use crate::error::Result;
use crate::tensor::ImageTensor;

/// Anything that turns a normalized image batch into one probability
/// distribution per sample.
///
/// The registry stores a `Box<dyn Classifier>` so request handling does not
/// depend on the concrete model format; tests swap in canned classifiers.
pub trait Classifier: Send + Sync {
    /// Length of each output distribution, when known ahead of time.
    fn output_size(&self) -> Option<usize>;

    /// Scores every sample of the batch.
    fn classify(&self, input: &ImageTensor) -> Result<Vec<Vec<f64>>>;
}
