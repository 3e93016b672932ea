//! Inference pipeline: payload → image → tensor → blank check → prediction.

pub mod decode;
pub mod normalize;
pub mod predict;
pub mod validate;

use image::DynamicImage;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::registry::ModelRegistry;
use crate::tensor::ImageTensor;

pub use decode::ImagePayload;
pub use predict::{ClassScore, Prediction};

/// Where a request is in its lifecycle.  A failing request stops at the
/// stage named by `Stage::rejected_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Decoded,
    Normalized,
    Validated,
    Scored,
    Responded,
}

impl Stage {
    /// The stage at which `err` ends a request, if it is a request error.
    pub fn rejected_at(err: &Error) -> Option<Stage> {
        match err {
            Error::MissingPayload | Error::Decode(_) => Some(Stage::Decoded),
            Error::ValidationRejected                => Some(Stage::Validated),
            Error::NotReady | Error::Inference(_)    => Some(Stage::Scored),
            Error::PayloadTooLarge { .. }            => Some(Stage::Received),
            _                                        => None,
        }
    }
}

/// Knobs the pipeline reads from the service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub input_size: u32,
    pub blank_std_threshold: f64,
    pub low_confidence_threshold: f64,
}

impl From<&ServiceConfig> for PipelineOptions {
    fn from(config: &ServiceConfig) -> Self {
        PipelineOptions {
            input_size:               config.input_size,
            blank_std_threshold:      config.blank_std_threshold,
            low_confidence_threshold: config.low_confidence_threshold,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions::from(&ServiceConfig::default())
    }
}

/// Stateless per-request driver.  Shared by all handler threads; the only
/// shared state it touches is the read-only registry passed to `predict`.
#[derive(Debug, Clone, Default)]
pub struct InferencePipeline {
    options: PipelineOptions,
}

impl InferencePipeline {
    pub fn new(options: PipelineOptions) -> InferencePipeline {
        InferencePipeline { options }
    }

    pub fn decode(&self, payload: &ImagePayload) -> Result<DynamicImage> {
        decode::decode(payload)
    }

    pub fn normalize(&self, image: &DynamicImage) -> ImageTensor {
        normalize::normalize(image, self.options.input_size)
    }

    pub fn validate(&self, tensor: &ImageTensor) -> bool {
        validate::has_visible_content(tensor, self.options.blank_std_threshold)
    }

    pub fn predict(&self, registry: &ModelRegistry, tensor: &ImageTensor) -> Result<Prediction> {
        predict::predict(registry, tensor, self.options.low_confidence_threshold)
    }

    /// Runs one payload through every stage.
    pub fn run(&self, registry: &ModelRegistry, payload: &ImagePayload) -> Result<Prediction> {
        let result = self.run_stages(registry, payload);
        match &result {
            Ok(p) => debug!(stage = ?Stage::Responded, label = %p.label, confidence = p.confidence, "request scored"),
            Err(e) => debug!(stage = ?Stage::rejected_at(e), error = %e, "request rejected"),
        }
        result
    }

    fn run_stages(&self, registry: &ModelRegistry, payload: &ImagePayload) -> Result<Prediction> {
        debug!(stage = ?Stage::Received);

        let image = self.decode(payload)?;
        debug!(stage = ?Stage::Decoded, width = image.width(), height = image.height());

        let tensor = self.normalize(&image);
        debug!(stage = ?Stage::Normalized, shape = ?tensor.shape());

        let accepted = self.validate(&tensor);
        debug!(stage = ?Stage::Validated, accepted);
        if !accepted {
            return Err(Error::ValidationRejected);
        }

        let prediction = self.predict(registry, &tensor)?;
        debug!(stage = ?Stage::Scored, index = prediction.class_index);
        Ok(prediction)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::ClassMapping;
    use test_support::{checkerboard_png, data_uri, solid_png, FixedClassifier};

    fn ready_registry() -> ModelRegistry {
        ModelRegistry::from_parts(
            Some(Box::new(FixedClassifier(vec![0.9, 0.1]))),
            Some(ClassMapping::from_labels(["Apple___Black_rot", "Apple___healthy"])),
        )
    }

    fn pipeline() -> InferencePipeline {
        InferencePipeline::new(PipelineOptions { input_size: 16, ..PipelineOptions::default() })
    }

    #[test]
    fn solid_image_is_rejected_before_scoring() {
        for colour in [[0, 0, 0], [255, 255, 255], [30, 160, 40]] {
            let payload = ImagePayload::Text(data_uri(&solid_png(12, colour)));
            let err = pipeline().run(&ready_registry(), &payload).unwrap_err();
            assert!(matches!(err, Error::ValidationRejected));
            assert_eq!(Stage::rejected_at(&err), Some(Stage::Validated));
        }
    }

    #[test]
    fn textured_image_is_scored() {
        let payload = ImagePayload::Bytes(checkerboard_png(20));
        let p = pipeline().run(&ready_registry(), &payload).unwrap();
        assert_eq!(p.label, "Apple___Black_rot");
        assert!(!p.is_healthy);
    }

    #[test]
    fn unloaded_registry_stops_at_scoring() {
        let payload = ImagePayload::Bytes(checkerboard_png(20));
        let err = pipeline().run(&ModelRegistry::empty(), &payload).unwrap_err();
        assert!(matches!(err, Error::NotReady));
        assert_eq!(Stage::rejected_at(&err), Some(Stage::Scored));
    }

    #[test]
    fn normalize_uses_configured_size() {
        let img = pipeline().decode(&ImagePayload::Bytes(checkerboard_png(5))).unwrap();
        assert_eq!(pipeline().normalize(&img).shape(), (1, 16, 16, 3));
    }
}
