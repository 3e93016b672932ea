pub mod math;
pub mod activation;
pub mod tensor;
pub mod layers;
pub mod network;
pub mod classifier;
pub mod classes;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock;
pub mod pipeline;
pub mod registry;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use tensor::{FeatureMap, ImageTensor};
pub use layers::Layer;
pub use network::{InputType, ModelMetadata, Network, NetworkSpec};
pub use classifier::Classifier;
pub use classes::ClassMapping;
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use pipeline::{ImagePayload, InferencePipeline, PipelineOptions, Prediction, Stage};
pub use registry::ModelRegistry;
