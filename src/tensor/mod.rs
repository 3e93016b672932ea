pub mod feature_map;
pub mod image_tensor;

pub use feature_map::FeatureMap;
pub use image_tensor::ImageTensor;
