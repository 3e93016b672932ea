use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL_PATH: &str = "models/leaf_disease_model.json";
pub const DEFAULT_CLASSES_PATH: &str = "models/classes.json";
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Process-wide settings, fixed at startup.
///
/// The server binary fills this from CLI flags and `LEAFSCAN_*` environment
/// variables; library users can construct it directly or start from
/// `ServiceConfig::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// `host:port` the HTTP server binds to.
    pub bind_addr: String,
    /// Classifier artifact (JSON network).
    pub model_path: PathBuf,
    /// Class-index → label JSON.
    pub classes_path: PathBuf,
    /// Square edge length images are resized to.
    pub input_size: u32,
    /// Pixel standard deviation below which an image is treated as blank.
    pub blank_std_threshold: f64,
    /// Top-class confidence below which a prediction is reported healthy.
    pub low_confidence_threshold: f64,
    /// Refuse to serve when the class mapping disagrees with the model's
    /// output size instead of falling back to placeholder labels.
    pub strict_classes: bool,
    /// Upper bound on accepted request bodies.
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind_addr:                "127.0.0.1:5000".into(),
            model_path:               PathBuf::from(DEFAULT_MODEL_PATH),
            classes_path:             PathBuf::from(DEFAULT_CLASSES_PATH),
            input_size:               DEFAULT_INPUT_SIZE,
            blank_std_threshold:      0.01,
            low_confidence_threshold: 0.5,
            strict_classes:           false,
            max_body_bytes:           16 * 1024 * 1024,
        }
    }
}
