use std::path::Path;

use tracing::{info, warn};

use crate::classes::ClassMapping;
use crate::classifier::Classifier;
use crate::config::ServiceConfig;
use crate::network::Network;

/// Holds the classifier and its class mapping for the life of the process.
///
/// Built once before the server starts and then only read.  Either half may
/// be missing; requests that need both get `Error::NotReady`.
pub struct ModelRegistry {
    classifier: Option<Box<dyn Classifier>>,
    classes:    Option<ClassMapping>,
}

impl ModelRegistry {
    /// Loads both artifacts from the configured paths.  Never fails: problems
    /// are logged and leave the corresponding half empty.
    pub fn load(config: &ServiceConfig) -> ModelRegistry {
        let network = load_network(&config.model_path);
        if let Some(declared) = network.as_ref().and_then(|n| n.metadata.input_type.as_ref()) {
            let (h, w, _) = declared.shape();
            let size = config.input_size as usize;
            if (h, w) != (size, size) {
                warn!(
                    "Model was built for {}x{} input but images will be resized to {}x{}",
                    w, h, size, size
                );
            }
        }

        let mut classes = load_classes(&config.classes_path);

        if let (Some(net), Some(mapping)) = (&network, &classes) {
            match net.output_len() {
                Some(n) if n != mapping.len() => {
                    if config.strict_classes {
                        warn!(
                            "Class mapping has {} labels but the model emits {}; refusing to serve (strict mode)",
                            mapping.len(), n
                        );
                        classes = None;
                    } else {
                        warn!(
                            "Class mapping has {} labels but the model emits {}; unmatched indices get placeholder labels",
                            mapping.len(), n
                        );
                    }
                }
                _ => {}
            }
        }

        ModelRegistry::from_parts(network.map(|n| Box::new(n) as Box<dyn Classifier>), classes)
    }

    pub fn from_parts(classifier: Option<Box<dyn Classifier>>, classes: Option<ClassMapping>) -> ModelRegistry {
        ModelRegistry { classifier, classes }
    }

    /// A registry with nothing loaded.
    pub fn empty() -> ModelRegistry {
        ModelRegistry::from_parts(None, None)
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.is_some() && self.classes.is_some()
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn classes_loaded(&self) -> bool {
        self.classes.is_some()
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        self.classifier.as_deref()
    }

    pub fn classes(&self) -> Option<&ClassMapping> {
        self.classes.as_ref()
    }
}

fn load_network(path: &Path) -> Option<Network> {
    if !path.exists() {
        warn!("Model not found at {}", path.display());
        warn!("Run `leafscan-mock` to write a mock model, or point --model-path at a trained one");
        return None;
    }
    info!("Loading model from {}...", path.display());
    match Network::load_json(path) {
        Ok(network) => {
            info!("Model loaded ({} layers)", network.layers.len());
            Some(network)
        }
        Err(e) => {
            warn!("Could not load model from {}: {}", path.display(), e);
            None
        }
    }
}

fn load_classes(path: &Path) -> Option<ClassMapping> {
    if !path.exists() {
        warn!("Classes file not found at {}", path.display());
        return None;
    }
    match ClassMapping::load_json(path) {
        Ok(mapping) => {
            info!("Classes loaded: {:?}", mapping.labels());
            Some(mapping)
        }
        Err(e) => {
            warn!("Could not load classes from {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::write_mock_artifacts;

    fn config_in(dir: &Path) -> ServiceConfig {
        ServiceConfig {
            model_path: dir.join("model.json"),
            classes_path: dir.join("classes.json"),
            input_size: 8,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn missing_files_leave_registry_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::load(&config_in(dir.path()));
        assert!(!registry.is_ready());
        assert!(!registry.model_loaded());
        assert!(!registry.classes_loaded());
    }

    #[test]
    fn malformed_classes_keep_model_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_mock_artifacts(&config.model_path, &config.classes_path, &["a", "b"], 8, 1).unwrap();
        std::fs::write(&config.classes_path, "not json").unwrap();

        let registry = ModelRegistry::load(&config);
        assert!(registry.model_loaded());
        assert!(!registry.classes_loaded());
        assert!(!registry.is_ready());
    }

    #[test]
    fn mock_artifacts_load_ready() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_mock_artifacts(&config.model_path, &config.classes_path, &["a", "b", "c"], 8, 9).unwrap();

        let registry = ModelRegistry::load(&config);
        assert!(registry.is_ready());
        assert_eq!(registry.classes().unwrap().len(), 3);
        assert_eq!(registry.classifier().unwrap().output_size(), Some(3));
    }

    #[test]
    fn strict_mode_rejects_mismatched_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        write_mock_artifacts(&config.model_path, &config.classes_path, &["a", "b", "c"], 8, 2).unwrap();
        ClassMapping::from_labels(["a", "b"]).save_json(&config.classes_path).unwrap();

        assert!(ModelRegistry::load(&config).is_ready());
        config.strict_classes = true;
        let strict = ModelRegistry::load(&config);
        assert!(strict.model_loaded());
        assert!(!strict.is_ready());
    }
}
