//! Mock artifacts: a randomly initialised leaf CNN plus its class mapping,
//! so the service can start before a real model has been trained.

use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::classes::ClassMapping;
use crate::error::{Error, Result};
use crate::network::NetworkSpec;

/// Crop/disease labels the mock model is written with.
pub const DEFAULT_CLASSES: &[&str] = &[
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Cassava___Brown_Spot",
    "Cassava___Green_Mottle",
    "Cassava___Mosaic",
    "Cassava___healthy",
    "Cherry___Powdery_mildew",
    "Cherry___healthy",
    "Corn___Cercospora_leaf_spot",
    "Corn___Common_rust",
    "Corn___Northern_Leaf_Blight",
    "Corn___healthy",
    "Grape___Black_rot",
    "Grape___Esca",
    "Grape___Leaf_blight",
    "Grape___healthy",
    "Orange___Haunglongbing",
    "Orange___healthy",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper___Bacterial_spot",
    "Pepper___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Rice___Brown_spot",
    "Rice___Leaf_blast",
    "Rice___Neck_blast",
    "Rice___healthy",
    "Squash___Powdery_mildew",
    "Squash___healthy",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites",
    "Tomato___Target_Spot",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___healthy",
];

/// Builds the default leaf CNN for `labels.len()` classes and writes it and
/// the matching class mapping.  Parent directories are created as needed.
pub fn write_mock_artifacts(
    model_path: &Path,
    classes_path: &Path,
    labels: &[&str],
    input_size: u32,
    seed: u64,
) -> Result<()> {
    let spec = NetworkSpec::leaf_cnn(labels.len(), input_size);
    write_artifacts(&spec, model_path, classes_path, labels, seed)
}

/// Like `write_mock_artifacts` but for an arbitrary architecture.  Fails
/// without writing anything unless the network's output size equals the
/// number of labels.
pub fn write_artifacts(
    spec: &NetworkSpec,
    model_path: &Path,
    classes_path: &Path,
    labels: &[&str],
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let network = spec.build(&mut rng)?;
    match network.output_len() {
        Some(n) if n == labels.len() => {}
        out => {
            return Err(Error::InvalidModel(format!(
                "spec '{}' emits {} values but {} class labels were given",
                spec.name,
                out.map_or_else(|| "an unknown number of".to_owned(), |n| n.to_string()),
                labels.len()
            )));
        }
    }

    for path in [model_path, classes_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Saving mock model to {}...", model_path.display());
    network.save_json(model_path)?;

    info!("Saving classes to {}...", classes_path.display());
    ClassMapping::from_labels(labels.iter().copied()).save_json(classes_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(DEFAULT_CLASSES.iter().all(|c| seen.insert(*c)));
        assert_eq!(DEFAULT_CLASSES.len(), 45);
    }

    #[test]
    fn creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("a/b/model.json");
        let classes = dir.path().join("c/classes.json");
        write_mock_artifacts(&model, &classes, &["x", "y"], 8, 0).unwrap();
        assert!(model.exists());
        assert_eq!(ClassMapping::load_json(&classes).unwrap().labels(), ["x", "y"]);
    }

    #[test]
    fn spec_output_must_match_label_count() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        let classes = dir.path().join("classes.json");
        let err = write_artifacts(&NetworkSpec::leaf_cnn(5, 8), &model, &classes, &["a", "b"], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
        assert!(!model.exists());
        assert!(!classes.exists());
    }
}
