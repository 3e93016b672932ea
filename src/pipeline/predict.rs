use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::registry::ModelRegistry;
use crate::tensor::ImageTensor;

/// Probability assigned to one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    pub label: String,
    pub probability: f64,
}

/// Outcome of scoring one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
    /// Probability of the top class.
    pub confidence: f64,
    /// Label mentions "healthy", or confidence fell under the threshold.
    pub is_healthy: bool,
    /// Confidence fell under the threshold.
    pub low_confidence: bool,
    /// Every class in output order.
    pub scores: Vec<ClassScore>,
}

/// Scores `tensor` with the registry's classifier and reads the top class.
///
/// Low-confidence predictions are reported healthy; `low_confidence` is set
/// alongside so callers can tell the two cases apart.
pub fn predict(registry: &ModelRegistry, tensor: &ImageTensor, low_confidence_threshold: f64) -> Result<Prediction> {
    let (classifier, classes) = match (registry.classifier(), registry.classes()) {
        (Some(c), Some(m)) => (c, m),
        _ => return Err(Error::NotReady),
    };

    let outputs = classifier.classify(tensor).map_err(|e| match e {
        Error::Inference(msg) => Error::Inference(msg),
        other                 => Error::Inference(other.to_string()),
    })?;
    let probs = outputs
        .into_iter()
        .next()
        .ok_or_else(|| Error::Inference("classifier returned no output".into()))?;
    if probs.is_empty() {
        return Err(Error::Inference("classifier returned an empty distribution".into()));
    }
    if probs.iter().any(|p| !p.is_finite()) {
        return Err(Error::Inference("classifier returned non-finite scores".into()));
    }

    // First maximum wins on ties.
    let (class_index, confidence) = probs
        .iter()
        .enumerate()
        .fold((0, probs[0]), |best, (i, &p)| if p > best.1 { (i, p) } else { best });

    if class_index >= classes.len() {
        warn!(
            "Class index {} has no label ({} labels loaded); using a placeholder",
            class_index,
            classes.len()
        );
    }
    let label = classes.label_or_placeholder(class_index);

    let low_confidence = confidence < low_confidence_threshold;
    let is_healthy = label.to_lowercase().contains("healthy") || low_confidence;

    let scores = probs
        .iter()
        .enumerate()
        .map(|(i, &p)| ClassScore { label: classes.label_or_placeholder(i), probability: p })
        .collect();

    Ok(Prediction { class_index, label, confidence, is_healthy, low_confidence, scores })
}
