use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use leafscan::{Error, ImagePayload, Prediction};

use crate::routes::{ApiResponse, RequestBody};
use crate::state::AppContext;
use crate::util::multipart::{extract_boundary, extract_text_field, multipart_extract_file};

/// JSON field carrying the image in `/detect` bodies.
const IMAGE_FIELD: &str = "imageData";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Detection {
    is_leaf:         bool,
    is_healthy:      bool,
    low_confidence:  bool,
    disease_id:      String,
    disease_name:    String,
    confidence:      f64,
    all_predictions: BTreeMap<String, f64>,
}

impl From<Prediction> for Detection {
    fn from(p: Prediction) -> Self {
        Detection {
            is_leaf:         true,
            is_healthy:      p.is_healthy,
            low_confidence:  p.low_confidence,
            disease_id:      p.class_index.to_string(),
            disease_name:    p.label,
            confidence:      p.confidence,
            all_predictions: p.scores.into_iter().map(|s| (s.label, s.probability)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /detect
// ---------------------------------------------------------------------------

pub fn handle(ctx: &AppContext, body: &RequestBody) -> ApiResponse {
    if !ctx.registry.is_ready() {
        return ApiResponse::detection_error(&Error::NotReady);
    }

    let payload = match extract_payload(body) {
        Ok(p)  => p,
        Err(e) => {
            warn!("Rejected /detect body: {}", e);
            return ApiResponse::detection_error(&e);
        }
    };

    match ctx.pipeline.run(&ctx.registry, &payload) {
        Ok(prediction) => {
            info!(
                "Detection: {} (confidence: {:.2}%)",
                prediction.label,
                prediction.confidence * 100.0
            );
            ApiResponse::json(200, &Detection::from(prediction))
        }
        Err(e @ Error::ValidationRejected) => {
            info!("Image rejected as blank or uniform");
            ApiResponse::detection_error(&e)
        }
        Err(e @ Error::Inference(_)) => {
            error!("Error during detection: {}", e);
            ApiResponse::detection_error(&e)
        }
        Err(e) => {
            warn!("Detection failed: {}", e);
            ApiResponse::detection_error(&e)
        }
    }
}

/// Pulls the image out of whichever body shape the client used:
/// multipart upload, raw `image/*` bytes, or JSON `{ "imageData": ... }`
/// where the value is a data URI, bare base64, or an array of byte values.
fn extract_payload(body: &RequestBody) -> Result<ImagePayload, Error> {
    let content_type = body.content_type.to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let boundary = extract_boundary(&body.content_type)
            .ok_or_else(|| Error::Decode("multipart body has no boundary".into()))?;
        if let Some(file) = multipart_extract_file(&body.bytes, &boundary) {
            return Ok(ImagePayload::Bytes(file));
        }
        return extract_text_field(&body.bytes, &boundary, IMAGE_FIELD)
            .map(ImagePayload::Text)
            .ok_or(Error::MissingPayload);
    }

    if content_type.starts_with("image/") || content_type.starts_with("application/octet-stream") {
        return Ok(ImagePayload::Bytes(body.bytes.clone()));
    }

    if body.bytes.is_empty() {
        return Err(Error::MissingPayload);
    }
    let json: Value = serde_json::from_slice(&body.bytes)
        .map_err(|e| Error::Decode(format!("request body is not valid JSON: {}", e)))?;

    match json.get(IMAGE_FIELD) {
        None | Some(Value::Null) => Err(Error::MissingPayload),
        Some(Value::String(s))   => Ok(ImagePayload::Text(s.clone())),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(ImagePayload::Bytes)
            .ok_or_else(|| Error::Decode(format!("{} array must contain byte values 0-255", IMAGE_FIELD))),
        Some(_) => Err(Error::Decode(format!("{} must be a string or byte array", IMAGE_FIELD))),
    }
}
