use serde::Serialize;

use crate::routes::ApiResponse;
use crate::state::AppContext;

#[derive(Debug, Serialize)]
struct ClassList<'a> {
    classes: &'a [String],
    count:   usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo<'a> {
    model_path:   String,
    classes_path: String,
    input_size:   u32,
    num_classes:  usize,
    classes:      &'a [String],
}

/// `GET /classes`
pub fn handle_classes(ctx: &AppContext) -> ApiResponse {
    match ctx.registry.classes() {
        Some(mapping) => ApiResponse::json(200, &ClassList {
            classes: mapping.labels(),
            count:   mapping.len(),
        }),
        None => ApiResponse::error(503, "Classes not loaded"),
    }
}

/// `GET /info`
///
/// Needs the model; the class list is reported empty if only the mapping
/// failed to load.
pub fn handle_info(ctx: &AppContext) -> ApiResponse {
    if !ctx.registry.model_loaded() {
        return ApiResponse::error(503, "Model not loaded");
    }
    let classes = ctx.registry.classes().map(|m| m.labels()).unwrap_or(&[]);
    ApiResponse::json(200, &ModelInfo {
        model_path:   ctx.config.model_path.display().to_string(),
        classes_path: ctx.config.classes_path.display().to_string(),
        input_size:   ctx.config.input_size,
        num_classes:  classes.len(),
        classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{empty_context, ready_context, LABELS};

    #[test]
    fn unloaded_registry_is_503() {
        let ctx = empty_context();
        assert_eq!(handle_classes(&ctx).status, 503);
        let info = handle_info(&ctx);
        assert_eq!(info.status, 503);
        assert_eq!(info.body.unwrap()["error"], "Model not loaded");
    }

    #[test]
    fn lists_labels_in_index_order() {
        let body = handle_classes(&ready_context(vec![1.0, 0.0, 0.0])).body.unwrap();
        assert_eq!(body["count"], 3);
        assert_eq!(body["classes"], serde_json::json!(LABELS));
    }

    #[test]
    fn info_reports_configuration() {
        let body = handle_info(&ready_context(vec![1.0, 0.0, 0.0])).body.unwrap();
        assert_eq!(body["inputSize"], 16);
        assert_eq!(body["numClasses"], 3);
        assert_eq!(body["modelPath"], leafscan::config::DEFAULT_MODEL_PATH);
        assert_eq!(body["classesPath"], leafscan::config::DEFAULT_CLASSES_PATH);
    }
}
