use chrono::{DateTime, Local};
use serde::Serialize;

use crate::routes::ApiResponse;
use crate::state::AppContext;

#[derive(Debug, Serialize)]
struct Health {
    status:         &'static str,
    model_loaded:   bool,
    classes_loaded: bool,
    timestamp:      DateTime<Local>,
}

/// `GET /health`
///
/// Always 200; readiness is reported in the body.
pub fn handle(ctx: &AppContext) -> ApiResponse {
    ApiResponse::json(200, &Health {
        status:         "healthy",
        model_loaded:   ctx.registry.model_loaded(),
        classes_loaded: ctx.registry.classes_loaded(),
        timestamp:      Local::now(),
    })
}
