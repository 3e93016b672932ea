use std::io::{Cursor, Read};
use std::time::Instant;

use serde::Serialize;
use serde_json::json;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{info, warn};

use leafscan::Error;

use crate::handlers;
use crate::state::{AppContext, SharedContext};

// ---------------------------------------------------------------------------
// Response type
// ---------------------------------------------------------------------------

/// A handler's answer before it is turned into a `tiny_http::Response`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body:   Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, body: &T) -> ApiResponse {
        match serde_json::to_value(body) {
            Ok(v)  => ApiResponse { status, body: Some(v) },
            Err(e) => ApiResponse::error(500, &format!("Could not encode response: {}", e)),
        }
    }

    pub fn error(status: u16, message: &str) -> ApiResponse {
        ApiResponse { status, body: Some(json!({ "error": message })) }
    }

    /// Error body for `/detect`: always carries `isLeaf: false`.
    pub fn detection_error(err: &Error) -> ApiResponse {
        ApiResponse {
            status: status_for(err),
            body:   Some(json!({ "error": err.to_string(), "isLeaf": false })),
        }
    }

    pub fn no_content() -> ApiResponse {
        ApiResponse { status: 204, body: None }
    }

    pub fn into_http(self) -> Response<Cursor<Vec<u8>>> {
        let bytes = self.body.map(|b| b.to_string().into_bytes()).unwrap_or_default();
        let len = bytes.len();
        let mut headers = cors_headers();
        if len > 0 {
            headers.push(header("Content-Type", "application/json"));
        }
        Response::new(StatusCode(self.status), headers, Cursor::new(bytes), Some(len), None)
    }
}

/// HTTP status for a request-time error.
pub fn status_for(err: &Error) -> u16 {
    match err {
        Error::NotReady                => 503,
        Error::MissingPayload
        | Error::Decode(_)
        | Error::ValidationRejected
        | Error::Io(_)                 => 400,
        Error::PayloadTooLarge { .. }  => 413,
        _                              => 500,
    }
}

fn header(name: &str, value: &str) -> Header {
    // Only called with static ASCII names and values.
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}

fn cors_headers() -> Vec<Header> {
    vec![
        header("Access-Control-Allow-Origin", "*"),
        header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        header("Access-Control-Allow-Headers", "authorization, x-client-info, apikey, content-type"),
    ]
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// The parts of a request handlers look at.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    pub content_type: String,
    pub bytes:        Vec<u8>,
}

fn read_body(request: &mut Request, limit: usize) -> Result<RequestBody, Error> {
    if request.body_length().is_some_and(|len| len > limit) {
        return Err(Error::PayloadTooLarge { limit });
    }
    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let bytes = read_limited(request.as_reader(), limit)?;
    Ok(RequestBody { content_type, bytes })
}

/// Reads at most `limit` bytes; one byte more means the body is too large.
/// Covers chunked bodies, which declare no length up front.
fn read_limited<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut bytes)?;
    if bytes.len() > limit {
        return Err(Error::PayloadTooLarge { limit });
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Reads the request, routes it, and writes the response.  Runs on the
/// per-request thread spawned by `main`.
pub fn dispatch(mut request: Request, ctx: SharedContext) {
    let started = Instant::now();
    let method  = request.method().clone();
    let path    = request_path(&request);

    let response = handle_request(&mut request, &ctx);

    info!(
        "{} {} -> {} ({:.1} ms)",
        method, path, response.status, started.elapsed().as_secs_f64() * 1000.0
    );
    if let Err(e) = request.respond(response.into_http()) {
        warn!("Failed to write response for {} {}: {}", method, path, e);
    }
}

fn request_path(request: &Request) -> String {
    request.url().split('?').next().unwrap_or("").to_owned()
}

/// Reads the body (POST only) and routes the request.
fn handle_request(request: &mut Request, ctx: &AppContext) -> ApiResponse {
    let method = request.method().clone();
    let path   = request_path(request);
    if method == Method::Post {
        match read_body(request, ctx.config.max_body_bytes) {
            Ok(body) => route(ctx, &method, &path, &body),
            Err(e)   => ApiResponse::detection_error(&e),
        }
    } else {
        route(ctx, &method, &path, &RequestBody::default())
    }
}

/// Maps `(method, path)` to a handler.  Pure: everything it needs is in the
/// arguments, so tests call it directly.
pub fn route(ctx: &AppContext, method: &Method, path: &str, body: &RequestBody) -> ApiResponse {
    if *method == Method::Options {
        return ApiResponse::no_content();
    }

    match (method, path) {
        (Method::Get,  "/health")  => handlers::health::handle(ctx),
        (Method::Post, "/detect")  => handlers::detect::handle(ctx, body),
        (Method::Get,  "/classes") => handlers::catalog::handle_classes(ctx),
        (Method::Get,  "/info")    => handlers::catalog::handle_info(ctx),

        (_, "/health" | "/detect" | "/classes" | "/info") => ApiResponse::error(405, "Method not allowed"),
        _ => ApiResponse::error(404, "Not found"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use tiny_http::TestRequest;

    use leafscan::{ClassMapping, Classifier, ImageTensor, ModelRegistry, ServiceConfig};

    use super::*;

    pub struct FixedClassifier(pub Vec<f64>);

    impl Classifier for FixedClassifier {
        fn output_size(&self) -> Option<usize> {
            Some(self.0.len())
        }

        fn classify(&self, input: &ImageTensor) -> leafscan::Result<Vec<Vec<f64>>> {
            Ok(vec![self.0.clone(); input.batch_size()])
        }
    }

    pub const LABELS: [&str; 3] = ["Potato___Early_blight", "Potato___Late_blight", "Potato___healthy"];

    pub fn test_config() -> ServiceConfig {
        ServiceConfig { input_size: 16, ..ServiceConfig::default() }
    }

    pub fn ready_context(probs: Vec<f64>) -> AppContext {
        let registry = ModelRegistry::from_parts(
            Some(Box::new(FixedClassifier(probs))),
            Some(ClassMapping::from_labels(LABELS)),
        );
        AppContext::new(test_config(), registry)
    }

    pub fn empty_context() -> AppContext {
        AppContext::new(test_config(), ModelRegistry::empty())
    }

    pub fn png(img: RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    pub fn leafy_png() -> Vec<u8> {
        png(RgbImage::from_fn(24, 24, |x, y| Rgb([(x * 10) as u8, 120 + (y * 5) as u8, 40])))
    }

    pub fn json_body(value: serde_json::Value) -> RequestBody {
        RequestBody { content_type: "application/json".into(), bytes: value.to_string().into_bytes() }
    }

    pub fn data_uri(bytes: &[u8]) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn options_preflight_is_empty_204() {
        let resp = route(&empty_context(), &Method::Options, "/detect", &RequestBody::default());
        assert_eq!(resp, ApiResponse::no_content());
    }

    #[test]
    fn unknown_path_and_wrong_method() {
        let ctx = empty_context();
        assert_eq!(route(&ctx, &Method::Get, "/nope", &RequestBody::default()).status, 404);
        assert_eq!(route(&ctx, &Method::Get, "/detect", &RequestBody::default()).status, 405);
    }

    #[test]
    fn error_statuses_follow_taxonomy() {
        assert_eq!(status_for(&Error::NotReady), 503);
        assert_eq!(status_for(&Error::Decode("x".into())), 400);
        assert_eq!(status_for(&Error::ValidationRejected), 400);
        assert_eq!(status_for(&Error::Inference("x".into())), 500);
        assert_eq!(status_for(&Error::PayloadTooLarge { limit: 1 }), 413);
    }

    fn context_with_limit(limit: usize) -> AppContext {
        let ready = ready_context(vec![0.7, 0.2, 0.1]);
        AppContext::new(ServiceConfig { max_body_bytes: limit, ..test_config() }, ready.registry)
    }

    fn post_detect(body: &'static str) -> Request {
        TestRequest::new()
            .with_method(Method::Post)
            .with_path("/detect")
            .with_header(header("Content-Type", "application/json"))
            .with_body(body)
            .into()
    }

    #[test]
    fn declared_body_over_limit_is_413() {
        let ctx = context_with_limit(8);
        let resp = handle_request(&mut post_detect(r#"{"x": 12}"#), &ctx);
        assert_eq!(resp.status, 413);
        let body = resp.body.unwrap();
        assert_eq!(body["isLeaf"], false);
        assert!(body["error"].as_str().unwrap().contains("8 byte limit"));
    }

    #[test]
    fn body_exactly_at_limit_is_read() {
        let ctx = context_with_limit(8);
        // Accepted and parsed: the JSON simply lacks `imageData`.
        let resp = handle_request(&mut post_detect(r#"{"x": 1}"#), &ctx);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body.unwrap()["error"], "No image data provided");
    }

    #[test]
    fn undeclared_length_is_capped_while_reading() {
        assert_eq!(read_limited(Cursor::new(vec![7u8; 8]), 8).unwrap().len(), 8);
        let err = read_limited(Cursor::new(vec![7u8; 9]), 8).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { limit: 8 }));
        assert_eq!(status_for(&err), 413);
    }

    #[test]
    fn get_requests_skip_the_body() {
        let ctx = context_with_limit(0);
        let mut req: Request = TestRequest::new().with_path("/health").into();
        assert_eq!(handle_request(&mut req, &ctx).status, 200);
    }

    #[test]
    fn http_response_carries_cors_and_json() {
        let resp = ApiResponse::error(404, "Not found").into_http();
        let has = |name: &'static str| resp.headers().iter().any(|h| h.field.equiv(name));
        assert!(has("Access-Control-Allow-Origin"));
        assert!(has("Content-Type"));
        assert_eq!(resp.status_code(), StatusCode(404));
    }
}
