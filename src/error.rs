use thiserror::Error;

/// Every failure the library can report.
///
/// Request-time variants (`NotReady` through `PayloadTooLarge`) are mapped to
/// HTTP statuses by the server; the remaining variants only occur while
/// loading or writing artifacts.
#[derive(Error, Debug)]
pub enum Error {
    /// Classifier or class mapping is missing.
    #[error("Model not loaded. Please train the model first.")]
    NotReady,

    /// The request did not carry any image data.
    #[error("No image data provided")]
    MissingPayload,

    /// Payload is not valid base64 or not a decodable image.
    #[error("Failed to process image: {0}")]
    Decode(String),

    /// Image decoded but looks blank or uniform.
    #[error("Please upload a valid plant leaf image")]
    ValidationRejected,

    /// Unexpected failure while scoring a tensor.
    #[error("Detection failed: {0}")]
    Inference(String),

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("Invalid class mapping: {0}")]
    InvalidClasses(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
