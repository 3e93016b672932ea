use serde::{Deserialize, Serialize};

/// Describes the image a Network was built for.
/// Stored in model JSON; the registry checks it against the configured size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// RGB image resized to width×height, normalized to [0, 1], laid out HWC.
    ImageRgb { width: u32, height: u32 },
}

impl InputType {
    /// `(height, width, channels)` of a single input sample.
    pub fn shape(&self) -> (usize, usize, usize) {
        match self {
            InputType::ImageRgb { width, height } => (*height as usize, *width as usize, 3),
        }
    }
}

/// Optional annotations attached to a saved Network.
/// All fields are Option<> so bare weight files deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub input_type: Option<InputType>,
}
