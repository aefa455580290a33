//! Properties detected on the source material.

/// What the media-info probe found out about the input.
///
/// Every field is optional: a missing frame rate makes frame-rate matching
/// fall back to the first candidate, and missing dimensions are only an
/// error when a target height has to be derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceInfo {
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
    /// Detected frame rate in frames per second.
    pub frame_rate: Option<f64>,
}

impl SourceInfo {
    /// Source with known dimensions and no frame rate.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            frame_rate: None,
        }
    }

    pub fn frame_rate(mut self, rate: f64) -> Self {
        self.frame_rate = Some(rate);
        self
    }

    /// Width and height, when both are known and non-zero.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}
