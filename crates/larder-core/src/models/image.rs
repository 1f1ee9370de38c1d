//! Image state for a recipe.

use serde::{Deserialize, Serialize};

/// Tagged image state of a recipe.
///
/// The `state` tag keeps "no image", "pending" and "failed" apart from a real
/// image reference, whatever the reference contains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ImageStatus {
    /// No image was requested
    #[default]
    Empty,

    /// An image request is in flight
    Loading,

    /// The image request failed
    Error,

    /// The image is available at `uri` (usually a `data:` URI)
    Ready { uri: String },
}

impl ImageStatus {
    /// Whether the state is terminal (`Ready` or `Error`).
    pub fn is_settled(&self) -> bool {
        matches!(self, ImageStatus::Ready { .. } | ImageStatus::Error)
    }

    /// Whether an image request is still pending.
    pub fn is_loading(&self) -> bool {
        matches!(self, ImageStatus::Loading)
    }

    /// The image reference, when one is available.
    pub fn uri(&self) -> Option<&str> {
        match self {
            ImageStatus::Ready { uri } => Some(uri),
            _ => None,
        }
    }

    /// Short lowercase label, used in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Empty => "none",
            ImageStatus::Loading => "loading",
            ImageStatus::Error => "error",
            ImageStatus::Ready { .. } => "ready",
        }
    }
}
