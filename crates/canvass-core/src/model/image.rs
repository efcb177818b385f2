//! Image attachment reference.

use serde::{Deserialize, Serialize};

/// Reference from an owning item to a stored image.
///
/// One-directional by construction: the image carries no back reference to
/// its owner. "Is this image still used" is answered by an explicit count
/// query in the image store, never by walking object graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Unique storage key, relative to the image root (e.g. `faq/faq_7`).
    pub path: String,
    /// Alternative text shown when the image cannot be rendered.
    pub alt: String,
}

impl ImageRef {
    #[must_use]
    pub fn new(path: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alt: alt.into(),
        }
    }
}
