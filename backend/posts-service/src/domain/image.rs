use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ServiceError, ServiceResult};

/// Storage namespace for post images
pub const IMAGE_NAMESPACE: &str = "posts/";

/// Longest path the `posts.image` column accepts
pub const IMAGE_PATH_MAX_LEN: usize = 100;

/// Reference to an externally stored post image.
///
/// Only the path is persisted; file content lives in whatever storage
/// backend serves `posts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// Place `name` under the `posts/` namespace.
    ///
    /// Already-namespaced paths are kept as they are.
    pub fn new(name: &str) -> ServiceResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("image path is empty".to_string()));
        }
        if name.starts_with('/') || name.starts_with('\\') {
            return Err(ServiceError::Validation(format!(
                "image path must be relative: {}",
                name
            )));
        }
        if name.split(&['/', '\\'][..]).any(|segment| segment == "..") {
            return Err(ServiceError::Validation(format!(
                "image path must not leave its namespace: {}",
                name
            )));
        }

        let path = if name.starts_with(IMAGE_NAMESPACE) {
            name.to_string()
        } else {
            format!("{}{}", IMAGE_NAMESPACE, name)
        };

        if path.len() == IMAGE_NAMESPACE.len() {
            return Err(ServiceError::Validation("image file name is empty".to_string()));
        }
        if path.chars().count() > IMAGE_PATH_MAX_LEN {
            return Err(ServiceError::Validation(format!(
                "image path exceeds {} characters",
                IMAGE_PATH_MAX_LEN
            )));
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without the namespace prefix
    pub fn file_name(&self) -> &str {
        self.0.strip_prefix(IMAGE_NAMESPACE).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ServiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ImageRef::new(&value)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
