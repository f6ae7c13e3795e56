//! Common object-store type definitions shared across crates.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Maximum container name length in bytes.
const MAX_CONTAINER_NAME_BYTES: usize = 256;

/// Maximum object name length in bytes.
const MAX_OBJECT_NAME_BYTES: usize = 1024;

/// Container name (1-256 bytes, no `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerName(String);

impl ContainerName {
    /// Create a new container name.
    ///
    /// # Errors
    /// Returns an error if the name is empty, longer than 256 bytes, or
    /// contains a `/`.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.len() > MAX_CONTAINER_NAME_BYTES {
            Some("must not exceed 256 bytes")
        } else if name.contains('/') {
            Some("must not contain '/'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidContainerName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Get the container name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContainerName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContainerName> for String {
    fn from(value: ContainerName) -> Self {
        value.0
    }
}

/// Object name (1-1024 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    /// Create a new object name.
    ///
    /// # Errors
    /// Returns an error if the name is empty or longer than 1024 bytes.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidObjectName {
                name,
                reason: "must not be empty",
            });
        }
        if name.len() > MAX_OBJECT_NAME_BYTES {
            return Err(CoreError::InvalidObjectName {
                name,
                reason: "must not exceed 1024 bytes",
            });
        }
        Ok(Self(name))
    }

    /// Get the object name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectName> for String {
    fn from(value: ObjectName) -> Self {
        value.0
    }
}

/// How uploaded segments are stitched back into one logical object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// Zero-byte object whose `X-Object-Manifest` header names a segment prefix.
    #[default]
    #[serde(alias = "dlo")]
    Dynamic,
    /// JSON manifest listing every segment with its ETag and size.
    #[serde(alias = "slo")]
    Static,
}

impl ManifestKind {
    /// Return the lowercase name used in configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamic" | "dlo" => Ok(Self::Dynamic),
            "static" | "slo" => Ok(Self::Static),
            _ => Err(CoreError::Config(format!("unknown manifest kind: {s}"))),
        }
    }
}
