use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// An opaque identifier addressing a single paste.
///
/// Only syntactic checks are applied when parsing caller input: the id must
/// be non-empty and at most [`MAX_LENGTH`](Self::MAX_LENGTH) bytes. Whether it
/// refers to a live paste is answered by the store.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PasteId(SmolStr);

impl PasteId {
    /// Longest id accepted by [`parse`](Self::parse), in bytes.
    pub const MAX_LENGTH: usize = 128;

    /// Parses a caller-supplied identifier.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(ValidationError::Id("must not be empty".to_string()));
        }
        if id.len() > Self::MAX_LENGTH {
            return Err(ValidationError::Id(format!(
                "must be at most {} bytes, got {}",
                Self::MAX_LENGTH,
                id.len()
            )));
        }
        Ok(Self(SmolStr::new(id)))
    }

    /// Creates a `PasteId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources such as a
    /// [`Generator`](https://docs.rs/evanesce-generator).
    pub fn new_unchecked(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasteId").field(&self.0).finish()
    }
}

impl Display for PasteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PasteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
