//! Module descriptors
//!
//! Descriptors arrive in the init message and describe one module each.

use serde::{Deserialize, Deserializer, Serialize};

use crate::module::traits::ModuleError;

/// Module descriptor (one entry of the init batch)
///
/// The wire form may also carry an `exports` placeholder; it is ignored, the
/// registry creates a fresh exports table per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module id, used as registry key
    pub id: String,
    /// Source locator passed to the host
    pub url: String,
    /// Dependency identifiers, unresolved; missing or `null` means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ModuleDescriptor {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.id.is_empty() {
            return Err(ModuleError::InvalidMessage(
                "Module id cannot be empty".to_string(),
            ));
        }
        if self.url.is_empty() {
            return Err(ModuleError::InvalidMessage(format!(
                "Module {} has no source url",
                self.id
            )));
        }
        Ok(())
    }
}
