use crate::error::{ReleaseError, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// A `package.json` document, key order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    doc: Value,
}

impl PackageManifest {
    pub fn parse(content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content)?;
        if !doc.is_object() {
            return Err(ReleaseError::manifest("manifest is not a JSON object"));
        }
        Ok(PackageManifest { doc })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReleaseError::manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn name(&self) -> Result<&str> {
        self.field("name")
    }

    pub fn version(&self) -> Result<semver::Version> {
        Ok(semver::Version::parse(self.field("version")?)?)
    }

    pub fn set_version(&mut self, version: &semver::Version) {
        self.doc["version"] = json!(version.to_string());
    }

    /// Two-space indented JSON followed by a newline.
    pub fn render(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.doc)?;
        out.push('\n');
        Ok(out)
    }

    fn field(&self, key: &str) -> Result<&str> {
        self.doc
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ReleaseError::manifest(format!("missing '{}' field", key)))
    }
}
