//! The `Project.snake` manifest

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the manifest at the project root
pub const MANIFEST_FILE: &str = "Project.snake";

/// Maps `(module, resource name)` to a path relative to the project root.
///
/// Keys other than `resources` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Manifest {
    pub fn resource_path(&self, module: &str, name: &str) -> Option<&str> {
        self.resources
            .get(module)
            .and_then(|names| names.get(name))
            .map(String::as_str)
    }

    /// Register a resource, returning the path it resolves to
    pub fn set_resource(&mut self, module: &str, name: &str, path: &str) -> &str {
        self.resources
            .entry(module.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| path.to_string())
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
