//! Resource I/O: the manifest, resource stores and table lookup

pub mod manifest;
pub mod store;
pub mod tables;

pub use manifest::{Manifest, MANIFEST_FILE};
pub use store::{FsStore, MemoryStore, ResourceStore};
pub use tables::TableSpec;

use crate::project::ProjectError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Raw contents of a located resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Find a table's resource, trying each candidate module in order.
///
/// A candidate is skipped when the manifest has no entry for it or the
/// store has no file at its path. Returns `Ok(None)` for an optional table
/// with no candidate left.
pub fn locate(
    store: &dyn ResourceStore,
    manifest: &Manifest,
    spec: &TableSpec,
) -> Result<Option<Resource>, ProjectError> {
    let mut tried = Vec::new();
    for module in spec.modules {
        let Some(path) = manifest.resource_path(module, &spec.name) else {
            tried.push(format!("{}/{}", module, spec.name));
            continue;
        };
        let read = store.read(path).map_err(|source| ProjectError::Io {
            path: path.to_string(),
            source,
        })?;
        match read {
            Some(bytes) => {
                debug!("{}: reading {} from {}", spec.table, path, module);
                return Ok(Some(Resource {
                    path: path.to_string(),
                    bytes,
                }));
            }
            None => tried.push(format!("{}/{} at {}", module, spec.name, path)),
        }
    }

    if spec.required {
        Err(ProjectError::MissingResource {
            table: spec.table.to_string(),
            tried: tried.join(", "),
        })
    } else {
        debug!("{}: not present, using defaults", spec.table);
        Ok(None)
    }
}

/// Locate a resource and decode it as UTF-8, returning `(path, text)`
pub fn read_text(
    store: &dyn ResourceStore,
    manifest: &Manifest,
    spec: &TableSpec,
) -> Result<Option<(String, String)>, ProjectError> {
    let Some(resource) = locate(store, manifest, spec)? else {
        return Ok(None);
    };
    let text = String::from_utf8(resource.bytes).map_err(|e| ProjectError::Io {
        path: resource.path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    Ok(Some((resource.path, text)))
}

/// Locate a YAML resource and deserialize it
pub fn read_yaml<T: DeserializeOwned>(
    store: &dyn ResourceStore,
    manifest: &Manifest,
    spec: &TableSpec,
) -> Result<Option<(String, T)>, ProjectError> {
    let Some((path, text)) = read_text(store, manifest, spec)? else {
        return Ok(None);
    };
    let value = serde_yaml::from_str(&text).map_err(|source| ProjectError::Yaml {
        path: path.clone(),
        source,
    })?;
    Ok(Some((path, value)))
}

/// Serialize a table as YAML for the given path
pub fn to_yaml<T: Serialize>(path: &str, value: &T) -> Result<Vec<u8>, ProjectError> {
    serde_yaml::to_string(value)
        .map(String::into_bytes)
        .map_err(|source| ProjectError::Yaml {
            path: path.to_string(),
            source,
        })
}

/// Path of the first candidate the manifest lists, whether or not it exists
pub fn locate_path<'a>(manifest: &'a Manifest, spec: &TableSpec) -> Option<&'a str> {
    spec.modules
        .iter()
        .find_map(|module| manifest.resource_path(module, &spec.name))
}

/// Path a table is saved to: the first candidate the manifest lists, or a
/// newly registered entry under the first module.
pub fn output_path(manifest: &mut Manifest, spec: &TableSpec) -> String {
    if let Some(path) = locate_path(manifest, spec) {
        return path.to_string();
    }
    manifest
        .set_resource(spec.modules[0], &spec.name, &spec.default_path)
        .to_string()
}
