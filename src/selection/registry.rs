//! Process-wide table of selector kinds.
//!
//! Kinds are looked up by their configuration keyword when a baffle
//! configuration is loaded. New kinds register a factory with
//! [`register_selector_kind`]; the built-in kinds are present from the start.

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::mesh_error::ConfigError;
use crate::selection::{face_list, face_zone, plane, FaceSelector, FlipSelector};

/// Builds a selector from its baffle name and settings tree.
pub type SelectorFactory =
    fn(name: &str, settings: &serde_json::Value) -> Result<Box<dyn FaceSelector>, ConfigError>;

static REGISTRY: Lazy<RwLock<HashMap<String, SelectorFactory>>> = Lazy::new(|| {
    let mut kinds: HashMap<String, SelectorFactory> = HashMap::new();
    kinds.insert(face_zone::KIND.to_string(), face_zone::build);
    kinds.insert(face_list::KIND.to_string(), face_list::build);
    kinds.insert(plane::KIND.to_string(), plane::build);
    RwLock::new(kinds)
});

/// Register (or replace) a selector kind. Returns the previous factory.
pub fn register_selector_kind(kind: &str, factory: SelectorFactory) -> Option<SelectorFactory> {
    log::debug!("registering selector kind `{kind}`");
    REGISTRY.write().insert(kind.to_string(), factory)
}

/// Remove a selector kind. Returns its factory if it was registered.
pub fn deregister_selector_kind(kind: &str) -> Option<SelectorFactory> {
    REGISTRY.write().remove(kind)
}

/// Registered kind names, sorted.
pub fn selector_kinds() -> Vec<String> {
    let mut kinds: Vec<String> = REGISTRY.read().keys().cloned().collect();
    kinds.sort_unstable();
    kinds
}

/// Resolve `kind` and build a selector named `name`.
///
/// A boolean `flip` key in `settings` inverts every flip flag the selector
/// reports.
pub fn build_selector(
    name: &str,
    kind: &str,
    settings: &serde_json::Value,
) -> Result<Box<dyn FaceSelector>, ConfigError> {
    let factory = REGISTRY
        .read()
        .get(kind)
        .copied()
        .ok_or_else(|| ConfigError::UnknownSelector {
            baffle: name.to_string(),
            kind: kind.to_string(),
        })?;
    let selector = factory(name, settings)?;

    let flip = match settings.get("flip") {
        None => false,
        Some(value) => value.as_bool().ok_or_else(|| ConfigError::InvalidSelector {
            baffle: name.to_string(),
            kind: kind.to_string(),
            message: format!("`flip` must be a boolean, got {value}"),
        })?,
    };
    Ok(if flip {
        Box::new(FlipSelector { inner: selector })
    } else {
        selector
    })
}

/// Deserialize a kind's typed settings, mapping failures to
/// [`ConfigError::InvalidSelector`].
pub(crate) fn parse_settings<T: DeserializeOwned>(
    name: &str,
    kind: &str,
    settings: &serde_json::Value,
) -> Result<T, ConfigError> {
    serde_json::from_value(settings.clone()).map_err(|e| ConfigError::InvalidSelector {
        baffle: name.to_string(),
        kind: kind.to_string(),
        message: e.to_string(),
    })
}
