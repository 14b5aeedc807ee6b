//! Baffle configuration.
//!
//! A configuration is a JSON document:
//!
//! ```json
//! {
//!   "internalFacesOnly": false,
//!   "noFields": false,
//!   "baffles": [
//!     {
//!       "name": "fan",
//!       "type": "faceZone",
//!       "zoneName": "fanFaces",
//!       "patches": [
//!         { "name": "fan0", "type": "cyclic", "neighbourPatch": "fan1",
//!           "patchFields": { "p": { "type": "fan", "value": 0.0 } } },
//!         { "name": "fan1", "type": "cyclic", "neighbourPatch": "fan0" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `internalFacesOnly` is required; `noFields` defaults to `false`.
//! Baffle entries are processed in list order. Apart from `name`, `type` and
//! `patches`, the keys of an entry are handed to the selector as its
//! settings. Patches of an entry alternate master, slave, master, slave.
//!
//! Everything is validated on load, so a broken configuration never reaches
//! the mesh.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mesh_error::ConfigError;
use crate::selection::{build_selector, FaceSelector};
use crate::topology::patch::PatchType;

/// Replacement patch field for one field on a baffle patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchFieldSpec {
    #[serde(rename = "type")]
    pub kind: String,
    /// Uniform value to assign, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl PatchFieldSpec {
    pub fn new(kind: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

/// Destination patch of a baffle side.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchSpec {
    pub name: String,
    /// Type used if the patch has to be created.
    pub kind: PatchType,
    /// Field overrides applied after the faces have moved.
    pub patch_fields: BTreeMap<String, PatchFieldSpec>,
}

impl PatchSpec {
    pub fn new(name: impl Into<String>, kind: PatchType) -> Self {
        Self {
            name: name.into(),
            kind,
            patch_fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, spec: PatchFieldSpec) -> Self {
        self.patch_fields.insert(field.into(), spec);
        self
    }
}

/// One baffle criterion and its patch list.
#[derive(Clone, Debug, PartialEq)]
pub struct BaffleSpec {
    /// Name of the criterion and of the face zone it fills.
    pub name: String,
    /// Selector kind.
    pub kind: String,
    /// Selector settings (a JSON object).
    pub settings: serde_json::Value,
    pub patches: Vec<PatchSpec>,
}

impl BaffleSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, settings: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            settings,
            patches: Vec::new(),
        }
    }

    pub fn with_patch(mut self, patch: PatchSpec) -> Self {
        self.patches.push(patch);
        self
    }

    /// Patches at even positions (masters).
    pub fn master_patches(&self) -> impl Iterator<Item = &PatchSpec> {
        self.patches.iter().step_by(2)
    }

    /// Patches at odd positions (slaves).
    pub fn slave_patches(&self) -> impl Iterator<Item = &PatchSpec> {
        self.patches.iter().skip(1).step_by(2)
    }
}

/// Validated baffle configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BafflesConfig {
    /// Leave faces on non-coupled boundary patches where they are.
    pub internal_faces_only: bool,
    /// Do not carry fields through the mesh change.
    pub no_fields: bool,
    pub baffles: Vec<BaffleSpec>,
}

// -------------------------------------------------------------------------
// Raw (unvalidated) form
// -------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    internal_faces_only: bool,
    #[serde(default)]
    no_fields: bool,
    #[serde(default)]
    baffles: Vec<RawBaffle>,
}

#[derive(Deserialize)]
struct RawBaffle {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    patches: Vec<RawPatch>,
    #[serde(flatten)]
    settings: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPatch {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    neighbour_patch: Option<String>,
    #[serde(default)]
    my_proc_no: Option<usize>,
    #[serde(default)]
    neighb_proc_no: Option<usize>,
    #[serde(default)]
    patch_fields: BTreeMap<String, PatchFieldSpec>,
}

impl RawPatch {
    fn resolve(self, baffle: &str, index: usize) -> Result<PatchSpec, ConfigError> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ConfigError::MissingPatchName {
                baffle: baffle.to_string(),
                index,
            })?;
        let kind = match self.kind.as_deref().unwrap_or("patch") {
            "patch" => PatchType::Patch,
            "wall" => PatchType::Wall,
            "empty" => PatchType::Empty,
            "symmetryPlane" => PatchType::SymmetryPlane,
            "cyclic" => PatchType::Cyclic {
                neighbour_patch: self.neighbour_patch.ok_or_else(|| {
                    ConfigError::MissingPatchKey {
                        patch: name.clone(),
                        kind: "cyclic",
                        key: "neighbourPatch",
                    }
                })?,
            },
            "processor" => {
                let missing = |key| ConfigError::MissingPatchKey {
                    patch: name.clone(),
                    kind: "processor",
                    key,
                };
                PatchType::Processor {
                    my_rank: self.my_proc_no.ok_or_else(|| missing("myProcNo"))?,
                    neighbour_rank: self.neighb_proc_no.ok_or_else(|| missing("neighbProcNo"))?,
                }
            }
            other => {
                return Err(ConfigError::UnknownPatchType {
                    baffle: baffle.to_string(),
                    patch: name,
                    kind: other.to_string(),
                });
            }
        };
        Ok(PatchSpec {
            name,
            kind,
            patch_fields: self.patch_fields,
        })
    }
}

impl BafflesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baffle(mut self, baffle: BaffleSpec) -> Self {
        self.baffles.push(baffle);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Parse and validate an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Reading baffle criteria from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut baffles = Vec::with_capacity(raw.baffles.len());
        for baffle in raw.baffles {
            let patches = baffle
                .patches
                .into_iter()
                .enumerate()
                .map(|(i, p)| p.resolve(&baffle.name, i))
                .collect::<Result<Vec<_>, _>>()?;
            baffles.push(BaffleSpec {
                name: baffle.name,
                kind: baffle.kind,
                settings: serde_json::Value::Object(baffle.settings),
                patches,
            });
        }
        let config = Self {
            internal_faces_only: raw.internal_faces_only,
            no_fields: raw.no_fields,
            baffles,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check names and that every selector can be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (i, baffle) in self.baffles.iter().enumerate() {
            if baffle.name.trim().is_empty() {
                return Err(ConfigError::EmptyBaffleName(i));
            }
            if !seen.insert(baffle.name.as_str()) {
                return Err(ConfigError::DuplicateBaffle(baffle.name.clone()));
            }
            if let Some(index) = baffle.patches.iter().position(|p| p.name.is_empty()) {
                return Err(ConfigError::MissingPatchName {
                    baffle: baffle.name.clone(),
                    index,
                });
            }
            if baffle.patches.len() % 2 == 1 {
                return Err(ConfigError::UnpairedPatch {
                    baffle: baffle.name.clone(),
                    patch: baffle.patches[baffle.patches.len() - 1].name.clone(),
                });
            }
        }
        self.build_selectors().map(|_| ())
    }

    /// Build the selector of every baffle entry, in order.
    pub fn build_selectors(&self) -> Result<Vec<Box<dyn FaceSelector>>, ConfigError> {
        self.baffles
            .iter()
            .map(|b| build_selector(&b.name, &b.kind, &b.settings))
            .collect()
    }

    /// Every destination patch name, sorted.
    pub fn patch_names(&self) -> BTreeSet<String> {
        self.baffles
            .iter()
            .flat_map(|b| b.patches.iter().map(|p| p.name.clone()))
            .collect()
    }
}
