//! Build-model input types.
//!
//! The build tool writes one model file per project next to its build file,
//! describing the already-resolved dependency graph: project coordinates,
//! the ordered remote repositories, direct and transitive artifact sets, and
//! the pass-through configuration destined for `bazel.json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};

/// Repository id excluded from hosting probes unless the model overrides it.
pub const DEFAULT_REPOSITORY_ID: &str = "central";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub skip: bool,

    #[serde(default = "default_repository_id")]
    pub default_repository: String,
    #[serde(default)]
    pub repositories: Vec<Repository>,

    #[serde(default)]
    pub direct_dependencies: Vec<Artifact>,
    #[serde(default)]
    pub transitive_dependencies: Vec<Artifact>,

    #[serde(default)]
    pub generated_source_rules: Vec<Value>,
    #[serde(default)]
    pub extra_rules: Vec<Value>,
    #[serde(default)]
    pub tool_dependencies: Vec<Artifact>,

    #[serde(default)]
    pub extra_config: Option<String>,
}

impl BuildModel {
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BridgeError::Model {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| BridgeError::Model {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Remote repository descriptor. Declared order is significant: resolution
/// probes repositories in model order and the first hit wins.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "type", default = "default_artifact_type")]
    pub kind: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Artifact {
    /// External reference key for the artifact: group, artifact and version
    /// joined with underscores, every character outside `[A-Za-z0-9_]`
    /// replaced by `_`.
    pub fn workspace_name(&self) -> String {
        let raw = format!("{}_{}_{}", self.group_id, self.artifact_id, self.version);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}

fn default_repository_id() -> String {
    DEFAULT_REPOSITORY_ID.to_string()
}

fn default_artifact_type() -> String {
    "jar".to_string()
}

fn default_scope() -> String {
    "compile".to_string()
}
