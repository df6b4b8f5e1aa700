//! Per-project Bazel descriptor assembly and output.
//!
//! The descriptor is the `bazel.json` document the downstream build-file
//! generator consumes: project identity, the advisory skip flag, the
//! pass-through rule lists, resolved tool dependencies, the repository
//! id→URL table, the three scope buckets, both annotated artifact lists
//! and the verbatim extra configuration.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::classify::DependencyClassifier;
use crate::error::{BridgeError, BridgeResult};
use crate::model::BuildModel;
use crate::resolve::{AnnotatedArtifact, RepositoryResolver};

pub const DESCRIPTOR_FILE: &str = "bazel.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BazelDescriptor {
    group_id: String,
    artifact_id: String,
    version: String,
    packaging: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    skip: bool,

    generated_source_rules: Vec<Value>,
    extra_rules: Vec<Value>,
    tool_dependencies: Vec<AnnotatedArtifact>,

    repo_urls: IndexMap<String, String>,
    compile_deps: Vec<String>,
    provided_deps: Vec<String>,
    test_deps: Vec<String>,
    direct_deps: Vec<AnnotatedArtifact>,
    transitive_deps: Vec<AnnotatedArtifact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    extra_config: Option<Value>,
}

impl BazelDescriptor {
    pub fn assemble(
        model: &BuildModel,
        classifier: &DependencyClassifier,
        resolver: &RepositoryResolver<'_>,
    ) -> BridgeResult<Self> {
        let tool_dependencies = model
            .tool_dependencies
            .iter()
            .map(|artifact| resolver.annotate(artifact))
            .collect::<BridgeResult<Vec<_>>>()?;

        let repo_urls = model
            .repositories
            .iter()
            .map(|repo| (repo.id.clone(), repo.url.clone()))
            .collect();

        let extra_config = model
            .extra_config
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(BridgeError::ExtraConfig)?;

        Ok(Self {
            group_id: model.group_id.clone(),
            artifact_id: model.artifact_id.clone(),
            version: model.version.clone(),
            packaging: model.packaging.clone(),
            url: model.url.clone(),
            skip: model.skip,
            generated_source_rules: model.generated_source_rules.clone(),
            extra_rules: model.extra_rules.clone(),
            tool_dependencies,
            repo_urls,
            compile_deps: classifier.compile_deps(),
            provided_deps: classifier.provided_deps(),
            test_deps: classifier.test_deps(),
            direct_deps: classifier.direct_artifacts().to_vec(),
            transitive_deps: classifier.transitive_artifacts().to_vec(),
            extra_config,
        })
    }

    /// Write to `<project_dir>/target/bazel.json`, creating `target/` as
    /// needed. The document is either fully written or not written at all.
    pub fn write(&self, project_dir: &Path) -> BridgeResult<PathBuf> {
        let target_dir = project_dir.join("target");
        let path = target_dir.join(DESCRIPTOR_FILE);
        let fail = |source: std::io::Error| BridgeError::DescriptorWrite {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&target_dir).map_err(fail)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::other)
            .map_err(fail)?;
        std::fs::write(&path, json + "\n").map_err(fail)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ProbeCache;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bazel_bridge_descriptor_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    // The snapshot is seeded with every URL the sample model can probe, so
    // assembly runs offline.
    fn assemble(model: serde_json::Value) -> BridgeResult<BazelDescriptor> {
        let model: BuildModel = serde_json::from_value(model).unwrap();
        let base = temp_dir("assemble");
        let path = base.join("url_response.json");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(
            &path,
            r#"{"http://internal.example/com/acme/widget/1.2.3/": 404}"#,
        )
        .unwrap();

        let cache = Arc::new(ProbeCache::at_path(path));
        let handle = cache.open()?;
        let resolver = RepositoryResolver::new(&cache, &model.repositories, "central");
        let result = DependencyClassifier::classify(&resolver, &model)
            .and_then(|classifier| BazelDescriptor::assemble(&model, &classifier, &resolver));
        let _ = handle.close();
        let _ = std::fs::remove_dir_all(base);
        result
    }

    fn sample_model() -> serde_json::Value {
        json!({
            "groupId": "com.acme",
            "artifactId": "app",
            "version": "1.0",
            "packaging": "jar",
            "skip": false,
            "repositories": [
                {"id": "central", "url": "http://central.example"},
                {"id": "internal", "url": "http://internal.example"}
            ],
            "transitiveDependencies": [
                {"groupId": "com.acme", "artifactId": "widget", "version": "1.2.3"}
            ],
            "extraRules": [{"name": "gen_version", "kind": "genrule"}]
        })
    }

    #[test]
    fn document_has_the_expected_field_set() -> anyhow::Result<()> {
        let value = serde_json::to_value(assemble(sample_model())?)?;
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();

        assert_eq!(
            keys,
            vec![
                "groupId",
                "artifactId",
                "version",
                "packaging",
                "skip",
                "generatedSourceRules",
                "extraRules",
                "toolDependencies",
                "repoUrls",
                "compileDeps",
                "providedDeps",
                "testDeps",
                "directDeps",
                "transitiveDeps",
            ]
        );
        // url and extraConfig were absent in the model and stay absent in
        // the document.
        assert!(value.get("url").is_none());
        assert!(value.get("extraConfig").is_none());
        Ok(())
    }

    #[test]
    fn repo_urls_keep_declared_order() -> anyhow::Result<()> {
        let value = serde_json::to_value(assemble(sample_model())?)?;
        let ids: Vec<&str> = value["repoUrls"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(ids, vec!["central", "internal"]);
        assert_eq!(value["repoUrls"]["internal"], "http://internal.example");
        Ok(())
    }

    #[test]
    fn extra_config_passes_through_verbatim() -> anyhow::Result<()> {
        let mut model = sample_model();
        model["extraConfig"] = json!(r#"{"jdk": 17, "flags": ["-Xlint"]}"#);
        let value = serde_json::to_value(assemble(model)?)?;
        assert_eq!(value["extraConfig"]["jdk"], 17);
        assert_eq!(value["extraConfig"]["flags"][0], "-Xlint");
        Ok(())
    }

    #[test]
    fn invalid_extra_config_is_rejected() {
        let mut model = sample_model();
        model["extraConfig"] = json!("{ nope");
        let err = assemble(model).unwrap_err();
        assert!(matches!(err, BridgeError::ExtraConfig(_)));
    }

    #[test]
    fn write_creates_target_directory_and_trailing_newline() -> anyhow::Result<()> {
        let project_dir = temp_dir("write");
        let descriptor = assemble(sample_model())?;

        let path = descriptor.write(&project_dir)?;
        assert_eq!(path, project_dir.join("target").join("bazel.json"));

        let raw = std::fs::read_to_string(&path)?;
        assert!(raw.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(value["compileDeps"][0], "@com_acme_widget_1_2_3//jar");

        let _ = std::fs::remove_dir_all(project_dir);
        Ok(())
    }
}
