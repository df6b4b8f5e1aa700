//! Scope classification of resolved dependency artifacts.
//!
//! Walks the transitive set once, attaching the resolved repository to
//! every artifact and collecting `@<workspace-name>//jar` references into
//! per-scope buckets. Buckets keep first-insertion order and suppress
//! duplicates, matching what the downstream generator expects.

use indexmap::{IndexMap, IndexSet};

use crate::error::BridgeResult;
use crate::model::{Artifact, BuildModel};
use crate::resolve::{AnnotatedArtifact, RepositoryResolver};

#[derive(Debug, Default)]
pub struct DependencyClassifier {
    scopes: IndexMap<String, IndexSet<String>>,
    direct: Vec<AnnotatedArtifact>,
    transitive: Vec<AnnotatedArtifact>,
}

impl DependencyClassifier {
    pub fn classify(
        resolver: &RepositoryResolver<'_>,
        model: &BuildModel,
    ) -> BridgeResult<Self> {
        let mut classifier = Self::default();

        for artifact in &model.transitive_dependencies {
            classifier.transitive.push(resolver.annotate(artifact)?);
            if artifact.scope != "system" {
                classifier.add_to_scope(artifact);
            }
        }

        for artifact in &model.direct_dependencies {
            classifier.direct.push(resolver.annotate(artifact)?);
        }

        Ok(classifier)
    }

    // Only jar artifacts become workspace references; other packaging
    // types have no //jar target to point at.
    fn add_to_scope(&mut self, artifact: &Artifact) {
        if artifact.kind == "jar" {
            let reference = format!("@{}//jar", artifact.workspace_name());
            self.scopes
                .entry(artifact.scope.clone())
                .or_default()
                .insert(reference);
        }
    }

    fn scope_deps(&self, scope: &str) -> Vec<String> {
        self.scopes
            .get(scope)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn compile_deps(&self) -> Vec<String> {
        self.scope_deps("compile")
    }

    pub fn provided_deps(&self) -> Vec<String> {
        self.scope_deps("provided")
    }

    pub fn test_deps(&self) -> Vec<String> {
        self.scope_deps("test")
    }

    pub fn direct_artifacts(&self) -> &[AnnotatedArtifact] {
        &self.direct
    }

    pub fn transitive_artifacts(&self) -> &[AnnotatedArtifact] {
        &self.transitive
    }
}
