//! Remote-repository resolution for artifacts.
//!
//! A repository hosts an artifact when
//! `<base>/<group path>/<artifact>/<version>/` answers 200. Repositories
//! are probed in declared model order and the first hit wins; the
//! designated default repository is never probed, so an artifact hosted
//! nowhere else resolves to `None` and is served from the default.

use serde::Serialize;

use crate::cache::ProbeCache;
use crate::error::BridgeResult;
use crate::model::{Artifact, Repository};

/// An artifact with its resolved hosting repository attached alongside,
/// ready for descriptor serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedArtifact {
    #[serde(flatten)]
    pub artifact: Artifact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
}

pub struct RepositoryResolver<'a> {
    cache: &'a ProbeCache,
    repositories: &'a [Repository],
    default_repository: &'a str,
}

impl<'a> RepositoryResolver<'a> {
    pub fn new(
        cache: &'a ProbeCache,
        repositories: &'a [Repository],
        default_repository: &'a str,
    ) -> Self {
        Self {
            cache,
            repositories,
            default_repository,
        }
    }

    /// Base URL of the first non-default repository hosting `artifact`, in
    /// declared repository order. `None` means the default repository.
    pub fn repository_url(&self, artifact: &Artifact) -> BridgeResult<Option<String>> {
        for repo in self.repositories {
            if repo.id == self.default_repository {
                continue;
            }
            if self.cache.response_code(&hosting_url(&repo.url, artifact))? == 200 {
                return Ok(Some(repo.url.clone()));
            }
        }
        Ok(None)
    }

    pub fn annotate(&self, artifact: &Artifact) -> BridgeResult<AnnotatedArtifact> {
        let repository_url = self.repository_url(artifact)?;
        Ok(AnnotatedArtifact {
            artifact: artifact.clone(),
            repository_url,
        })
    }
}

pub fn hosting_url(repo_url: &str, artifact: &Artifact) -> String {
    format!(
        "{}/{}/{}/{}/",
        repo_url,
        artifact.group_id.replace('.', "/"),
        artifact.artifact_id,
        artifact.version
    )
}
