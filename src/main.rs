use anyhow::{Context, Result};
use bazel_bridge::cache::{self, ProbeCache};
use bazel_bridge::classify::DependencyClassifier;
use bazel_bridge::cli::{Cli, Commands};
use bazel_bridge::config::{clear_cache, resolve_build_root, resolve_cache_path};
use bazel_bridge::descriptor::BazelDescriptor;
use bazel_bridge::model::BuildModel;
use bazel_bridge::resolve::RepositoryResolver;
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Stats => {
            let stats = cache::stats(&resolve_cache_path(&cli)?)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Clear => {
            clear_cache(&resolve_cache_path(&cli)?)?;
        }
        Commands::Generate { models } => {
            let build_root = resolve_build_root(&cli)?;
            let results = generate_all(&build_root, &models);

            let mut reports = Vec::new();
            let mut failures = 0usize;
            for result in results {
                match result {
                    Ok(report) => reports.push(report),
                    Err(err) => {
                        failures += 1;
                        eprintln!("[bazel-bridge] {err:#}");
                    }
                }
            }
            println!("{}", serde_json::to_string_pretty(&reports)?);

            if failures > 0 {
                anyhow::bail!("{failures} of {} build step(s) failed", models.len());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct StepReport {
    model: String,
    project: String,
    packaging: String,
    bazel_json: Option<String>,
    duration_ms: u64,
}

/// One build step per model file, fanned out over the thread pool. All
/// steps share one probe cache; the last step to finish persists it.
fn generate_all(build_root: &Path, models: &[PathBuf]) -> Vec<Result<StepReport>> {
    let cache = Arc::new(ProbeCache::new(build_root));
    models
        .par_iter()
        .map(|model_path| {
            generate_step(&cache, model_path)
                .with_context(|| format!("Failed to generate for {}", model_path.display()))
        })
        .collect()
}

fn generate_step(cache: &Arc<ProbeCache>, model_path: &Path) -> Result<StepReport> {
    let start = Instant::now();
    let handle = cache.open()?;

    let model = BuildModel::load(model_path)?;
    let project_dir = project_dir_of(model_path);

    let resolver = RepositoryResolver::new(cache, &model.repositories, &model.default_repository);
    let classifier = DependencyClassifier::classify(&resolver, &model)?;

    // POM projects still resolve and probe above; they just produce no
    // descriptor of their own.
    let bazel_json = if model.packaging == "pom" {
        warn!(model = %model_path.display(), "Skipping POM project");
        None
    } else {
        let descriptor = BazelDescriptor::assemble(&model, &classifier, &resolver)?;
        Some(descriptor.write(&project_dir)?)
    };

    handle.close()?;

    Ok(StepReport {
        model: model_path.to_string_lossy().to_string(),
        project: format!("{}:{}:{}", model.group_id, model.artifact_id, model.version),
        packaging: model.packaging,
        bazel_json: bazel_json.map(|p| p.to_string_lossy().to_string()),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn project_dir_of(model_path: &Path) -> PathBuf {
    match model_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_dir_is_the_model_file_parent() {
        assert_eq!(
            project_dir_of(Path::new("/work/app/model.json")),
            PathBuf::from("/work/app")
        );
        assert_eq!(
            project_dir_of(Path::new("model.json")),
            PathBuf::from(".")
        );
    }
}
