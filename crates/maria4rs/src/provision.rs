use crate::config::ServerConfig;
use crate::error::Result;
use crate::runtime::{JavaRuntime, RuntimeProbe};
use maria4rs_maven::{DependencyWalker, MavenCentralRegistry, MavenRepository, ResolutionReport};
use std::path::{Path, PathBuf};

/// Everything needed to boot the embedded engine.
#[derive(Debug)]
pub struct Provisioned {
    pub runtime: JavaRuntime,
    /// Jars fetched into the dependencies directory.
    pub classpath: Vec<PathBuf>,
    pub report: ResolutionReport,
}

/// Locates the Java runtime and fetches the engine jars.
///
/// A missing runtime is fatal. Resolution failures are not: they are
/// reported per artifact in [`Provisioned::report`].
pub async fn provision(config: &ServerConfig, project_pom: Option<&Path>) -> Result<Provisioned> {
    let probe = RuntimeProbe::new(config.marker_path());
    let registry = MavenCentralRegistry::from_config(&config.resolver)?;
    provision_with(config, &probe, registry, project_pom).await
}

pub async fn provision_with<R: MavenRepository>(
    config: &ServerConfig,
    probe: &RuntimeProbe,
    registry: R,
    project_pom: Option<&Path>,
) -> Result<Provisioned> {
    let runtime = probe.locate(config.java_version).await?;

    let walker = DependencyWalker::from_config(registry, &config.resolver);
    let report = walker.resolve_project(project_pom).await;
    let classpath = report
        .jar_paths()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();

    tracing::info!(
        fetched = report.fetched_count(),
        failed = report.failed().count(),
        dir = %walker.dependencies_dir().display(),
        "dependencies resolved"
    );

    Ok(Provisioned {
        runtime,
        classpath,
        report,
    })
}
