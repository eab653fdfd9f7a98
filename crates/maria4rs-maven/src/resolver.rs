//! Transitive dependency walker.
//!
//! Starting from root coordinates, each artifact's jar and pom are fetched,
//! the pom is parsed and its dependencies are walked depth-first (pre-order).
//! A `groupId:artifactId` is processed at most once per run, whatever version
//! is requested later. Failures only ever cut off the failing branch.

use crate::error::Result;
use crate::parser::parse_descriptor;
use crate::registry::MavenRepository;
use crate::types::{
    ArtifactCoordinate, ArtifactKind, CoordinateKey, PropertyTable, artifact_file_name,
    is_safe_file_component,
};
use maria4rs_core::ResolverConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Coordinates already processed during one resolution run.
pub type VisitedSet = HashSet<CoordinateKey>;

/// Root used when no project pom is available.
pub const DEFAULT_ROOT: (&str, &str, &str) = ("ch.vorburger.mariaDB4j", "mariaDB4j", "3.1.0");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Jar and pom are on disk.
    Fetched { jar: PathBuf, pom: PathBuf },
    JarUnavailable,
    DescriptorUnavailable,
    /// A root without a version that the registry could not resolve.
    VersionUnresolved,
    DepthLimitExceeded,
    /// artifactId or version would place the file outside the dependencies dir.
    InvalidCoordinate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub coordinate: ArtifactCoordinate,
    pub status: OutcomeStatus,
    pub depth: usize,
}

/// Per-artifact results of a resolution run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub outcomes: Vec<ArtifactOutcome>,
    /// Dependencies dropped because no version could be determined.
    pub unresolved: Vec<CoordinateKey>,
}

impl ResolutionReport {
    pub fn fetched(&self) -> impl Iterator<Item = &ArtifactCoordinate> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Fetched { .. }))
            .map(|o| &o.coordinate)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, OutcomeStatus::Fetched { .. }))
    }

    pub fn fetched_count(&self) -> usize {
        self.fetched().count()
    }

    pub fn is_fetched(&self, group_id: &str, artifact_id: &str) -> bool {
        self.fetched()
            .any(|c| c.group_id == group_id && c.artifact_id == artifact_id)
    }

    /// True when every processed artifact was fetched and nothing was dropped.
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none() && self.unresolved.is_empty()
    }

    /// Paths of all fetched jars, suitable for a classpath.
    pub fn jar_paths(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                OutcomeStatus::Fetched { jar, .. } => Some(jar.as_path()),
                _ => None,
            })
            .collect()
    }

    fn is_depth_limited(&self, key: &CoordinateKey) -> bool {
        self.outcomes.iter().any(|o| {
            o.status == OutcomeStatus::DepthLimitExceeded
                && o.coordinate.group_id == key.group_id
                && o.coordinate.artifact_id == key.artifact_id
        })
    }

    fn record(&mut self, coordinate: ArtifactCoordinate, depth: usize, status: OutcomeStatus) {
        self.outcomes.push(ArtifactOutcome {
            coordinate,
            status,
            depth,
        });
    }
}

pub fn default_roots() -> Vec<ArtifactCoordinate> {
    let (group_id, artifact_id, version) = DEFAULT_ROOT;
    vec![ArtifactCoordinate::versioned(group_id, artifact_id, version)]
}

/// Reads a project pom and returns its runtime dependencies as roots.
pub async fn roots_from_pom<R>(path: &Path, registry: &R) -> Result<Vec<ArtifactCoordinate>>
where
    R: MavenRepository + ?Sized,
{
    let mut properties = PropertyTable::new();
    let parsed = parse_descriptor(path, &mut properties, registry).await?;
    Ok(parsed
        .dependencies
        .iter()
        .map(|d| d.to_coordinate())
        .collect())
}

pub struct DependencyWalker<R> {
    registry: R,
    dependencies_dir: PathBuf,
    max_depth: usize,
}

impl<R: MavenRepository> DependencyWalker<R> {
    pub fn new(registry: R, dependencies_dir: impl Into<PathBuf>, max_depth: usize) -> Self {
        Self {
            registry,
            dependencies_dir: dependencies_dir.into(),
            max_depth,
        }
    }

    pub fn from_config(registry: R, config: &ResolverConfig) -> Self {
        Self::new(registry, &config.dependencies_dir, config.max_depth)
    }

    pub const fn registry(&self) -> &R {
        &self.registry
    }

    pub fn dependencies_dir(&self) -> &Path {
        &self.dependencies_dir
    }

    /// Resolves every root with one shared [`VisitedSet`].
    pub async fn resolve_all(&self, roots: &[ArtifactCoordinate]) -> ResolutionReport {
        if let Err(e) = tokio::fs::create_dir_all(&self.dependencies_dir).await {
            tracing::warn!(
                path = %self.dependencies_dir.display(),
                error = %e,
                "failed to create dependencies directory"
            );
        }

        let mut visited = VisitedSet::new();
        let mut report = ResolutionReport::default();

        for root in roots {
            tracing::info!(artifact = %root, "resolving");
            self.resolve_one(root.clone(), &mut visited, &mut report)
                .await;
        }

        tracing::info!(
            fetched = report.fetched_count(),
            failed = report.failed().count(),
            unresolved = report.unresolved.len(),
            "all dependencies processed"
        );
        report
    }

    /// Resolves the dependencies of `project_pom` when it exists, otherwise
    /// the [`default_roots`].
    pub async fn resolve_project(&self, project_pom: Option<&Path>) -> ResolutionReport {
        let roots = match project_pom {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "loading dependency configuration");
                match roots_from_pom(path, &self.registry).await {
                    Ok(roots) => roots,
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to read project pom, using default roots"
                        );
                        default_roots()
                    }
                }
            }
            _ => default_roots(),
        };
        self.resolve_all(&roots).await
    }

    /// Walks `root` and its transitive dependencies.
    ///
    /// Uses an explicit stack so deep graphs cannot exhaust the call stack;
    /// entries deeper than `max_depth` are reported and skipped.
    pub async fn resolve_one(
        &self,
        root: ArtifactCoordinate,
        visited: &mut VisitedSet,
        report: &mut ResolutionReport,
    ) {
        let mut stack = vec![(root, 0usize)];

        while let Some((coordinate, depth)) = stack.pop() {
            let key = coordinate.key();
            if visited.contains(&key) {
                tracing::trace!(artifact = %coordinate, "already processed");
                continue;
            }
            if depth > self.max_depth {
                tracing::warn!(
                    artifact = %coordinate,
                    max_depth = self.max_depth,
                    "dependency depth limit exceeded, skipping"
                );
                if !report.is_depth_limited(&key) {
                    report.record(coordinate, depth, OutcomeStatus::DepthLimitExceeded);
                }
                continue;
            }
            visited.insert(key);

            let Some(version) = self.version_of(&coordinate).await else {
                report.record(coordinate, depth, OutcomeStatus::VersionUnresolved);
                continue;
            };
            let (group_id, artifact_id) = (&coordinate.group_id, &coordinate.artifact_id);

            if !is_safe_file_component(artifact_id) || !is_safe_file_component(&version) {
                tracing::warn!(
                    artifact = %coordinate,
                    version = %version,
                    "artifactId or version is not a valid file name, skipping"
                );
                report.record(coordinate, depth, OutcomeStatus::InvalidCoordinate);
                continue;
            }

            let jar = self.target_path(artifact_id, &version, ArtifactKind::Jar);
            let jar_url = self
                .registry
                .artifact_url(group_id, artifact_id, &version, ArtifactKind::Jar);
            tracing::debug!(url = %jar_url, path = %jar.display(), "fetching jar");
            if !self.registry.fetch(&jar_url, &jar).await {
                tracing::warn!(artifact = %coordinate, "failed to download JAR");
                report.record(coordinate, depth, OutcomeStatus::JarUnavailable);
                continue;
            }

            let pom = self.target_path(artifact_id, &version, ArtifactKind::Pom);
            let pom_url = self
                .registry
                .artifact_url(group_id, artifact_id, &version, ArtifactKind::Pom);
            if !self.registry.fetch(&pom_url, &pom).await {
                tracing::warn!(artifact = %coordinate, "failed to download POM");
                report.record(coordinate, depth, OutcomeStatus::DescriptorUnavailable);
                continue;
            }

            let mut properties = PropertyTable::new();
            let dependencies = match parse_descriptor(&pom, &mut properties, &self.registry).await
            {
                Ok(parsed) => {
                    if !parsed.modules.is_empty() {
                        tracing::debug!(modules = ?parsed.modules, "modules are not traversed");
                    }
                    report.unresolved.extend(parsed.unresolved);
                    parsed.dependencies
                }
                Err(e) => {
                    tracing::warn!(path = %pom.display(), error = %e, "failed to parse POM");
                    Vec::new()
                }
            };

            let resolved = ArtifactCoordinate::versioned(group_id, artifact_id, version);
            report.record(resolved, depth, OutcomeStatus::Fetched { jar, pom });

            // Reversed so dependencies are popped in declaration order.
            for dep in dependencies.iter().rev() {
                stack.push((dep.to_coordinate(), depth + 1));
            }
        }
    }

    async fn version_of(&self, coordinate: &ArtifactCoordinate) -> Option<String> {
        if let Some(version) = &coordinate.version {
            return Some(version.clone());
        }
        let version = self
            .registry
            .latest_version(&coordinate.group_id, &coordinate.artifact_id)
            .await;
        if version.is_none() {
            tracing::warn!(artifact = %coordinate, "no version available, skipping");
        }
        version
    }

    fn target_path(&self, artifact_id: &str, version: &str, kind: ArtifactKind) -> PathBuf {
        self.dependencies_dir
            .join(artifact_file_name(artifact_id, version, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::artifact_url;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "mem://repo";

    /// In-memory repository recording every network-level interaction.
    #[derive(Default)]
    struct FakeRepository {
        files: HashMap<String, String>,
        latest: HashMap<(String, String), String>,
        downloads: Mutex<Vec<String>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeRepository {
        fn artifact(mut self, g: &str, a: &str, v: &str, deps: &[(&str, &str, Option<&str>)]) -> Self {
            let body: String = deps
                .iter()
                .map(|(dg, da, dv)| {
                    let version = dv.map(|v| format!("<version>{v}</version>")).unwrap_or_default();
                    format!(
                        "<dependency><groupId>{dg}</groupId><artifactId>{da}</artifactId>{version}</dependency>"
                    )
                })
                .collect();
            let pom = format!(
                "<project><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version><dependencies>{body}</dependencies></project>"
            );
            self.files
                .insert(artifact_url(BASE, g, a, v, ArtifactKind::Jar), "jar".into());
            self.files
                .insert(artifact_url(BASE, g, a, v, ArtifactKind::Pom), pom);
            self
        }

        fn raw_pom(mut self, g: &str, a: &str, v: &str, pom: &str) -> Self {
            self.files
                .insert(artifact_url(BASE, g, a, v, ArtifactKind::Jar), "jar".into());
            self.files
                .insert(artifact_url(BASE, g, a, v, ArtifactKind::Pom), pom.into());
            self
        }

        fn jar_only(mut self, g: &str, a: &str, v: &str) -> Self {
            self.files
                .insert(artifact_url(BASE, g, a, v, ArtifactKind::Jar), "jar".into());
            self
        }

        fn latest(mut self, g: &str, a: &str, v: &str) -> Self {
            self.latest.insert((g.into(), a.into()), v.into());
            self
        }

        fn downloads(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MavenRepository for FakeRepository {
        async fn latest_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
            self.queries
                .lock()
                .unwrap()
                .push(format!("{group_id}:{artifact_id}"));
            self.latest
                .get(&(group_id.to_string(), artifact_id.to_string()))
                .cloned()
        }

        fn artifact_url(
            &self,
            group_id: &str,
            artifact_id: &str,
            version: &str,
            kind: ArtifactKind,
        ) -> String {
            artifact_url(BASE, group_id, artifact_id, version, kind)
        }

        async fn fetch(&self, url: &str, dest: &Path) -> bool {
            if dest.exists() {
                return true;
            }
            let Some(content) = self.files.get(url) else {
                return false;
            };
            self.downloads.lock().unwrap().push(url.to_string());
            std::fs::write(dest, content).is_ok()
        }
    }

    fn walker(repo: FakeRepository, dir: &Path) -> DependencyWalker<FakeRepository> {
        DependencyWalker::new(repo, dir, 64)
    }

    fn root(g: &str, a: &str, v: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::versioned(g, a, v)
    }

    #[tokio::test]
    async fn test_transitive_resolution_in_preorder() {
        let repo = FakeRepository::default()
            .artifact("g", "app", "1.0", &[("g", "lib-a", Some("1.0")), ("g", "lib-b", Some("2.0"))])
            .artifact("g", "lib-a", "1.0", &[("g", "lib-c", Some("3.0"))])
            .artifact("g", "lib-b", "2.0", &[])
            .artifact("g", "lib-c", "3.0", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1.0")]).await;

        let order: Vec<_> = report.fetched().map(|c| c.artifact_id.as_str()).collect();
        assert_eq!(order, vec!["app", "lib-a", "lib-c", "lib-b"]);
        assert!(report.is_complete());
        assert!(dir.path().join("lib-c-3.0.jar").exists());
        assert!(dir.path().join("lib-c-3.0.pom").exists());
        assert_eq!(report.outcomes[2].depth, 2);
    }

    #[tokio::test]
    async fn test_cycle_terminates_and_fetches_once() {
        let repo = FakeRepository::default()
            .artifact("g", "a", "1", &[("g", "b", Some("1"))])
            .artifact("g", "b", "1", &[("g", "a", Some("1"))]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "a", "1")]).await;

        assert_eq!(report.fetched_count(), 2);
        let downloads = walker.registry().downloads();
        assert_eq!(downloads.len(), 4);
        assert_eq!(
            downloads.iter().filter(|u| u.ends_with("a-1.jar")).count(),
            1
        );
        assert_eq!(
            downloads.iter().filter(|u| u.ends_with("b-1.jar")).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_first_seen_version_wins() {
        let repo = FakeRepository::default()
            .artifact("g", "app", "1", &[("g", "lib", Some("1.0")), ("g", "other", Some("1"))])
            .artifact("g", "other", "1", &[("g", "lib", Some("2.0"))])
            .artifact("g", "lib", "1.0", &[])
            .artifact("g", "lib", "2.0", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        let libs: Vec<_> = report
            .fetched()
            .filter(|c| c.artifact_id == "lib")
            .collect();
        assert_eq!(libs.len(), 1);
        assert_eq!(libs[0].version.as_deref(), Some("1.0"));
        assert!(!dir.path().join("lib-2.0.jar").exists());
    }

    #[tokio::test]
    async fn test_shared_visited_set_across_roots() {
        let repo = FakeRepository::default()
            .artifact("g", "one", "1", &[("g", "common", Some("1"))])
            .artifact("g", "two", "1", &[("g", "common", Some("1"))])
            .artifact("g", "common", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker
            .resolve_all(&[root("g", "one", "1"), root("g", "two", "1"), root("g", "one", "1")])
            .await;

        assert_eq!(report.fetched_count(), 3);
        assert_eq!(walker.registry().downloads().len(), 6);
    }

    #[tokio::test]
    async fn test_rerun_against_cache_performs_no_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let build = || {
            FakeRepository::default()
                .artifact("g", "app", "1", &[("g", "lib", Some("1"))])
                .artifact("g", "lib", "1", &[])
        };

        let first = walker(build(), dir.path());
        let report = first.resolve_all(&[root("g", "app", "1")]).await;
        assert_eq!(first.registry().downloads().len(), 4);
        assert!(report.is_complete());

        let second = walker(build(), dir.path());
        let report = second.resolve_all(&[root("g", "app", "1")]).await;
        assert!(second.registry().downloads().is_empty());
        assert_eq!(report.fetched_count(), 2);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_missing_jar_aborts_branch_only() {
        let repo = FakeRepository::default()
            .artifact("g", "app", "1", &[("g", "gone", Some("1")), ("g", "ok", Some("1"))])
            .artifact("g", "ok", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        assert!(report.is_fetched("g", "ok"));
        assert!(!report.is_fetched("g", "gone"));
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].status, OutcomeStatus::JarUnavailable);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_missing_pom_aborts_branch() {
        let repo = FakeRepository::default().jar_only("g", "nopom", "1");
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "nopom", "1")]).await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::DescriptorUnavailable);
        assert!(dir.path().join("nopom-1.jar").exists());
    }

    #[tokio::test]
    async fn test_malformed_pom_yields_no_dependencies() {
        let repo = FakeRepository::default().raw_pom("g", "broken", "1", "<project><dependencies>");
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "broken", "1")]).await;

        assert_eq!(report.fetched_count(), 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_excluded_scopes_never_fetched() {
        let pom = r"<project>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>kept</artifactId><version>1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>junit</artifactId><version>1</version><scope>test</scope></dependency>
    <dependency><groupId>g</groupId><artifactId>servlet</artifactId><version>1</version><scope>provided</scope></dependency>
    <dependency><groupId>g</groupId><artifactId>extra</artifactId><version>1</version><optional>true</optional></dependency>
  </dependencies>
</project>";
        let repo = FakeRepository::default()
            .raw_pom("g", "app", "1", pom)
            .artifact("g", "kept", "1", &[])
            .artifact("g", "junit", "1", &[])
            .artifact("g", "servlet", "1", &[])
            .artifact("g", "extra", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        let fetched: Vec<_> = report.fetched().map(|c| c.artifact_id.as_str()).collect();
        assert_eq!(fetched, vec!["app", "kept"]);
        assert!(
            walker
                .registry()
                .downloads()
                .iter()
                .all(|u| !u.contains("junit") && !u.contains("servlet") && !u.contains("extra"))
        );
    }

    #[tokio::test]
    async fn test_managed_version_skips_registry() {
        let pom = r"<project>
  <dependencyManagement>
    <dependencies>
      <dependency><groupId>g</groupId><artifactId>lib</artifactId><version>2.0</version></dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>lib</artifactId></dependency>
  </dependencies>
</project>";
        let repo = FakeRepository::default()
            .raw_pom("g", "app", "1", pom)
            .artifact("g", "lib", "2.0", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        assert!(walker.registry().queries().is_empty());
        let lib = report.fetched().find(|c| c.artifact_id == "lib").unwrap();
        assert_eq!(lib.version.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn test_missing_version_queries_registry_once() {
        let repo = FakeRepository::default()
            .artifact("g", "app", "1", &[("g", "found", None), ("g", "lost", None)])
            .artifact("g", "found", "4.2", &[])
            .latest("g", "found", "4.2");
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        assert_eq!(walker.registry().queries(), vec!["g:found", "g:lost"]);
        assert!(report.is_fetched("g", "found"));
        assert!(!report.is_fetched("g", "lost"));
        assert_eq!(report.unresolved, vec![CoordinateKey::new("g", "lost")]);
    }

    #[tokio::test]
    async fn test_unversioned_root_uses_latest() {
        let repo = FakeRepository::default()
            .artifact("g", "app", "5", &[])
            .latest("g", "app", "5");
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker
            .resolve_all(&[
                ArtifactCoordinate::new("g", "app", None),
                ArtifactCoordinate::new("g", "unknown", None),
            ])
            .await;

        assert!(dir.path().join("app-5.jar").exists());
        assert_eq!(report.outcomes[0].coordinate.version.as_deref(), Some("5"));
        assert_eq!(report.outcomes[1].status, OutcomeStatus::VersionUnresolved);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let repo = FakeRepository::default()
            .artifact("g", "a", "1", &[("g", "b", Some("1"))])
            .artifact("g", "b", "1", &[("g", "c", Some("1"))])
            .artifact("g", "c", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = DependencyWalker::new(repo, dir.path(), 1);

        let report = walker.resolve_all(&[root("g", "a", "1")]).await;

        assert_eq!(report.fetched_count(), 2);
        assert_eq!(report.outcomes[2].status, OutcomeStatus::DepthLimitExceeded);
        assert!(!dir.path().join("c-1.jar").exists());
    }

    #[tokio::test]
    async fn test_depth_limited_artifact_reported_once() {
        let repo = FakeRepository::default()
            .artifact("g", "a", "1", &[("g", "b", Some("1")), ("g", "c", Some("1"))])
            .artifact("g", "b", "1", &[("g", "deep", Some("1"))])
            .artifact("g", "c", "1", &[("g", "deep", Some("1"))])
            .artifact("g", "deep", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = DependencyWalker::new(repo, dir.path(), 1);

        let report = walker.resolve_all(&[root("g", "a", "1")]).await;

        assert_eq!(report.fetched_count(), 3);
        let limited: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::DepthLimitExceeded)
            .map(|o| o.coordinate.artifact_id.as_str())
            .collect();
        assert_eq!(limited, vec!["deep"]);
    }

    #[tokio::test]
    async fn test_path_escaping_coordinates_rejected() {
        let pom = r"<project>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>../../escaped</artifactId><version>1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>/tmp/abs</artifactId><version>1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>lib</artifactId><version>../1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>ok</artifactId><version>1</version></dependency>
  </dependencies>
</project>";
        let repo = FakeRepository::default()
            .raw_pom("g", "app", "1", pom)
            .artifact("g", "../../escaped", "1", &[])
            .artifact("g", "/tmp/abs", "1", &[])
            .artifact("g", "lib", "../1", &[])
            .artifact("g", "ok", "1", &[]);
        let scratch = tempfile::tempdir().unwrap();
        let jars = scratch.path().join("a").join("b");
        let walker = walker(repo, &jars);

        let report = walker.resolve_all(&[root("g", "app", "1")]).await;

        let rejected: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::InvalidCoordinate)
            .map(|o| o.coordinate.artifact_id.as_str())
            .collect();
        assert_eq!(rejected, vec!["../../escaped", "/tmp/abs", "lib"]);
        assert!(report.is_fetched("g", "ok"));
        assert!(!report.is_complete());

        let downloads = walker.registry().downloads();
        assert_eq!(downloads.len(), 4);
        assert!(downloads.iter().all(|url| !url.contains("..") && !url.contains("/tmp/")));
        assert!(!scratch.path().join("escaped-1.jar").exists());
        assert!(!std::path::Path::new("/tmp/abs-1.jar").exists());
    }

    #[tokio::test]
    async fn test_modules_not_traversed() {
        let pom = r"<project>
  <groupId>g</groupId>
  <version>1</version>
  <modules><module>child</module></modules>
</project>";
        let repo = FakeRepository::default()
            .raw_pom("g", "parent", "1", pom)
            .artifact("g", "child", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker.resolve_all(&[root("g", "parent", "1")]).await;

        assert_eq!(report.fetched_count(), 1);
        assert!(!report.is_fetched("g", "child"));
    }

    #[tokio::test]
    async fn test_creates_dependencies_dir() {
        let repo = FakeRepository::default().artifact("g", "a", "1", &[]);
        let dir = tempfile::tempdir().unwrap();
        let jars = dir.path().join("mariadb4j_jars");
        let walker = walker(repo, &jars);

        let report = walker.resolve_all(&[root("g", "a", "1")]).await;

        assert!(report.is_complete());
        assert!(jars.join("a-1.jar").exists());
        assert_eq!(report.jar_paths(), vec![jars.join("a-1.jar").as_path()]);
    }

    #[tokio::test]
    async fn test_resolve_project_falls_back_to_default_root() {
        let (g, a, v) = DEFAULT_ROOT;
        let repo = FakeRepository::default().artifact(g, a, v, &[]);
        let dir = tempfile::tempdir().unwrap();
        let walker = walker(repo, dir.path());

        let report = walker
            .resolve_project(Some(&dir.path().join("missing-pom.xml")))
            .await;

        assert!(report.is_fetched(g, a));
    }

    #[tokio::test]
    async fn test_resolve_project_from_pom() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("pom.xml");
        std::fs::write(
            &project,
            r"<project>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>lib</artifactId><version>1</version></dependency>
    <dependency><groupId>g</groupId><artifactId>junit</artifactId><version>1</version><scope>test</scope></dependency>
  </dependencies>
</project>",
        )
        .unwrap();
        let repo = FakeRepository::default().artifact("g", "lib", "1", &[]);
        let walker = walker(repo, &dir.path().join("jars"));

        let report = walker.resolve_project(Some(&project)).await;

        let fetched: Vec<_> = report.fetched().map(ToString::to_string).collect();
        assert_eq!(fetched, vec!["g:lib:1"]);
    }
}
