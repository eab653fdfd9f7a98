//! Java runtime discovery.
//!
//! The embedded server runs on a JVM of a fixed major version. A runtime is
//! looked for on `PATH`, then under `JAVA_HOME`, then at the path recorded in
//! a marker file by an earlier successful probe.

use crate::error::{Result, ServerError};
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version\s+"([^"]+)""#).expect("Invalid regex"));

/// A located Java executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRuntime {
    pub executable: PathBuf,
    /// Installation root, when known (`<home>/bin/java`).
    pub java_home: Option<PathBuf>,
}

impl JavaRuntime {
    fn from_executable(executable: PathBuf) -> Self {
        let java_home = executable
            .parent()
            .and_then(Path::parent)
            .filter(|home| !home.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Self {
            executable,
            java_home,
        }
    }
}

/// Extracts the major version from the first line of `java -version`.
///
/// `openjdk version "17.0.2"` yields 17; legacy `"1.8.0_392"` yields 8.
pub fn parse_java_version(line: &str) -> Option<u32> {
    let caps = VERSION_PATTERN.captures(line)?;
    let mut parts = caps[1].split(|c: char| !c.is_ascii_digit());
    let major: u32 = parts.next()?.parse().ok()?;
    if major == 1 {
        parts.next()?.parse().ok()
    } else {
        Some(major)
    }
}

/// Runs `<executable> -version` and parses the reported major version.
pub async fn java_major_version(executable: &Path) -> Option<u32> {
    let output = match tokio::process::Command::new(executable)
        .arg("-version")
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(executable = %executable.display(), "java executable not found");
            return None;
        }
        Err(e) => {
            tracing::debug!(executable = %executable.display(), error = %e, "failed to run java");
            return None;
        }
    };

    if !output.status.success() {
        tracing::info!(executable = %executable.display(), "failed to determine JDK version");
        return None;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = stderr.lines().next().and_then(parse_java_version);
    if let Some(version) = version {
        tracing::info!(executable = %executable.display(), version, "found JDK");
    }
    version
}

pub fn read_marker(path: &Path) -> Option<PathBuf> {
    let content = std::fs::read_to_string(path).ok()?;
    let line = content.lines().next()?.trim();
    (!line.is_empty()).then(|| PathBuf::from(line))
}

pub fn write_marker(path: &Path, executable: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, executable.to_string_lossy().as_bytes())?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RuntimeProbe {
    path_executable: PathBuf,
    java_home: Option<PathBuf>,
    marker_path: PathBuf,
}

impl RuntimeProbe {
    /// Probe using `java` from `PATH` and the `JAVA_HOME` environment variable.
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        let java_home = std::env::var_os("JAVA_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            path_executable: PathBuf::from("java"),
            java_home,
            marker_path: marker_path.into(),
        }
    }

    #[must_use]
    pub fn with_java_home(mut self, java_home: Option<PathBuf>) -> Self {
        self.java_home = java_home;
        self
    }

    #[must_use]
    pub fn with_path_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.path_executable = executable.into();
        self
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker_path
    }

    pub async fn locate(&self, target: u32) -> Result<JavaRuntime> {
        if java_major_version(&self.path_executable).await == Some(target) {
            return Ok(JavaRuntime {
                executable: self.path_executable.clone(),
                java_home: self.java_home.clone(),
            });
        }

        if let Some(home) = &self.java_home {
            let executable = home.join("bin").join("java");
            if java_major_version(&executable).await == Some(target) {
                tracing::info!(java_home = %home.display(), "using JAVA_HOME runtime");
                if !self.marker_path.exists() {
                    write_marker(&self.marker_path, &executable)?;
                }
                return Ok(JavaRuntime {
                    executable,
                    java_home: Some(home.clone()),
                });
            }
        }

        if let Some(executable) = read_marker(&self.marker_path) {
            let runtime = JavaRuntime::from_executable(executable);
            if let Some(home) = runtime.java_home.as_deref()
                && home.exists()
            {
                tracing::info!(java_home = %home.display(), "using recorded runtime");
                return Ok(runtime);
            }
            tracing::warn!(
                marker = %self.marker_path.display(),
                executable = %runtime.executable.display(),
                "recorded runtime no longer exists"
            );
        }

        tracing::info!(target, "JDK is not installed");
        Err(ServerError::Runtime { target })
    }
}
