use maria4rs::{ServerConfig, ServerError, provision};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_FILE_ENV: &str = "MARIA4RS_LOG_FILE";

fn init_tracing() {
    let log_file = std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let project_pom = std::env::args_os().nth(1).map(PathBuf::from);

    match provision(&config, project_pom.as_deref()).await {
        Ok(provisioned) => {
            println!("java: {}", provisioned.runtime.executable.display());
            println!(
                "jars: {} fetched into {}",
                provisioned.classpath.len(),
                config.resolver.dependencies_dir.display()
            );
            for outcome in provisioned.report.failed() {
                println!("failed: {} ({:?})", outcome.coordinate, outcome.status);
            }
            for key in &provisioned.report.unresolved {
                println!("unresolved: {key}");
            }
            ExitCode::SUCCESS
        }
        Err(e @ ServerError::Runtime { .. }) => {
            tracing::error!(error = %e, "install a JDK or set JAVA_HOME");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "provisioning failed");
            ExitCode::FAILURE
        }
    }
}
