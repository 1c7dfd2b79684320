use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

pub const DEFAULT_LOG_FILE: &str = "cds.log";
pub const JAR_LAUNCHER: &str = "org.springframework.boot.loader.launch.JarLauncher";
pub const RUN_APP_JAR: &str = "run-app.jar";

pub fn resolve_working_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.target.clone() {
        return Ok(p);
    }
    std::env::current_dir().context("Failed to resolve current directory")
}

/// Resolves the class loading log against the working directory, which must exist.
pub fn resolve_log_file(working_dir: &Path, log_file: Option<&Path>) -> Result<PathBuf> {
    let path = working_dir.join(log_file.unwrap_or(Path::new(DEFAULT_LOG_FILE)));
    if !path.exists() {
        let display = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
        bail!(
            "JVM log file does not exist: '{}' Set --target or --log-file",
            display.display()
        );
    }
    Ok(path)
}

/// Arguments that launch the application found in `working_dir`.
///
/// An explicit jar wins, then an exploded Spring Boot layout (`BOOT-INF`),
/// then an extracted `run-app.jar`.
pub fn detect_application(working_dir: &Path, jar: Option<&Path>) -> Result<Vec<String>> {
    if let Some(jar) = jar {
        let resolved = working_dir.join(jar);
        if !resolved.exists() {
            bail!("Specified jar file does not exist: {}", resolved.display());
        }
        let jar = jar.to_str().context("jar path is not valid UTF-8")?;
        return Ok(vec!["-jar".to_string(), jar.to_string()]);
    }
    if working_dir.join("BOOT-INF").exists() {
        return Ok(vec![JAR_LAUNCHER.to_string()]);
    }
    if working_dir.join(RUN_APP_JAR).exists() {
        return Ok(vec!["-jar".to_string(), RUN_APP_JAR.to_string()]);
    }
    bail!("No application detected in {}", working_dir.display())
}
