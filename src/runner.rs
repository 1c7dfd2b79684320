use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

pub const ARCHIVE_FILE: &str = "application.jsa";

fn java_command(working_dir: Option<&Path>, args: &[String]) -> Result<Output> {
    let java_bin = std::env::var("CDS_JAVA").unwrap_or_else(|_| "java".to_string());

    let mut command = Command::new(&java_bin);
    command.args(args);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }
    command
        .output()
        .with_context(|| format!("Failed to execute {java_bin} (make sure it is in your path)"))
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Output of `java --version`.
pub fn java_version() -> Result<String> {
    let output = java_command(None, &["--version".to_string()])?;
    if !output.status.success() {
        bail!("Failed to invoke java, make sure it is in your path");
    }
    Ok(combined_output(&output))
}

/// JVM flags that dump a dynamic archive at exit and log skipped classes to `log_file`.
pub fn archive_flags(log_file: &Path) -> Vec<String> {
    vec![
        "-Xlog:cds=off:stdout".to_string(),
        format!("-Xlog:cds=warning:file={}:tags", log_file.display()),
        format!("-XX:ArchiveClassesAtExit={ARCHIVE_FILE}"),
        "-Dspring.context.exit=onRefresh".to_string(),
    ]
}

/// Runs the application in `working_dir` with archive creation enabled.
///
/// Returns the log of the archive dump, ready for
/// [`ArchiveLogParser`](crate::parser::ArchiveLogParser).
pub fn create_archive(working_dir: &Path, app_args: &[String]) -> Result<PathBuf> {
    let log_file = temp_log_path("cds-archive-warnings");
    let mut args = archive_flags(&log_file);
    args.extend_from_slice(app_args);

    info!(working_dir = %working_dir.display(), "Starting application: java {}", args.join(" "));
    let output = java_command(Some(working_dir), &args)?;
    if !output.status.success() {
        bail!(
            "Failed to run application (exit status: {}):\n{}",
            output.status,
            combined_output(&output).trim_end()
        );
    }
    Ok(log_file)
}

fn temp_log_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{}-{nanos}.log", std::process::id()))
}
