use anyhow::{Context, Result};
use clap::Parser;
use cds_log_analyzer::cli::{Cli, Commands, OutputFormat};
use cds_log_analyzer::config::{detect_application, resolve_log_file, resolve_working_dir};
use cds_log_analyzer::parser::{ArchiveLogParser, ClassLoadingLogParser};
use cds_log_analyzer::render::{ArchiveSummary, ClassLoadingSummary};
use cds_log_analyzer::runner::{ARCHIVE_FILE, create_archive, java_version};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let working_dir = resolve_working_dir(&cli)?;
    match cli.command.clone().unwrap_or_default() {
        Commands::Parse { log_file } => {
            parse_jvm_logs(&working_dir, log_file.as_deref(), cli.format)?;
        }
        Commands::Create { jar, app_args } => {
            create_cds_archive(&working_dir, jar.as_deref(), &app_args, cli.format)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_jvm_logs(working_dir: &Path, log_file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let log_file = resolve_log_file(working_dir, log_file)?;
    let report = ClassLoadingLogParser::new(working_dir)
        .parse(&log_file)
        .with_context(|| format!("Failed to parse {}", log_file.display()))?;
    let summary = ClassLoadingSummary::from_report(&report);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", summary.to_text()),
    }
    Ok(())
}

fn create_cds_archive(
    working_dir: &Path,
    jar: Option<&Path>,
    app_args: &[String],
    format: OutputFormat,
) -> Result<()> {
    let mut launch = detect_application(working_dir, jar)?;
    launch.extend_from_slice(app_args);

    let text = format == OutputFormat::Text;
    if text {
        println!("Creating the CDS archive ...");
        println!();
        println!("Using java version:");
        println!("{}", java_version()?);
        println!("Starting application using command: java {}", launch.join(" "));
    }

    let log_file = create_archive(working_dir, &launch)?;
    let report = ArchiveLogParser::new()
        .parse(&log_file)
        .with_context(|| format!("Failed to parse {}", log_file.display()))?;
    let summary = ArchiveSummary::from_report(&report);

    if text {
        print!("{}", summary.to_text());
        println!("To use the archive and collect class loading logs for this application, add the following flag:");
        println!();
        println!("\t-XX:SharedArchiveFile={ARCHIVE_FILE} -Xlog:class+load:file=cds.log:tags");
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
