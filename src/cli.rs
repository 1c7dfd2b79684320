use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cds-log-analyzer")]
#[command(about = "Report class loading and CDS archive statistics from JVM logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory of the application; defaults to the current directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub target: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse an existing class loading log and print its statistics.
    Parse {
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },
    /// Run the application to create a CDS archive and report skipped classes.
    Create {
        #[arg(long, value_name = "FILE")]
        jar: Option<PathBuf>,

        /// Extra arguments passed to the application after its launch arguments.
        #[arg(last = true, value_name = "ARGS")]
        app_args: Vec<String>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Parse { log_file: None }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
