//! # cds-log-analyzer
//!
//! Turns JVM unified-logging output of the class loading and CDS archive
//! subsystems into aggregated reports.
//!
//! ## Architecture
//!
//! - **line**: Tag block and message extraction for a single log line
//! - **source**: Cache hit / miss classification of `class+load` messages
//! - **exclusion**: Skip notice classification of `cds` archive dump messages
//! - **buckets**: Insertion-ordered grouping of class names by key
//! - **report**: Immutable class loading and archive reports
//! - **parser**: Log resource reading and report accumulation
//! - **render**: Rankings, category splits, package grouping and text output
//! - **runner**: `java` invocation that dumps an archive and captures its log
//! - **cli** / **config**: Command line and working directory resolution

pub mod buckets;
pub mod cli;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod line;
pub mod parser;
pub mod render;
pub mod report;
pub mod runner;
pub mod source;

pub use error::AnalyzerError;
pub use parser::{ArchiveLogParser, ClassLoadingLogParser};
pub use report::{ArchiveReport, ClassLoadingReport};
