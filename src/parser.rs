//! Log parsers that expect the JVM logs to be decorated with their tags, as
//! produced by options such as:
//!
//! ```text
//! -Xlog:class+load:file=cds.log:tags
//! -Xlog:cds=warning:file=cds-warnings.log:tags
//! ```
//!
//! Both parsers share one line loop: blank lines are ignored, every other line
//! must carry a tag block, and lines are offered to an accumulator that owns
//! the buckets until the report is built.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::buckets::Buckets;
use crate::error::{AnalyzerError, Result};
use crate::exclusion::{ExclusionEvent, classify_exclusion};
use crate::line::LogLine;
use crate::report::{ArchiveReport, ClassLoadingReport};
use crate::source::{SourceEvent, SourceRule, classify_source};

const IN_MEMORY: &str = "<memory>";

trait Accumulator {
    type Report;

    /// Offers a tokenized line; returns whether it produced an event.
    fn accept(&mut self, line: &LogLine, raw: &str, line_number: usize) -> Result<bool>;

    fn finish(self) -> Self::Report;
}

/// Parses `class+load` logs into a [`ClassLoadingReport`].
#[derive(Debug, Clone)]
pub struct ClassLoadingLogParser {
    working_dir: PathBuf,
}

impl ClassLoadingLogParser {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn parse(&self, path: &Path) -> Result<ClassLoadingReport> {
        process_file(path, ClassLoadingAccumulator::new(&self.working_dir))
    }

    pub fn parse_str(&self, content: &str) -> Result<ClassLoadingReport> {
        process(
            content.as_bytes(),
            Path::new(IN_MEMORY),
            ClassLoadingAccumulator::new(&self.working_dir),
        )
    }
}

/// Parses `cds` warnings written while dumping an archive into an [`ArchiveReport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveLogParser;

impl ArchiveLogParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<ArchiveReport> {
        process_file(path, ArchiveAccumulator::default())
    }

    pub fn parse_str(&self, content: &str) -> Result<ArchiveReport> {
        process(content.as_bytes(), Path::new(IN_MEMORY), ArchiveAccumulator::default())
    }
}

struct ClassLoadingAccumulator<'a> {
    working_dir: &'a Path,
    hits: Vec<String>,
    misses: Buckets,
}

impl<'a> ClassLoadingAccumulator<'a> {
    fn new(working_dir: &'a Path) -> Self {
        Self {
            working_dir,
            hits: Vec::new(),
            misses: Buckets::new(),
        }
    }
}

impl Accumulator for ClassLoadingAccumulator<'_> {
    type Report = ClassLoadingReport;

    fn accept(&mut self, line: &LogLine, raw: &str, line_number: usize) -> Result<bool> {
        if !line.contains_tags(&["class", "load"]) {
            return Ok(false);
        }
        match classify_source(&line.message, self.working_dir)? {
            SourceEvent::Hit { class_name } => self.hits.push(class_name),
            SourceEvent::Miss {
                class_name,
                bucket,
                rule,
            } => {
                if rule == SourceRule::Fallback {
                    warn!(line_number, "Fallback on default source for {raw}");
                }
                self.misses.add(bucket, class_name);
            }
            SourceEvent::Skip => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> ClassLoadingReport {
        ClassLoadingReport::new(self.hits, self.misses)
    }
}

#[derive(Default)]
struct ArchiveAccumulator {
    skipped: Buckets,
}

impl Accumulator for ArchiveAccumulator {
    type Report = ArchiveReport;

    fn accept(&mut self, line: &LogLine, _raw: &str, _line_number: usize) -> Result<bool> {
        if !line.contains_tags(&["cds"]) {
            return Ok(false);
        }
        match classify_exclusion(&line.message) {
            ExclusionEvent::Excluded { class_name, reason } => {
                self.skipped.add(reason, class_name);
                Ok(true)
            }
            ExclusionEvent::Skip => Ok(false),
        }
    }

    fn finish(self) -> ArchiveReport {
        ArchiveReport::new(self.skipped)
    }
}

fn process_file<A: Accumulator>(path: &Path, accumulator: A) -> Result<A::Report> {
    if !path.exists() {
        return Err(AnalyzerError::ResourceUnavailable {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| AnalyzerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    process(BufReader::new(file), path, accumulator)
}

fn process<R: BufRead, A: Accumulator>(reader: R, origin: &Path, mut accumulator: A) -> Result<A::Report> {
    let mut lines_read = 0usize;
    let mut classified = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let raw = line.map_err(|source| match source.kind() {
            ErrorKind::InvalidData => AnalyzerError::InvalidUtf8 {
                path: origin.to_path_buf(),
                line_number,
            },
            _ => AnalyzerError::Io {
                path: origin.to_path_buf(),
                source,
            },
        })?;
        if raw.trim().is_empty() {
            continue;
        }
        lines_read += 1;

        let log_line = LogLine::parse(&raw).ok_or_else(|| AnalyzerError::MalformedLine {
            line_number,
            line: raw.clone(),
        })?;
        if accumulator.accept(&log_line, &raw, line_number)? {
            classified += 1;
        }
    }

    info!(
        origin = %origin.display(),
        lines_read, classified, "Parsed log resource"
    );
    Ok(accumulator.finish())
}
