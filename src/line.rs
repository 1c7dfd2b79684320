/// A single JVM unified-logging line, decorated with its tags.
///
/// Only the `tags` decorator is relied upon. Other decorators such as uptime
/// or level (`[0.011s][info][class,load]`) may precede the tag block, which is
/// why the block is located from the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub tags: Vec<String>,
    pub message: String,
}

impl LogLine {
    /// Splits a raw line into its tag block and trimmed message.
    ///
    /// Returns `None` when the line has no `[` followed by a `]`.
    pub fn parse(line: &str) -> Option<LogLine> {
        let tag_start = line.rfind('[')?;
        let tag_end = tag_start + line[tag_start..].find(']')?;
        let tags = line[tag_start + 1..tag_end]
            .split(',')
            .map(str::to_string)
            .collect();
        let message = line[tag_end + 1..].trim().to_string();
        Some(LogLine { tags, message })
    }

    /// All of `tags` must be present on this line.
    pub fn contains_tags(&self, tags: &[&str]) -> bool {
        tags.iter().all(|tag| self.tags.iter().any(|t| t == tag))
    }
}
