//! Classification of `class+load` messages into cache hits and misses.
//!
//! A message has the shape `<class name> source: <source>`. The source is
//! matched against an ordered rule table; the first rule that recognizes it
//! decides whether the class came from the shared archive and, if not, the
//! bucket the class is accounted under.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::report::SYNTHETIC_SOURCES;

pub const SOURCE_MARKER: &str = "source: ";

const SHARED_ARCHIVE_PREFIX: &str = "shared objects file";
const FILE_PREFIX: &str = "file:";
const NESTED_JAR_PREFIX: &str = "jar:nested:";
const RUNTIME_IMAGE_PREFIX: &str = "jrt:/";
const INSTANCE_PREFIX: &str = "instance of ";

/// The rule that recognized a source, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRule {
    SharedArchive,
    File,
    NestedJar,
    Synthetic,
    DefiningClass,
    RuntimeImage,
    Instance,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Hit {
        class_name: String,
    },
    Miss {
        class_name: String,
        bucket: String,
        rule: SourceRule,
    },
    /// The message has no `source: ` marker.
    Skip,
}

enum Outcome {
    Hit,
    Miss(String),
}

struct Candidate<'a> {
    class_name: &'a str,
    source: &'a str,
    working_dir: &'a Path,
}

type Rule = fn(&Candidate<'_>) -> Option<Result<Outcome>>;

const RULES: [(SourceRule, Rule); 7] = [
    (SourceRule::SharedArchive, shared_archive),
    (SourceRule::File, file),
    (SourceRule::NestedJar, nested_jar),
    (SourceRule::Synthetic, synthetic),
    // Loose match, must stay behind the literal prefixes above.
    (SourceRule::DefiningClass, defining_class),
    (SourceRule::RuntimeImage, runtime_image),
    (SourceRule::Instance, instance),
];

/// Classifies the message of a `class+load` line.
///
/// `file:` locations under `working_dir` are reported relative to it. Fails
/// only on a `jar:nested:` source without its `!` delimiters; sources no rule
/// recognizes become their own bucket with [`SourceRule::Fallback`].
pub fn classify_source(message: &str, working_dir: &Path) -> Result<SourceEvent> {
    let Some(idx) = message.find(SOURCE_MARKER) else {
        debug!("No source found in {message}");
        return Ok(SourceEvent::Skip);
    };
    let candidate = Candidate {
        class_name: message[..idx].trim(),
        source: message[idx + SOURCE_MARKER.len()..].trim(),
        working_dir,
    };

    for (rule, matcher) in RULES {
        if let Some(outcome) = matcher(&candidate) {
            return Ok(candidate.event(outcome?, rule));
        }
    }
    Ok(candidate.event(Outcome::Miss(candidate.source.to_string()), SourceRule::Fallback))
}

impl Candidate<'_> {
    fn event(&self, outcome: Outcome, rule: SourceRule) -> SourceEvent {
        let class_name = self.class_name.to_string();
        match outcome {
            Outcome::Hit => SourceEvent::Hit { class_name },
            Outcome::Miss(bucket) => SourceEvent::Miss {
                class_name,
                bucket,
                rule,
            },
        }
    }

    fn source_as_bucket(&self) -> Option<Result<Outcome>> {
        Some(Ok(Outcome::Miss(self.source.to_string())))
    }
}

fn shared_archive(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    c.source
        .starts_with(SHARED_ARCHIVE_PREFIX)
        .then_some(Ok(Outcome::Hit))
}

fn file(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    let raw = c.source.strip_prefix(FILE_PREFIX)?;
    let path: PathBuf = Path::new(raw).components().collect();
    let location = match path.strip_prefix(c.working_dir) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    };
    Some(Ok(Outcome::Miss(location)))
}

fn nested_jar(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    if !c.source.starts_with(NESTED_JAR_PREFIX) {
        return None;
    }
    let nested = c.source.find('!').and_then(|start| {
        let rest = &c.source[start + 1..];
        rest.find('!').map(|end| rest[..end].to_string())
    });
    Some(match nested {
        Some(jar) => Ok(Outcome::Miss(jar)),
        None => Err(AnalyzerError::MalformedSource {
            source_text: c.source.to_string(),
        }),
    })
}

fn synthetic(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    if SYNTHETIC_SOURCES.contains(&c.source) {
        return c.source_as_bucket();
    }
    None
}

// Lambda forms are reported with their defining class as the source.
fn defining_class(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    if c.class_name.starts_with(c.source) {
        return c.source_as_bucket();
    }
    None
}

fn runtime_image(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    if c.source.starts_with(RUNTIME_IMAGE_PREFIX) {
        return c.source_as_bucket();
    }
    None
}

fn instance(c: &Candidate<'_>) -> Option<Result<Outcome>> {
    let owner = c.source.strip_prefix(INSTANCE_PREFIX)?;
    Some(Ok(Outcome::Miss(owner.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CLASS_DEFINER, DYNAMIC_PROXY};
    use proptest::prelude::*;

    fn app_dir() -> &'static Path {
        Path::new("/app/target/app")
    }

    fn miss(message: &str) -> (String, String, SourceRule) {
        match classify_source(message, app_dir()).unwrap() {
            SourceEvent::Miss {
                class_name,
                bucket,
                rule,
            } => (class_name, bucket, rule),
            other => panic!("expected miss for {message}, got {other:?}"),
        }
    }

    #[test]
    fn shared_objects_file_is_a_hit() {
        let event = classify_source("java.lang.Object source: shared objects file", app_dir()).unwrap();
        assert_eq!(
            event,
            SourceEvent::Hit {
                class_name: "java.lang.Object".into()
            }
        );
        let event =
            classify_source("java.lang.String source: shared objects file (top)", app_dir()).unwrap();
        assert!(matches!(event, SourceEvent::Hit { .. }));
    }

    #[test]
    fn file_source_is_relative_to_working_dir() {
        let (class_name, bucket, rule) =
            miss("com.example.X source: file:/app/target/app/BOOT-INF/lib/x.jar");
        assert_eq!(class_name, "com.example.X");
        assert_eq!(bucket, "BOOT-INF/lib/x.jar");
        assert_eq!(rule, SourceRule::File);
    }

    #[test]
    fn file_source_outside_working_dir_stays_absolute() {
        let (_, bucket, _) = miss("com.example.X source: file:/opt/libs//y.jar");
        assert_eq!(bucket, "/opt/libs/y.jar");
        let (_, bucket, _) = miss("com.example.X source: file:/app/target/application/z.jar");
        assert_eq!(bucket, "/app/target/application/z.jar");
    }

    #[test]
    fn file_source_equal_to_working_dir_is_empty_bucket() {
        let (_, bucket, _) = miss("a.b.Handler source: file:/app/target/app/");
        assert_eq!(bucket, "");
    }

    #[test]
    fn nested_jar_extracts_inner_entry() {
        let (_, bucket, rule) =
            miss("com.example.Y source: jar:nested:/app/app.jar!BOOT-INF/lib/y.jar!/");
        assert_eq!(bucket, "BOOT-INF/lib/y.jar");
        assert_eq!(rule, SourceRule::NestedJar);
    }

    #[test]
    fn nested_jar_without_delimiters_fails() {
        let err = classify_source("com.example.Y source: jar:nested:/app/app.jar!BOOT-INF", app_dir())
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedSource { .. }));
        assert!(classify_source("com.example.Y source: jar:nested:/app/app.jar", app_dir()).is_err());
    }

    #[test]
    fn synthetic_sources_are_their_own_bucket() {
        let (_, bucket, rule) = miss("jdk.proxy1.$Proxy0 source: __dynamic_proxy__");
        assert_eq!(bucket, DYNAMIC_PROXY);
        assert_eq!(rule, SourceRule::Synthetic);
        let (_, bucket, _) = miss("a.b.C$$Lambda/0x01 source: __ClassDefiner__");
        assert_eq!(bucket, CLASS_DEFINER);
    }

    #[test]
    fn lambda_is_bucketed_by_defining_class() {
        let (_, bucket, rule) =
            miss("com.example.App$$Lambda/0x000001 source: com.example.App");
        assert_eq!(bucket, "com.example.App");
        assert_eq!(rule, SourceRule::DefiningClass);
    }

    #[test]
    fn runtime_image_and_instance_sources() {
        let (_, bucket, rule) = miss("sun.nio.fs.UnixPath source: jrt:/java.base");
        assert_eq!((bucket.as_str(), rule), ("jrt:/java.base", SourceRule::RuntimeImage));

        let (_, bucket, rule) = miss(
            "org.example.Gen source: instance of org.springframework.core.SmartClassLoader",
        );
        assert_eq!(bucket, "org.springframework.core.SmartClassLoader");
        assert_eq!(rule, SourceRule::Instance);
    }

    #[test]
    fn unknown_source_falls_back_to_itself() {
        let (_, bucket, rule) =
            miss("java.lang.invoke.DirectMethodHandle$Holder source: java.lang.Shutdown");
        assert_eq!(bucket, "java.lang.Shutdown");
        assert_eq!(rule, SourceRule::Fallback);
    }

    #[test]
    fn missing_marker_is_skipped() {
        let event = classify_source("java.lang.Object", app_dir()).unwrap();
        assert_eq!(event, SourceEvent::Skip);
    }

    #[test]
    fn literal_prefixes_win_over_defining_class() {
        // The class name starts with the source, but the file rule comes first.
        let (_, bucket, rule) = miss("file:/x/A source: file:/x/");
        assert_eq!(rule, SourceRule::File);
        assert_eq!(bucket, "/x");

        let event = classify_source("shared objects file.X source: shared objects file", app_dir())
            .unwrap();
        assert!(matches!(event, SourceEvent::Hit { .. }));
    }

    #[test]
    fn defining_class_wins_over_runtime_image() {
        let (_, _, rule) = miss("jrt:/java.base.Foo source: jrt:/java.base");
        assert_eq!(rule, SourceRule::DefiningClass);
    }

    proptest! {
        #[test]
        fn shared_prefix_always_hits(class in "[a-z]{1,8}(\\.[A-Za-z$]{1,8}){0,3}", tail in "[ -~]{0,20}") {
            let message = format!("{class} source: shared objects file{tail}");
            let event = classify_source(&message, app_dir()).unwrap();
            prop_assert!(matches!(event, SourceEvent::Hit { .. }), "expected a hit");
        }

        #[test]
        fn instance_prefix_loses_to_defining_class(owner in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}") {
            let source = format!("instance of {owner}");
            let message = format!("{source}$Generated source: {source}");
            let event = classify_source(&message, app_dir()).unwrap();
            prop_assert_eq!(
                event,
                SourceEvent::Miss {
                    class_name: format!("{source}$Generated"),
                    bucket: source.clone(),
                    rule: SourceRule::DefiningClass,
                }
            );
        }

        #[test]
        fn classification_never_panics(message in "[ -~]{0,60}") {
            let _ = classify_source(&message, app_dir());
        }
    }
}
