use tracing::{debug, warn};

use crate::report::{INTERFACE_EXCLUDED, SUPER_CLASS_EXCLUDED};

const SKIPPING_PREFIX: &str = "Skipping";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionEvent {
    Excluded { class_name: String, reason: String },
    Skip,
}

/// Classifies the message of a `cds` line written while dumping an archive.
///
/// Only `Skipping <class>: <reason>` notices produce an exclusion. Reasons that
/// blame an excluded interface or super class are folded into
/// [`INTERFACE_EXCLUDED`] and [`SUPER_CLASS_EXCLUDED`]; any other reason is
/// kept verbatim.
pub fn classify_exclusion(message: &str) -> ExclusionEvent {
    let Some(class_and_reason) = message.strip_prefix(SKIPPING_PREFIX) else {
        debug!("Could not process {message}");
        return ExclusionEvent::Skip;
    };
    let Some((class_name, reason)) = class_and_reason.split_once(':') else {
        warn!("Separator not found in {message}");
        return ExclusionEvent::Skip;
    };
    let class_name = class_name.trim().replace('/', ".");
    let reason = reason.trim();
    ExclusionEvent::Excluded {
        class_name,
        reason: curate(reason).unwrap_or(reason).to_string(),
    }
}

fn curate(reason: &str) -> Option<&'static str> {
    if !reason.contains("is excluded") {
        return None;
    }
    if reason.contains("interface ") {
        Some(INTERFACE_EXCLUDED)
    } else if reason.contains("super class ") {
        Some(SUPER_CLASS_EXCLUDED)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded(message: &str) -> (String, String) {
        match classify_exclusion(message) {
            ExclusionEvent::Excluded { class_name, reason } => (class_name, reason),
            ExclusionEvent::Skip => panic!("expected exclusion for {message}"),
        }
    }

    #[test]
    fn inaccessible_interface_is_curated() {
        let (class_name, reason) = excluded(
            "Skipping com/foo/Bar: class com.foo.Bar implements inaccessible interface com.foo.Baz and is excluded",
        );
        assert_eq!(class_name, "com.foo.Bar");
        assert_eq!(reason, INTERFACE_EXCLUDED);
    }

    #[test]
    fn excluded_super_class_is_curated() {
        let (class_name, reason) = excluded(
            "Skipping net/bytebuddy/utility/visitor/MetadataAwareClassVisitor: super class org/objectweb/asm/ClassVisitor is excluded",
        );
        assert_eq!(class_name, "net.bytebuddy.utility.visitor.MetadataAwareClassVisitor");
        assert_eq!(reason, SUPER_CLASS_EXCLUDED);
    }

    #[test]
    fn other_reasons_are_kept_verbatim() {
        let (class_name, reason) = excluded("Skipping jdk/internal/event/ThreadSleepEvent: JFR event class");
        assert_eq!(class_name, "jdk.internal.event.ThreadSleepEvent");
        assert_eq!(reason, "JFR event class");

        let (_, reason) = excluded("Skipping a/B: interface a/C is not loaded");
        assert_eq!(reason, "interface a/C is not loaded");
    }

    #[test]
    fn reason_keeps_text_after_first_separator() {
        let (class_name, reason) = excluded("Skipping a/B: Old class has been linked: verification failed");
        assert_eq!(class_name, "a.B");
        assert_eq!(reason, "Old class has been linked: verification failed");
    }

    #[test]
    fn non_skip_notices_are_ignored() {
        assert_eq!(classify_exclusion("Preload Warning: Cannot find a/B"), ExclusionEvent::Skip);
        assert_eq!(classify_exclusion("Skipping a/B without a reason"), ExclusionEvent::Skip);
    }
}
