use serde::Serialize;

use crate::buckets::Buckets;

/// Source reported for classes defined through `Lookup.defineClass`.
pub const CLASS_DEFINER: &str = "__ClassDefiner__";

/// Source reported for lambda proxy classes spun at runtime.
pub const DYNAMIC_GENERATED_LAMBDA: &str = "__JVM_LookupDefineClass__";

/// Source reported for `java.lang.reflect.Proxy` classes.
pub const DYNAMIC_PROXY: &str = "__dynamic_proxy__";

pub const SYNTHETIC_SOURCES: [&str; 3] = [CLASS_DEFINER, DYNAMIC_GENERATED_LAMBDA, DYNAMIC_PROXY];

/// Curated reason: one of the class interfaces is excluded from the archive.
pub const INTERFACE_EXCLUDED: &str = "interface is excluded";

/// Curated reason: the super class is excluded from the archive.
pub const SUPER_CLASS_EXCLUDED: &str = "super class is excluded";

/// Where classes were loaded from, as recorded by a `-Xlog:class+load` log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassLoadingReport {
    hits: Vec<String>,
    misses: Buckets,
}

impl ClassLoadingReport {
    pub fn new(hits: Vec<String>, misses: Buckets) -> Self {
        Self { hits, misses }
    }

    /// Classes loaded from the shared archive, in log order.
    pub fn hits(&self) -> &[String] {
        &self.hits
    }

    /// Classes loaded from elsewhere, grouped by location.
    pub fn misses(&self) -> &Buckets {
        &self.misses
    }

    pub fn miss_count(&self) -> usize {
        self.misses.total()
    }

    pub fn load_count(&self) -> usize {
        self.hits.len() + self.miss_count()
    }

    /// Share of classes loaded from the cache, `None` when nothing was loaded.
    pub fn hit_rate(&self) -> Option<f64> {
        rate(self.hits.len(), self.load_count())
    }

    pub fn miss_rate(&self) -> Option<f64> {
        self.hit_rate().map(|hit| 1.0 - hit)
    }
}

/// Classes excluded while dumping a CDS archive, grouped by reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveReport {
    skipped: Buckets,
}

impl ArchiveReport {
    pub fn new(skipped: Buckets) -> Self {
        Self { skipped }
    }

    pub fn skipped(&self) -> &Buckets {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.total()
    }
}

pub(crate) fn rate(part: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(hits: &[&str], misses: &[(&str, &str)]) -> ClassLoadingReport {
        let mut buckets = Buckets::new();
        for (key, class) in misses {
            buckets.add(*key, *class);
        }
        ClassLoadingReport::new(hits.iter().map(|s| s.to_string()).collect(), buckets)
    }

    #[test]
    fn rates_follow_counts() {
        let report = report(
            &["java.lang.Object", "java.lang.String", "java.lang.Integer"],
            &[("a.jar", "com.a.A"), ("b.jar", "com.b.B")],
        );
        assert_eq!(report.load_count(), 5);
        assert_eq!(report.miss_count(), 2);
        assert!((report.hit_rate().unwrap() - 0.6).abs() < 1e-9);
        assert!((report.miss_rate().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn rates_are_undefined_for_empty_report() {
        let report = report(&[], &[]);
        assert_eq!(report.load_count(), 0);
        assert_eq!(report.hit_rate(), None);
        assert_eq!(report.miss_rate(), None);
    }

    #[test]
    fn archive_report_counts_every_skipped_class() {
        let mut skipped = Buckets::new();
        skipped.add(INTERFACE_EXCLUDED, "a.B");
        skipped.add("JFR event class", "jdk.internal.event.ThreadSleepEvent");
        skipped.add(INTERFACE_EXCLUDED, "a.C");
        assert_eq!(ArchiveReport::new(skipped).skipped_count(), 3);
    }
}
