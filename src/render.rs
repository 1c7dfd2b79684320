//! Statistics and text rendering for parsed reports.
//!
//! A summary is computed once from a report and can then be rendered as
//! human-readable text or serialized as JSON. Rankings sort by count,
//! descending, and keep first-seen order between equal counts.

use serde::Serialize;
use std::collections::HashMap;

use crate::buckets::Buckets;
use crate::report::{ArchiveReport, ClassLoadingReport, rate};

pub const LAMBDA_MARKER: &str = "$$Lambda";
pub const PROXY_MARKER: &str = "$Proxy";

const TOP: usize = 10;
const BANNER: &str = "--------------------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Lambda,
    Proxy,
    Class,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Lambda, Category::Proxy, Category::Class];

    pub fn of(class_name: &str) -> Category {
        if class_name.contains(LAMBDA_MARKER) {
            Category::Lambda
        } else if class_name.contains(PROXY_MARKER) {
            Category::Proxy
        } else {
            Category::Class
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Lambda => "Lambdas",
            Category::Proxy => "Proxies",
            Category::Class => "Classes",
        }
    }
}

/// Hit and miss counts for a subset of the loaded classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadCounts {
    pub from_cache: usize,
    pub from_classpath: usize,
}

impl LoadCounts {
    pub fn total(&self) -> usize {
        self.from_cache + self.from_classpath
    }

    pub fn hit_rate(&self) -> Option<f64> {
        rate(self.from_cache, self.total())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySplit {
    pub category: Category,
    #[serde(flatten)]
    pub counts: LoadCounts,
    pub total: usize,
    /// Share of all loaded classes.
    pub share: Option<f64>,
    pub hit_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedBucket {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageLoads {
    pub package: String,
    #[serde(flatten)]
    pub counts: LoadCounts,
    pub total: usize,
    pub hit_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassLoadingSummary {
    pub load_count: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: Option<f64>,
    pub miss_rate: Option<f64>,
    pub categories: Vec<CategorySplit>,
    pub top_locations: Vec<RankedBucket>,
    pub top_packages: Vec<PackageLoads>,
}

impl ClassLoadingSummary {
    pub fn from_report(report: &ClassLoadingReport) -> Self {
        let load_count = report.load_count();
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let counts = count_loads(report, |name| Category::of(name) == category);
                CategorySplit {
                    category,
                    counts,
                    total: counts.total(),
                    share: rate(counts.total(), load_count),
                    hit_rate: counts.hit_rate(),
                }
            })
            .collect();

        let mut top_packages: Vec<PackageLoads> = package_loads(report)
            .into_iter()
            .map(|(package, counts)| PackageLoads {
                package,
                counts,
                total: counts.total(),
                hit_rate: counts.hit_rate(),
            })
            .collect();
        top_packages.sort_by(|a, b| b.total.cmp(&a.total));
        top_packages.truncate(TOP);

        Self {
            load_count,
            hits: report.hits().len(),
            misses: report.miss_count(),
            hit_rate: report.hit_rate(),
            miss_rate: report.miss_rate(),
            categories,
            top_locations: top_buckets(report.misses(), TOP),
            top_packages,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str("Class Loading Report:\n");
        out.push_str(&format!("{:>10} classes and JDK proxies loaded\n", self.load_count));
        out.push_str(&format!("{:>10} ({}%) from cache\n", self.hits, percent(self.hit_rate)));
        out.push_str(&format!("{:>10} ({}%) from classpath\n", self.misses, percent(self.miss_rate)));
        out.push('\n');

        out.push_str("Categories:\n");
        let width = self.load_count.to_string().len();
        for split in &self.categories {
            out.push_str(&format!(
                "{:>10} {:>width$} ({}%): {}% from cache\n",
                split.category.label(),
                split.total,
                percent(split.share),
                percent_compact(split.hit_rate),
            ));
        }
        out.push('\n');

        out.push_str("Top 10 locations from classpath:\n");
        for bucket in &self.top_locations {
            out.push_str(&format!("{:>10} {}\n", bucket.count, bucket.key));
        }
        out.push('\n');

        out.push_str("Top 10 packages:\n");
        for package in &self.top_packages {
            out.push_str(&format!(
                "{:>10} {} ({}% from cache)\n",
                package.total,
                package.package,
                percent_compact(package.hit_rate),
            ));
        }
        out.push_str(BANNER);
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub skipped_count: usize,
    pub top_reasons: Vec<RankedBucket>,
    pub top_packages: Vec<RankedBucket>,
}

impl ArchiveSummary {
    pub fn from_report(report: &ArchiveReport) -> Self {
        let mut packages = PackageCounter::default();
        for class_name in report.skipped().values() {
            packages.entry(class_name).from_classpath += 1;
        }
        let mut top_packages: Vec<RankedBucket> = packages
            .into_entries()
            .into_iter()
            .map(|(key, counts)| RankedBucket {
                key,
                count: counts.total(),
            })
            .collect();
        top_packages.sort_by(|a, b| b.count.cmp(&a.count));
        top_packages.truncate(TOP);

        Self {
            skipped_count: report.skipped_count(),
            top_reasons: top_buckets(report.skipped(), TOP),
            top_packages,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str("CDS Archive Report:\n");
        out.push_str(&format!("{:>10} classes were skipped\n", self.skipped_count));
        out.push('\n');
        out.push_str("Top Reasons:\n");
        for reason in &self.top_reasons {
            out.push_str(&format!("{:>10} {}\n", reason.count, reason.key));
        }
        out.push('\n');
        out.push_str("Top Packages:\n");
        for package in &self.top_packages {
            out.push_str(&format!("{:>10} {}\n", package.count, package.key));
        }
        out.push_str(BANNER);
        out.push('\n');
        out
    }
}

/// First two segments of a dotted class name, or the whole name when it has
/// fewer than three segments.
pub fn package_key(class_name: &str) -> &str {
    let mut dots = class_name.match_indices('.').map(|(i, _)| i);
    match (dots.next(), dots.next()) {
        (Some(_), Some(second)) => &class_name[..second],
        _ => class_name,
    }
}

/// Buckets ranked by number of classes; the sort is stable.
pub fn top_buckets(buckets: &Buckets, limit: usize) -> Vec<RankedBucket> {
    let mut ranked: Vec<RankedBucket> = buckets
        .iter()
        .map(|(key, classes)| RankedBucket {
            key: key.to_string(),
            count: classes.len(),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

fn count_loads(report: &ClassLoadingReport, filter: impl Fn(&str) -> bool) -> LoadCounts {
    LoadCounts {
        from_cache: report.hits().iter().filter(|name| filter(name.as_str())).count(),
        from_classpath: report.misses().values().filter(|name| filter(*name)).count(),
    }
}

fn package_loads(report: &ClassLoadingReport) -> Vec<(String, LoadCounts)> {
    let mut packages = PackageCounter::default();
    for class_name in report.hits() {
        packages.entry(class_name).from_cache += 1;
    }
    for class_name in report.misses().values() {
        packages.entry(class_name).from_classpath += 1;
    }
    packages.into_entries()
}

#[derive(Default)]
struct PackageCounter {
    entries: Vec<(String, LoadCounts)>,
    index: HashMap<String, usize>,
}

impl PackageCounter {
    fn entry(&mut self, class_name: &str) -> &mut LoadCounts {
        let key = package_key(class_name);
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), LoadCounts::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(String, LoadCounts)> {
        self.entries
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:5.2}", v * 100.0),
        None => "  n/a".to_string(),
    }
}

fn percent_compact(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v * 100.0),
        None => "n/a".to_string(),
    }
}
