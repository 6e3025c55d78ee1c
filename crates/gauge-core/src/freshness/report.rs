//! Freshness report over a set of category timestamps.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::clock::now_ms;
use crate::freshness::classifier::{age_at, indicator_at, status_at};
use crate::freshness::types::{Category, Freshness};

/// Snapshot of per-category freshness, for the `status` view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReport {
    pub generated_at: u64,
    pub fields: BTreeMap<String, FieldReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub status: Freshness,
    /// Milliseconds; absent when the value was never fetched.
    pub age_ms: Option<u64>,
    pub indicator: String,
}

/// Build a report from `(category name, timestamp)` pairs.
///
/// Names that are not in the fixed category set are silently skipped, so
/// callers can feed in whatever keys their cache happens to hold.
pub fn report_at<'a, I>(now_ms: u64, timestamps: I) -> FreshnessReport
where
    I: IntoIterator<Item = (&'a str, Option<u64>)>,
{
    let mut fields = BTreeMap::new();
    for (name, timestamp) in timestamps {
        let Some(category) = Category::parse(name) else {
            continue;
        };
        fields.insert(
            category.as_str().to_string(),
            FieldReport {
                status: status_at(now_ms, timestamp, category),
                age_ms: age_at(now_ms, timestamp).as_millis(),
                indicator: indicator_at(now_ms, timestamp, category).glyph().to_string(),
            },
        );
    }
    FreshnessReport {
        generated_at: now_ms,
        fields,
    }
}

pub fn report<'a, I>(timestamps: I) -> FreshnessReport
where
    I: IntoIterator<Item = (&'a str, Option<u64>)>,
{
    report_at(now_ms(), timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_report_classifies_each_category() {
        let report = report_at(
            NOW,
            [
                ("git_status", Some(NOW - 1_000)),
                ("billing_oauth", Some(NOW - 700_000)),
                ("model", None),
            ],
        );

        assert_eq!(report.generated_at, NOW);
        assert_eq!(report.fields.len(), 3);
        assert_eq!(report.fields["git_status"].status, Freshness::Fresh);
        assert_eq!(report.fields["git_status"].age_ms, Some(1_000));
        assert_eq!(report.fields["billing_oauth"].status, Freshness::Critical);
        assert_eq!(report.fields["billing_oauth"].indicator, "🔺");
        assert_eq!(report.fields["model"].status, Freshness::Unknown);
        assert_eq!(report.fields["model"].age_ms, None);
    }

    #[test]
    fn test_report_skips_unknown_categories() {
        let report = report_at(
            NOW,
            [("not_a_category", Some(NOW)), ("context", Some(NOW - 500))],
        );
        assert_eq!(report.fields.len(), 1);
        assert!(report.fields.contains_key("context"));
    }

    #[test]
    fn test_report_empty_input() {
        let report = report_at(NOW, []);
        assert!(report.fields.is_empty());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = report_at(NOW, [("context", Some(NOW - 500))]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("generatedAt").is_some());
        assert!(json["fields"]["context"].get("ageMs").is_some());
    }
}
