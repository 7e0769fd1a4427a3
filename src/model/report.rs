use chrono::{DateTime, Utc};

use crate::model::ProbeResult;

/// Aggregate over one full run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub total: usize,
    pub working_count: usize,
    pub broken_count: usize,
    pub success_rate: f64,
    pub working: Vec<ProbeResult>,
    pub broken: Vec<ProbeResult>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub total: usize,
    pub working: usize,
}

impl CategoryStats {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.working, self.total)
    }
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(working: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { working as f64 / total as f64 }
}

impl ReconciliationReport {
    /// Builds the report in input order, whatever order the results completed in.
    pub fn from_results(mut results: Vec<ProbeResult>, generated_at: DateTime<Utc>) -> Self {
        results.sort_by_key(|r| r.index);
        let (working, broken): (Vec<ProbeResult>, Vec<ProbeResult>) = results.into_iter().partition(|r| r.reachable);
        let total = working.len() + broken.len();
        Self {
            total,
            working_count: working.len(),
            broken_count: broken.len(),
            success_rate: success_rate(working.len(), total),
            working,
            broken,
            generated_at,
        }
    }

    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self::from_results(vec![], generated_at)
    }

    /// All results in input order.
    pub fn results(&self) -> Vec<&ProbeResult> {
        let mut all: Vec<&ProbeResult> = self.working.iter().chain(self.broken.iter()).collect();
        all.sort_by_key(|r| r.index);
        all
    }

    /// Per category counts, categories in order of first appearance.
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        let mut stats: Vec<CategoryStats> = vec![];
        for result in self.results() {
            let idx = if let Some(pos) = stats.iter().position(|s| s.category == result.category) {
                pos
            } else {
                stats.push(CategoryStats { category: result.category.clone(), total: 0, working: 0 });
                stats.len() - 1
            };
            stats[idx].total += 1;
            if result.reachable {
                stats[idx].working += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::model::{ChannelEntry, ProbeResult, ProbeVerdict, ReconciliationReport};

    fn result(index: usize, category: &str, reachable: bool) -> ProbeResult {
        let entry = ChannelEntry::new(&format!("ch{index}"), Some(category), None, &format!("https://x/{index}.m3u8"));
        let verdict = if reachable { ProbeVerdict::reachable("content-verified") } else { ProbeVerdict::unreachable("http-404") };
        ProbeResult::new(index, &entry, verdict, Utc::now())
    }

    #[test]
    fn test_totals_and_order() {
        let report = ReconciliationReport::from_results(
            vec![result(3, "Haber", false), result(0, "TRT", true), result(2, "Haber", true), result(1, "TRT", false)],
            Utc::now());
        assert_eq!(report.total, 4);
        assert_eq!(report.working_count + report.broken_count, report.total);
        assert!((report.success_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(report.working.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(report.broken.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_empty_report_rate() {
        let report = ReconciliationReport::empty(Utc::now());
        assert_eq!(report.total, 0);
        assert!(report.success_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_stats() {
        let report = ReconciliationReport::from_results(
            vec![result(0, "TRT", true), result(1, "Haber", false), result(2, "TRT", false)], Utc::now());
        let stats = report.category_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "TRT");
        assert_eq!((stats[0].working, stats[0].total), (1, 2));
        assert_eq!((stats[1].working, stats[1].total), (0, 1));
    }

    #[test]
    fn test_json_field_names() {
        let report = ReconciliationReport::from_results(vec![result(0, "TRT", true)], Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        for key in ["total", "workingCount", "brokenCount", "successRate", "working", "broken", "generatedAt"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let item = &json["working"][0];
        for key in ["position", "name", "category", "url", "statusLabel", "reachable", "checkedAt"] {
            assert!(item.get(key).is_some(), "missing {key}");
        }
        assert!(item.get("index").is_none());
    }
}
