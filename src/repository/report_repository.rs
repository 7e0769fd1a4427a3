use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::m3u_checker_error::{notify_err, M3uCheckerError};
use crate::model::ReconciliationReport;
use crate::utils::write_atomic;

/// Single slot store for the report of the last run.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    path: PathBuf,
}

impl ReportRepository {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    /// Replaces any earlier report.
    pub fn write(&self, report: &ReconciliationReport) -> Result<(), M3uCheckerError> {
        let content = serde_json::to_string_pretty(report)
            .map_err(|err| notify_err!("failed to serialize report: {}", err))?;
        write_atomic(&self.path, content.as_bytes())
            .map_err(|err| notify_err!("failed to write report {}: {}", self.path.display(), err))?;
        info!("report written to {}", self.path.display());
        Ok(())
    }

    /// `None` when no report has been written yet.
    pub fn read_last(&self) -> Result<Option<ReconciliationReport>, M3uCheckerError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|err| notify_err!("failed to parse report {}: {}", self.path.display(), err)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(notify_err!("cant read report {}: {}", self.path.display(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::model::{ChannelEntry, ProbeResult, ProbeVerdict, ReconciliationReport};
    use crate::repository::report_repository::ReportRepository;

    fn report(reachable: bool) -> ReconciliationReport {
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let entry = ChannelEntry::new("NTV", Some("Haber"), None, "https://dogus-live.daioncdn.net/ntv/ntv.m3u8");
        let verdict = if reachable { ProbeVerdict::reachable("content-verified") } else { ProbeVerdict::unreachable("timeout") };
        ReconciliationReport::from_results(vec![ProbeResult::new(0, &entry, verdict, ts)], ts)
    }

    #[test]
    fn test_no_report_yet() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ReportRepository::new(&dir.path().join("channel_report.json"));
        assert!(repo.read_last().unwrap().is_none());
    }

    #[test]
    fn test_write_overwrites_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ReportRepository::new(&dir.path().join("channel_report.json"));
        repo.write(&report(true)).unwrap();
        repo.write(&report(false)).unwrap();
        let last = repo.read_last().unwrap().unwrap();
        assert_eq!(last, report(false));
        assert_eq!(last.broken_count, 1);
        assert_eq!(last.broken[0].status_label, "timeout");
    }

    #[test]
    fn test_reloaded_report_keeps_playlist_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ReportRepository::new(&dir.path().join("channel_report.json"));
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let channels = [("NTV", "Haber", false), ("A Spor", "Spor", true), ("TRT Haber", "Haber", true)];
        let results = channels.iter().enumerate().map(|(index, (name, category, reachable))| {
            let entry = ChannelEntry::new(name, Some(category), None, &format!("https://x/{index}.m3u8"));
            let verdict = if *reachable { ProbeVerdict::reachable("accessible") } else { ProbeVerdict::unreachable("http-403") };
            ProbeResult::new(index, &entry, verdict, ts)
        }).collect();
        let report = ReconciliationReport::from_results(results, ts);
        repo.write(&report).unwrap();

        let last = repo.read_last().unwrap().unwrap();
        let names: Vec<&str> = last.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["NTV", "A Spor", "TRT Haber"]);
        let categories: Vec<String> = last.category_stats().into_iter().map(|s| s.category).collect();
        assert_eq!(categories, vec!["Haber".to_string(), "Spor".to_string()]);
    }

    #[test]
    fn test_corrupt_report_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("channel_report.json");
        std::fs::write(&file, "{ not json").unwrap();
        assert!(ReportRepository::new(&file).read_last().is_err());
    }
}
