use log::{info, warn};

use crate::m3u_checker_error::M3uCheckerError;
use crate::model::{Config, EntryFilter, ReconcilePolicy, ReconciliationReport};
use crate::processing::probe::HttpTransport;
use crate::processing::processor::{format_suggestions, format_summary, reconcile, repair_playlist, suggest_repairs, ReconciliationEngine, RepairOutcome, RepairSuggestion};
use crate::repository::{read_substitutions, PlaylistStore, ReportRepository, SubstitutionMap};

/// One complete run: load, probe, write the report, apply the policy, print the summary.
/// A playlist that can not be read fails the run before anything is written.
pub async fn exec_check<T: HttpTransport>(engine: &ReconciliationEngine<T>, config: &Config, filter: &EntryFilter) -> Result<ReconciliationReport, M3uCheckerError> {
    let store = PlaylistStore::new(&config.playlist_path, config.orphan_metadata);
    let mut document = store.load_document()?;
    let entries = document.entries();
    info!("{} channels loaded from {}", entries.len(), store.path().display());

    let report = engine.run_filtered(&entries, |entry| filter.matches(entry)).await;
    ReportRepository::new(&config.report_path).write(&report)?;

    if config.policy == ReconcilePolicy::Prune {
        let reconciliation = reconcile(&entries, &report, config.policy);
        if reconciliation.removed > 0 {
            document.retain_entries(|index| reconciliation.is_kept(index));
            store.save_document(&document)?;
            info!("{} broken channel(s) removed from playlist", reconciliation.removed);
        } else {
            info!("playlist unchanged");
        }
    }

    println!("{}", format_summary(&report, config.policy == ReconcilePolicy::AnnotateOnly));
    Ok(report)
}

/// Prints the stored report, `None` when no run has been reported yet.
pub fn show_last_report(config: &Config) -> Result<Option<ReconciliationReport>, M3uCheckerError> {
    let last = ReportRepository::new(&config.report_path).read_last()?;
    match last.as_ref() {
        Some(report) => println!("{}", format_summary(report, false)),
        None => println!("no report yet"),
    }
    Ok(last)
}

/// Applies the substitutions file to the broken entries of the stored report.
pub fn exec_repair(config: &Config) -> Result<RepairOutcome, M3uCheckerError> {
    let Some(report) = ReportRepository::new(&config.report_path).read_last()? else {
        warn!("no report found at {}, run a check first", config.report_path.display());
        return Ok(RepairOutcome::default());
    };
    if report.broken.is_empty() {
        info!("last report has no broken channels");
        return Ok(RepairOutcome::default());
    }
    let substitutions = read_substitutions(&config.substitutions_path)?;
    info!("{} substitution(s) loaded from {}", substitutions.len(), config.substitutions_path.display());
    let store = PlaylistStore::new(&config.playlist_path, config.orphan_metadata);
    let outcome = repair_playlist(&store, &report.broken, &substitutions, &config.backup_path)?;
    println!("Repaired: {}", outcome.replaced.len());
    for name in &outcome.unmatched {
        println!("  no replacement: {name}");
    }
    Ok(outcome)
}

/// Dry run of [`exec_repair`]: prints failure class, advice and replacement
/// for every broken entry of the stored report. Nothing is written.
pub fn exec_suggest(config: &Config) -> Result<Vec<RepairSuggestion>, M3uCheckerError> {
    let Some(report) = ReportRepository::new(&config.report_path).read_last()? else {
        warn!("no report found at {}, run a check first", config.report_path.display());
        return Ok(Vec::new());
    };
    let substitutions = if config.substitutions_path.exists() {
        read_substitutions(&config.substitutions_path)?
    } else {
        warn!("substitutions file {} not found", config.substitutions_path.display());
        SubstitutionMap::default()
    };
    let suggestions = suggest_repairs(&report.broken, &substitutions);
    println!("{}", format_suggestions(&suggestions));
    Ok(suggestions)
}
