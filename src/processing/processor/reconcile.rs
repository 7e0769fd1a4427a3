use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::model::{ChannelEntry, Config, ProbeResult, ReconcilePolicy, ReconciliationReport};
use crate::processing::probe::{HttpTransport, LivenessProbe, StrategySelector};
use crate::processing::processor::RateLimiter;
use crate::utils::sanitize_sensitive_info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Pause between probe starts, platform strategies may ask for more.
    pub delay: Duration,
    /// Concurrent probes, 1 runs sequentially.
    pub workers: usize,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self { delay: config.check.delay(), workers: config.check.workers.max(1) }
    }
}

/// Drives entries through the liveness probe and aggregates the outcome.
pub struct ReconciliationEngine<T: HttpTransport> {
    probe: LivenessProbe<T>,
    selector: StrategySelector,
    options: RunOptions,
}

impl<T: HttpTransport> ReconciliationEngine<T> {
    pub const fn new(probe: LivenessProbe<T>, selector: StrategySelector, options: RunOptions) -> Self {
        Self { probe, selector, options }
    }

    /// Engine as configured, `strict` ignores the platform rules.
    pub fn from_config(transport: T, config: &Config, strict: bool) -> Self {
        let selector = if strict { StrategySelector::strict() } else { StrategySelector::new(&config.platforms) };
        Self::new(LivenessProbe::new(transport, &config.probe), selector, RunOptions::from_config(config))
    }

    pub const fn probe(&self) -> &LivenessProbe<T> {
        &self.probe
    }

    pub async fn run_full(&self, entries: &[ChannelEntry]) -> ReconciliationReport {
        self.run_filtered(entries, |_| true).await
    }

    /// Probes the selected entries. Zero matches gives an empty report.
    pub async fn run_filtered<P>(&self, entries: &[ChannelEntry], predicate: P) -> ReconciliationReport
    where
        P: Fn(&ChannelEntry) -> bool,
    {
        let selected: Vec<(usize, &ChannelEntry)> = entries.iter().enumerate().filter(|(_, entry)| predicate(entry)).collect();
        if selected.is_empty() {
            warn!("no channels selected for checking");
            return ReconciliationReport::empty(Utc::now());
        }
        let count = selected.len();
        info!("{count} channels will be checked with {} worker(s)", self.options.workers);

        let limiter = RateLimiter::new();
        let results: Vec<ProbeResult> = stream::iter(selected.into_iter().enumerate())
            .map(|(position, (index, entry))| self.check_entry(&limiter, position + 1, count, index, entry))
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;

        ReconciliationReport::from_results(results, Utc::now())
    }

    async fn check_entry(&self, limiter: &RateLimiter, position: usize, count: usize, index: usize, entry: &ChannelEntry) -> ProbeResult {
        let strategy = self.selector.select(&entry.stream_url);
        limiter.acquire(strategy.delay().unwrap_or(self.options.delay)).await;
        info!("[{position}/{count}] checking {} ({})", entry.name, sanitize_sensitive_info(&entry.stream_url));
        let hints = self.probe.hints_for(&entry.stream_url);
        let verdict = self.probe.probe(&entry.stream_url, &hints, strategy.as_ref()).await;
        if verdict.reachable {
            info!("✅ {}: {}", entry.name, verdict.status_label);
        } else {
            info!("❌ {}: {}", entry.name, verdict.status_label);
        }
        ProbeResult::new(index, entry, verdict, Utc::now())
    }
}

/// Playlist content decided by the reconciliation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub entries: Vec<ChannelEntry>,
    /// Positions of `entries` in the input sequence.
    pub kept: Vec<usize>,
    pub removed: usize,
}

impl Reconciliation {
    pub fn is_kept(&self, index: usize) -> bool {
        self.kept.binary_search(&index).is_ok()
    }
}

/// `entries` must be the sequence the report was produced from.
pub fn reconcile(entries: &[ChannelEntry], report: &ReconciliationReport, policy: ReconcilePolicy) -> Reconciliation {
    let broken: HashSet<usize> = match policy {
        ReconcilePolicy::AnnotateOnly => HashSet::new(),
        ReconcilePolicy::Prune => report.broken.iter().map(|r| r.index).collect(),
    };
    let (kept, entries): (Vec<usize>, Vec<ChannelEntry>) = entries.iter().enumerate()
        .filter(|(index, _)| !broken.contains(index))
        .map(|(index, entry)| (index, entry.clone()))
        .unzip();
    let removed = broken.len();
    Reconciliation { entries, kept, removed }
}
