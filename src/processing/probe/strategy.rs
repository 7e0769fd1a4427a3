use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{PlatformRule, ProbeObservation, ProbeVerdict, TransportFailure};
use crate::utils::get_url_host;

/// Turns a probe observation into a reachability verdict.
pub trait ClassificationStrategy: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, observation: &ProbeObservation) -> ProbeVerdict;

    /// Pacing delay before probes handled by this strategy, `None` uses the run default.
    fn delay(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Default)]
pub struct DefaultStrategy;

impl ClassificationStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        "default"
    }

    fn classify(&self, observation: &ProbeObservation) -> ProbeVerdict {
        match observation {
            ProbeObservation::TrustedOrigin
            | ProbeObservation::ContentVerified(_)
            | ProbeObservation::ExistenceOnly
            | ProbeObservation::Accessible => ProbeVerdict::reachable(observation.to_string()),
            ProbeObservation::ContentMismatch
            | ProbeObservation::HttpStatus(_)
            | ProbeObservation::Transport(_) => ProbeVerdict::unreachable(observation.to_string()),
        }
    }
}

/// Platform whose delivery edge is slow but present. Only connection errors and
/// 4xx/5xx statuses outside the tolerated list disqualify a url, any other
/// failure is accepted with a `-tolerated` label.
#[derive(Debug)]
pub struct PlatformTolerantStrategy {
    rule: PlatformRule,
}

impl PlatformTolerantStrategy {
    pub const fn new(rule: PlatformRule) -> Self {
        Self { rule }
    }
}

impl ClassificationStrategy for PlatformTolerantStrategy {
    fn name(&self) -> &str {
        &self.rule.name
    }

    fn classify(&self, observation: &ProbeObservation) -> ProbeVerdict {
        let verdict = DefaultStrategy.classify(observation);
        if verdict.reachable {
            return verdict;
        }
        let disqualified = match observation {
            ProbeObservation::Transport(TransportFailure::Connection) => true,
            ProbeObservation::Transport(TransportFailure::Timeout) => !self.rule.tolerate_timeout,
            ProbeObservation::HttpStatus(status) => (400..600).contains(status) && !self.rule.tolerated_status.contains(status),
            _ => false,
        };
        if disqualified {
            verdict
        } else {
            ProbeVerdict::reachable(format!("{observation}-tolerated"))
        }
    }

    fn delay(&self) -> Option<Duration> {
        self.rule.delay_millis.map(Duration::from_millis)
    }
}

/// Picks the strategy for a url by its host, before the probe runs.
#[derive(Debug)]
pub struct StrategySelector {
    platforms: Vec<(PlatformRule, Arc<dyn ClassificationStrategy>)>,
    default: Arc<dyn ClassificationStrategy>,
}

impl StrategySelector {
    pub fn new(rules: &[PlatformRule]) -> Self {
        Self {
            platforms: rules.iter()
                .map(|rule| (rule.clone(), Arc::new(PlatformTolerantStrategy::new(rule.clone())) as Arc<dyn ClassificationStrategy>))
                .collect(),
            default: Arc::new(DefaultStrategy),
        }
    }

    /// Every url is classified by the default strategy.
    pub fn strict() -> Self {
        Self::new(&[])
    }

    pub fn select(&self, url: &str) -> Arc<dyn ClassificationStrategy> {
        get_url_host(url)
            .and_then(|host| self.platforms.iter().find(|(rule, _)| rule.matches_host(&host)))
            .map_or_else(|| Arc::clone(&self.default), |(_, strategy)| Arc::clone(strategy))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::model::{PlatformRule, ProbeObservation, TransportFailure};
    use crate::processing::probe::{ClassificationStrategy, DefaultStrategy, PlatformTolerantStrategy, StrategySelector};

    #[test]
    fn test_default_strategy() {
        let timeout = DefaultStrategy.classify(&ProbeObservation::Transport(TransportFailure::Timeout));
        assert!(!timeout.reachable);
        assert_eq!(timeout.status_label, "timeout");
        let ok = DefaultStrategy.classify(&ProbeObservation::ExistenceOnly);
        assert!(ok.reachable);
        assert_eq!(ok.status_label, "existence-only");
    }

    #[test]
    fn test_platform_tolerance() {
        let strategy = PlatformTolerantStrategy::new(PlatformRule::youtube());
        let timeout = strategy.classify(&ProbeObservation::Transport(TransportFailure::Timeout));
        assert!(timeout.reachable);
        assert_eq!(timeout.status_label, "timeout-tolerated");
        assert!(strategy.classify(&ProbeObservation::HttpStatus(404)).reachable);
        assert!(!strategy.classify(&ProbeObservation::HttpStatus(403)).reachable);
        assert!(!strategy.classify(&ProbeObservation::HttpStatus(500)).reachable);
        assert!(!strategy.classify(&ProbeObservation::Transport(TransportFailure::Connection)).reachable);
        assert_eq!(strategy.delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_platform_accepts_non_fatal_failures() {
        let strategy = PlatformTolerantStrategy::new(PlatformRule::youtube());
        let error = strategy.classify(&ProbeObservation::Transport(TransportFailure::Other("tls handshake eof".to_string())));
        assert!(error.reachable);
        assert_eq!(error.status_label, "error:tls handshake eof-tolerated");
        let mismatch = strategy.classify(&ProbeObservation::ContentMismatch);
        assert!(mismatch.reachable);
        assert_eq!(mismatch.status_label, "content-mismatch-tolerated");
        assert!(strategy.classify(&ProbeObservation::HttpStatus(302)).reachable);
        let verified = strategy.classify(&ProbeObservation::ContentVerified("hasManifestMarker"));
        assert_eq!(verified.status_label, "content-verified");
    }

    #[test]
    fn test_platform_without_timeout_tolerance() {
        let rule = PlatformRule { tolerate_timeout: false, ..PlatformRule::youtube() };
        let strategy = PlatformTolerantStrategy::new(rule);
        let timeout = strategy.classify(&ProbeObservation::Transport(TransportFailure::Timeout));
        assert!(!timeout.reachable);
        assert_eq!(timeout.status_label, "timeout");
    }

    #[test]
    fn test_selector() {
        let selector = StrategySelector::new(&[PlatformRule::youtube()]);
        assert_eq!(selector.select("https://www.youtube.com/watch?v=abc").name(), "youtube");
        assert_eq!(selector.select("https://cdn.example/live.m3u8").name(), "default");
        assert_eq!(selector.select("garbage").name(), "default");
        assert_eq!(StrategySelector::strict().select("https://youtu.be/abc").name(), "default");
    }
}
