use std::time::Duration;

use log::trace;

use crate::model::{ProbeConfig, ProbeHints, ProbeObservation, ProbeVerdict, StreamKind};
use crate::processing::probe::{is_success_status, ClassificationStrategy, ContentRules, HttpTransport};
use crate::utils::{get_url_host, sanitize_sensitive_info, url_path_ends_with};

/// Classifies a single url as reachable or not. Never retries.
pub struct LivenessProbe<T: HttpTransport> {
    transport: T,
    config: ProbeConfig,
    content_rules: ContentRules,
}

impl<T: HttpTransport> LivenessProbe<T> {
    pub fn new(transport: T, config: &ProbeConfig) -> Self {
        Self {
            transport,
            config: config.clone(),
            content_rules: ContentRules::from_config(config),
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn hints_for(&self, url: &str) -> ProbeHints {
        let kind = if url_path_ends_with(url, &self.config.manifest_extensions) { StreamKind::Manifest } else { StreamKind::WebPage };
        ProbeHints::new(kind)
    }

    /// Hint override, then host override, then the global default.
    pub fn effective_timeout(&self, host: Option<&str>, hints: &ProbeHints) -> Duration {
        hints.timeout_override
            .or_else(|| host.and_then(|h| self.config.host_timeout(h)))
            .unwrap_or_else(|| self.config.default_timeout())
    }

    pub async fn probe(&self, url: &str, hints: &ProbeHints, strategy: &dyn ClassificationStrategy) -> ProbeVerdict {
        let observation = self.observe(url, hints).await;
        trace!("{} observed {} ({})", sanitize_sensitive_info(url), observation, strategy.name());
        strategy.classify(&observation)
    }

    pub async fn observe(&self, url: &str, hints: &ProbeHints) -> ProbeObservation {
        let host = get_url_host(url);
        let timeout = self.effective_timeout(host.as_deref(), hints);
        match hints.declared_kind {
            StreamKind::Manifest => self.observe_manifest(url, host.as_deref(), timeout).await,
            StreamKind::WebPage => self.observe_page(url, timeout).await,
        }
    }

    async fn observe_manifest(&self, url: &str, host: Option<&str>, timeout: Duration) -> ProbeObservation {
        match self.transport.head(url, timeout).await {
            Err(failure) => ProbeObservation::Transport(failure),
            Ok(status) if !is_success_status(status) => ProbeObservation::HttpStatus(status),
            Ok(_) => {
                if host.is_some_and(|h| self.config.is_trusted_origin(h)) {
                    return ProbeObservation::TrustedOrigin;
                }
                match self.transport.get(url, timeout, Some(self.config.max_manifest_bytes)).await {
                    Ok(reply) => {
                        let body = reply.body.unwrap_or_default();
                        self.content_rules.verify(&body)
                            .map_or(ProbeObservation::ContentMismatch, ProbeObservation::ContentVerified)
                    }
                    // the existence check passed, deeper verification is unavailable
                    Err(_) => ProbeObservation::ExistenceOnly,
                }
            }
        }
    }

    async fn observe_page(&self, url: &str, timeout: Duration) -> ProbeObservation {
        match self.transport.get(url, timeout, None).await {
            Err(failure) => ProbeObservation::Transport(failure),
            Ok(reply) if reply.is_success() => ProbeObservation::Accessible,
            Ok(reply) => ProbeObservation::HttpStatus(reply.status),
        }
    }
}
