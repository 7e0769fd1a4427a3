use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::model::ChannelEntry;

/// Declared content kind of a stream url.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StreamKind {
    Manifest,
    WebPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHints {
    pub declared_kind: StreamKind,
    pub timeout_override: Option<Duration>,
}

impl ProbeHints {
    pub const fn new(declared_kind: StreamKind) -> Self {
        Self { declared_kind, timeout_override: None }
    }
}

/// Failure below the http layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connection,
    Other(String),
}

/// What a probe saw, before any platform policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeObservation {
    TrustedOrigin,
    ContentVerified(&'static str),
    ExistenceOnly,
    Accessible,
    ContentMismatch,
    HttpStatus(u16),
    Transport(TransportFailure),
}

impl Display for ProbeObservation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::TrustedOrigin => write!(f, "trusted-origin"),
            Self::ContentVerified(_) => write!(f, "content-verified"),
            Self::ExistenceOnly => write!(f, "existence-only"),
            Self::Accessible => write!(f, "accessible"),
            Self::ContentMismatch => write!(f, "content-mismatch"),
            Self::HttpStatus(code) => write!(f, "http-{code}"),
            Self::Transport(TransportFailure::Timeout) => write!(f, "timeout"),
            Self::Transport(TransportFailure::Connection) => write!(f, "connection-error"),
            Self::Transport(TransportFailure::Other(msg)) => write!(f, "error:{msg}"),
        }
    }
}

/// Reachability decision with its status label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeVerdict {
    pub reachable: bool,
    pub status_label: String,
}

impl ProbeVerdict {
    pub fn reachable(status_label: impl Into<String>) -> Self {
        Self { reachable: true, status_label: status_label.into() }
    }

    pub fn unreachable(status_label: impl Into<String>) -> Self {
        Self { reachable: false, status_label: status_label.into() }
    }
}

/// Outcome of testing one entry. `index` is the position of the entry in the
/// probed playlist, stored as `position` so a reloaded report keeps playlist order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    #[serde(rename = "position", default)]
    pub index: usize,
    pub name: String,
    pub category: String,
    pub url: String,
    pub status_label: String,
    pub reachable: bool,
    pub checked_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn new(index: usize, entry: &ChannelEntry, verdict: ProbeVerdict, checked_at: DateTime<Utc>) -> Self {
        Self {
            index,
            name: entry.name.clone(),
            category: entry.category.clone(),
            url: entry.stream_url.clone(),
            status_label: verdict.status_label,
            reachable: verdict.reachable,
            checked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{ProbeObservation, TransportFailure};

    #[test]
    fn test_observation_labels() {
        assert_eq!(ProbeObservation::HttpStatus(404).to_string(), "http-404");
        assert_eq!(ProbeObservation::Transport(TransportFailure::Timeout).to_string(), "timeout");
        assert_eq!(ProbeObservation::Transport(TransportFailure::Connection).to_string(), "connection-error");
        assert_eq!(ProbeObservation::Transport(TransportFailure::Other("dns".to_string())).to_string(), "error:dns");
        assert_eq!(ProbeObservation::ContentVerified("hasManifestMarker").to_string(), "content-verified");
    }
}
