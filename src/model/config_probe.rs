use std::time::Duration;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::utils::{default_manifest_extensions, default_manifest_markers, default_max_manifest_bytes, default_segment_suffixes,
                   default_timeout_secs, host_matches, DEFAULT_PLATFORM_DELAY_MILLIS, YOUTUBE_HOSTS, YOUTUBE_PLATFORM};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HostTimeout {
    pub host: String,
    pub secs: u64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub host_timeouts: Vec<HostTimeout>,
    #[serde(default)]
    pub trusted_origins: Vec<String>,
    #[serde(default = "default_manifest_extensions")]
    pub manifest_extensions: Vec<String>,
    #[serde(default = "default_manifest_markers")]
    pub manifest_markers: Vec<String>,
    #[serde(default = "default_segment_suffixes")]
    pub segment_suffixes: Vec<String>,
    #[serde(default = "default_max_manifest_bytes")]
    pub max_manifest_bytes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            host_timeouts: vec![],
            trusted_origins: vec![],
            manifest_extensions: default_manifest_extensions(),
            manifest_markers: default_manifest_markers(),
            segment_suffixes: default_segment_suffixes(),
            max_manifest_bytes: default_max_manifest_bytes(),
        }
    }
}

impl ProbeConfig {
    pub fn prepare(&mut self) -> Result<(), M3uCheckerError> {
        if self.timeout_secs == 0 {
            return Err(info_err!("probe.timeout_secs must be greater than 0"));
        }
        if self.manifest_extensions.is_empty() {
            return Err(info_err!("probe.manifest_extensions must not be empty"));
        }
        if let Some(ht) = self.host_timeouts.iter().find(|ht| ht.secs == 0 || ht.host.trim().is_empty()) {
            return Err(info_err!("invalid host timeout for '{}'", ht.host));
        }
        self.trusted_origins.retain(|o| !o.trim().is_empty());
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// First matching host override, otherwise `None`.
    pub fn host_timeout(&self, host: &str) -> Option<Duration> {
        self.host_timeouts.iter()
            .find(|ht| host_matches(host, &ht.host))
            .map(|ht| Duration::from_secs(ht.secs))
    }

    pub fn is_trusted_origin(&self, host: &str) -> bool {
        self.trusted_origins.iter().any(|origin| host_matches(host, origin))
    }
}

/// Host-keyed tolerance rule for a video platform.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlatformRule {
    pub name: String,
    pub hosts: Vec<String>,
    #[serde(default)]
    pub tolerate_timeout: bool,
    #[serde(default)]
    pub tolerated_status: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_millis: Option<u64>,
}

impl PlatformRule {
    pub fn youtube() -> Self {
        Self {
            name: YOUTUBE_PLATFORM.to_string(),
            hosts: YOUTUBE_HOSTS.iter().map(|h| (*h).to_string()).collect(),
            tolerate_timeout: true,
            tolerated_status: vec![404],
            delay_millis: Some(DEFAULT_PLATFORM_DELAY_MILLIS),
        }
    }

    pub fn prepare(&self) -> Result<(), M3uCheckerError> {
        if self.name.trim().is_empty() {
            return Err(info_err!("platform rule without name"));
        }
        if self.hosts.is_empty() {
            return Err(info_err!("platform rule '{}' has no hosts", self.name));
        }
        Ok(())
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|pattern| host_matches(host, pattern))
    }
}

pub(crate) fn default_platforms() -> Vec<PlatformRule> {
    vec![PlatformRule::youtube()]
}
