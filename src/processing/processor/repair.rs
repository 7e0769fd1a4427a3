use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};

use crate::m3u_checker_error::M3uCheckerError;
use crate::model::ProbeResult;
use crate::repository::{PlaylistStore, SubstitutionMap};
use crate::utils::sanitize_sensitive_info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Names of the entries that got a replacement url.
    pub replaced: Vec<String>,
    /// Broken entries without a mapped replacement, left untouched.
    pub unmatched: Vec<String>,
    pub backup_file: Option<PathBuf>,
}

/// Replaces the stream url of broken entries that have a substitution.
/// Entries are matched by name and by the url that was reported broken, so
/// a second run on the same report does nothing. The pre-repair text is
/// backed up before the playlist is rewritten, nothing is written without a replacement.
/// Only the url line of a repaired entry changes, all other playlist lines are kept.
pub fn repair_playlist(store: &PlaylistStore, broken: &[ProbeResult], substitutions: &SubstitutionMap, backup_dir: &Path) -> Result<RepairOutcome, M3uCheckerError> {
    let original = store.load_text()?;
    let mut document = store.document(&original)?;
    let entries = document.entries();
    let mut outcome = RepairOutcome::default();

    for result in broken {
        let Some(replacement) = substitutions.get(&result.name) else {
            outcome.unmatched.push(result.name.clone());
            continue;
        };
        let mut found = false;
        for (index, _) in entries.iter().enumerate().filter(|(_, e)| e.name == result.name && e.stream_url == result.url) {
            found |= document.replace_url(index, replacement);
        }
        if found {
            info!("{}: {} -> {}", result.name, sanitize_sensitive_info(&result.url), sanitize_sensitive_info(replacement));
            outcome.replaced.push(result.name.clone());
        } else {
            warn!("{} with url {} not found in playlist", result.name, sanitize_sensitive_info(&result.url));
            outcome.unmatched.push(result.name.clone());
        }
    }

    if outcome.replaced.is_empty() {
        info!("nothing to repair");
        return Ok(outcome);
    }

    outcome.backup_file = Some(store.backup(&original, backup_dir, &Utc::now())?);
    store.save_document(&document)?;
    info!("{} channel(s) repaired, run a check to confirm", outcome.replaced.len());
    Ok(outcome)
}

/// Failure class of a broken result, derived from its status label.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureClass {
    Timeout,
    Connection,
    Blocked,
    ServerError,
    NotFound,
    ContentMismatch,
    Other,
}

impl FailureClass {
    pub fn from_status_label(label: &str) -> Self {
        match label {
            "timeout" => Self::Timeout,
            "connection-error" => Self::Connection,
            "content-mismatch" => Self::ContentMismatch,
            _ => match label.strip_prefix("http-").and_then(|code| code.parse::<u16>().ok()) {
                Some(401 | 403) => Self::Blocked,
                Some(code) if code >= 500 => Self::ServerError,
                Some(code) if code >= 400 => Self::NotFound,
                _ => Self::Other,
            },
        }
    }

    pub const fn advice(self) -> &'static str {
        match self {
            Self::Timeout => "server responds slowly, raise probe.timeout_secs or add a host timeout",
            Self::Connection => "host not reachable, check network and DNS or wait for the host to return",
            Self::Blocked => "server refuses the client, try another user agent, network or time of day",
            Self::ServerError => "server side failure, retry later",
            Self::NotFound => "stream moved or removed, a replacement url is needed",
            Self::ContentMismatch => "response is not a stream manifest, the url probably points to a web page",
            Self::Other => "check the url manually",
        }
    }
}

impl Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Blocked => "blocked",
            Self::ServerError => "server-error",
            Self::NotFound => "not-found",
            Self::ContentMismatch => "content-mismatch",
            Self::Other => "other",
        })
    }
}

/// What a repair would do for one broken entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairSuggestion {
    pub name: String,
    pub category: String,
    pub status_label: String,
    pub class: FailureClass,
    pub replacement: Option<String>,
}

/// Dry run of [`repair_playlist`], nothing is read from or written to the playlist.
pub fn suggest_repairs(broken: &[ProbeResult], substitutions: &SubstitutionMap) -> Vec<RepairSuggestion> {
    broken.iter().map(|result| RepairSuggestion {
        name: result.name.clone(),
        category: result.category.clone(),
        status_label: result.status_label.clone(),
        class: FailureClass::from_status_label(&result.status_label),
        replacement: substitutions.get(&result.name).map(ToString::to_string),
    }).collect()
}
