use crate::utils::constants::{DEFAULT_DELAY_MILLIS, DEFAULT_MANIFEST_EXTENSIONS, DEFAULT_MANIFEST_MARKERS, DEFAULT_MAX_MANIFEST_BYTES,
                              DEFAULT_PLAYLIST_FILE, DEFAULT_REPORT_FILE, DEFAULT_SCHEDULE_INTERVAL_SECS, DEFAULT_SEGMENT_SUFFIXES,
                              DEFAULT_SUBSTITUTIONS_FILE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

pub(crate) fn default_as_true() -> bool { true }

pub(crate) fn default_as_one_usize() -> usize { 1 }

pub(crate) fn default_playlist_file() -> String { String::from(DEFAULT_PLAYLIST_FILE) }

pub(crate) fn default_report_file() -> String { String::from(DEFAULT_REPORT_FILE) }

pub(crate) fn default_substitutions_file() -> String { String::from(DEFAULT_SUBSTITUTIONS_FILE) }

pub(crate) fn default_user_agent() -> String { String::from(DEFAULT_USER_AGENT) }

pub(crate) fn default_delay_millis() -> u64 { DEFAULT_DELAY_MILLIS }

pub(crate) fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

pub(crate) fn default_max_manifest_bytes() -> usize { DEFAULT_MAX_MANIFEST_BYTES }

pub(crate) fn default_schedule_interval_secs() -> u64 { DEFAULT_SCHEDULE_INTERVAL_SECS }

pub(crate) fn default_manifest_extensions() -> Vec<String> { to_string_list(DEFAULT_MANIFEST_EXTENSIONS) }

pub(crate) fn default_manifest_markers() -> Vec<String> { to_string_list(DEFAULT_MANIFEST_MARKERS) }

pub(crate) fn default_segment_suffixes() -> Vec<String> { to_string_list(DEFAULT_SEGMENT_SUFFIXES) }

fn to_string_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
