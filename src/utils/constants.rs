pub const CONFIG_FILE: &str = "config.yml";
pub const ENV_LOG_LEVEL: &str = "M3U_CHECKER_LOG";

pub const DEFAULT_PLAYLIST_FILE: &str = "playlist.m3u";
pub const DEFAULT_REPORT_FILE: &str = "channel_report.json";
pub const DEFAULT_SUBSTITUTIONS_FILE: &str = "substitutions.yml";

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const M3U_HEADER: &str = "#EXTM3U";
pub const M3U_EXTINF: &str = "#EXTINF";
pub const M3U_EXTGRP: &str = "#EXTGRP";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DELAY_MILLIS: u64 = 1000;
pub const DEFAULT_PLATFORM_DELAY_MILLIS: u64 = 2000;
pub const DEFAULT_SCHEDULE_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_MAX_MANIFEST_BYTES: usize = 1_048_576;
pub const DEFAULT_RESOLVER_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_MANIFEST_EXTENSIONS: &[&str] = &[".m3u8"];
pub const DEFAULT_MANIFEST_MARKERS: &[&str] = &["#EXTM3U", "#EXT-X-VERSION"];
pub const DEFAULT_SEGMENT_SUFFIXES: &[&str] = &[".ts", ".m3u8"];

pub const YOUTUBE_PLATFORM: &str = "youtube";
pub const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "googlevideo.com"];

pub const MAX_ERROR_MESSAGE_LEN: usize = 50;
