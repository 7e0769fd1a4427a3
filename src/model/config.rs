use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::model::{default_platforms, LogConfig, PlatformRule, ProbeConfig};
use crate::utils::{default_as_one_usize, default_delay_millis, default_playlist_file, default_report_file,
                   default_schedule_interval_secs, default_substitutions_file, default_user_agent, parent_dir, resolve_path,
                   DEFAULT_RESOLVER_TIMEOUT_SECS};

/// What gets written back to the playlist after a run.
#[derive(Debug, Copy, Clone, serde::Serialize, serde::Deserialize, Eq, PartialEq, Default)]
pub enum ReconcilePolicy {
    #[serde(rename = "prune")]
    #[default]
    Prune,
    #[serde(rename = "annotate")]
    AnnotateOnly,
}

impl ReconcilePolicy {
    const PRUNE: &'static str = "prune";
    const ANNOTATE: &'static str = "annotate";
}

impl Display for ReconcilePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", match *self {
            Self::Prune => Self::PRUNE,
            Self::AnnotateOnly => Self::ANNOTATE,
        })
    }
}

/// Handling of an `#EXTINF` line that is never followed by a url line.
#[derive(Debug, Copy, Clone, serde::Serialize, serde::Deserialize, Eq, PartialEq, Default)]
pub enum OrphanPolicy {
    #[serde(rename = "drop")]
    #[default]
    Drop,
    #[serde(rename = "reject")]
    Reject,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    #[serde(default = "default_delay_millis")]
    pub delay_millis: u64,
    #[serde(default = "default_as_one_usize")]
    pub workers: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            delay_millis: default_delay_millis(),
            workers: default_as_one_usize(),
            user_agent: default_user_agent(),
        }
    }
}

impl CheckConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_millis)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_interval_secs")]
    pub interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: default_schedule_interval_secs(), cron: None }
    }
}

impl ScheduleConfig {
    pub fn prepare(&mut self) -> Result<(), M3uCheckerError> {
        if let Some(expression) = self.cron.as_ref() {
            if let Err(err) = cron::Schedule::from_str(expression) {
                return Err(info_err!("invalid cron expression '{}': {}", expression, err));
            }
        } else if self.interval_secs == 0 {
            return Err(info_err!("schedule.interval_secs must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default = "default_resolver_binary")]
    pub binary: String,
    #[serde(default = "default_resolver_format")]
    pub format: String,
    #[serde(default = "default_resolver_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_resolver_binary() -> String { String::from("yt-dlp") }

fn default_resolver_format() -> String { String::from("best") }

fn default_resolver_timeout_secs() -> u64 { DEFAULT_RESOLVER_TIMEOUT_SECS }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            binary: default_resolver_binary(),
            format: default_resolver_format(),
            timeout_secs: default_resolver_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_playlist_file")]
    pub playlist: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,
    #[serde(default = "default_substitutions_file")]
    pub substitutions_file: String,
    #[serde(default)]
    pub policy: ReconcilePolicy,
    #[serde(default)]
    pub orphan_metadata: OrphanPolicy,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformRule>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(skip)]
    pub config_dir: PathBuf,
    #[serde(skip)]
    pub playlist_path: PathBuf,
    #[serde(skip)]
    pub report_path: PathBuf,
    #[serde(skip)]
    pub backup_path: PathBuf,
    #[serde(skip)]
    pub substitutions_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playlist: default_playlist_file(),
            report_file: default_report_file(),
            backup_dir: None,
            substitutions_file: default_substitutions_file(),
            policy: ReconcilePolicy::default(),
            orphan_metadata: OrphanPolicy::default(),
            check: CheckConfig::default(),
            probe: ProbeConfig::default(),
            platforms: default_platforms(),
            schedule: ScheduleConfig::default(),
            resolver: ResolverConfig::default(),
            log: LogConfig::default(),
            config_dir: PathBuf::from("."),
            playlist_path: PathBuf::from(default_playlist_file()),
            report_path: PathBuf::from(default_report_file()),
            backup_path: PathBuf::from("."),
            substitutions_path: PathBuf::from(default_substitutions_file()),
        }
    }
}

impl Config {
    /// Validates the settings and resolves all file names relative to `config_dir`.
    pub fn prepare(&mut self, config_dir: &Path) -> Result<(), M3uCheckerError> {
        if self.check.workers == 0 {
            return Err(info_err!("check.workers must be at least 1"));
        }
        if self.playlist.trim().is_empty() {
            return Err(info_err!("playlist file name is empty"));
        }
        self.probe.prepare()?;
        self.schedule.prepare()?;
        for rule in &self.platforms {
            rule.prepare()?;
        }
        config_dir.clone_into(&mut self.config_dir);
        self.resolve_paths();
        Ok(())
    }

    /// Replaces the playlist file, e.g. from the command line. A relative
    /// name is resolved against `base_dir`, not the config directory.
    pub fn set_playlist(&mut self, playlist: &str, base_dir: &Path) {
        self.playlist = resolve_path(base_dir, playlist).to_string_lossy().to_string();
        self.resolve_paths();
    }

    fn resolve_paths(&mut self) {
        self.playlist_path = resolve_path(&self.config_dir, &self.playlist);
        self.report_path = resolve_path(&self.config_dir, &self.report_file);
        self.substitutions_path = resolve_path(&self.config_dir, &self.substitutions_file);
        self.backup_path = self.backup_dir.as_ref().map_or_else(
            || parent_dir(&self.playlist_path),
            |dir| resolve_path(&self.config_dir, dir));
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use crate::model::{Config, OrphanPolicy, ReconcilePolicy};

    const CONFIG: &str = r#"
playlist: turkiye_kanallari.m3u
backup_dir: backups
policy: annotate
orphan_metadata: reject
check:
  delay_millis: 500
  workers: 4
probe:
  timeout_secs: 8
  host_timeouts:
    - host: daioncdn.net
      secs: 15
  trusted_origins: [trt.com.tr]
schedule:
  cron: "0 0 */6 * * *"
"#;

    #[test]
    fn test_parse_config() {
        let mut cfg: Config = serde_yaml::from_str(CONFIG).unwrap();
        cfg.prepare(Path::new("/srv/iptv")).unwrap();
        assert_eq!(cfg.policy, ReconcilePolicy::AnnotateOnly);
        assert_eq!(cfg.orphan_metadata, OrphanPolicy::Reject);
        assert_eq!(cfg.check.workers, 4);
        assert_eq!(cfg.probe.timeout_secs, 8);
        assert_eq!(cfg.probe.manifest_extensions, vec![".m3u8".to_string()]);
        assert_eq!(cfg.platforms.len(), 1);
        assert_eq!(cfg.playlist_path, PathBuf::from("/srv/iptv/turkiye_kanallari.m3u"));
        assert_eq!(cfg.report_path, PathBuf::from("/srv/iptv/channel_report.json"));
        assert_eq!(cfg.backup_path, PathBuf::from("/srv/iptv/backups"));
    }

    #[test]
    fn test_invalid_cron() {
        let mut cfg: Config = serde_yaml::from_str("schedule:\n  cron: \"every now and then\"\n").unwrap();
        assert!(cfg.prepare(Path::new(".")).is_err());
    }

    #[test]
    fn test_zero_workers() {
        let mut cfg: Config = serde_yaml::from_str("check:\n  workers: 0\n").unwrap();
        assert!(cfg.prepare(Path::new(".")).is_err());
    }

    #[test]
    fn test_unknown_field() {
        assert!(serde_yaml::from_str::<Config>("playlists: x.m3u\n").is_err());
    }

    #[test]
    fn test_set_playlist() {
        let mut cfg = Config::default();
        cfg.prepare(Path::new("/data")).unwrap();
        cfg.set_playlist("other.m3u", Path::new("/data"));
        assert_eq!(cfg.playlist_path, PathBuf::from("/data/other.m3u"));
        assert_eq!(cfg.backup_path, PathBuf::from("/data"));
    }

    #[test]
    fn test_set_playlist_relative_to_working_dir() {
        let mut cfg = Config::default();
        cfg.prepare(Path::new("/etc/m3u-checker")).unwrap();
        cfg.set_playlist("./lists/kanallar.m3u", Path::new("/home/iptv"));
        assert_eq!(cfg.playlist_path, PathBuf::from("/home/iptv/lists/kanallar.m3u"));
        assert_eq!(cfg.backup_path, PathBuf::from("/home/iptv/lists"));
        assert_eq!(cfg.report_path, PathBuf::from("/etc/m3u-checker/channel_report.json"));
        cfg.set_playlist("/srv/all.m3u", Path::new("/home/iptv"));
        assert_eq!(cfg.playlist_path, PathBuf::from("/srv/all.m3u"));
    }
}
