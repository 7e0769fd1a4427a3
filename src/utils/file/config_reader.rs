use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::model::Config;
use crate::utils::parent_dir;

static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{env:(?P<var>[a-zA-Z_][a-zA-Z0-9_]*)}").unwrap());

pub fn resolve_env_var(value: &str) -> String {
    ENV_REGEX.replace_all(value, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| format!("${{env:{var_name}}}"))
    }).to_string()
}

/// Reads a text file with `${env:NAME}` placeholders substituted.
pub fn read_resolved_text(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path).map(|content| resolve_env_var(&content))
}

/// A missing config file yields the default configuration.
pub fn read_config(config_file: &str) -> Result<Config, M3uCheckerError> {
    let path = PathBuf::from(config_file);
    let mut config = match read_resolved_text(&path) {
        Ok(content) => serde_yaml::from_str::<Config>(&content)
            .map_err(|err| info_err!("cant read config file {}: {}", config_file, err))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("config file {config_file} not found, using defaults");
            Config::default()
        }
        Err(err) => return Err(info_err!("cant read config file {}: {}", config_file, err)),
    };
    config.prepare(&parent_dir(&path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use crate::model::ReconcilePolicy;
    use crate::utils::file::config_reader::{read_config, resolve_env_var};

    #[test]
    fn test_resolve() {
        let resolved = resolve_env_var("${env:HOME}");
        assert_eq!(resolved, std::env::var("HOME").unwrap());
        assert_eq!(resolve_env_var("${env:M3U_CHECKER_SURELY_UNSET_VAR}"), "${env:M3U_CHECKER_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.yml");
        let config = read_config(file.to_str().unwrap()).unwrap();
        assert_eq!(config.policy, ReconcilePolicy::Prune);
        assert_eq!(config.playlist_path, dir.path().join("playlist.m3u"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.yml");
        std::fs::write(&file, "policy: [unclosed").unwrap();
        assert!(read_config(file.to_str().unwrap()).is_err());
    }
}
