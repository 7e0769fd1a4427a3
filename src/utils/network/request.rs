use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::m3u_checker_error::{notify_err, M3uCheckerError};
use crate::model::Config;

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(username=)[^&]*").unwrap());
static PASSWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(password=)[^&]*").unwrap());
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(token=)[^&]*").unwrap());

static SANITIZE_SENSITIVE_INFO: LazyLock<AtomicBool> = LazyLock::new(|| AtomicBool::new(true));

pub fn set_sanitize_sensitive_info(value: bool) {
    SANITIZE_SENSITIVE_INFO.store(value, Ordering::Relaxed);
}

pub fn sanitize_sensitive_info(query: &str) -> String {
    if SANITIZE_SENSITIVE_INFO.load(Ordering::Relaxed) {
        let masked_query = USERNAME_REGEX.replace_all(query, "$1***");
        let masked_query = PASSWORD_REGEX.replace_all(&masked_query, "$1***");
        let masked_query = TOKEN_REGEX.replace_all(&masked_query, "$1***");
        masked_query.to_string()
    } else {
        query.to_string()
    }
}

pub fn create_client(config: &Config) -> Result<reqwest::Client, M3uCheckerError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(config.check.user_agent.as_str())
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|err| notify_err!("Failed to create http client: {}", err))
}

/// Lowercased host of `url`, `None` for unparseable urls.
pub fn get_url_host(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase))
}

/// `pattern` matches the host itself or any of its subdomains.
pub fn host_matches(host: &str, pattern: &str) -> bool {
    let pattern = pattern.trim_start_matches('.').to_lowercase();
    host == pattern || host.ends_with(&format!(".{pattern}"))
}

/// Checks the url path, query and fragment excluded, against the given suffixes.
pub fn url_path_ends_with(url: &str, suffixes: &[String]) -> bool {
    let path = Url::parse(url).map_or_else(
        |_| url.split(['?', '#']).next().unwrap_or(url).to_lowercase(),
        |u| u.path().to_lowercase());
    suffixes.iter().any(|suffix| path.ends_with(&suffix.to_lowercase()))
}

pub fn truncate_message(message: &str, max_len: usize) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > max_len {
        first_line.chars().take(max_len).collect()
    } else {
        first_line.to_string()
    }
}
