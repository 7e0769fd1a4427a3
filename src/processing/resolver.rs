use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use crate::m3u_checker_error::{notify_err, M3uCheckerError};
use crate::model::ResolverConfig;
use crate::utils::{sanitize_sensitive_info, truncate_message, MAX_ERROR_MESSAGE_LEN};

/// Turns a video page url into a direct media url. No latency bound is
/// guaranteed, callers go through [`resolve_with_timeout`].
pub trait VideoPageResolver: Send + Sync {
    fn resolve(&self, page_url: &str) -> impl Future<Output=Result<Option<String>, M3uCheckerError>> + Send;
}

/// Resolves through an external `yt-dlp` process.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: String,
    format: String,
}

impl YtDlpResolver {
    pub fn new(binary: &str, format: &str) -> Self {
        Self { binary: binary.to_string(), format: format.to_string() }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.binary, &config.format)
    }
}

impl VideoPageResolver for YtDlpResolver {
    async fn resolve(&self, page_url: &str) -> Result<Option<String>, M3uCheckerError> {
        debug!("resolving {} with {}", sanitize_sensitive_info(page_url), self.binary);
        let output = Command::new(&self.binary)
            .args(["-f", &self.format, "-g", "--no-warnings", "--no-playlist", page_url])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| notify_err!("failed to run {}: {}", self.binary, err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(notify_err!("{} failed: {}", self.binary, truncate_message(stderr.trim(), MAX_ERROR_MESSAGE_LEN)));
        }
        // one url per selected format, the first is the best match
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(ToString::to_string))
    }
}

pub async fn resolve_with_timeout<R: VideoPageResolver>(resolver: &R, page_url: &str, timeout: Duration) -> Result<Option<String>, M3uCheckerError> {
    match tokio::time::timeout(timeout, resolver.resolve(page_url)).await {
        Ok(result) => result,
        Err(_) => Err(notify_err!("resolving {} timed out after {}s", sanitize_sensitive_info(page_url), timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::m3u_checker_error::M3uCheckerError;
    use crate::processing::resolver::{resolve_with_timeout, VideoPageResolver, YtDlpResolver};

    struct HangingResolver;

    impl VideoPageResolver for HangingResolver {
        async fn resolve(&self, _page_url: &str) -> Result<Option<String>, M3uCheckerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Some("https://never".to_string()))
        }
    }

    struct FixedResolver(Option<&'static str>);

    impl VideoPageResolver for FixedResolver {
        async fn resolve(&self, _page_url: &str) -> Result<Option<String>, M3uCheckerError> {
            Ok(self.0.map(ToString::to_string))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let result = resolve_with_timeout(&HangingResolver, "https://www.youtube.com/watch?v=x", Duration::from_secs(60)).await;
        let err = result.unwrap_err();
        assert!(err.message.contains("timed out after 60s"));
    }

    #[tokio::test]
    async fn test_resolved_and_empty() {
        let url = resolve_with_timeout(&FixedResolver(Some("https://cdn/x.m3u8")), "https://www.youtube.com/watch?v=x", Duration::from_secs(5)).await;
        assert_eq!(url.unwrap(), Some("https://cdn/x.m3u8".to_string()));
        let none = resolve_with_timeout(&FixedResolver(None), "https://www.youtube.com/watch?v=x", Duration::from_secs(5)).await;
        assert_eq!(none.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let resolver = YtDlpResolver::new("/nonexistent/yt-dlp-binary", "best");
        assert!(resolve_with_timeout(&resolver, "https://www.youtube.com/watch?v=x", Duration::from_secs(5)).await.is_err());
    }
}
