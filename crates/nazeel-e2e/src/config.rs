//! Suite configuration.
//!
//! Resolution order: built-in defaults, optional YAML file, `NAZEEL_*`
//! environment variables, then whatever the caller overrides in code (the CLI
//! applies its flags last).

use crate::delayed::{
    DelayPolicy, DEFAULT_ACTION_DELAY_MS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL_MS,
};
use crate::model::User;
use crate::result::{E2eError, E2eResult};
use crate::wait::ReadyOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Staging root URL
pub const DEFAULT_BASE_URL: &str = "https://staging.nazeel.net:9002/";

/// Default screenshot directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "failed-screenshots";

/// Default per-test retry budget used by the suites
pub const DEFAULT_TEST_RETRIES: u32 = 2;

/// Default per-attempt test timeout (5 minutes)
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 300_000;

/// Resolved suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application root, with trailing slash
    pub base_url: String,
    /// Login credentials
    pub user: User,
    /// Row index in the property picker after login
    pub property_index: usize,
    /// Run browser headless
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Browser window size
    pub window_size: (u32, u32),
    /// Disable the chromium sandbox (containers/CI)
    pub no_sandbox: bool,
    /// Settle delay after mutating actions
    pub action_delay_ms: u64,
    /// Retry bound for click/type/clear
    pub max_action_retries: u32,
    /// Pause between action retries
    pub retry_interval_ms: u64,
    /// Implicit wait for driver-level finds
    pub implicit_wait_ms: u64,
    /// Page-ready wait options
    pub ready: ReadyOptions,
    /// Where failure screenshots go
    pub screenshot_dir: PathBuf,
    /// Re-runs allowed for a failing test
    pub test_retries: u32,
    /// Per-attempt timeout
    pub test_timeout_ms: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user: User::default(),
            property_index: 2,
            headless: true,
            chromium_path: None,
            window_size: (1920, 1080),
            no_sandbox: false,
            action_delay_ms: DEFAULT_ACTION_DELAY_MS,
            max_action_retries: DEFAULT_MAX_RETRIES,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            implicit_wait_ms: 0,
            ready: ReadyOptions::default(),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            test_retries: DEFAULT_TEST_RETRIES,
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
        }
    }
}

impl SuiteConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> E2eResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: &Path) -> E2eResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Apply `NAZEEL_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NAZEEL_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("NAZEEL_USERNAME") {
            self.user.username = v;
        }
        if let Some(v) = lookup("NAZEEL_PASSWORD") {
            self.user.password = v;
        }
        if let Some(v) = lookup("NAZEEL_ACCESS_CODE") {
            self.user.access_code = v;
        }
        if let Some(v) = lookup("NAZEEL_HEADLESS") {
            self.headless = parse_bool("NAZEEL_HEADLESS", &v)?;
        }
        if let Some(v) = lookup("NAZEEL_CHROMIUM_PATH") {
            self.chromium_path = Some(v);
        }
        if let Some(v) = lookup("NAZEEL_SCREENSHOT_DIR") {
            self.screenshot_dir = PathBuf::from(v);
        }
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        Ok(())
    }

    /// Check the configuration is usable for a live run
    pub fn validate(&self) -> E2eResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(E2eError::config(format!(
                "base_url must be http(s): {}",
                self.base_url
            )));
        }
        if !self.user.has_credentials() {
            return Err(E2eError::config(
                "username, password and access code are required \
                 (NAZEEL_USERNAME, NAZEEL_PASSWORD, NAZEEL_ACCESS_CODE)",
            ));
        }
        Ok(())
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Login page
    #[must_use]
    pub fn start_url(&self) -> String {
        self.url("login")
    }

    /// Decorator policy derived from the action settings
    #[must_use]
    pub const fn delay_policy(&self) -> DelayPolicy {
        DelayPolicy {
            action_delay: Duration::from_millis(self.action_delay_ms),
            max_retries: self.max_action_retries,
            retry_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }

    /// Per-attempt test timeout
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }
}

fn parse_bool(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_default_urls() {
            let config = SuiteConfig::default();
            assert_eq!(config.start_url(), "https://staging.nazeel.net:9002/login");
            assert_eq!(
                config.url("/guest-supplies/supplies-order"),
                "https://staging.nazeel.net:9002/guest-supplies/supplies-order"
            );
        }

        #[test]
        fn test_default_policy() {
            let policy = SuiteConfig::default().delay_policy();
            assert_eq!(policy.action_delay, Duration::from_millis(600));
            assert_eq!(policy.max_retries, 3);
        }

        #[test]
        fn test_defaults_need_credentials() {
            let err = SuiteConfig::default().validate().unwrap_err();
            assert!(err.to_string().contains("NAZEEL_USERNAME"));
        }
    }

    mod yaml {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = SuiteConfig::from_yaml_str(
                "base_url: https://qa.nazeel.net/\nheadless: false\nuser:\n  username: qa\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "https://qa.nazeel.net/");
            assert!(!config.headless);
            assert_eq!(config.user.username, "qa");
            assert_eq!(config.property_index, 2);
            assert_eq!(config.ready.settle_ms, 2_000);
        }

        #[test]
        fn test_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "screenshot_dir: shots\ntest_retries: 5").unwrap();
            let config = SuiteConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.screenshot_dir, PathBuf::from("shots"));
            assert_eq!(config.test_retries, 5);
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = SuiteConfig::from_yaml_file(Path::new("/nonexistent/nazeel.yaml")).unwrap_err();
            assert!(matches!(err, E2eError::Config { .. }));
        }

        #[test]
        fn test_invalid_yaml() {
            assert!(matches!(
                SuiteConfig::from_yaml_str("headless: [").unwrap_err(),
                E2eError::Yaml(_)
            ));
        }
    }

    mod environment {
        use super::*;

        #[test]
        fn test_env_overrides() {
            let mut config = SuiteConfig::default();
            config
                .apply_env(env(&[
                    ("NAZEEL_BASE_URL", "https://qa.nazeel.net"),
                    ("NAZEEL_USERNAME", "qa"),
                    ("NAZEEL_PASSWORD", "pw"),
                    ("NAZEEL_ACCESS_CODE", "12345"),
                    ("NAZEEL_HEADLESS", "no"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "https://qa.nazeel.net/");
            assert!(!config.headless);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_bad_bool() {
            let mut config = SuiteConfig::default();
            let err = config
                .apply_env(env(&[("NAZEEL_HEADLESS", "maybe")]))
                .unwrap_err();
            assert!(err.to_string().contains("NAZEEL_HEADLESS"));
        }
    }
}
