//! Browser backends.
//!
//! [`BrowserConfig`] is resolved from the suite configuration whether or not
//! a real browser is compiled in. With the `browser` feature, [`launch`]
//! starts chromium over CDP; without it, [`launch`] fails with
//! [`E2eError::Unsupported`] and only the mock driver is available.

#[cfg(feature = "browser")]
pub mod cdp;

#[cfg(feature = "browser")]
pub use cdp::{CdpElement, ChromiumDriver};

use crate::config::SuiteConfig;
use crate::driver::DriverRef;
#[cfg(not(feature = "browser"))]
use crate::result::E2eError;
use crate::result::E2eResult;

/// Browser launch options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Window width and height
    pub window_size: (u32, u32),
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Extra command line switches
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            chromium_path: None,
            sandbox: true,
            args: vec!["--lang=en-US".to_string()],
        }
    }
}

impl BrowserConfig {
    /// Launch options for a suite run
    #[must_use]
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            window_size: config.window_size,
            chromium_path: config.chromium_path.clone(),
            sandbox: !config.no_sandbox,
            ..Self::default()
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Append a command line switch
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Start a browser for `config`
#[cfg(feature = "browser")]
pub async fn launch(config: &SuiteConfig) -> E2eResult<DriverRef> {
    let driver = ChromiumDriver::launch(BrowserConfig::from_suite(config)).await?;
    Ok(std::sync::Arc::new(driver))
}

/// Start a browser for `config`
#[cfg(not(feature = "browser"))]
pub async fn launch(config: &SuiteConfig) -> E2eResult<DriverRef> {
    let _ = BrowserConfig::from_suite(config);
    Err(E2eError::Unsupported {
        message: "built without the `browser` feature".to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_suite_maps_window_and_sandbox() {
        let mut suite = SuiteConfig::default();
        suite.headless = false;
        suite.no_sandbox = true;
        suite.window_size = (1280, 720);
        suite.chromium_path = Some("/usr/bin/chromium".into());

        let config = BrowserConfig::from_suite(&suite);
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.window_size, (1280, 720));
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.args, vec!["--lang=en-US".to_string()]);
    }

    #[test]
    fn test_builders() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_no_sandbox()
            .with_arg("--disable-gpu");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.args.last().map(String::as_str), Some("--disable-gpu"));
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_browser_feature() {
        let err = launch(&SuiteConfig::default()).await.unwrap_err();
        assert!(matches!(err, E2eError::Unsupported { .. }));
    }
}
