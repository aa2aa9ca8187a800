//! Result and error types for the Nazeel end-to-end suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the application
#[derive(Debug, Error)]
pub enum E2eError {
    // ------------------------------------------------------------------
    // Transient interaction failures (retried by the delayed driver)
    // ------------------------------------------------------------------
    /// No element matched the locator
    #[error("No such element: {locator}")]
    NoSuchElement {
        /// Locator that matched nothing
        locator: String,
    },

    /// Element exists but cannot receive input right now
    #[error("Element not interactable: {message}")]
    ElementNotInteractable {
        /// Error message
        message: String,
    },

    /// Element handle no longer attached to the document
    #[error("Stale element reference: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// Another element would receive the click
    #[error("Element click intercepted: {message}")]
    ClickIntercepted {
        /// Error message
        message: String,
    },

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------
    /// The browser never reached the expected URL
    #[error("URL did not become {expected} within {timeout_ms}ms (last seen: {actual})")]
    UrlNotReached {
        /// URL that was awaited
        expected: String,
        /// Last URL observed
        actual: String,
        /// Phase timeout in milliseconds
        timeout_ms: u64,
    },

    /// The loading overlay stayed visible (strict readiness only)
    #[error("Loading indicator still visible after {timeout_ms}ms")]
    LoaderStillVisible {
        /// Phase timeout in milliseconds
        timeout_ms: u64,
    },

    /// Explicit wait timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    // ------------------------------------------------------------------
    // Business assertions
    // ------------------------------------------------------------------
    /// A business rule did not hold
    #[error("Assertion failed: {message} (expected: {expected}, actual: {actual})")]
    Assertion {
        /// What was being checked
        message: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    // ------------------------------------------------------------------
    // Infrastructure
    // ------------------------------------------------------------------
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// UI text could not be parsed into a record
    #[error("Cannot parse {what} from {input:?}: {message}")]
    Parse {
        /// Kind of value being parsed
        what: &'static str,
        /// Raw input text
        input: String,
        /// Error message
        message: String,
    },

    /// Scrolling did not move the page
    #[error("Scroll limit reached while scrolling {direction}")]
    ScrollLimitReached {
        /// Scroll direction
        direction: String,
    },

    /// Operation not supported by the active backend
    #[error("Unsupported operation: {message}")]
    Unsupported {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Whether this failure is a re-render race worth retrying
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoSuchElement { .. }
                | Self::ElementNotInteractable { .. }
                | Self::StaleElement { .. }
                | Self::ClickIntercepted { .. }
        )
    }

    /// Build an assertion failure carrying both sides
    pub fn assertion(
        message: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Assertion {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a parse failure
    pub fn parse(what: &'static str, input: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what,
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Build a config failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Fail with an [`E2eError::Assertion`] unless `actual == expected`
pub fn ensure_eq<T>(actual: &T, expected: &T, message: &str) -> E2eResult<()>
where
    T: PartialEq + std::fmt::Debug + ?Sized,
{
    if actual == expected {
        Ok(())
    } else {
        Err(E2eError::assertion(
            message,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

/// Fail with an [`E2eError::Assertion`] unless `condition` holds
pub fn ensure(condition: bool, message: &str) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message, true, false))
    }
}
