//! Browser session shared by every case of a run.
//!
//! A [`Session`] owns the decorated driver, the suite configuration and the
//! state that suites hand to one another (orders created by one suite and
//! inspected by the next, the user resolved at login).

use crate::config::SuiteConfig;
use crate::delayed::DelayedDriver;
use crate::driver::{Driver, DriverRef};
use crate::model::{Order, User};
use crate::pages::{DashboardPage, LoginPage, PageObject};
use crate::result::E2eResult;
use crate::wait::{wait_ready, PageReady};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between submitting the login form and picking a property
const LOGIN_SETTLE: Duration = Duration::from_secs(2);

/// Values carried between cases and suites
#[derive(Debug, Clone, Default)]
pub struct SuiteState {
    /// Last order created as accomplished
    pub accomplished_order: Option<Order>,
    /// Last order created as proposed
    pub proposed_order: Option<Order>,
    /// Logged-in user, display name included once known
    pub login_user: User,
}

/// One browser plus everything a case needs to drive it
#[derive(Debug)]
pub struct Session {
    driver: Arc<DelayedDriver>,
    config: SuiteConfig,
    /// Cross-case state
    pub state: SuiteState,
}

impl Session {
    /// Wrap `raw` in the delay decorator configured by `config`
    #[must_use]
    pub fn new(raw: DriverRef, config: SuiteConfig) -> Self {
        let driver = DelayedDriver::new(raw, config.delay_policy());
        driver.set_implicit_wait(Duration::from_millis(config.implicit_wait_ms));
        let state = SuiteState {
            login_user: config.user.clone(),
            ..SuiteState::default()
        };
        Self {
            driver: Arc::new(driver),
            config,
            state,
        }
    }

    /// Decorated driver as a shared handle for page objects
    #[must_use]
    pub fn driver(&self) -> DriverRef {
        self.driver.clone()
    }

    /// Decorated driver
    #[must_use]
    pub fn delayed(&self) -> &DelayedDriver {
        &self.driver
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// Navigate to the login page
    pub async fn start(&self) -> E2eResult<()> {
        let url = self.config.start_url();
        info!(url = %url, "starting session");
        self.driver.goto(&url).await
    }

    /// Navigate to `target`; relative paths resolve against the base URL
    pub async fn navigate(&self, target: &str) -> E2eResult<()> {
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            self.url(target)
        };
        self.driver.goto(&url).await
    }

    /// Navigate to `path` and block until the page is ready
    pub async fn open(&self, path: &str) -> E2eResult<PageReady> {
        let url = self.url(path);
        self.driver.goto(&url).await?;
        self.wait_for_page_to_load(&url).await
    }

    /// Open a page object by its path
    pub async fn open_page(&self, page: &dyn PageObject) -> E2eResult<PageReady> {
        debug!(page = page.page_name(), "opening page");
        self.open(page.path()).await
    }

    /// Block until the browser shows `url` and the loader has cleared
    pub async fn wait_for_page_to_load(&self, url: &str) -> E2eResult<PageReady> {
        wait_ready(self.driver.as_ref(), url, &self.config.ready).await
    }

    /// Fixed pause
    pub async fn sleep(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Change the decorator's implicit find wait
    pub fn implicit_wait(&self, wait: Duration) {
        self.driver.set_implicit_wait(wait);
    }

    /// Log in with the configured user and property, then record the
    /// display name shown on the dashboard
    pub async fn login(&mut self) -> E2eResult<&User> {
        let login = LoginPage::new(self.driver());
        let user = self.config.user.clone();
        login.login(&user).await?;
        tokio::time::sleep(LOGIN_SETTLE).await;
        login.select_property(self.config.property_index).await?;

        let dashboard = DashboardPage::new(self.driver());
        self.wait_for_page_to_load(&dashboard.url(&self.config.base_url))
            .await?;
        let name = dashboard.logged_in_user_name().await?;
        info!(user = %name, "logged in");
        self.state.login_user = user.with_name(name);
        Ok(&self.state.login_user)
    }

    /// Close the browser
    pub async fn shutdown(&self) -> E2eResult<()> {
        info!("closing browser");
        self.driver.quit().await
    }
}
