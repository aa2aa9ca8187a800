//! Landing page after login, with the setup menu.

use super::{is_shown, PageObject};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use crate::wait::{wait_for_displayed, Waits};
use async_trait::async_trait;
use std::time::Duration;

const MENU_SETTLE: Duration = Duration::from_secs(3);

/// Dashboard
#[derive(Debug, Clone)]
pub struct DashboardPage {
    driver: DriverRef,
}

impl DashboardPage {
    /// Setup menu toggle
    pub const SETUP_MENU: &'static str = "//a[contains(text(),'Setup')]";
    /// Supplies entry inside the setup menu
    pub const SUPPLIES_MENU: &'static str = "//a[12]";
    /// Supplies unit usages link
    pub const SUPPLIES_UNIT_USAGES: &'static str = "//div[15]/a[3]";
    /// "Later" on the user verification prompt
    pub const VERIFICATION_LATER: &'static str = "//*[contains(text(),'Later')]";
    /// Display name in the top bar
    pub const USER_NAME: &'static str = "[class*='user-name']";
    /// Toast text
    pub const TOAST_MESSAGE: &'static str = "toast-message";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self { driver }
    }

    /// Walk Setup > Supplies > Supplies Unit Usages
    pub async fn open_supplies_unit_usages(&self) -> E2eResult<()> {
        self.driver
            .find_element(&By::xpath(Self::SETUP_MENU))
            .await?
            .click()
            .await?;
        tokio::time::sleep(MENU_SETTLE).await;

        let supplies = self.driver.find_element(&By::xpath(Self::SUPPLIES_MENU)).await?;
        supplies.scroll_into_view().await?;
        supplies.click().await?;
        tokio::time::sleep(MENU_SETTLE).await;

        self.driver
            .find_element(&By::xpath(Self::SUPPLIES_UNIT_USAGES))
            .await?
            .click()
            .await
    }

    /// Dismiss the user verification prompt if it is showing
    pub async fn dismiss_verification_prompt(&self) -> E2eResult<bool> {
        let later = By::xpath(Self::VERIFICATION_LATER);
        if !is_shown(self.driver.as_ref(), &later).await? {
            return Ok(false);
        }
        self.driver.find_element(&later).await?.click().await?;
        Ok(true)
    }

    /// Display name of the logged-in user
    pub async fn logged_in_user_name(&self) -> E2eResult<String> {
        let name = wait_for_displayed(
            self.driver.as_ref(),
            &By::css(Self::USER_NAME),
            Waits::UntilDisplayed.options(),
        )
        .await?;
        Ok(name.text().await?.trim().to_string())
    }

    /// Fail unless the visible toast reads exactly `expected`
    pub async fn assert_toast(&self, expected: &str) -> E2eResult<()> {
        let toast = wait_for_displayed(
            self.driver.as_ref(),
            &By::class_name(Self::TOAST_MESSAGE),
            Waits::TillItReady.options(),
        )
        .await?;
        let shown = toast.text().await?;
        let shown = shown.trim();
        if shown == expected {
            Ok(())
        } else {
            Err(E2eError::assertion("Toast message did not match", expected, shown))
        }
    }
}

#[async_trait]
impl PageObject for DashboardPage {
    fn page_name(&self) -> &'static str {
        "dashboard"
    }

    fn path(&self) -> &'static str {
        "dashboard"
    }

    async fn is_loaded(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::xpath(Self::SETUP_MENU)).await
    }
}
