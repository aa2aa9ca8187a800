//! Login screen and property picker.

use super::{is_shown, PageObject};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::model::User;
use crate::result::{E2eError, E2eResult};
use crate::wait::{wait_for_count, Waits};
use async_trait::async_trait;

/// Credentials form shown at `/login`
#[derive(Debug, Clone)]
pub struct LoginPage {
    driver: DriverRef,
}

impl LoginPage {
    /// Username input
    pub const USERNAME: &'static str = "usern";
    /// Password input
    pub const PASSWORD: &'static str = "pass";
    /// Access code input
    pub const ACCESS_CODE: &'static str = "acc";
    /// Submit button
    pub const LOGIN_BUTTON: &'static str = "//button[contains(text(),'Login')]";
    /// Property rows listed after authentication
    pub const PROPERTY_ROWS: &'static str = "tbody[role='presentation']>tr";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self { driver }
    }

    /// Type the username
    pub async fn enter_username(&self, username: &str) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::id(Self::USERNAME))
            .await?
            .send_keys(username)
            .await?;
        Ok(self)
    }

    /// Type the password
    pub async fn enter_password(&self, password: &str) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::id(Self::PASSWORD))
            .await?
            .send_keys(password)
            .await?;
        Ok(self)
    }

    /// Type the access code
    pub async fn enter_access_code(&self, code: &str) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::id(Self::ACCESS_CODE))
            .await?
            .send_keys(code)
            .await?;
        Ok(self)
    }

    /// Submit the form
    pub async fn click_login(&self) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::xpath(Self::LOGIN_BUTTON))
            .await?
            .click()
            .await?;
        Ok(self)
    }

    /// Fill in all three credentials and submit
    pub async fn login(&self, user: &User) -> E2eResult<&Self> {
        if !user.has_credentials() {
            return Err(E2eError::config("login requires username, password and access code"));
        }
        self.enter_username(&user.username).await?;
        self.enter_password(&user.password).await?;
        self.enter_access_code(&user.access_code).await?;
        self.click_login().await
    }

    /// Pick the `index`-th property once the list has rendered
    pub async fn select_property(&self, index: usize) -> E2eResult<()> {
        let rows = wait_for_count(
            self.driver.as_ref(),
            &By::css(Self::PROPERTY_ROWS),
            index + 1,
            Waits::TillItReady.options(),
        )
        .await?;
        match rows.get(index) {
            Some(row) => row.click().await,
            None => Err(E2eError::NoSuchElement {
                locator: format!("{} [{index}]", Self::PROPERTY_ROWS),
            }),
        }
    }
}

#[async_trait]
impl PageObject for LoginPage {
    fn page_name(&self) -> &'static str {
        "login"
    }

    fn path(&self) -> &'static str {
        "login"
    }

    async fn is_loaded(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::id(Self::USERNAME)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    fn form() -> (Arc<MockDriver>, [Arc<MockElement>; 4]) {
        let fields = [
            MockElement::new("usern").into_ref(),
            MockElement::new("pass").into_ref(),
            MockElement::new("acc").into_ref(),
            MockElement::new("login").into_ref(),
        ];
        let driver = MockDriver::new()
            .with_element(By::id(LoginPage::USERNAME), fields[0].clone())
            .with_element(By::id(LoginPage::PASSWORD), fields[1].clone())
            .with_element(By::id(LoginPage::ACCESS_CODE), fields[2].clone())
            .with_element(By::xpath(LoginPage::LOGIN_BUTTON), fields[3].clone());
        (Arc::new(driver), fields)
    }

    #[tokio::test]
    async fn test_login_fills_every_field() {
        let (driver, fields) = form();
        let page = LoginPage::new(driver);
        page.login(&User::new("qa", "pw", "99")).await.unwrap();
        assert_eq!(fields[0].value(), "qa");
        assert_eq!(fields[1].value(), "pw");
        assert_eq!(fields[2].value(), "99");
        assert_eq!(fields[3].call_count("click"), 1);
        assert!(page.is_loaded().await.unwrap());
    }

    #[tokio::test]
    async fn test_login_without_credentials_is_config_error() {
        let (driver, fields) = form();
        let err = LoginPage::new(driver).login(&User::default()).await.unwrap_err();
        assert!(matches!(err, E2eError::Config { .. }));
        assert_eq!(fields[3].call_count("click"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_property_by_index() {
        let second = MockElement::new("second").into_ref();
        let driver = Arc::new(MockDriver::new().with_elements(
            By::css(LoginPage::PROPERTY_ROWS),
            [MockElement::new("first").into_ref(), second.clone()],
        ));
        LoginPage::new(driver).select_property(1).await.unwrap();
        assert_eq!(second.call_count("click"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_missing_property_times_out() {
        let driver = Arc::new(MockDriver::new());
        assert!(matches!(
            LoginPage::new(driver).select_property(0).await,
            Err(E2eError::Timeout { .. })
        ));
    }
}
