//! Filter panel of the supplies order listing.

use super::nth;
use crate::driver::DriverRef;
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use std::collections::HashMap;

/// Dropdowns of the filter panel, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDropdown {
    /// Order status
    Status,
    /// Supply category
    Category,
    /// Supply name
    Supply,
    /// Unit types
    UnitTypes,
    /// Creator, shown as `company - username`
    User,
}

impl FilterDropdown {
    /// Position among the `.k-select` toggles
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Category => 1,
            Self::Supply => 2,
            Self::UnitTypes => 3,
            Self::User => 4,
        }
    }
}

/// Filter panel
#[derive(Debug, Clone)]
pub struct FiltersPage {
    driver: DriverRef,
    selected: HashMap<FilterDropdown, String>,
}

impl FiltersPage {
    /// Dropdown toggles
    pub const DROPDOWNS: &'static str = "k-select";
    /// Order number input
    pub const ORDER_NO: &'static str = "order-number";
    /// Search button
    pub const SEARCH: &'static str = "button.button--primary";
    /// Options of the open dropdown
    pub const OPTIONS: &'static str = "div>ul>li[role='option']";
    /// Date-from input
    pub const DATE_FROM: &'static str = "input[placeholder='From']";
    /// Date-to input
    pub const DATE_TO: &'static str = "input[placeholder='To']";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self {
            driver,
            selected: HashMap::new(),
        }
    }

    /// Whether any option of the open dropdown is displayed
    pub async fn is_options_shown(&self) -> E2eResult<bool> {
        for option in self.driver.find_elements(&By::css(Self::OPTIONS)).await? {
            match option.is_displayed().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    /// Open `dropdown`
    pub async fn open(&mut self, dropdown: FilterDropdown) -> E2eResult<&mut Self> {
        nth(self.driver.as_ref(), &By::class_name(Self::DROPDOWNS), dropdown.index())
            .await?
            .click()
            .await?;
        Ok(self)
    }

    /// Pick the `index`-th option of the open `dropdown` and remember its text
    pub async fn select_option(&mut self, dropdown: FilterDropdown, index: usize) -> E2eResult<&mut Self> {
        let option = nth(self.driver.as_ref(), &By::css(Self::OPTIONS), index).await?;
        let text = option.text().await?.trim().to_string();
        option.click().await?;
        self.selected.insert(dropdown, text);
        Ok(self)
    }

    /// Open `dropdown` and pick its `index`-th option
    pub async fn choose(&mut self, dropdown: FilterDropdown, index: usize) -> E2eResult<&mut Self> {
        self.open(dropdown).await?;
        self.select_option(dropdown, index).await
    }

    /// Type an order number
    pub async fn insert_order_no(&mut self, order_no: &str) -> E2eResult<&mut Self> {
        self.driver
            .find_element(&By::id(Self::ORDER_NO))
            .await?
            .send_keys(order_no)
            .await?;
        Ok(self)
    }

    /// Focus the date-from input
    pub async fn click_date_from(&mut self) -> E2eResult<&mut Self> {
        self.driver.find_element(&By::css(Self::DATE_FROM)).await?.click().await?;
        Ok(self)
    }

    /// Focus the date-to input
    pub async fn click_date_to(&mut self) -> E2eResult<&mut Self> {
        self.driver.find_element(&By::css(Self::DATE_TO)).await?.click().await?;
        Ok(self)
    }

    /// Apply the filters
    pub async fn click_search(&mut self) -> E2eResult<&mut Self> {
        self.driver.find_element(&By::css(Self::SEARCH)).await?.click().await?;
        Ok(self)
    }

    /// Text of the option last picked in `dropdown`
    #[must_use]
    pub fn selected(&self, dropdown: FilterDropdown) -> Option<&str> {
        self.selected.get(&dropdown).map(String::as_str)
    }

    /// Username part of the picked user option (`company - username`)
    pub fn selected_user_name(&self) -> E2eResult<String> {
        let option = self.selected(FilterDropdown::User).ok_or_else(|| E2eError::NoSuchElement {
            locator: "selected user option".to_string(),
        })?;
        user_name_from_option(option)
    }
}

/// Split `company - username` and return the trimmed username
pub fn user_name_from_option(option: &str) -> E2eResult<String> {
    option
        .split_once(" - ")
        .map(|(_, name)| name.trim().to_string())
        .ok_or_else(|| E2eError::parse("user option", option, "expected `company - username`"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    fn panel() -> (Arc<MockDriver>, Vec<Arc<MockElement>>) {
        let toggles: Vec<_> = (0..5)
            .map(|i| MockElement::new(format!("toggle{i}")).into_ref())
            .collect();
        let driver = MockDriver::new()
            .with_elements(By::class_name(FiltersPage::DROPDOWNS), toggles.clone())
            .with_elements(
                By::css(FiltersPage::OPTIONS),
                [
                    MockElement::new("o0").with_text("Nazeel - admin").into_ref(),
                    MockElement::new("o1").with_text(" Nazeel Hotels - Ahmed Ali ").into_ref(),
                ],
            );
        (Arc::new(driver), toggles)
    }

    #[tokio::test]
    async fn test_choose_opens_the_right_dropdown() {
        let (driver, toggles) = panel();
        let mut filters = FiltersPage::new(driver);
        filters.choose(FilterDropdown::User, 1).await.unwrap();
        assert_eq!(toggles[4].call_count("click"), 1);
        assert_eq!(toggles[0].call_count("click"), 0);
        assert_eq!(filters.selected(FilterDropdown::User), Some("Nazeel Hotels - Ahmed Ali"));
        assert_eq!(filters.selected_user_name().unwrap(), "Ahmed Ali");
        assert_eq!(filters.selected(FilterDropdown::Status), None);
    }

    #[tokio::test]
    async fn test_options_shown() {
        let (driver, _) = panel();
        assert!(FiltersPage::new(driver).is_options_shown().await.unwrap());
        let hidden = Arc::new(MockDriver::new().with_element(
            By::css(FiltersPage::OPTIONS),
            MockElement::new("o").with_displayed(false).into_ref(),
        ));
        assert!(!FiltersPage::new(hidden).is_options_shown().await.unwrap());
    }

    #[test]
    fn test_user_name_from_option() {
        assert_eq!(user_name_from_option("A - B - C").unwrap(), "B - C");
        assert!(user_name_from_option("admin").is_err());
    }

    #[tokio::test]
    async fn test_selected_user_name_requires_selection() {
        let (driver, _) = panel();
        assert!(FiltersPage::new(driver).selected_user_name().is_err());
    }
}
