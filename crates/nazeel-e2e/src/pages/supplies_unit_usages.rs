//! Setup > Supplies > Supplies Unit Usages.
//!
//! Each record ties a unit type to a supply with daily and weekly
//! quantities. The form is a Kendo dialog whose comboboxes sit one row
//! lower when editing, hence [`FormMode`].

use super::{select_by_text, PageObject};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::time::Duration;

/// Toast shown after a successful save
pub const EXPECTED_SAVE_TOAST: &str = "Saved Successfully";

const SHORT_SETTLE: Duration = Duration::from_secs(1);
const LIST_SETTLE: Duration = Duration::from_secs(2);
const QUANTITY_SETTLE: Duration = Duration::from_secs(3);

/// Which layout the record form is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// New record dialog
    #[default]
    Add,
    /// Editing an existing record
    Edit,
}

/// Supplies unit usages listing and its add/edit dialog
#[derive(Debug, Clone)]
pub struct SuppliesUnitUsagesPage {
    driver: DriverRef,
}

impl SuppliesUnitUsagesPage {
    pub const PATH: &'static str = "setup/supplies-unit-usages";

    pub const ADD_NEW: &'static str = "//div[2]/div/button";
    pub const UNIT_TYPE_SEARCH: &'static str = "//div/kendo-searchbar/input";
    pub const UNIT_TYPE_OPTIONS: &'static str = "//li/label";
    pub const CATEGORY: &'static str = "//div[3]/div/kendo-combobox/span/span";
    pub const CATEGORY_EDIT: &'static str = "//div[4]/div/kendo-combobox/span/span/span";
    pub const SUPPLY: &'static str = "//div[3]/div[2]/kendo-combobox/span/span/span";
    pub const SUPPLY_EDIT: &'static str = "//div[4]/div[2]/kendo-combobox/span/span/span";
    /// Category and supply options
    pub const LIST_OPTIONS: &'static str = "//kendo-list/div/ul/li";
    pub const DAILY_QUANTITY: &'static str = "dailyQuentityCriteria";
    pub const WEEKLY_QUANTITY: &'static str = "weeklyQuentityCriteria";
    pub const APPEND: &'static str = "//div[5]/button";
    pub const SAVE: &'static str = "//kendo-dialog-actions/button[2]";

    pub const FILTER: &'static str = "//button[2]";
    pub const FILTER_UNIT_TYPE: &'static str = "//div[2]/kendo-combobox/span/span/span";
    pub const FILTER_OPTIONS: &'static str = "//li";
    pub const SEARCH: &'static str = "//div[4]/div/button";

    /// Unit type column of the grid
    pub const GRID_UNIT_TYPES: &'static str = "//tr/td[2]";
    pub const EDIT: &'static str = "//tr[1]/td[7]/div/div/button";
    pub const DELETE: &'static str = "//tr/td[5]/div/div/button";
    pub const CONFIRM_DELETE: &'static str = "//div/div[3]/button";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self { driver }
    }

    async fn click(&self, by: &By) -> E2eResult<()> {
        self.driver.find_element(by).await?.click().await
    }

    /// Open the new record dialog
    pub async fn click_add_new(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::ADD_NEW)).await?;
        Ok(self)
    }

    /// Tick the unit type whose label contains `unit_type`, then move
    /// focus to the daily quantity field to close the list
    pub async fn select_unit_type(&self, unit_type: &str) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::UNIT_TYPE_SEARCH)).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        select_by_text(self.driver.as_ref(), &By::xpath(Self::UNIT_TYPE_OPTIONS), unit_type).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        self.click(&By::name(Self::DAILY_QUANTITY)).await?;
        Ok(self)
    }

    /// Pick a supply category
    pub async fn select_category(&self, category: &str, mode: FormMode) -> E2eResult<&Self> {
        let combo = match mode {
            FormMode::Add => Self::CATEGORY,
            FormMode::Edit => Self::CATEGORY_EDIT,
        };
        self.click(&By::xpath(combo)).await?;
        tokio::time::sleep(LIST_SETTLE).await;
        select_by_text(self.driver.as_ref(), &By::xpath(Self::LIST_OPTIONS), category).await?;
        Ok(self)
    }

    /// Pick a supply of the chosen category
    pub async fn select_supply(&self, supply: &str, mode: FormMode) -> E2eResult<&Self> {
        let combo = match mode {
            FormMode::Add => Self::SUPPLY,
            FormMode::Edit => Self::SUPPLY_EDIT,
        };
        self.click(&By::xpath(combo)).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        select_by_text(self.driver.as_ref(), &By::xpath(Self::LIST_OPTIONS), supply).await?;
        Ok(self)
    }

    /// Type the daily and weekly quantity criteria
    pub async fn enter_quantities(&self, daily: &str, weekly: &str) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::name(Self::DAILY_QUANTITY))
            .await?
            .send_keys(daily)
            .await?;
        tokio::time::sleep(QUANTITY_SETTLE).await;
        self.driver
            .find_element(&By::name(Self::WEEKLY_QUANTITY))
            .await?
            .send_keys(weekly)
            .await?;
        Ok(self)
    }

    /// Add the filled line to the dialog's list
    pub async fn append(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::APPEND)).await?;
        Ok(self)
    }

    /// Save the dialog
    pub async fn save(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::SAVE)).await?;
        Ok(self)
    }

    /// Open the filter panel
    pub async fn click_filter(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::FILTER)).await?;
        Ok(self)
    }

    /// Choose `unit_type` in the filter panel
    pub async fn filter_by_unit_type(&self, unit_type: &str) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::FILTER_UNIT_TYPE)).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        select_by_text(self.driver.as_ref(), &By::xpath(Self::FILTER_OPTIONS), unit_type).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        Ok(self)
    }

    /// Apply the filter
    pub async fn click_search(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::SEARCH)).await?;
        Ok(self)
    }

    /// Unit type of every grid row
    pub async fn grid_unit_types(&self) -> E2eResult<Vec<String>> {
        let mut types = Vec::new();
        for cell in self.driver.find_elements(&By::xpath(Self::GRID_UNIT_TYPES)).await? {
            types.push(cell.text().await?.trim().to_string());
        }
        Ok(types)
    }

    /// Whether any grid row has `unit_type`
    pub async fn grid_contains(&self, unit_type: &str) -> E2eResult<bool> {
        Ok(self.grid_unit_types().await?.iter().any(|t| t == unit_type))
    }

    /// Fail unless the grid is non-empty and every row has `unit_type`
    pub async fn assert_grid_unit_types(&self, unit_type: &str) -> E2eResult<()> {
        let types = self.grid_unit_types().await?;
        if types.is_empty() {
            return Err(E2eError::assertion("Grid has no rows", unit_type, "no rows"));
        }
        match types.iter().find(|t| *t != unit_type) {
            Some(other) => Err(E2eError::assertion(
                "Grid row has a different unit type",
                unit_type,
                other,
            )),
            None => Ok(()),
        }
    }

    /// Open the first row for editing
    pub async fn click_edit(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::EDIT)).await?;
        Ok(self)
    }

    /// Delete the first usage line of the open record and confirm
    pub async fn delete_record(&self) -> E2eResult<&Self> {
        self.click(&By::xpath(Self::DELETE)).await?;
        tokio::time::sleep(SHORT_SETTLE).await;
        self.click(&By::xpath(Self::CONFIRM_DELETE)).await?;
        Ok(self)
    }
}

#[async_trait]
impl PageObject for SuppliesUnitUsagesPage {
    fn page_name(&self) -> &'static str {
        "supplies unit usages"
    }

    fn path(&self) -> &'static str {
        Self::PATH
    }

    async fn is_loaded(&self) -> E2eResult<bool> {
        super::is_shown(self.driver.as_ref(), &By::xpath(Self::ADD_NEW)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    fn options(labels: &[&str]) -> Vec<Arc<MockElement>> {
        labels
            .iter()
            .map(|l| MockElement::new(*l).with_text(*l).into_ref())
            .collect()
    }

    mod form {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_add_flow_fills_the_dialog() {
            let search = MockElement::new("search").into_ref();
            let daily = MockElement::new("daily").into_ref();
            let weekly = MockElement::new("weekly").into_ref();
            let category = MockElement::new("category").into_ref();
            let supply = MockElement::new("supply").into_ref();
            let types = options(&["Suite", "Room with Hall"]);
            let list = options(&["Meals", "meals_first"]);
            let driver = Arc::new(
                MockDriver::new()
                    .with_element(By::xpath(SuppliesUnitUsagesPage::UNIT_TYPE_SEARCH), search.clone())
                    .with_elements(By::xpath(SuppliesUnitUsagesPage::UNIT_TYPE_OPTIONS), types.clone())
                    .with_element(By::name(SuppliesUnitUsagesPage::DAILY_QUANTITY), daily.clone())
                    .with_element(By::name(SuppliesUnitUsagesPage::WEEKLY_QUANTITY), weekly.clone())
                    .with_element(By::xpath(SuppliesUnitUsagesPage::CATEGORY), category.clone())
                    .with_element(By::xpath(SuppliesUnitUsagesPage::SUPPLY), supply.clone())
                    .with_elements(By::xpath(SuppliesUnitUsagesPage::LIST_OPTIONS), list.clone()),
            );
            let page = SuppliesUnitUsagesPage::new(driver);
            page.select_unit_type("room with hall").await.unwrap();
            page.select_category("meals", FormMode::Add).await.unwrap();
            page.select_supply("meals_first", FormMode::Add).await.unwrap();
            page.enter_quantities("1", "2").await.unwrap();

            assert_eq!(search.call_count("click"), 1);
            assert_eq!(types[1].call_count("click"), 1);
            assert_eq!(types[0].call_count("click"), 0);
            assert_eq!(category.call_count("click"), 1);
            assert_eq!(supply.call_count("click"), 1);
            // "meals" matches the first option, "meals_first" only the second
            assert_eq!(list[0].call_count("click"), 1);
            assert_eq!(list[1].call_count("click"), 1);
            assert_eq!(daily.value(), "1");
            assert_eq!(weekly.value(), "2");
        }

        #[tokio::test(start_paused = true)]
        async fn test_edit_mode_uses_shifted_combobox() {
            let edit_category = MockElement::new("edit category").into_ref();
            let driver = Arc::new(
                MockDriver::new()
                    .with_element(By::xpath(SuppliesUnitUsagesPage::CATEGORY_EDIT), edit_category.clone())
                    .with_elements(By::xpath(SuppliesUnitUsagesPage::LIST_OPTIONS), options(&["meals"])),
            );
            let page = SuppliesUnitUsagesPage::new(driver);
            page.select_category("meals", FormMode::Edit).await.unwrap();
            assert_eq!(edit_category.call_count("click"), 1);
            assert!(page.select_category("meals", FormMode::Add).await.is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_option_is_no_such_element() {
            let driver = Arc::new(
                MockDriver::new()
                    .with_element(
                        By::xpath(SuppliesUnitUsagesPage::FILTER_UNIT_TYPE),
                        MockElement::new("combo").into_ref(),
                    )
                    .with_elements(By::xpath(SuppliesUnitUsagesPage::FILTER_OPTIONS), options(&["Suite"])),
            );
            let err = SuppliesUnitUsagesPage::new(driver)
                .filter_by_unit_type("Villa")
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::NoSuchElement { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_delete_record_confirms() {
            let delete = MockElement::new("delete").into_ref();
            let yes = MockElement::new("yes").into_ref();
            let driver = Arc::new(
                MockDriver::new()
                    .with_element(By::xpath(SuppliesUnitUsagesPage::DELETE), delete.clone())
                    .with_element(By::xpath(SuppliesUnitUsagesPage::CONFIRM_DELETE), yes.clone()),
            );
            SuppliesUnitUsagesPage::new(driver).delete_record().await.unwrap();
            assert_eq!(delete.call_count("click"), 1);
            assert_eq!(yes.call_count("click"), 1);
            assert!(delete.calls()[0].at < yes.calls()[0].at);
        }
    }

    mod grid {
        use super::*;

        fn grid(types: &[&str]) -> SuppliesUnitUsagesPage {
            SuppliesUnitUsagesPage::new(Arc::new(
                MockDriver::new().with_elements(By::xpath(SuppliesUnitUsagesPage::GRID_UNIT_TYPES), options(types)),
            ))
        }

        #[tokio::test]
        async fn test_every_row_matches() {
            let page = grid(&["Room with Hall", "Room with Hall"]);
            page.assert_grid_unit_types("Room with Hall").await.unwrap();
            assert!(page.grid_contains("Room with Hall").await.unwrap());
        }

        #[tokio::test]
        async fn test_mismatched_row_fails() {
            let page = grid(&["Room with Hall", "Suite"]);
            match page.assert_grid_unit_types("Room with Hall").await.unwrap_err() {
                E2eError::Assertion { actual, .. } => assert_eq!(actual, "Suite"),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_empty_grid_fails() {
            assert!(grid(&[]).assert_grid_unit_types("Suite").await.is_err());
            assert!(!grid(&[]).grid_contains("Suite").await.unwrap());
        }
    }
}
