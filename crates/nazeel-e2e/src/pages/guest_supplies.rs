//! Create-supplies-order form.
//!
//! The page remembers the option texts it clicked so a suite can build the
//! expected [`Order`](crate::model::Order) without reading the form back.

use super::{is_opaque, nth, nth_in, PageObject};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use crate::wait::{wait_for_count, Waits};
use async_trait::async_trait;

/// Maximum comment length accepted by the form
pub const MAX_COMMENT_LEN: usize = 400;

/// Create supplies order form
#[derive(Debug, Clone)]
pub struct GuestSuppliesPage {
    driver: DriverRef,
    selected_category: Option<String>,
    selected_supply: Option<String>,
    selected_unit_types: Vec<String>,
    selected_unit_numbers: Vec<String>,
}

impl GuestSuppliesPage {
    /// URL path
    pub const PATH: &'static str = "guest-supplies/create-supplies-order";
    /// Category combobox
    pub const CATEGORY: &'static str = "kendo-combobox[name='category']>span>span";
    /// Supply combobox
    pub const SUPPLY: &'static str = "kendo-combobox[name='supply']>span>span";
    /// Options of whichever dropdown is open
    pub const OPTIONS: &'static str = "div>ul>li[role='option']";
    /// Quantity input
    pub const QUANTITY: &'static str = "input[placeholder='Quantity']";
    /// Unit types multiselect
    pub const UNIT_TYPES: &'static str = "kendo-multiselect[name='unitType']";
    /// Unit numbers multiselect
    pub const UNIT_NUMBERS: &'static str = "kendo-multiselect[name='unitNumber']";
    /// Append button
    pub const APPEND: &'static str = "n-button--primary";
    /// Appended supply rows
    pub const APPENDED_ROWS: &'static str = "tbody>tr[role='row']";
    /// Edit and delete buttons of an appended row, in that order
    pub const ROW_ACTIONS: &'static str = "td button";
    /// Quantity-per-unit column of the appended rows
    pub const QUANTITY_CELLS: &'static str = "tbody[role='presentation']>tr>td:nth-child(3)";
    /// Total column of the appended rows
    pub const TOTAL_CELLS: &'static str = "tbody[role='presentation']>tr>td:nth-child(6)";
    /// Create accomplished order
    pub const CREATE_ACCOMPLISHED: &'static str = ".popup__btn.popup__btn--blue.h-35.d-flex.flex-row-reverse";
    /// Create proposed order
    pub const CREATE_PROPOSED: &'static str = "//button[contains(normalize-space(.),'Proposed')]";
    /// Discard the whole order
    pub const DISCARD: &'static str = ".n-button.n-button--danger-border.margin-inline";
    /// Reset the entry form
    pub const CANCEL: &'static str = "//button[contains(normalize-space(.),'Cancel')]";
    /// Comment textarea
    pub const COMMENT: &'static str = "div>textarea.dropdown-toggle";
    /// Clear buttons of filled inputs
    pub const CLEAR_BUTTONS: &'static str = "span[role='button']";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self {
            driver,
            selected_category: None,
            selected_supply: None,
            selected_unit_types: Vec::new(),
            selected_unit_numbers: Vec::new(),
        }
    }

    async fn click(&self, by: By) -> E2eResult<()> {
        self.driver.find_element(&by).await?.click().await
    }

    /// Click the `index`-th option of the open dropdown, returning its text
    async fn pick_option(&self, index: usize) -> E2eResult<String> {
        let by = By::css(Self::OPTIONS);
        let options = wait_for_count(self.driver.as_ref(), &by, index + 1, Waits::UntilDisplayed.options()).await?;
        let option = options.into_iter().nth(index).ok_or_else(|| E2eError::NoSuchElement {
            locator: format!("{by} [{index}]"),
        })?;
        let text = option.text().await?.trim().to_string();
        option.click().await?;
        Ok(text)
    }

    // ------------------------------------------------------------------
    // Form entry
    // ------------------------------------------------------------------

    /// Open the category dropdown
    pub async fn click_category_dropdown(&mut self) -> E2eResult<&mut Self> {
        self.click(By::css(Self::CATEGORY)).await?;
        Ok(self)
    }

    /// Pick a category
    pub async fn select_category_option(&mut self, index: usize) -> E2eResult<&mut Self> {
        self.selected_category = Some(self.pick_option(index).await?);
        Ok(self)
    }

    /// Open the supply dropdown
    pub async fn click_supply_dropdown(&mut self) -> E2eResult<&mut Self> {
        self.click(By::css(Self::SUPPLY)).await?;
        Ok(self)
    }

    /// Pick a supply
    pub async fn select_supply_option(&mut self, index: usize) -> E2eResult<&mut Self> {
        self.selected_supply = Some(self.pick_option(index).await?);
        Ok(self)
    }

    /// Type into the quantity input
    pub async fn insert_quantity(&mut self, quantity: &str) -> E2eResult<&mut Self> {
        self.driver
            .find_element(&By::css(Self::QUANTITY))
            .await?
            .send_keys(quantity)
            .await?;
        Ok(self)
    }

    /// Open the unit types multiselect
    pub async fn click_unit_types(&mut self) -> E2eResult<&mut Self> {
        self.click(By::css(Self::UNIT_TYPES)).await?;
        Ok(self)
    }

    /// Pick exactly one unit type
    pub async fn select_single_unit_type(&mut self, index: usize) -> E2eResult<&mut Self> {
        let text = self.pick_option(index).await?;
        self.selected_unit_types = vec![text];
        Ok(self)
    }

    /// Open the unit numbers multiselect
    pub async fn click_unit_numbers(&mut self) -> E2eResult<&mut Self> {
        self.click(By::css(Self::UNIT_NUMBERS)).await?;
        Ok(self)
    }

    /// Pick exactly one unit number
    pub async fn select_single_unit_number(&mut self, index: usize) -> E2eResult<&mut Self> {
        let text = self.pick_option(index).await?;
        self.selected_unit_numbers = vec![text];
        Ok(self)
    }

    /// Add another unit number to the selection
    pub async fn add_unit_number(&mut self, index: usize) -> E2eResult<&mut Self> {
        let text = self.pick_option(index).await?;
        self.selected_unit_numbers.push(text);
        Ok(self)
    }

    /// Append the entry to the order
    pub async fn click_append(&mut self) -> E2eResult<&mut Self> {
        self.click(By::class_name(Self::APPEND)).await?;
        Ok(self)
    }

    /// Type into the comment textarea
    pub async fn insert_comment(&mut self, comment: &str) -> E2eResult<&mut Self> {
        self.driver
            .find_element(&By::css(Self::COMMENT))
            .await?
            .send_keys(comment)
            .await?;
        Ok(self)
    }

    /// Reset the entry form
    pub async fn click_cancel(&mut self) -> E2eResult<&mut Self> {
        self.click(By::xpath(Self::CANCEL)).await?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Appended rows and submission
    // ------------------------------------------------------------------

    /// Move the `index`-th appended row back into the form
    pub async fn edit_appended_supply(&mut self, index: usize) -> E2eResult<&mut Self> {
        let row = nth(self.driver.as_ref(), &By::css(Self::APPENDED_ROWS), index).await?;
        nth_in(row.as_ref(), &By::css(Self::ROW_ACTIONS), 0).await?.click().await?;
        Ok(self)
    }

    /// Remove the `index`-th appended row
    pub async fn delete_appended_supply(&mut self, index: usize) -> E2eResult<&mut Self> {
        let row = nth(self.driver.as_ref(), &By::css(Self::APPENDED_ROWS), index).await?;
        nth_in(row.as_ref(), &By::css(Self::ROW_ACTIONS), 1).await?.click().await?;
        Ok(self)
    }

    /// Submit as accomplished
    pub async fn click_create_accomplished(&self) -> E2eResult<&Self> {
        self.click(By::css(Self::CREATE_ACCOMPLISHED)).await?;
        Ok(self)
    }

    /// Submit as proposed
    pub async fn click_create_proposed(&self) -> E2eResult<&Self> {
        self.click(By::xpath(Self::CREATE_PROPOSED)).await?;
        Ok(self)
    }

    /// Abandon the order and return to the listing
    pub async fn click_discard(&self) -> E2eResult<&Self> {
        self.click(By::css(Self::DISCARD)).await?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the category combobox is rendered and fully faded in
    pub async fn is_category_dropdown_shown(&self) -> E2eResult<bool> {
        match self.driver.find_element(&By::css(Self::CATEGORY)).await {
            Ok(dropdown) => is_opaque(dropdown.as_ref()).await,
            Err(err) if err.is_transient() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether the open dropdown's options are fully faded in
    pub async fn are_options_shown(&self) -> E2eResult<bool> {
        match self.driver.find_elements(&By::css(Self::OPTIONS)).await?.first() {
            Some(first) => is_opaque(first.as_ref()).await,
            None => Ok(false),
        }
    }

    /// Number of appended rows
    pub async fn appended_rows_count(&self) -> E2eResult<usize> {
        Ok(self.driver.find_elements(&By::css(Self::APPENDED_ROWS)).await?.len())
    }

    /// Quantity-per-unit text of every appended row
    pub async fn appended_quantities(&self) -> E2eResult<Vec<String>> {
        let mut quantities = Vec::new();
        for cell in self.driver.find_elements(&By::css(Self::QUANTITY_CELLS)).await? {
            quantities.push(cell.text().await?.trim().to_string());
        }
        Ok(quantities)
    }

    /// Quantity-per-unit text of the `index`-th appended row
    pub async fn quantity_at(&self, index: usize) -> E2eResult<String> {
        let cell = nth(self.driver.as_ref(), &By::css(Self::QUANTITY_CELLS), index).await?;
        Ok(cell.text().await?.trim().to_string())
    }

    /// Displayed total of the `index`-th appended row
    pub async fn total_at(&self, index: usize) -> E2eResult<u32> {
        let cell = nth(self.driver.as_ref(), &By::css(Self::TOTAL_CELLS), index).await?;
        let text = cell.text().await?;
        text.trim()
            .parse()
            .map_err(|e| E2eError::parse("row total", text.trim(), e))
    }

    /// Characters currently held by the comment textarea
    pub async fn comment_length(&self) -> E2eResult<usize> {
        let comment = self.driver.find_element(&By::css(Self::COMMENT)).await?;
        Ok(comment
            .attribute("value")
            .await?
            .map_or(0, |value| value.chars().count()))
    }

    /// Number of visible clear buttons (one per filled input)
    pub async fn clear_buttons_count(&self) -> E2eResult<usize> {
        Ok(self.driver.find_elements(&By::css(Self::CLEAR_BUTTONS)).await?.len())
    }

    /// Last picked category
    #[must_use]
    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Last picked supply
    #[must_use]
    pub fn selected_supply(&self) -> Option<&str> {
        self.selected_supply.as_deref()
    }

    /// Picked unit types
    #[must_use]
    pub fn selected_unit_types(&self) -> &[String] {
        &self.selected_unit_types
    }

    /// Picked unit numbers
    #[must_use]
    pub fn selected_unit_numbers(&self) -> &[String] {
        &self.selected_unit_numbers
    }
}

#[async_trait]
impl PageObject for GuestSuppliesPage {
    fn page_name(&self) -> &'static str {
        "guest supplies"
    }

    fn path(&self) -> &'static str {
        Self::PATH
    }

    async fn is_loaded(&self) -> E2eResult<bool> {
        self.is_category_dropdown_shown().await
    }
}
