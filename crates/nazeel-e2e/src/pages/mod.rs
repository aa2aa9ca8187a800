//! Page Object Model
//!
//! One type per application screen. Every page holds the session's decorated
//! [`DriverRef`](crate::driver::DriverRef), so clicks and typing inherit the settle delay and retries.
//! Actions chain through `E2eResult<&Self>`; pages that remember what was
//! picked (option texts) take `&mut self` for those actions.

mod dashboard;
mod filters;
mod guest_supplies;
mod login;
mod page_base;
mod supplies_order;
mod supplies_unit_usages;
mod view;

pub use dashboard::DashboardPage;
pub use filters::{FilterDropdown, FiltersPage};
pub use guest_supplies::{GuestSuppliesPage, MAX_COMMENT_LEN};
pub use login::LoginPage;
pub use page_base::{ItemCell, PageBase, PrintStatus};
pub use supplies_order::{SuppliesColumn, SuppliesItemColumn, SuppliesOrderPage};
pub use supplies_unit_usages::{FormMode, SuppliesUnitUsagesPage, EXPECTED_SAVE_TOAST};
pub use view::ViewPage;

use crate::driver::{Driver, Element, ElementRef};
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;

/// A page reachable by URL.
///
/// ```ignore
/// let page = GuestSuppliesPage::new(session.driver());
/// session.open_page(&page).await?;
/// assert!(page.is_loaded().await?);
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Name used in logs
    fn page_name(&self) -> &'static str;

    /// Path below the application root, without a leading slash
    fn path(&self) -> &'static str;

    /// Absolute URL under `base_url` (which ends with `/`)
    fn url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.path())
    }

    /// Whether the page's anchor element is ready for interaction
    async fn is_loaded(&self) -> E2eResult<bool>;
}

// ============================================================================
// Shared lookups
// ============================================================================

fn out_of_range(by: &By, index: usize) -> E2eError {
    E2eError::NoSuchElement {
        locator: format!("{by} [{index}]"),
    }
}

/// The `index`-th match of `by` in the document
pub(crate) async fn nth(driver: &dyn Driver, by: &By, index: usize) -> E2eResult<ElementRef> {
    driver
        .find_elements(by)
        .await?
        .into_iter()
        .nth(index)
        .ok_or_else(|| out_of_range(by, index))
}

/// The `index`-th match of `by` below `parent`
pub(crate) async fn nth_in(parent: &dyn Element, by: &By, index: usize) -> E2eResult<ElementRef> {
    parent
        .find_elements(by)
        .await?
        .into_iter()
        .nth(index)
        .ok_or_else(|| out_of_range(by, index))
}

/// Displayed state of an element; missing or detached counts as hidden
pub(crate) async fn displayed(element: &dyn Element) -> E2eResult<bool> {
    match element.is_displayed().await {
        Ok(shown) => Ok(shown),
        Err(err) if err.is_transient() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Whether the first match of `by` is displayed
pub(crate) async fn is_shown(driver: &dyn Driver, by: &By) -> E2eResult<bool> {
    match driver.find_element(by).await {
        Ok(el) => displayed(el.as_ref()).await,
        Err(err) if err.is_transient() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Whether the element is displayed and fully opaque
pub(crate) async fn is_opaque(element: &dyn Element) -> E2eResult<bool> {
    if !displayed(element).await? {
        return Ok(false);
    }
    match element.css_value("opacity").await {
        Ok(opacity) => Ok(opacity == "1"),
        Err(err) if err.is_transient() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Texts of every cell below `row`
pub(crate) async fn cell_texts(row: &dyn Element, cells: &By) -> E2eResult<Vec<String>> {
    let mut texts = Vec::new();
    for cell in row.find_elements(cells).await? {
        texts.push(cell.text().await?.trim().to_string());
    }
    Ok(texts)
}

/// Click the first option whose text contains `text`, ignoring case.
/// Returns the option's text.
pub(crate) async fn select_by_text(driver: &dyn Driver, options: &By, text: &str) -> E2eResult<String> {
    let needle = text.to_lowercase();
    for option in driver.find_elements(options).await? {
        let label = option.text().await?;
        if label.to_lowercase().contains(&needle) {
            option.click().await?;
            return Ok(label.trim().to_string());
        }
    }
    Err(E2eError::NoSuchElement {
        locator: format!("{options} containing {text:?}"),
    })
}

/// Parse a non-negative count shown in a grid cell
pub(crate) fn parse_count(what: &'static str, text: &str) -> E2eResult<u32> {
    text.trim()
        .parse()
        .map_err(|e| E2eError::parse(what, text, e))
}

/// Cell at `index`, or a parse error naming the row shape
pub(crate) fn cell<'a>(cells: &'a [String], index: usize, what: &'static str) -> E2eResult<&'a str> {
    cells.get(index).map(String::as_str).ok_or_else(|| {
        E2eError::parse(what, cells.join(" | "), format!("row has no cell {index}"))
    })
}
