//! Supplies order listing with its row actions.

use super::{cell, cell_texts, displayed, is_opaque, is_shown, nth, parse_count, PageObject};
use crate::driver::{DriverRef, ElementRef};
use crate::locator::By;
use crate::model::{split_list, Order, OrderItem, OrderStatus};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;

/// Columns of the orders grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppliesColumn {
    /// Order number
    OrderNo,
    /// Status label
    Status,
    /// Categories in the order
    Categories,
    /// Items summary
    Items,
    /// Creator display name
    CreatedBy,
    /// Creation date and time
    DateTime,
    /// Unit types in the order
    UnitTypes,
    /// Unit numbers in the order
    Units,
}

impl SuppliesColumn {
    /// Zero-based column index
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::OrderNo => 0,
            Self::Status => 1,
            Self::Categories => 2,
            Self::Items => 3,
            Self::CreatedBy => 4,
            Self::DateTime => 5,
            Self::UnitTypes => 6,
            Self::Units => 7,
        }
    }
}

/// Columns of an expanded order's item grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppliesItemColumn {
    /// Supply category
    Category,
    /// Supply name
    Supply,
    /// Quantity per unit
    QuantityPerUnit,
    /// Total quantity
    Total,
    /// Unit numbers
    Units,
}

impl SuppliesItemColumn {
    /// Zero-based column index
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Category => 0,
            Self::Supply => 1,
            Self::QuantityPerUnit => 2,
            Self::Total => 3,
            Self::Units => 4,
        }
    }
}

/// Supplies order listing
#[derive(Debug, Clone)]
pub struct SuppliesOrderPage {
    driver: DriverRef,
}

impl SuppliesOrderPage {
    /// URL path
    pub const PATH: &'static str = "guest-supplies/supplies-order";
    /// Grid rows
    pub const ROWS: &'static str = "tbody>tr";
    /// Cells of an order row
    pub const CELLS: &'static str = "td[role='gridcell']";
    /// Rows of an expanded order's item grid
    pub const ITEM_ROWS: &'static str =
        ".k-detail-cell>div>div>kendo-grid>div>kendo-grid-list>div>div>table>tbody>tr";
    /// Cells of an item row
    pub const ITEM_CELLS: &'static str = "td";
    /// View buttons, one per order
    pub const VIEW_BUTTONS: &'static str = "div.n-table-actions>button";
    /// Row action panels, one per order
    pub const ACTION_PANELS: &'static str = "div.n-table-actions";
    /// Edit button inside an action panel
    pub const EDIT_BUTTON: &'static str = "div>button";
    /// More-options toggles, one per order
    pub const MORE_OPTIONS: &'static str = ".n-table-actions>div:nth-child(3)";
    /// Print entry of the more-options popup
    pub const PRINT: &'static str = "kendo-popup>div>div>div:nth-child(1)";
    /// Cancel entry of the more-options popup
    pub const CANCEL: &'static str = "popup__item--red";
    /// Confirm button of the cancel dialog
    pub const CONFIRM_CANCEL: &'static str = "sweet-alert__button--danger-border";
    /// Checklist (0) and filter (1) buttons above the grid
    pub const HEADER_BUTTONS: &'static str = ".n-table__top-btns > button";
    /// Expand toggles of collapsed orders
    pub const EXPAND: &'static str = "k-plus";
    /// Collapse toggles of expanded orders
    pub const COLLAPSE: &'static str = "k-minus";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self { driver }
    }

    async fn click_nth(&self, by: By, index: usize) -> E2eResult<&Self> {
        nth(self.driver.as_ref(), &by, index).await?.click().await?;
        Ok(self)
    }

    async fn rows(&self) -> E2eResult<Vec<Vec<String>>> {
        let cells = By::css(Self::CELLS);
        let mut rows = Vec::new();
        for row in self.driver.find_elements(&By::css(Self::ROWS)).await? {
            rows.push(cell_texts(row.as_ref(), &cells).await?);
        }
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Grid reads
    // ------------------------------------------------------------------

    /// Text of `column` for every order row.
    ///
    /// Detail rows of expanded orders have no grid cells and are skipped.
    pub async fn supplies_values(&self, column: SuppliesColumn) -> E2eResult<Vec<String>> {
        Ok(self
            .rows()
            .await?
            .into_iter()
            .filter_map(|mut cells| {
                (column.index() < cells.len()).then(|| cells.swap_remove(column.index()))
            })
            .collect())
    }

    /// Every order row as an [`Order`] (number, status, creator, timestamp)
    pub async fn requested_orders(&self) -> E2eResult<Vec<Order>> {
        let mut orders = Vec::new();
        for cells in self.rows().await? {
            if cells.len() <= SuppliesColumn::DateTime.index() {
                continue;
            }
            let status: OrderStatus = cell(&cells, SuppliesColumn::Status.index(), "order row")?.parse()?;
            let order = Order::new()
                .with_order_no(cell(&cells, SuppliesColumn::OrderNo.index(), "order row")?)
                .with_status(status)
                .with_created_by(cell(&cells, SuppliesColumn::CreatedBy.index(), "order row")?)
                .with_created_at_text(cell(&cells, SuppliesColumn::DateTime.index(), "order row")?)?;
            orders.push(order);
        }
        Ok(orders)
    }

    /// Order with the given number
    pub async fn order_by_order_no(&self, order_no: &str) -> E2eResult<Option<Order>> {
        Ok(self
            .requested_orders()
            .await?
            .into_iter()
            .find(|order| order.order_no == order_no))
    }

    /// Position of the first order with `status`
    pub async fn order_index_by_status(&self, status: OrderStatus) -> E2eResult<Option<usize>> {
        Ok(self
            .requested_orders()
            .await?
            .iter()
            .position(|order| order.status == Some(status)))
    }

    /// Order at `index`
    pub async fn order_by_index(&self, index: usize) -> E2eResult<Order> {
        self.requested_orders()
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: format!("{} [{index}]", Self::ROWS),
            })
    }

    /// Order whose timestamp renders as `date_time` (`dd/MM/yyyy hh:mm a`)
    pub async fn order_by_created_date_time(&self, date_time: &str) -> E2eResult<Option<Order>> {
        Ok(self
            .requested_orders()
            .await?
            .into_iter()
            .find(|order| order.created_at_text().as_deref() == Some(date_time)))
    }

    /// Items of every expanded order
    pub async fn requested_items(&self) -> E2eResult<Vec<OrderItem>> {
        let cells = By::css(Self::ITEM_CELLS);
        let mut items = Vec::new();
        for row in self.driver.find_elements(&By::css(Self::ITEM_ROWS)).await? {
            let texts = cell_texts(row.as_ref(), &cells).await?;
            let at = |column: SuppliesItemColumn| cell(&texts, column.index(), "item row");
            let quantity = parse_count("quantity", at(SuppliesItemColumn::QuantityPerUnit)?)?;
            let total = parse_count("total", at(SuppliesItemColumn::Total)?)?;
            let item = OrderItem::new(
                at(SuppliesItemColumn::Category)?,
                at(SuppliesItemColumn::Supply)?,
                quantity,
                Vec::new(),
                split_list(at(SuppliesItemColumn::Units)?),
            )
            .with_displayed_total(total);
            items.push(item);
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Row actions
    // ------------------------------------------------------------------

    /// Open the view page of the `index`-th order
    pub async fn click_view(&self, index: usize) -> E2eResult<&Self> {
        self.click_nth(By::css(Self::VIEW_BUTTONS), index).await
    }

    async fn edit_button(&self, index: usize) -> E2eResult<ElementRef> {
        let panel = nth(self.driver.as_ref(), &By::css(Self::ACTION_PANELS), index).await?;
        panel.find_element(&By::css(Self::EDIT_BUTTON)).await
    }

    /// Open the edit page of the `index`-th order
    pub async fn click_edit(&self, index: usize) -> E2eResult<&Self> {
        self.edit_button(index).await?.click().await?;
        Ok(self)
    }

    /// Whether the `index`-th order offers a visible, opaque edit button
    pub async fn is_edit_displayed(&self, index: usize) -> E2eResult<bool> {
        match self.edit_button(index).await {
            Ok(edit) => is_opaque(edit.as_ref()).await,
            Err(err) if err.is_transient() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Expand the `index`-th collapsed order
    pub async fn expand_order(&self, index: usize) -> E2eResult<&Self> {
        self.click_nth(By::class_name(Self::EXPAND), index).await
    }

    /// Collapse the `index`-th expanded order
    pub async fn collapse_order(&self, index: usize) -> E2eResult<&Self> {
        self.click_nth(By::class_name(Self::COLLAPSE), index).await
    }

    /// Open the more-options popup of the `index`-th order
    pub async fn click_more_options(&self, index: usize) -> E2eResult<&Self> {
        self.click_nth(By::css(Self::MORE_OPTIONS), index).await
    }

    /// Print from the open popup
    pub async fn click_print(&self) -> E2eResult<&Self> {
        self.click_nth(By::css(Self::PRINT), 0).await
    }

    /// Cancel from the open popup
    pub async fn click_cancel(&self) -> E2eResult<&Self> {
        self.click_nth(By::class_name(Self::CANCEL), 0).await
    }

    /// Confirm the cancel dialog
    pub async fn confirm_cancel(&self) -> E2eResult<&Self> {
        self.click_nth(By::class_name(Self::CONFIRM_CANCEL), 0).await
    }

    /// Whether the popup offers print
    pub async fn is_print_displayed(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::css(Self::PRINT)).await
    }

    /// Whether the popup offers cancel
    pub async fn is_cancel_displayed(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::class_name(Self::CANCEL)).await
    }

    /// Whether the cancel dialog is open
    pub async fn is_confirm_cancel_displayed(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::class_name(Self::CONFIRM_CANCEL)).await
    }

    // ------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------

    /// Open the orders checklist report
    pub async fn click_checklist(&self) -> E2eResult<&Self> {
        self.click_nth(By::css(Self::HEADER_BUTTONS), 0).await
    }

    /// Open the filter panel
    pub async fn click_filter(&self) -> E2eResult<&Self> {
        self.click_nth(By::css(Self::HEADER_BUTTONS), 1).await
    }
}

#[async_trait]
impl PageObject for SuppliesOrderPage {
    fn page_name(&self) -> &'static str {
        "supplies orders"
    }

    fn path(&self) -> &'static str {
        Self::PATH
    }

    async fn is_loaded(&self) -> E2eResult<bool> {
        let buttons = self.driver.find_elements(&By::css(Self::HEADER_BUTTONS)).await?;
        match buttons.get(1) {
            Some(filter) => displayed(filter.as_ref()).await,
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    fn order_row(no: &str, status: &str, by: &str, at: &str) -> Arc<MockElement> {
        let cells = [no, status, "Bathroom", "1", by, at, "Suite", "101"]
            .into_iter()
            .map(|t| MockElement::new("td").with_text(t).into_ref());
        MockElement::new("tr")
            .with_children(By::css(SuppliesOrderPage::CELLS), cells)
            .into_ref()
    }

    fn listing() -> Arc<MockDriver> {
        Arc::new(MockDriver::new().with_elements(
            By::css(SuppliesOrderPage::ROWS),
            [
                order_row("1043", "Accomplished", "Ahmed Ali", "16/04/2025 02:27 PM"),
                // detail row of an expanded order
                MockElement::new("detail").into_ref(),
                order_row("1042", "Proposed", "Ahmed Ali", "15/04/2025 09:05 AM"),
                order_row("1041", "Cancelled", "Sara", "14/04/2025 11:40 AM"),
            ],
        ))
    }

    mod grid {
        use super::*;

        #[tokio::test]
        async fn test_requested_orders_skips_detail_rows() {
            let page = SuppliesOrderPage::new(listing());
            let orders = page.requested_orders().await.unwrap();
            assert_eq!(orders.len(), 3);
            assert_eq!(orders[1].status, Some(OrderStatus::Proposed));
            assert_eq!(
                orders[0].created_at_text().as_deref(),
                Some("16/04/2025 02:27 PM")
            );
        }

        #[tokio::test]
        async fn test_supplies_values_by_column() {
            let page = SuppliesOrderPage::new(listing());
            assert_eq!(
                page.supplies_values(SuppliesColumn::CreatedBy).await.unwrap(),
                vec!["Ahmed Ali", "Ahmed Ali", "Sara"]
            );
        }

        #[tokio::test]
        async fn test_lookups() {
            let page = SuppliesOrderPage::new(listing());
            assert_eq!(
                page.order_index_by_status(OrderStatus::Cancelled).await.unwrap(),
                Some(2)
            );
            assert!(page.order_by_order_no("1042").await.unwrap().is_some());
            assert!(page.order_by_order_no("9999").await.unwrap().is_none());
            assert_eq!(
                page.order_by_created_date_time("15/04/2025 09:05 AM")
                    .await
                    .unwrap()
                    .unwrap()
                    .order_no,
                "1042"
            );
            assert_eq!(page.order_by_index(0).await.unwrap().order_no, "1043");
            assert!(page.order_by_index(7).await.is_err());
        }

        #[tokio::test]
        async fn test_unknown_status_is_parse_error() {
            let driver = Arc::new(MockDriver::new().with_element(
                By::css(SuppliesOrderPage::ROWS),
                order_row("1", "Pending", "x", "16/04/2025 02:27 PM"),
            ));
            assert!(matches!(
                SuppliesOrderPage::new(driver).requested_orders().await,
                Err(E2eError::Parse { .. })
            ));
        }

        #[tokio::test]
        async fn test_requested_items_of_expanded_orders() {
            let cells = ["Bathroom", "Soap", "3", "6", "101, 102"]
                .into_iter()
                .map(|t| MockElement::new("td").with_text(t).into_ref());
            let row = MockElement::new("item")
                .with_children(By::css(SuppliesOrderPage::ITEM_CELLS), cells)
                .into_ref();
            let driver = Arc::new(MockDriver::new().with_element(By::css(SuppliesOrderPage::ITEM_ROWS), row));
            let items = SuppliesOrderPage::new(driver).requested_items().await.unwrap();
            assert_eq!(items[0].supply, "Soap");
            assert_eq!(items[0].total, 6);
            assert!(items[0].is_total_consistent());
        }
    }

    mod actions {
        use super::*;

        #[tokio::test]
        async fn test_edit_button_visibility() {
            let edit = MockElement::new("edit").with_css("opacity", "1").into_ref();
            let panels = [
                MockElement::new("panel0").into_ref(),
                MockElement::new("panel1")
                    .with_child(By::css(SuppliesOrderPage::EDIT_BUTTON), edit.clone())
                    .into_ref(),
            ];
            let driver = Arc::new(MockDriver::new().with_elements(By::css(SuppliesOrderPage::ACTION_PANELS), panels));
            let page = SuppliesOrderPage::new(driver);
            assert!(!page.is_edit_displayed(0).await.unwrap());
            assert!(page.is_edit_displayed(1).await.unwrap());
            assert!(!page.is_edit_displayed(5).await.unwrap());
            page.click_edit(1).await.unwrap();
            assert_eq!(edit.call_count("click"), 1);
        }

        #[tokio::test]
        async fn test_header_buttons_by_position() {
            let checklist = MockElement::new("checklist").into_ref();
            let filter = MockElement::new("filter").into_ref();
            let driver = Arc::new(MockDriver::new().with_elements(
                By::css(SuppliesOrderPage::HEADER_BUTTONS),
                [checklist.clone(), filter.clone()],
            ));
            let page = SuppliesOrderPage::new(driver);
            assert!(page.is_loaded().await.unwrap());
            page.click_filter().await.unwrap();
            page.click_checklist().await.unwrap();
            assert_eq!(filter.call_count("click"), 1);
            assert_eq!(checklist.call_count("click"), 1);
        }

        #[tokio::test]
        async fn test_expand_past_last_is_no_such_element() {
            let driver = Arc::new(MockDriver::new().with_element(
                By::class_name(SuppliesOrderPage::EXPAND),
                MockElement::new("plus").into_ref(),
            ));
            let page = SuppliesOrderPage::new(driver);
            page.expand_order(0).await.unwrap();
            assert!(matches!(
                page.expand_order(1).await,
                Err(E2eError::NoSuchElement { .. })
            ));
        }

        #[tokio::test]
        async fn test_cancel_flow_visibility() {
            let driver = Arc::new(MockDriver::new().with_element(
                By::css(SuppliesOrderPage::PRINT),
                MockElement::new("print").into_ref(),
            ));
            let page = SuppliesOrderPage::new(driver);
            assert!(page.is_print_displayed().await.unwrap());
            assert!(!page.is_cancel_displayed().await.unwrap());
            assert!(!page.is_confirm_cancel_displayed().await.unwrap());
        }
    }
}
