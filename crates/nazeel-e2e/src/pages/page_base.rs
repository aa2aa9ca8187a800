//! Components shared by every screen: toasts, the page loader, the order
//! items grid and the print preview iframe.

use super::{cell, cell_texts, is_shown, parse_count};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::model::{split_list, OrderItem};
use crate::result::{E2eError, E2eResult};
use crate::wait::{self, poll, wait_for_displayed, WaitOptions, Waits, PAGE_LOADER};

/// Column positions in the order items grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCell {
    /// Supply category
    Category,
    /// Supply name
    Supply,
    /// Quantity per unit
    QuantityPerUnit,
    /// Comma-separated unit types
    UnitTypes,
    /// Comma-separated unit numbers
    Units,
    /// Total quantity
    Total,
}

impl ItemCell {
    /// Zero-based column index
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Category => 0,
            Self::Supply => 1,
            Self::QuantityPerUnit => 2,
            Self::UnitTypes => 3,
            Self::Units => 4,
            Self::Total => 5,
        }
    }
}

/// State of the report viewer inside the print iframe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintStatus {
    /// Status message never appeared
    NotShown,
    /// Message appeared but did not report completion
    Pending(String),
    /// Message contains "Done"
    Done(String),
}

/// Shared page helpers
#[derive(Debug, Clone)]
pub struct PageBase {
    driver: DriverRef,
}

impl PageBase {
    /// Success toast
    pub const SUCCESS_TOAST: &'static str = "toast-success";
    /// Error toast
    pub const ERROR_TOAST: &'static str = "toast-error";
    /// Toast text
    pub const TOAST_MESSAGE: &'static str = "toast-message";
    /// Order item rows
    pub const ITEM_ROWS: &'static str = "tbody>tr";
    /// Cells of an item row
    pub const ITEM_CELLS: &'static str = "td";
    /// Report viewer status line
    pub const PRINT_MESSAGE: &'static str = "trv-error-message";
    /// Print preview iframe
    pub const PRINT_FRAME: &'static str = "responsive-iframe";

    /// Create the helper over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self { driver }
    }

    /// Whether the success toast is visible
    pub async fn is_success_toast_shown(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::class_name(Self::SUCCESS_TOAST)).await
    }

    /// Whether the error toast is visible
    pub async fn is_error_toast_shown(&self) -> E2eResult<bool> {
        is_shown(self.driver.as_ref(), &By::class_name(Self::ERROR_TOAST)).await
    }

    /// Wait for the success toast
    pub async fn wait_for_success_toast(&self, options: WaitOptions) -> E2eResult<()> {
        wait::wait_until(options, "success toast", || self.is_success_toast_shown())
            .await
            .map(|_| ())
    }

    /// Wait for the error toast
    pub async fn wait_for_error_toast(&self, options: WaitOptions) -> E2eResult<()> {
        wait::wait_until(options, "error toast", || self.is_error_toast_shown())
            .await
            .map(|_| ())
    }

    /// Text of the visible toast
    pub async fn toast_message(&self) -> E2eResult<String> {
        let toast = wait_for_displayed(
            self.driver.as_ref(),
            &By::class_name(Self::TOAST_MESSAGE),
            Waits::TillItReady.options(),
        )
        .await?;
        Ok(toast.text().await?.trim().to_string())
    }

    /// Whether the page loader overlay is displayed and opaque
    pub async fn is_loader_shown(&self) -> E2eResult<bool> {
        wait::is_loader_shown(self.driver.as_ref(), &By::css(PAGE_LOADER)).await
    }

    /// Parse the order items grid
    pub async fn requested_items(&self) -> E2eResult<Vec<OrderItem>> {
        let cells = By::css(Self::ITEM_CELLS);
        let mut items = Vec::new();
        for row in self.driver.find_elements(&By::css(Self::ITEM_ROWS)).await? {
            let texts = cell_texts(row.as_ref(), &cells).await?;
            let quantity = parse_count("quantity", cell(&texts, ItemCell::QuantityPerUnit.index(), "item row")?)?;
            let total = parse_count("total", cell(&texts, ItemCell::Total.index(), "item row")?)?;
            let item = OrderItem::new(
                cell(&texts, ItemCell::Category.index(), "item row")?,
                cell(&texts, ItemCell::Supply.index(), "item row")?,
                quantity,
                split_list(cell(&texts, ItemCell::UnitTypes.index(), "item row")?),
                split_list(cell(&texts, ItemCell::Units.index(), "item row")?),
            )
            .with_displayed_total(total);
            items.push(item);
        }
        Ok(items)
    }

    /// Scope finds to the print iframe once it is attached
    pub async fn switch_to_print_frame(&self) -> E2eResult<()> {
        let frame = By::class_name(Self::PRINT_FRAME);
        let driver = self.driver.as_ref();
        let frame_ref = &frame;
        poll(Waits::TillItReady.options(), "print iframe", move || async move {
            driver.switch_to_frame(frame_ref).await?;
            Ok::<_, E2eError>(Some(()))
        })
        .await
    }

    /// Enter the print iframe, wait for the report status, and leave again.
    ///
    /// `shown` bounds the wait for the status line, `done` the wait for it to
    /// read "Done". The driver is back on the top document afterwards, even
    /// on error.
    pub async fn print_status(&self, shown: WaitOptions, done: WaitOptions) -> E2eResult<PrintStatus> {
        self.switch_to_print_frame().await?;
        let status = self.read_print_status(shown, done).await;
        let back = self.driver.switch_to_default_content().await;
        let status = status?;
        back?;
        Ok(status)
    }

    /// Whether printing completed within the standard waits
    pub async fn is_print_done(&self) -> E2eResult<bool> {
        let status = self
            .print_status(Waits::LongUntilDisplayed.options(), Waits::TillItReady.options())
            .await?;
        Ok(matches!(status, PrintStatus::Done(_)))
    }

    async fn read_print_status(&self, shown: WaitOptions, done: WaitOptions) -> E2eResult<PrintStatus> {
        let by = By::class_name(Self::PRINT_MESSAGE);
        let driver = self.driver.as_ref();
        let message = match wait_for_displayed(driver, &by, shown).await {
            Ok(el) => el,
            Err(E2eError::Timeout { .. }) => return Ok(PrintStatus::NotShown),
            Err(err) => return Err(err),
        };
        match wait::wait_for_text(driver, &by, "Done", done).await {
            Ok(text) => Ok(PrintStatus::Done(text)),
            Err(E2eError::Timeout { .. }) => Ok(PrintStatus::Pending(message.text().await.unwrap_or_default())),
            Err(err) => Err(err),
        }
    }
}
