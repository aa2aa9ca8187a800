//! Read-only view of a submitted order.

use super::{nth, PageBase};
use crate::driver::DriverRef;
use crate::locator::By;
use crate::model::{parse_date_time, Order, OrderStatus};
use crate::result::{E2eError, E2eResult};
use chrono::NaiveDateTime;

/// Order view page (`…/supplies-order/view/<id>`)
#[derive(Debug, Clone)]
pub struct ViewPage {
    driver: DriverRef,
    base: PageBase,
}

impl ViewPage {
    /// Header blocks: order number, status, date
    pub const TITLES: &'static str = "div.col-md-2";
    /// Status label inside its header block
    pub const STATUS_SPAN: &'static str = "span";
    /// Discard button
    pub const DISCARD: &'static str = ".n-button.n-button--danger-border.margin-inline";
    /// Print button
    pub const PRINT: &'static str = "button.ng-star-inserted";

    /// Create the page over `driver`
    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self {
            base: PageBase::new(driver.clone()),
            driver,
        }
    }

    async fn title(&self, index: usize) -> E2eResult<String> {
        let block = nth(self.driver.as_ref(), &By::css(Self::TITLES), index).await?;
        Ok(block.text().await?.trim().to_string())
    }

    /// Order number, or empty when the header has no value line
    pub async fn order_no(&self) -> E2eResult<String> {
        let title = self.title(0).await?;
        Ok(second_line(&title).unwrap_or_default().to_string())
    }

    /// Status label
    pub async fn order_status(&self) -> E2eResult<OrderStatus> {
        let block = nth(self.driver.as_ref(), &By::css(Self::TITLES), 1).await?;
        let label = block.find_element(&By::css(Self::STATUS_SPAN)).await?.text().await?;
        label.parse()
    }

    /// Creation timestamp
    pub async fn order_date_time(&self) -> E2eResult<NaiveDateTime> {
        let title = self.title(2).await?;
        let line = second_line(&title)
            .ok_or_else(|| E2eError::parse("order date", title.clone(), "missing value line"))?;
        parse_date_time(line)
    }

    /// Everything the page shows as an [`Order`]
    pub async fn view_order(&self) -> E2eResult<Order> {
        Ok(Order::new()
            .with_order_no(self.order_no().await?)
            .with_status(self.order_status().await?)
            .with_created_at(self.order_date_time().await?)
            .with_items(self.base.requested_items().await?)
            .with_url(self.driver.current_url().await?))
    }

    /// Return to the listing
    pub async fn click_discard(&self) -> E2eResult<&Self> {
        self.driver.find_element(&By::css(Self::DISCARD)).await?.click().await?;
        Ok(self)
    }

    /// Print the order
    pub async fn click_print(&self) -> E2eResult<&Self> {
        self.driver.find_element(&By::css(Self::PRINT)).await?.click().await?;
        Ok(self)
    }
}

fn second_line(text: &str) -> Option<&str> {
    text.lines().nth(1).map(str::trim)
}
