//! Guest Supplies: building and submitting supplies orders.
//!
//! TC01 and TC14 leave the orders they create in
//! [`SuiteState`](crate::session::SuiteState) for the supplies order suite.

use super::expect_within;
use crate::harness::{TestCase, TestFuture, TestSuite};
use crate::model::{Order, OrderItem, OrderStatus};
use crate::pages::{GuestSuppliesPage, PageBase, SuppliesOrderPage, ViewPage, MAX_COMMENT_LEN};
use crate::result::{ensure, ensure_eq, E2eError, E2eResult};
use crate::session::Session;
use crate::wait::{wait_for_url_contains, wait_until, Waits};
use chrono::Local;
use std::time::Duration;
use tracing::info;

/// Suite name
pub const NAME: &str = "guest_supplies";

/// Re-runs allowed for the order-creating cases
const CREATE_RETRIES: u32 = 3;

/// Pause between two appends of the same form
const APPEND_SETTLE: Duration = Duration::from_secs(2);

/// The guest supplies suite
#[must_use]
pub fn suite() -> TestSuite {
    TestSuite::new(NAME)
        .with_case(TestCase::new("tc01", "Request valid accomplished order", tc01).with_retries(CREATE_RETRIES))
        .with_case(TestCase::new("tc02", "Append without selecting category", tc02))
        .with_case(TestCase::new("tc03", "Append without selecting supply", tc03))
        .with_case(TestCase::new("tc04", "Append with quantity zero", tc04))
        .with_case(TestCase::new("tc05", "Append without selecting unit types", tc05))
        .with_case(TestCase::new("tc06", "Append multiple valid rows", tc06))
        .with_case(TestCase::new("tc07", "Append with negative quantity", tc07))
        .with_case(TestCase::new("tc08", "Append with decimal quantity", tc08))
        .with_case(TestCase::new("tc09", "Append with non-numeric quantity", tc09))
        .with_case(TestCase::new("tc10", "Append duplicate supply row", tc10))
        .with_case(TestCase::new("tc11", "Total equals quantity times units", tc11))
        .with_case(TestCase::new("tc12", "Form resets after append", tc12))
        .with_case(TestCase::new("tc13", "Create accomplished order without appending", tc13))
        .with_case(TestCase::new("tc14", "Request valid proposed order", tc14).with_retries(CREATE_RETRIES))
        .with_case(TestCase::new("tc15", "Create proposed order without appending", tc15))
        .with_case(TestCase::new("tc16", "Remove appended supply", tc16))
        .with_case(TestCase::new("tc17", "Edit appended supply", tc17))
        .with_case(TestCase::new("tc18", "Discard appended supply", tc18))
        .with_case(TestCase::new("tc19", "Create accomplished order with long comment", tc19))
        .with_case(TestCase::new("tc20", "Create proposed order with long comment", tc20))
        .with_case(TestCase::new("tc21", "Cancel clears the entered supply", tc21))
}

// ============================================================================
// Shared steps
// ============================================================================

/// Option indexes and quantity for one form entry
#[derive(Debug, Clone, Copy)]
struct SupplyEntry<'a> {
    category: usize,
    supply: usize,
    quantity: &'a str,
    unit_type: usize,
    unit_number: usize,
}

impl<'a> SupplyEntry<'a> {
    /// First option everywhere
    const fn first(quantity: &'a str) -> Self {
        Self {
            category: 0,
            supply: 0,
            quantity,
            unit_type: 0,
            unit_number: 0,
        }
    }

    const fn with_unit_number(mut self, unit_number: usize) -> Self {
        self.unit_number = unit_number;
        self
    }
}

async fn open_form(session: &Session) -> E2eResult<GuestSuppliesPage> {
    let page = GuestSuppliesPage::new(session.driver());
    session.open_page(&page).await?;
    expect_within(
        wait_until(Waits::UntilDisplayed.options(), "category dropdown", || {
            page.is_category_dropdown_shown()
        })
        .await,
        "Category dropdown didn't display",
    )?;
    Ok(page)
}

/// Fill every field, append, and return the item the form should have
/// produced. `None` when the quantity is not a whole number.
async fn fill_supply_form(page: &mut GuestSuppliesPage, entry: SupplyEntry<'_>) -> E2eResult<Option<OrderItem>> {
    page.click_category_dropdown()
        .await?
        .select_category_option(entry.category)
        .await?
        .click_supply_dropdown()
        .await?
        .select_supply_option(entry.supply)
        .await?
        .insert_quantity(entry.quantity)
        .await?
        .click_unit_types()
        .await?
        .select_single_unit_type(entry.unit_type)
        .await?
        .click_unit_numbers()
        .await?
        .select_single_unit_number(entry.unit_number)
        .await?
        .click_append()
        .await?;

    let Ok(quantity) = entry.quantity.parse::<u32>() else {
        return Ok(None);
    };
    Ok(Some(OrderItem::new(
        page.selected_category().unwrap_or_default(),
        page.selected_supply().unwrap_or_default(),
        quantity,
        page.selected_unit_types().to_vec(),
        page.selected_unit_numbers().to_vec(),
    )))
}

async fn fill_category_only(page: &mut GuestSuppliesPage, quantity: &str) -> E2eResult<()> {
    page.click_category_dropdown()
        .await?
        .select_category_option(0)
        .await?
        .insert_quantity(quantity)
        .await?;
    Ok(())
}

async fn assert_supply_not_added(session: &Session, page: &GuestSuppliesPage) -> E2eResult<()> {
    let base = PageBase::new(session.driver());
    expect_within(
        base.wait_for_error_toast(Waits::UntilDisplayed.options()).await,
        "Error toast didn't display",
    )?;
    ensure_eq(&page.appended_rows_count().await?, &0, "appended rows")
}

/// Wait for the success toast and the redirect; returns the new URL
async fn assert_supply_ordered(session: &Session) -> E2eResult<String> {
    let base = PageBase::new(session.driver());
    expect_within(
        base.wait_for_success_toast(Waits::UntilDisplayed.options()).await,
        "Success toast didn't display",
    )?;
    expect_within(
        wait_for_url_contains(
            session.delayed(),
            SuppliesOrderPage::PATH,
            Waits::UntilLoads.options(),
        )
        .await,
        "URL didn't change to supplies order page",
    )
}

async fn appended_count_at_least(page: &GuestSuppliesPage, count: usize, message: &str) -> E2eResult<()> {
    let rows = page.appended_rows_count().await?;
    ensure(rows >= count, message)
}

/// Submit a valid one-item order and capture it as it should read back
async fn create_valid_order(session: &mut Session, status: OrderStatus) -> E2eResult<Order> {
    let mut page = open_form(session).await?;
    let item = fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
    ensure_eq(&page.appended_rows_count().await?, &1, "Exactly one supply row should be appended")?;

    let mut order = Order::new()
        .with_status(status)
        .with_created_by(session.state.login_user.name.clone())
        .with_created_at(Local::now().naive_local())
        .with_items(item.into_iter().collect());

    match status {
        OrderStatus::Proposed => page.click_create_proposed().await?,
        _ => page.click_create_accomplished().await?,
    };
    let url = assert_supply_ordered(session).await?;
    session.wait_for_page_to_load(&url).await?;
    let order_no = ViewPage::new(session.driver()).order_no().await?;
    order = order.with_url(url).with_order_no(order_no);
    info!(order_no = %order.order_no, status = %status, url = %order.url, "order created");
    Ok(order)
}

async fn assert_form_cleared(page: &GuestSuppliesPage) -> E2eResult<()> {
    let clear_buttons = page.clear_buttons_count().await?;
    ensure(clear_buttons <= 2, &format!("form still holds {clear_buttons} filled inputs"))
}

// ============================================================================
// Cases
// ============================================================================

fn tc01(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let order = create_valid_order(session, OrderStatus::Accomplished).await?;
        session.state.accomplished_order = Some(order);
        Ok(())
    })
}

fn tc02(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        page.insert_quantity("2")
            .await?
            .click_unit_types()
            .await?
            .select_single_unit_type(0)
            .await?
            .click_unit_numbers()
            .await?
            .select_single_unit_number(0)
            .await?
            .click_append()
            .await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc03(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_category_only(&mut page, "3").await?;
        page.click_unit_types()
            .await?
            .select_single_unit_type(0)
            .await?
            .click_unit_numbers()
            .await?
            .select_single_unit_number(0)
            .await?
            .click_append()
            .await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc04(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("0")).await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc05(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_category_only(&mut page, "5").await?;
        page.click_supply_dropdown()
            .await?
            .select_supply_option(0)
            .await?
            .click_append()
            .await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc06(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        for supply in 0..2 {
            page.click_category_dropdown()
                .await?
                .select_category_option(0)
                .await?
                .click_supply_dropdown()
                .await?
                .select_supply_option(supply)
                .await?
                .insert_quantity("2")
                .await?;
            // unit selections carry over to the second row
            if supply == 0 {
                page.click_unit_types()
                    .await?
                    .select_single_unit_type(0)
                    .await?
                    .click_unit_numbers()
                    .await?
                    .select_single_unit_number(0)
                    .await?;
            }
            page.click_append().await?;
            tokio::time::sleep(APPEND_SETTLE).await;
        }
        appended_count_at_least(&page, 2, "Both supplies should be appended").await
    })
}

fn tc07(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("-3")).await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc08(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2.5")).await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc09(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("abc")).await?;
        assert_supply_not_added(session, &page).await
    })
}

fn tc10(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        const ATTEMPTS: usize = 2;
        let mut page = open_form(session).await?;
        for attempt in 0..ATTEMPTS {
            page.click_category_dropdown()
                .await?
                .select_category_option(0)
                .await?
                .click_supply_dropdown()
                .await?
                .select_supply_option(0)
                .await?
                .insert_quantity("2")
                .await?;
            if attempt == 0 {
                page.click_unit_types()
                    .await?
                    .select_single_unit_type(0)
                    .await?
                    .click_unit_numbers()
                    .await?
                    .select_single_unit_number(0)
                    .await?;
            }
            page.click_append().await?;
        }
        let rows = page.appended_rows_count().await?;
        ensure(rows < ATTEMPTS, &format!("duplicate supply appended ({rows} rows)"))
    })
}

fn tc11(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let quantity = "10";
        let mut page = open_form(session).await?;
        let item = fill_supply_form(&mut page, SupplyEntry::first(quantity).with_unit_number(1))
            .await?
            .ok_or_else(|| E2eError::assertion("quantity should parse", quantity, "not a number"))?;
        ensure_eq(&page.appended_rows_count().await?, &1, "Exactly one supply row should be appended")?;
        ensure_eq(page.quantity_at(0).await?.as_str(), quantity, "quantity per unit")?;
        ensure_eq(&page.total_at(0).await?, &item.total, "Total doesn't equal quantity times units")
    })
}

fn tc12(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
        assert_form_cleared(&page).await
    })
}

fn tc13(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_form(session).await?;
        page.click_create_accomplished().await?;
        expect_within(
            PageBase::new(session.driver())
                .wait_for_error_toast(Waits::UntilDisplayed.options())
                .await,
            "Expected error toast when no supplies are appended",
        )
    })
}

fn tc14(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let order = create_valid_order(session, OrderStatus::Proposed).await?;
        session.state.proposed_order = Some(order);
        Ok(())
    })
}

fn tc15(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_form(session).await?;
        page.click_create_proposed().await?;
        expect_within(
            PageBase::new(session.driver())
                .wait_for_error_toast(Waits::UntilDisplayed.options())
                .await,
            "Expected error toast when creating proposed order without supplies",
        )
    })
}

fn tc16(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
        ensure_eq(&page.appended_rows_count().await?, &1, "appended rows")?;
        page.delete_appended_supply(0).await?;
        ensure_eq(&page.appended_rows_count().await?, &0, "Supply not removed properly")
    })
}

fn tc17(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
        ensure_eq(&page.appended_rows_count().await?, &1, "appended rows")?;
        page.edit_appended_supply(0).await?;
        ensure_eq(&page.appended_rows_count().await?, &0, "edited row should leave the table")?;
        page.click_append().await?;
        ensure_eq(&page.appended_rows_count().await?, &1, "edited row appended again")
    })
}

fn tc18(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
        ensure_eq(&page.appended_rows_count().await?, &1, "appended rows")?;
        page.click_discard().await?;
        expect_within(
            wait_for_url_contains(
                session.delayed(),
                SuppliesOrderPage::PATH,
                Waits::UntilLoads.options(),
            )
            .await,
            "URL didn't change to supplies order page",
        )?;
        Ok(())
    })
}

async fn long_comment_order(session: &Session, comment_len: usize, status: OrderStatus) -> E2eResult<()> {
    let mut page = open_form(session).await?;
    fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
    page.insert_comment(&"C".repeat(comment_len)).await?;
    ensure_eq(&page.comment_length().await?, &MAX_COMMENT_LEN, "comment length")?;
    page.click_append().await?;
    appended_count_at_least(&page, 1, "Supply item not appended").await?;
    match status {
        OrderStatus::Proposed => page.click_create_proposed().await?,
        _ => page.click_create_accomplished().await?,
    };
    assert_supply_ordered(session).await?;
    Ok(())
}

fn tc19(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { long_comment_order(session, 500, OrderStatus::Accomplished).await })
}

fn tc20(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { long_comment_order(session, 600, OrderStatus::Proposed).await })
}

fn tc21(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let mut page = open_form(session).await?;
        fill_supply_form(&mut page, SupplyEntry::first("2")).await?;
        page.click_cancel().await?;
        assert_form_cleared(&page).await
    })
}
