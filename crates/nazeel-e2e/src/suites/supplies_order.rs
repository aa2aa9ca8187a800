//! Supplies Orders: the listing, its filters and row actions.
//!
//! TC01 to TC06 inspect the orders captured by the guest supplies suite and
//! are skipped when that suite did not create them. The remaining cases work
//! on whatever the listing holds.

use super::expect_within;
use crate::assertion::SoftAssertions;
use crate::harness::{TestCase, TestFuture, TestSuite};
use crate::model::{parse_date_time, Order, OrderStatus};
use crate::pages::{FilterDropdown, FiltersPage, PageBase, PrintStatus, SuppliesColumn, SuppliesOrderPage, ViewPage};
use crate::result::{ensure, E2eError, E2eResult};
use crate::session::Session;
use crate::utils::{scroll_down_little, CalendarPicker};
use crate::wait::{poll, wait_for_url_contains, wait_until, WaitOptions, Waits};
use chrono::NaiveDateTime;
use tracing::debug;

/// Suite name
pub const NAME: &str = "supplies_order";

const ACCOMPLISHED_CREATED: &str = "guest_supplies::tc01";
const PROPOSED_CREATED: &str = "guest_supplies::tc14";

/// Lower bound typed into the date-from picker
const FILTER_FROM: &str = "25/04/2025 02:00 PM";
/// Upper bound typed into the date-to picker
const FILTER_TO: &str = "30/04/2025 04:30 PM";

/// Scroll steps before giving up on reaching the bottom
const MAX_SCROLL_ROUNDS: usize = 50;
/// Expand clicks per scroll position
const MAX_EXPANDS_PER_ROUND: usize = 100;

/// The supplies order suite
#[must_use]
pub fn suite() -> TestSuite {
    TestSuite::new(NAME)
        .with_case(TestCase::new("tc01", "Compare accomplished order with sent order", tc01).depends_on(ACCOMPLISHED_CREATED))
        .with_case(TestCase::new("tc02", "Compare proposed order with sent order", tc02).depends_on(PROPOSED_CREATED))
        .with_case(TestCase::new("tc03", "Discarded accomplished order is listed", tc03).depends_on(ACCOMPLISHED_CREATED))
        .with_case(TestCase::new("tc04", "Discarded proposed order is listed", tc04).depends_on(PROPOSED_CREATED))
        .with_case(TestCase::new("tc05", "Accomplished order can't be cancelled", tc05).depends_on(ACCOMPLISHED_CREATED))
        .with_case(TestCase::new("tc06", "Proposed order can be cancelled", tc06).depends_on(PROPOSED_CREATED))
        .with_case(TestCase::new("tc07", "Filter by status", tc07))
        .with_case(TestCase::new("tc08", "Filter by category", tc08))
        .with_case(TestCase::new("tc09", "Filter by supply name", tc09))
        .with_case(TestCase::new("tc10", "Filter by unit types", tc10))
        .with_case(TestCase::new("tc11", "Filter by order number", tc11))
        .with_case(TestCase::new("tc12", "Filter by user", tc12))
        .with_case(TestCase::new("tc13", "Filter by date from", tc13))
        .with_case(TestCase::new("tc14", "Filter by date to", tc14))
        .with_case(TestCase::new("tc15", "Filter by date range", tc15))
        .with_case(TestCase::new("tc16", "Filter by combined filters", tc16))
        .with_case(TestCase::new("tc17", "Print accomplished order", tc17))
        .with_case(TestCase::new("tc18", "Print proposed order", tc18))
        .with_case(TestCase::new("tc19", "Print cancelled order", tc19))
        .with_case(TestCase::new("tc20", "View accomplished order", tc20))
        .with_case(TestCase::new("tc21", "View proposed order", tc21))
        .with_case(TestCase::new("tc22", "View cancelled order", tc22))
        .with_case(TestCase::new("tc23", "Edit not shown for accomplished order", tc23))
        .with_case(TestCase::new("tc24", "Edit not shown for cancelled order", tc24))
        .with_case(TestCase::new("tc25", "Edit proposed order navigates", tc25))
        .with_case(TestCase::new("tc26", "Orders checklist prints", tc26))
}

// ============================================================================
// Shared steps
// ============================================================================

async fn open_orders(session: &Session) -> E2eResult<SuppliesOrderPage> {
    let page = SuppliesOrderPage::new(session.driver());
    session.open_page(&page).await?;
    Ok(page)
}

async fn open_filters(session: &Session) -> E2eResult<(SuppliesOrderPage, FiltersPage)> {
    let orders = open_orders(session).await?;
    orders.click_filter().await?;
    Ok((orders, FiltersPage::new(session.driver())))
}

async fn wait_options_shown(filters: &FiltersPage) -> E2eResult<()> {
    expect_within(
        wait_until(Waits::UntilDisplayed.options(), "filter options", || filters.is_options_shown()).await,
        "Options didn't show!",
    )?;
    Ok(())
}

/// Open `dropdown`, wait for its options and pick one; returns its text
async fn pick(filters: &mut FiltersPage, dropdown: FilterDropdown, index: usize) -> E2eResult<String> {
    filters.open(dropdown).await?;
    wait_options_shown(filters).await?;
    filters.select_option(dropdown, index).await?;
    Ok(filters.selected(dropdown).unwrap_or_default().to_string())
}

/// Submit the filters and wait for the grid to reload
async fn search(session: &Session, filters: &mut FiltersPage) -> E2eResult<()> {
    filters.click_search().await?;
    let base = PageBase::new(session.driver());
    let base = &base;
    wait_until(Waits::UntilLoads.options(), "page loader hidden", move || async move {
        Ok::<_, E2eError>(!base.is_loader_shown().await?)
    })
    .await?;
    session.sleep(session.config().ready.settle_ms).await;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum DateBound {
    From,
    To,
}

/// Focus a date input and type `text` (`dd/MM/yyyy hh:mm a`) into it
async fn enter_filter_date(
    session: &Session,
    filters: &mut FiltersPage,
    bound: DateBound,
    text: &str,
) -> E2eResult<NaiveDateTime> {
    let at = parse_date_time(text)?;
    match bound {
        DateBound::From => filters.click_date_from().await?,
        DateBound::To => filters.click_date_to().await?,
    };
    CalendarPicker::new(session.driver()).enter_date_time(&at).await?;
    Ok(at)
}

async fn status_index(page: &SuppliesOrderPage, status: OrderStatus) -> E2eResult<usize> {
    page.order_index_by_status(status)
        .await?
        .ok_or_else(|| E2eError::assertion(format!("No {status} order found!"), status, "none listed"))
}

/// Expand collapsed orders in view until no expand toggle is left
async fn expand_visible(orders: &SuppliesOrderPage) -> E2eResult<()> {
    for _ in 0..MAX_EXPANDS_PER_ROUND {
        match orders.expand_order(0).await {
            Ok(_) => {}
            Err(err) if err.is_transient() => return Ok(()),
            Err(err) => return Err(err),
        }
    }
    debug!(clicks = MAX_EXPANDS_PER_ROUND, "expand toggles still present");
    Ok(())
}

fn ensure_found<T>(rows: &[T], message: &str) -> E2eResult<()> {
    ensure(!rows.is_empty(), message)
}

/// Fail on the first value `matches` rejects
fn ensure_every(values: &[String], expected: &str, message: &str, matches: impl Fn(&str) -> bool) -> E2eResult<()> {
    match values.iter().find(|value| !matches(value)) {
        Some(mismatch) => Err(E2eError::assertion(message, expected, mismatch)),
        None => Ok(()),
    }
}

fn created_at(order: &Order) -> E2eResult<NaiveDateTime> {
    order
        .created_at
        .ok_or_else(|| E2eError::assertion(format!("order {} has no timestamp", order.order_no), "timestamp", "none"))
}

fn captured(order: Option<&Order>, kind: OrderStatus) -> E2eResult<Order> {
    order
        .cloned()
        .ok_or_else(|| E2eError::assertion(format!("no {kind} order was captured"), kind, "none"))
}

/// Map the print iframe's report status onto pass or fail
async fn expect_printed(session: &Session, shown: WaitOptions, what: &str) -> E2eResult<()> {
    let status = PageBase::new(session.driver())
        .print_status(shown, Waits::TillItReady.options())
        .await?;
    debug!(?status, what, "print status");
    match status {
        PrintStatus::Done(_) => Ok(()),
        PrintStatus::NotShown => Err(E2eError::assertion(
            format!("Print message of {what} not displayed!"),
            "print status message",
            "nothing",
        )),
        PrintStatus::Pending(message) => Err(E2eError::assertion(
            format!("{what} print process failed!"),
            "Done",
            message,
        )),
    }
}

async fn verify_print(session: &Session, status: OrderStatus) -> E2eResult<()> {
    let page = open_orders(session).await?;
    let index = status_index(&page, status).await?;
    page.click_more_options(index).await?.click_print().await?;
    expect_printed(session, Waits::LongUntilDisplayed.options(), &format!("{status} order")).await
}

async fn verify_view(session: &Session, status: OrderStatus) -> E2eResult<()> {
    let page = open_orders(session).await?;
    let index = status_index(&page, status).await?;
    page.click_view(index).await?;
    expect_within(
        wait_for_url_contains(session.delayed(), "/view", Waits::UntilLoads.options()).await,
        &format!("View of {status} order didn't navigate correctly"),
    )?;
    Ok(())
}

async fn verify_edit_not_displayed(session: &Session, status: OrderStatus) -> E2eResult<()> {
    let page = open_orders(session).await?;
    let index = status_index(&page, status).await?;
    ensure(
        !page.is_edit_displayed(index).await?,
        &format!("Edit button for {status} orders should not be visible"),
    )
}

/// Open the captured order's view page and compare it field by field
async fn compare_with_view(session: &Session, expected: &Order) -> E2eResult<()> {
    session.navigate(&expected.url).await?;
    session.wait_for_page_to_load(&expected.url).await?;
    let actual = ViewPage::new(session.driver()).view_order().await?;
    let mut soft = SoftAssertions::new();
    soft.assert_order(&actual, expected);
    soft.verify()
}

/// Discard the captured order's view page and find it in the listing
async fn discard_and_find(session: &Session, expected: &Order) -> E2eResult<()> {
    session.navigate(&expected.url).await?;
    session.wait_for_page_to_load(&expected.url).await?;
    ViewPage::new(session.driver()).click_discard().await?;
    session
        .wait_for_page_to_load(&session.url(SuppliesOrderPage::PATH))
        .await?;

    let actual = SuppliesOrderPage::new(session.driver())
        .order_by_order_no(&expected.order_no)
        .await?
        .ok_or_else(|| {
            E2eError::assertion("Order not found in Supplies Orders list.", &expected.order_no, "missing")
        })?;
    let mut soft = SoftAssertions::new();
    soft.assert_order_overview(&actual, expected);
    soft.verify()
}

// ============================================================================
// Captured orders
// ============================================================================

fn tc01(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let expected = captured(session.state.accomplished_order.as_ref(), OrderStatus::Accomplished)?;
        compare_with_view(session, &expected).await
    })
}

fn tc02(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let expected = captured(session.state.proposed_order.as_ref(), OrderStatus::Proposed)?;
        compare_with_view(session, &expected).await
    })
}

fn tc03(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let expected = captured(session.state.accomplished_order.as_ref(), OrderStatus::Accomplished)?;
        discard_and_find(session, &expected).await
    })
}

fn tc04(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let expected = captured(session.state.proposed_order.as_ref(), OrderStatus::Proposed)?;
        discard_and_find(session, &expected).await
    })
}

fn tc05(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_orders(session).await?;
        let index = status_index(&page, OrderStatus::Accomplished).await?;
        page.click_more_options(index).await?;
        ensure(
            !page.is_cancel_displayed().await?,
            "Cancel button should not be shown for accomplished order.",
        )
    })
}

fn tc06(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_orders(session).await?;
        let index = status_index(&page, OrderStatus::Proposed).await?;
        page.click_more_options(index)
            .await?
            .click_cancel()
            .await?
            .confirm_cancel()
            .await?;
        expect_within(
            PageBase::new(session.driver())
                .wait_for_success_toast(Waits::UntilDisplayed.options())
                .await,
            "Expected success toast did not appear within the timeout period.",
        )?;

        let page = &page;
        let cancelled = poll(Waits::UntilDisplayed.options(), "order cancelled", move || async move {
            let order = page.order_by_index(index).await?;
            Ok::<_, E2eError>((order.status == Some(OrderStatus::Cancelled)).then_some(()))
        })
        .await;
        expect_within(cancelled, "Order status was not updated to CANCELLED")
    })
}

// ============================================================================
// Filters
// ============================================================================

fn tc07(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let selected = pick(&mut filters, FilterDropdown::Status, 0).await?;
        search(session, &mut filters).await?;
        let results = orders.supplies_values(SuppliesColumn::Status).await?;
        ensure_found(&results, "No records found for selected status.")?;
        ensure_every(&results, &selected, "Status doesn't match the selected status.", |status| {
            status.eq_ignore_ascii_case(&selected)
        })
    })
}

fn tc08(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let selected = pick(&mut filters, FilterDropdown::Category, 0).await?;
        search(session, &mut filters).await?;
        let results = orders.supplies_values(SuppliesColumn::Categories).await?;
        ensure_found(&results, "No items found for selected category.")?;
        ensure_every(&results, &selected, "Results don't match the selected category.", |categories| {
            categories.contains(selected.as_str())
        })
    })
}

fn tc09(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        pick(&mut filters, FilterDropdown::Category, 0).await?;
        let selected = pick(&mut filters, FilterDropdown::Supply, 0).await?;
        search(session, &mut filters).await?;

        for _ in 0..MAX_SCROLL_ROUNDS {
            expand_visible(&orders).await?;
            let items = orders.requested_items().await?;
            ensure_found(&items, "No items found for selected supply.")?;
            ensure(
                items.iter().any(|item| item.supply.eq_ignore_ascii_case(&selected)),
                "Results don't match the selected supplies.",
            )?;
            match scroll_down_little(session.delayed()).await {
                Ok(()) => {}
                Err(E2eError::ScrollLimitReached { .. }) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })
}

fn tc10(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let selected = pick(&mut filters, FilterDropdown::UnitTypes, 0).await?;
        search(session, &mut filters).await?;
        let results = orders.supplies_values(SuppliesColumn::UnitTypes).await?;
        ensure_found(&results, "No items found for selected unit types.")?;
        ensure_every(&results, &selected, "Results don't match the selected unit types.", |unit_types| {
            unit_types == selected
        })
    })
}

fn tc11(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let listed = orders.requested_orders().await?;
        let order_no = listed
            .first()
            .map(|order| order.order_no.clone())
            .ok_or_else(|| E2eError::assertion("No orders listed to filter by.", "at least one order", 0))?;

        filters.insert_order_no(&order_no).await?;
        search(session, &mut filters).await?;
        let results: Vec<String> = orders
            .requested_orders()
            .await?
            .into_iter()
            .map(|order| order.order_no)
            .collect();
        ensure_found(&results, "No records found for the given order number.")?;
        ensure_every(&results, &order_no, "Results don't match the selected order number.", |no| {
            no.eq_ignore_ascii_case(&order_no)
        })
    })
}

fn tc12(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        // first option is the "all users" entry
        const USER_OPTION: usize = 1;
        let (orders, mut filters) = open_filters(session).await?;
        pick(&mut filters, FilterDropdown::User, USER_OPTION).await?;
        search(session, &mut filters).await?;
        let results = orders.supplies_values(SuppliesColumn::CreatedBy).await?;
        ensure_found(&results, "No records found for selected user.")?;
        let name = filters.selected_user_name()?;
        ensure_every(&results, &name, "Results don't match the selected user.", |created_by| {
            created_by == name
        })
    })
}

fn tc13(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let from = enter_filter_date(session, &mut filters, DateBound::From, FILTER_FROM).await?;
        search(session, &mut filters).await?;
        let results = orders.requested_orders().await?;
        ensure_found(&results, "No records found for the date from filter.")?;
        for order in &results {
            let at = created_at(order)?;
            if at < from {
                return Err(E2eError::assertion(
                    "Order created before selected 'from' datetime",
                    format!(">= {FILTER_FROM}"),
                    order.created_at_text().unwrap_or_default(),
                ));
            }
        }
        Ok(())
    })
}

fn tc14(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let to = enter_filter_date(session, &mut filters, DateBound::To, FILTER_TO).await?;
        search(session, &mut filters).await?;
        let results = orders.requested_orders().await?;
        ensure_found(&results, "No records found for the date to filter.")?;
        for order in &results {
            let at = created_at(order)?;
            if at > to {
                return Err(E2eError::assertion(
                    "Order created after selected 'to' datetime",
                    format!("<= {FILTER_TO}"),
                    order.created_at_text().unwrap_or_default(),
                ));
            }
        }
        Ok(())
    })
}

fn tc15(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        let from = enter_filter_date(session, &mut filters, DateBound::From, FILTER_FROM).await?;
        let to = enter_filter_date(session, &mut filters, DateBound::To, FILTER_TO).await?;
        search(session, &mut filters).await?;
        let results = orders.requested_orders().await?;
        ensure_found(&results, "No records found for the date range filter.")?;
        for order in &results {
            let at = created_at(order)?;
            if !(from..=to).contains(&at) {
                return Err(E2eError::assertion(
                    "Order datetime is outside the selected range",
                    format!("{FILTER_FROM} - {FILTER_TO}"),
                    order.created_at_text().unwrap_or_default(),
                ));
            }
        }
        Ok(())
    })
}

fn tc16(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let (orders, mut filters) = open_filters(session).await?;
        filters
            .choose(FilterDropdown::Status, 0)
            .await?
            .choose(FilterDropdown::Category, 0)
            .await?
            .choose(FilterDropdown::Supply, 0)
            .await?
            .choose(FilterDropdown::UnitTypes, 0)
            .await?;
        search(session, &mut filters).await?;
        let results = orders.requested_orders().await?;
        ensure_found(&results, "No records found for combined filter.")
    })
}

// ============================================================================
// Row actions
// ============================================================================

fn tc17(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_print(session, OrderStatus::Accomplished).await })
}

fn tc18(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_print(session, OrderStatus::Proposed).await })
}

fn tc19(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_print(session, OrderStatus::Cancelled).await })
}

fn tc20(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_view(session, OrderStatus::Accomplished).await })
}

fn tc21(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_view(session, OrderStatus::Proposed).await })
}

fn tc22(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_view(session, OrderStatus::Cancelled).await })
}

fn tc23(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_edit_not_displayed(session, OrderStatus::Accomplished).await })
}

fn tc24(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move { verify_edit_not_displayed(session, OrderStatus::Cancelled).await })
}

fn tc25(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_orders(session).await?;
        let index = status_index(&page, OrderStatus::Proposed).await?;
        page.click_edit(index).await?;
        expect_within(
            wait_for_url_contains(session.delayed(), "/edit", Waits::UntilLoads.options()).await,
            "Edit did not navigate correctly",
        )?;
        Ok(())
    })
}

fn tc26(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_orders(session).await?;
        page.click_checklist().await?;
        expect_printed(session, Waits::UntilDisplayed.options(), "checklist").await
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::locator::By;
    use crate::mock::{MockDriver, MockElement};
    use std::sync::Arc;

    const LISTING_URL: &str = "https://staging.nazeel.net:9002/guest-supplies/supplies-order";

    fn config() -> SuiteConfig {
        let mut config = SuiteConfig::default();
        config.action_delay_ms = 0;
        config.ready.settle_ms = 0;
        config
    }

    fn order_row(no: &str, status: &str, at: &str) -> Arc<MockElement> {
        let cells = [no, status, "Bathroom", "1", "Ahmed Ali", at, "Suite", "101"]
            .into_iter()
            .map(|t| MockElement::new("td").with_text(t).into_ref());
        MockElement::new("tr")
            .with_children(By::css(SuppliesOrderPage::CELLS), cells)
            .into_ref()
    }

    fn listing() -> MockDriver {
        MockDriver::new().with_url(LISTING_URL).with_elements(
            By::css(SuppliesOrderPage::ROWS),
            [
                order_row("1043", "Accomplished", "26/04/2025 02:27 PM"),
                order_row("1042", "Proposed", "29/04/2025 09:05 AM"),
            ],
        )
    }

    mod checks {
        use super::*;

        #[tokio::test]
        async fn test_status_index_reports_missing_status() {
            let page = SuppliesOrderPage::new(Arc::new(listing()));
            assert_eq!(status_index(&page, OrderStatus::Proposed).await.unwrap(), 1);
            match status_index(&page, OrderStatus::Cancelled).await.unwrap_err() {
                E2eError::Assertion { message, .. } => assert_eq!(message, "No Cancelled order found!"),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_ensure_every_names_first_mismatch() {
            let values = vec!["Proposed".to_string(), "proposed".into(), "Cancelled".into()];
            let err = ensure_every(&values, "Proposed", "status", |v| v.eq_ignore_ascii_case("proposed")).unwrap_err();
            assert!(matches!(err, E2eError::Assertion { ref actual, .. } if actual == "Cancelled"));
            assert!(ensure_every(&values[..2], "Proposed", "status", |v| v.eq_ignore_ascii_case("proposed")).is_ok());
            assert!(ensure_found::<String>(&[], "empty").is_err());
        }

        #[test]
        fn test_filter_bounds_parse() {
            let from = parse_date_time(FILTER_FROM).unwrap();
            let to = parse_date_time(FILTER_TO).unwrap();
            assert!(from < to);
        }

        #[test]
        fn test_missing_capture_is_assertion() {
            assert!(matches!(
                captured(None, OrderStatus::Proposed),
                Err(E2eError::Assertion { .. })
            ));
        }
    }

    mod flows {
        use super::*;

        /// Listing of `rows` with a filter panel whose dropdowns offer `options`
        fn filter_panel(rows: Vec<Arc<MockElement>>, options: &[&str]) -> MockDriver {
            MockDriver::new()
                .with_url(LISTING_URL)
                .with_elements(By::css(SuppliesOrderPage::ROWS), rows)
                .with_elements(
                    By::css(SuppliesOrderPage::HEADER_BUTTONS),
                    [MockElement::new("checklist").into_ref(), MockElement::new("filter").into_ref()],
                )
                .with_elements(
                    By::class_name(FiltersPage::DROPDOWNS),
                    (0..5).map(|i| MockElement::new(format!("toggle{i}")).into_ref()),
                )
                .with_elements(
                    By::css(FiltersPage::OPTIONS),
                    options.iter().map(|t| MockElement::new("option").with_text(*t).into_ref()),
                )
                .with_element(By::css(FiltersPage::SEARCH), MockElement::new("search").into_ref())
        }

        fn item_row(supply: &str) -> Arc<MockElement> {
            let cells = ["Bathroom", supply, "1", "1", "101"]
                .into_iter()
                .map(|t| MockElement::new("td").with_text(t).into_ref());
            MockElement::new("item")
                .with_children(By::css(SuppliesOrderPage::ITEM_CELLS), cells)
                .into_ref()
        }

        fn expand_icons(count: usize) -> Vec<Arc<MockElement>> {
            (0..count)
                .map(|i| MockElement::new(format!("plus{i}")).into_ref())
                .collect()
        }

        fn assertion_message(err: E2eError) -> String {
            match err {
                E2eError::Assertion { message, .. } => message,
                other => panic!("unexpected {other:?}"),
            }
        }

        mod status_filter {
            use super::*;

            #[tokio::test(start_paused = true)]
            async fn test_passes_when_every_row_has_selected_status() {
                let rows = vec![
                    order_row("1043", "Proposed", "26/04/2025 02:27 PM"),
                    order_row("1042", "proposed", "29/04/2025 09:05 AM"),
                ];
                let mut session = Session::new(Arc::new(filter_panel(rows, &["Proposed", "Cancelled"])), config());
                tc07(&mut session).await.unwrap();
            }

            #[tokio::test(start_paused = true)]
            async fn test_fails_on_mixed_statuses() {
                let rows = vec![
                    order_row("1043", "Proposed", "26/04/2025 02:27 PM"),
                    order_row("1042", "Cancelled", "29/04/2025 09:05 AM"),
                ];
                let mut session = Session::new(Arc::new(filter_panel(rows, &["Proposed"])), config());
                match tc07(&mut session).await.unwrap_err() {
                    E2eError::Assertion { message, expected, actual } => {
                        assert_eq!(message, "Status doesn't match the selected status.");
                        assert_eq!(expected, "Proposed");
                        assert_eq!(actual, "Cancelled");
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }

            #[tokio::test(start_paused = true)]
            async fn test_fails_on_empty_results() {
                let mut session = Session::new(Arc::new(filter_panel(Vec::new(), &["Proposed"])), config());
                let err = tc07(&mut session).await.unwrap_err();
                assert_eq!(assertion_message(err), "No records found for selected status.");
            }
        }

        mod supply_filter {
            use super::*;

            #[tokio::test(start_paused = true)]
            async fn test_many_expandable_rows_without_items_fail() {
                let driver = Arc::new(
                    filter_panel(Vec::new(), &["Soap"])
                        .with_elements(By::class_name(SuppliesOrderPage::EXPAND), expand_icons(60)),
                );
                let mut session = Session::new(driver, config());
                let err = tc09(&mut session).await.unwrap_err();
                assert_eq!(assertion_message(err), "No items found for selected supply.");
            }

            #[tokio::test(start_paused = true)]
            async fn test_stuck_expand_toggle_is_bounded_then_supply_checked() {
                let icons = expand_icons(3);
                let driver = Arc::new(
                    filter_panel(Vec::new(), &["Soap"])
                        .with_elements(By::class_name(SuppliesOrderPage::EXPAND), icons.clone())
                        .with_elements(By::css(SuppliesOrderPage::ITEM_ROWS), [item_row("Towels"), item_row("Soap")]),
                );
                let mut session = Session::new(driver, config());
                tc09(&mut session).await.unwrap();
                assert_eq!(icons[0].call_count("click"), MAX_EXPANDS_PER_ROUND);
            }

            #[tokio::test(start_paused = true)]
            async fn test_items_of_other_supplies_fail() {
                let driver = Arc::new(
                    filter_panel(Vec::new(), &["Soap"])
                        .with_elements(By::css(SuppliesOrderPage::ITEM_ROWS), [item_row("Towels")]),
                );
                let mut session = Session::new(driver, config());
                let err = tc09(&mut session).await.unwrap_err();
                assert_eq!(assertion_message(err), "Results don't match the selected supplies.");
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_date_from_filter_types_into_focused_input() {
            let input = MockElement::new("from").into_ref();
            let driver = Arc::new(
                listing()
                    .with_element(By::css(FiltersPage::DATE_FROM), input.clone())
                    .with_active(input.clone()),
            );
            let session = Session::new(driver, config());
            let mut filters = FiltersPage::new(session.driver());
            let at = enter_filter_date(&session, &mut filters, DateBound::From, FILTER_FROM)
                .await
                .unwrap();
            assert_eq!(at, parse_date_time(FILTER_FROM).unwrap());
            assert_eq!(input.call_count("click"), 1);
            assert_eq!(input.value(), "250420250200PM");
        }

        #[tokio::test(start_paused = true)]
        async fn test_checklist_print_done() {
            let checklist = MockElement::new("checklist").into_ref();
            let driver = Arc::new(
                listing()
                    .with_elements(
                        By::css(SuppliesOrderPage::HEADER_BUTTONS),
                        [checklist.clone(), MockElement::new("filter").into_ref()],
                    )
                    .with_frame_element(
                        By::class_name(PageBase::PRINT_FRAME),
                        By::class_name(PageBase::PRINT_MESSAGE),
                        MockElement::new("status").with_text("Done. 1 page loaded.").into_ref(),
                    ),
            );
            let mut session = Session::new(driver.clone(), config());
            tc26(&mut session).await.unwrap();
            assert_eq!(checklist.call_count("click"), 1);
            assert!(driver.current_frame().is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_print_without_status_message_fails() {
            let driver = Arc::new(
                listing()
                    .with_elements(
                        By::css(SuppliesOrderPage::HEADER_BUTTONS),
                        [MockElement::new("checklist").into_ref(), MockElement::new("filter").into_ref()],
                    )
                    .with_frame_element(
                        By::class_name(PageBase::PRINT_FRAME),
                        By::css("div.report"),
                        MockElement::new("report").into_ref(),
                    ),
            );
            let mut session = Session::new(driver, config());
            match tc26(&mut session).await.unwrap_err() {
                E2eError::Assertion { message, .. } => {
                    assert_eq!(message, "Print message of checklist not displayed!");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_captured_order_cases_depend_on_creation() {
        let suite = suite();
        for id in ["tc01", "tc03", "tc05"] {
            assert_eq!(suite.case(id).unwrap().depends_on, vec![ACCOMPLISHED_CREATED.to_string()]);
        }
        for id in ["tc02", "tc04", "tc06"] {
            assert_eq!(suite.case(id).unwrap().depends_on, vec![PROPOSED_CREATED.to_string()]);
        }
        assert!(suite.case("tc07").unwrap().depends_on.is_empty());
    }
}
