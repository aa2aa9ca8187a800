//! Setup > Supplies Unit Usages: add and edit a usage rule.

use super::expect_within;
use crate::harness::{TestCase, TestFuture, TestSuite};
use crate::pages::{DashboardPage, FormMode, PageObject, SuppliesUnitUsagesPage, EXPECTED_SAVE_TOAST};
use crate::result::E2eResult;
use crate::session::Session;
use crate::wait::{wait_until, Waits};
use tracing::info;

/// Suite name
pub const NAME: &str = "supplies_unit_usages";

const UNIT_TYPE: &str = "Room with Hall";
const EDITED_UNIT_TYPE: &str = "Two Rooms with Hall";
const CATEGORY: &str = "meals";
const SUPPLY: &str = "meals_first";

/// The supplies unit usages suite
#[must_use]
pub fn suite() -> TestSuite {
    TestSuite::new(NAME)
        .with_case(TestCase::new("tc01", "Open supplies unit usages from the menu", tc01))
        .with_case(TestCase::new("tc02", "Add a supplies unit usage", tc02).depends_on("tc01"))
        .with_case(TestCase::new("tc03", "Edit a supplies unit usage", tc03).depends_on("tc02"))
}

/// Quantities typed into one usage line
#[derive(Debug, Clone, Copy)]
struct Usage<'a> {
    unit_type: &'a str,
    daily: &'a str,
    weekly: &'a str,
}

async fn wait_loaded(page: &SuppliesUnitUsagesPage) -> E2eResult<()> {
    expect_within(
        wait_until(Waits::UntilLoads.options(), "supplies unit usages", || page.is_loaded()).await,
        "Supplies unit usages page didn't load",
    )?;
    Ok(())
}

async fn open_usages(session: &Session) -> E2eResult<SuppliesUnitUsagesPage> {
    let page = SuppliesUnitUsagesPage::new(session.driver());
    session.open_page(&page).await?;
    wait_loaded(&page).await?;
    Ok(page)
}

/// Fill one line, append it and save the dialog
async fn save_usage(session: &Session, page: &SuppliesUnitUsagesPage, usage: Usage<'_>, mode: FormMode) -> E2eResult<()> {
    page.select_unit_type(usage.unit_type)
        .await?
        .select_category(CATEGORY, mode)
        .await?
        .select_supply(SUPPLY, mode)
        .await?
        .enter_quantities(usage.daily, usage.weekly)
        .await?
        .append()
        .await?
        .save()
        .await?;
    DashboardPage::new(session.driver())
        .assert_toast(EXPECTED_SAVE_TOAST)
        .await?;
    info!(unit_type = usage.unit_type, ?mode, "usage saved");
    Ok(())
}

/// Narrow the grid to `unit_type` and check every row has it
async fn filter_grid(page: &SuppliesUnitUsagesPage, unit_type: &str) -> E2eResult<()> {
    page.click_filter()
        .await?
        .filter_by_unit_type(unit_type)
        .await?
        .click_search()
        .await?;
    page.assert_grid_unit_types(unit_type).await
}

fn tc01(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let dashboard = DashboardPage::new(session.driver());
        session.open_page(&dashboard).await?;
        dashboard.dismiss_verification_prompt().await?;
        dashboard.open_supplies_unit_usages().await?;

        let page = SuppliesUnitUsagesPage::new(session.driver());
        session
            .wait_for_page_to_load(&page.url(&session.config().base_url))
            .await?;
        wait_loaded(&page).await
    })
}

fn tc02(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_usages(session).await?;
        page.click_add_new().await?;
        let usage = Usage {
            unit_type: UNIT_TYPE,
            daily: "1",
            weekly: "2",
        };
        save_usage(session, &page, usage, FormMode::Add).await?;
        filter_grid(&page, UNIT_TYPE).await
    })
}

fn tc03(session: &mut Session) -> TestFuture<'_> {
    Box::pin(async move {
        let page = open_usages(session).await?;
        filter_grid(&page, UNIT_TYPE).await?;
        page.click_edit().await?.delete_record().await?;
        let usage = Usage {
            unit_type: EDITED_UNIT_TYPE,
            daily: "3",
            weekly: "3",
        };
        save_usage(session, &page, usage, FormMode::Edit).await
    })
}
