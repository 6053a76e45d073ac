use crate::desktop::platform::attrs;
use crate::error::{HarnessError, Result};
use crate::uat::assertions::{self, AssertionExt};
use crate::uat::menu;
use crate::uat::registry::{TestCase, TestRegistry};
use crate::uat::TestContext;

const SUITE: &str = "app_basics";
const MEMORY_LIMIT_MB: f64 = 500.0;
const EXPECTED_MENU_ITEMS: [&str; 4] = ["Start Recording", "Record + AI Polish", "Settings", "Quit"];

pub(super) fn register(registry: &mut TestRegistry) -> Result<()> {
    registry.add(
        TestCase::new("app_is_running", SUITE, app_is_running)
            .describe("GIVEN the app should be running, THEN it has a live process."),
    )?;
    registry.add(
        TestCase::new("menu_bar_status_item_exists", SUITE, status_item_exists)
            .describe("GIVEN the app is running, THEN a status item appears in the menu bar."),
    )?;
    registry.add(
        TestCase::new("menu_bar_has_menu_items", SUITE, menu_has_items)
            .describe("GIVEN the app is running, WHEN the menu bar menu is opened, THEN expected menu items are discoverable."),
    )?;
    registry.add(
        TestCase::new("memory_within_bounds", SUITE, memory_within_bounds)
            .describe("GIVEN the app is running idle, THEN memory usage is below 500MB."),
    )
}

fn app_is_running(ctx: &mut TestContext) -> Result<()> {
    assertions::process_running(ctx, &ctx.app_name)?;
    ctx.log(&format!("PID: {}", ctx.pid));
    Ok(())
}

fn status_item_exists(ctx: &mut TestContext) -> Result<()> {
    assertions::process_running(ctx, &ctx.app_name)?;
    let role = ctx.app_root().role().unwrap_or_default();
    if role != attrs::ROLE_APPLICATION {
        return Err(HarnessError::assertion(format!("Expected AXApplication, got {role}")));
    }
    Ok(())
}

fn menu_has_items(ctx: &mut TestContext) -> Result<()> {
    if !menu::open_menu_bar_menu(ctx) {
        return Err(HarnessError::assertion("Could not open the menu bar menu via AX"));
    }
    ctx.on_cleanup(menu::close_menu);

    let titles = menu::menu_item_titles(ctx);
    ctx.log(&format!("All menu item titles: {titles:?}"));

    let found: Vec<&str> = EXPECTED_MENU_ITEMS
        .into_iter()
        .filter(|needle| titles.iter().any(|t| t.contains(needle)))
        .collect();
    ctx.log(&format!("Found menu items: {found:?}"));

    if found.is_empty() {
        return Err(HarnessError::assertion(format!(
            "No expected menu items found. Checked: {EXPECTED_MENU_ITEMS:?}. Actual: {titles:?}"
        )));
    }
    Ok(())
}

fn memory_within_bounds(ctx: &mut TestContext) -> Result<()> {
    let mem = assertions::memory_below(ctx, MEMORY_LIMIT_MB)
        .or_fail_with("Idle memory exceeds 500MB, possible model leak")?;
    ctx.log(&format!("Memory: {mem:.1}MB"));
    Ok(())
}
