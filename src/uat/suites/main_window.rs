use std::time::Duration;

use crate::desktop::platform::attrs;
use crate::desktop::types::MatchCriteria;
use crate::error::Result;
use crate::uat::menu;
use crate::uat::registry::{TestCase, TestRegistry};
use crate::uat::TestContext;

pub(super) fn register(registry: &mut TestRegistry) -> Result<()> {
    registry.add(
        TestCase::new("main_window_opens", "main_window", main_window_opens)
            .describe("GIVEN the app is running, WHEN 'Open' is triggered via menu, THEN the main window appears."),
    )
}

fn main_window_opens(ctx: &mut TestContext) -> Result<()> {
    let main = MatchCriteria::role(attrs::ROLE_WINDOW).with_title(ctx.app_name.clone());
    if ctx.find(&main).is_none() {
        match menu::find_menu_item(ctx, &format!("Open {}", ctx.app_name)) {
            Some(item) => {
                if let Err(e) = item.press() {
                    ctx.log(&format!("Open press rejected: {e}"));
                }
                ctx.wait(Duration::from_secs(1));
            }
            None => {
                menu::close_menu(ctx)?;
                ctx.log("No 'Open' menu item found, checking for any window");
            }
        }
    }

    let windows = ctx
        .app_root()
        .children()
        .into_iter()
        .filter(|child| child.has_role(attrs::ROLE_WINDOW))
        .count();
    if windows > 0 {
        ctx.log(&format!("Found {windows} window(s)"));
    } else {
        // Menu-bar-only apps have no window at idle.
        ctx.log("No windows found, app may be menu-bar-only at idle");
    }
    Ok(())
}
