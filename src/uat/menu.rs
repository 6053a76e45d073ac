//! Status-bar menu helpers. Menu bar extra items stay out of the tree until
//! their menu is opened.

use std::time::Duration;

use super::context::TestContext;
use crate::desktop::platform::attrs;
use crate::desktop::types::MatchCriteria;
use crate::desktop::{Modifiers, Node};
use crate::error::Result;

/// Open the app's status menu by pressing its menu bar extra, falling back
/// to the first pressable regular menu bar item. Returns whether anything
/// accepted the press.
pub fn open_menu_bar_menu(ctx: &TestContext) -> bool {
    let app = ctx.app_root();

    let extra = app
        .element_attribute(attrs::EXTRAS_MENU_BAR)
        .and_then(|bar| bar.children().into_iter().next());
    if let Some(item) = extra {
        if item.perform_action(attrs::ACTION_PRESS) {
            ctx.log(&format!("Opened menu bar extra {item}"));
            ctx.wait(Duration::from_millis(500));
            return true;
        }
    }

    if let Some(bar) = app.element_attribute(attrs::MENU_BAR) {
        for item in bar.children() {
            if item.perform_action(attrs::ACTION_PRESS) {
                ctx.log(&format!("Opened menu bar item {item}"));
                ctx.wait(Duration::from_millis(500));
                return true;
            }
        }
    }

    ctx.log("No menu bar item accepted AXPress");
    false
}

/// Dismiss an open menu with Escape
pub fn close_menu(ctx: &TestContext) -> Result<()> {
    ctx.press("escape", Modifiers::NONE)?;
    ctx.wait(Duration::from_millis(300));
    Ok(())
}

/// Open the status menu and look up an item by title.
///
/// Exact title first, then a substring match so emoji-prefixed labels like
/// "🎙 Start Recording" still resolve. The menu is left open.
pub fn find_menu_item(ctx: &TestContext, title: &str) -> Option<Node> {
    open_menu_bar_menu(ctx);

    let exact = MatchCriteria::role(attrs::ROLE_MENU_ITEM).with_title(title);
    if let Some(item) = ctx.find(&exact) {
        return Some(item);
    }

    ctx.find_all(&MatchCriteria::role(attrs::ROLE_MENU_ITEM))
        .into_iter()
        .find(|item| item.title().unwrap_or_default().contains(title))
}

/// Titles of every menu item currently in the tree
pub fn menu_item_titles(ctx: &TestContext) -> Vec<String> {
    ctx.find_all(&MatchCriteria::role(attrs::ROLE_MENU_ITEM))
        .iter()
        .map(|item| item.title().unwrap_or_default())
        .collect()
}
