use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::uat::registry::{TestCase, TestRegistry};
use crate::uat::TestContext;

const ORIGINAL: &str = "UAT_ORIGINAL_CLIPBOARD_CONTENT";

pub(super) fn register(registry: &mut TestRegistry) -> Result<()> {
    registry.add(
        TestCase::new("clipboard_save_restore", "clipboard", clipboard_save_restore)
            .describe("GIVEN the user has content on the clipboard, THEN it survives a round trip through the pasteboard."),
    )
}

// A full transcription needs a microphone; this covers the pasteboard round trip.
fn clipboard_save_restore(ctx: &mut TestContext) -> Result<()> {
    ctx.set_clipboard(ORIGINAL)?;
    ctx.wait(Duration::from_millis(300));

    let restored = ctx.clipboard()?;
    if restored != ORIGINAL {
        return Err(HarnessError::assertion(format!(
            "Clipboard round-trip failed. Set {ORIGINAL:?}, got {restored:?}"
        )));
    }
    ctx.log("Clipboard save/restore API verified");
    Ok(())
}
