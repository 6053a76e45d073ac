//! Built-in acceptance suites for the menu-bar dictation app.

mod app_basics;
mod cancel_recording;
mod clipboard;
mod main_window;
mod settings;

use super::registry::TestRegistry;
use crate::error::Result;

/// Register every built-in suite, in a fixed order
pub fn register_all(registry: &mut TestRegistry) -> Result<()> {
    app_basics::register(registry)?;
    cancel_recording::register(registry)?;
    settings::register(registry)?;
    clipboard::register(registry)?;
    main_window::register(registry)?;
    Ok(())
}

/// Registry holding just the built-in suites
pub fn builtin() -> Result<TestRegistry> {
    let mut registry = TestRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}
