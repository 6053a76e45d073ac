//! Built-in suites against a scripted copy of the menu-bar app.

use ax_uat::desktop::platform::fake::{
    ActionLog, FakeAccessor, FakeClipboard, FakeElement, FakeProcesses, RecordingInput,
};
use ax_uat::desktop::Desktop;
use ax_uat::uat::{suites, RunSummary, Runner, Selection, TestStatus};
use ax_uat::Config;

const PID: u32 = 501;
const TABS: [&str; 4] = ["Shortcuts", "AI Polish", "Permissions", "Speech Engine"];

fn menu_item(title: &str, log: &ActionLog) -> FakeElement {
    FakeElement::new("AXMenuItem").title(title).pressable().logging_to(log)
}

fn settings_window() -> FakeElement {
    let rows = TABS.iter().enumerate().map(|(i, tab)| {
        FakeElement::new("AXRow")
            .frame(20.0, 100.0 + 30.0 * i as f64, 180.0, 28.0)
            .child(FakeElement::new("AXCell").child(FakeElement::new("AXStaticText").value(*tab)))
    });
    FakeElement::new("AXWindow")
        .title("EnviousWispr Settings")
        .frame(200.0, 100.0, 700.0, 500.0)
        .child(
            FakeElement::new("AXSplitGroup")
                .child(FakeElement::new("AXScrollArea").child(FakeElement::new("AXOutline").children(rows))),
        )
}

fn full_app(log: &ActionLog) -> FakeElement {
    let status_menu = FakeElement::new("AXMenu")
        .child(menu_item("🎙 Start Recording", log))
        .child(menu_item("✨ Record + AI Polish", log))
        .child(menu_item("Settings...", log))
        .child(menu_item("Quit EnviousWispr", log));
    FakeElement::new("AXApplication")
        .title("EnviousWispr")
        .satellite(
            "AXExtrasMenuBar",
            FakeElement::new("AXMenuBar").child(
                FakeElement::new("AXMenuBarItem")
                    .title("EnviousWispr")
                    .pressable()
                    .logging_to(log)
                    .child(status_menu),
            ),
        )
        .child(settings_window())
}

fn desktop(root: FakeElement, memory_mb: f64, input: &RecordingInput) -> Desktop {
    Desktop::new(Config::immediate(), Box::new(FakeAccessor::new(root)), Box::new(input.clone()))
        .with_processes(FakeProcesses::default().with_process("EnviousWispr", PID, memory_mb))
        .with_clipboard(FakeClipboard::default())
}

#[test]
fn test_all_builtin_suites_pass_against_healthy_app() {
    let log = ActionLog::default();
    let input = RecordingInput::default();
    let desktop = desktop(full_app(&log), 180.0, &input);
    let registry = suites::builtin().unwrap();

    let results = Runner::new(&registry, &desktop).run_selection(&Selection::All).unwrap();
    let failures: Vec<String> = results
        .iter()
        .filter(|r| r.status != TestStatus::Pass)
        .map(|r| format!("{} {}: {}", r.status, r.name, r.message))
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:?}");

    let summary = RunSummary::from_results(results);
    assert_eq!(summary.total, 12);
    assert!(summary.all_passed);

    let pressed = log.borrow();
    assert!(pressed.contains(&"🎙 Start Recording AXPress".to_string()));
    assert!(pressed.contains(&"Settings... AXPress".to_string()));
}

#[test]
fn test_tab_switching_clicks_each_row() {
    let log = ActionLog::default();
    let input = RecordingInput::default();
    let desktop = desktop(full_app(&log), 180.0, &input);
    let registry = suites::builtin().unwrap();

    let results = Runner::new(&registry, &desktop).run(&["settings_tab_switching_works".to_string()]);
    assert_eq!(results[0].status, TestStatus::Pass);

    let downs: Vec<String> = input
        .events()
        .into_iter()
        .filter(|e| e.starts_with("down"))
        .collect();
    // AI Polish is the second row, clicked first.
    assert_eq!(downs, ["down 110,144 Left", "down 110,174 Left", "down 110,204 Left", "down 110,114 Left"]);
}

#[test]
fn test_bare_app_fails_menu_tests() {
    let input = RecordingInput::default();
    let desktop = desktop(FakeElement::new("AXApplication"), 900.0, &input);
    let registry = suites::builtin().unwrap();

    let names: Vec<String> = ["menu_bar_has_menu_items", "esc_cancels_recording_via_menu", "memory_within_bounds", "app_is_running"]
        .iter()
        .map(|n| n.to_string())
        .collect();
    let results = Runner::new(&registry, &desktop).run(&names);

    assert_eq!(results[0].status, TestStatus::Fail);
    assert_eq!(results[0].message, "Could not open the menu bar menu via AX");
    assert_eq!(results[1].status, TestStatus::Fail);
    assert_eq!(results[1].message, "Could not find 'Start Recording' menu item");
    assert_eq!(results[2].status, TestStatus::Fail);
    assert_eq!(results[2].message, "Idle memory exceeds 500MB, possible model leak");
    assert_eq!(results[3].status, TestStatus::Pass);
}

#[test]
fn test_cancel_keeps_clipboard_sentinel() {
    let log = ActionLog::default();
    let input = RecordingInput::default();
    let clipboard = FakeClipboard::default();
    let desktop = desktop(full_app(&log), 180.0, &input).with_clipboard(clipboard.clone());
    let registry = suites::builtin().unwrap();

    let results = Runner::new(&registry, &desktop).run(&["esc_no_clipboard_write_on_cancel".to_string()]);
    assert_eq!(results[0].status, TestStatus::Pass);
    assert_eq!(clipboard.contents(), "UAT_SENTINEL_DO_NOT_OVERWRITE");

    // Escape from the body, then again from the cleanup.
    let escapes = input.events().iter().filter(|e| e.starts_with("key 53 down")).count();
    assert_eq!(escapes, 2);
}
