//! End-to-end runner behavior over the in-memory desktop.

use std::cell::RefCell;
use std::rc::Rc;

use ax_uat::desktop::platform::fake::{FakeAccessor, FakeElement, FakeProcesses, RecordingInput};
use ax_uat::desktop::Desktop;
use ax_uat::uat::{RunSummary, Runner, Selection, TestRegistry, TestStatus};
use ax_uat::{Config, HarnessError};

const PID: u32 = 4242;

fn app() -> FakeElement {
    FakeElement::new("AXApplication")
        .title("EnviousWispr")
        .child(FakeElement::new("AXWindow").title("EnviousWispr"))
}

/// Desktop plus a handle on the accessor so tests can see which pids were queried
fn desktop(running: bool) -> (Desktop, Rc<FakeAccessor>) {
    let accessor = Rc::new(FakeAccessor::new(app()));
    let processes = if running {
        FakeProcesses::default().with_process(&Config::immediate().app_name, PID, 150.0)
    } else {
        FakeProcesses::default()
    };
    let desktop = Desktop::new(
        Config::immediate(),
        Box::new(Rc::clone(&accessor)),
        Box::new(RecordingInput::default()),
    )
    .with_processes(processes);
    (desktop, accessor)
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_suite_selection_runs_only_that_suite() {
    let (desktop, _) = desktop(true);
    let mut registry = TestRegistry::new();
    registry.register("t1", "s1", |_| Ok(())).unwrap();
    registry.register("t2", "s1", |_| Ok(())).unwrap();
    registry.register("t3", "s2", |_| Ok(())).unwrap();

    let results = Runner::new(&registry, &desktop)
        .run_selection(&Selection::Suite("s1".into()))
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "t1");
    assert_eq!(results[1].name, "t2");
    assert!(results.iter().all(|r| r.status == TestStatus::Pass));
}

#[test]
fn test_unknown_suite_is_not_found() {
    let (desktop, _) = desktop(true);
    let mut registry = TestRegistry::new();
    registry.register("t1", "s1", |_| Ok(())).unwrap();

    let err = Runner::new(&registry, &desktop)
        .run_selection(&Selection::Suite("nope".into()))
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_outcome_classification() {
    let (desktop, _) = desktop(true);
    let mut registry = TestRegistry::new();
    registry.register("passes", "s", |ctx| {
        assert_eq!(ctx.pid, PID);
        Ok(())
    })
    .unwrap();
    registry
        .register("fails", "s", |_| Err(HarnessError::assertion("Element not found: role='AXSheet'")))
        .unwrap();
    registry
        .register("errors", "s", |_| Err(HarnessError::not_found("window")))
        .unwrap();
    registry.register("panics", "s", |_| panic!("index out of range")).unwrap();

    let results = Runner::new(&registry, &desktop).run(&names(&["passes", "fails", "errors", "panics", "ghost"]));
    let statuses: Vec<TestStatus> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        [TestStatus::Pass, TestStatus::Fail, TestStatus::Error, TestStatus::Error, TestStatus::Skip]
    );

    assert_eq!(results[1].message, "Element not found: role='AXSheet'");
    assert_eq!(results[1].details, serde_json::json!({}));

    assert_eq!(results[2].message, "Not found: window");
    assert!(results[2].details["trace"].as_str().unwrap().starts_with("not_found"));

    assert_eq!(results[3].message, "index out of range");
    assert!(results[3].details["trace"].as_str().unwrap().contains("index out of range"));

    assert_eq!(results[4].message, "Unknown test: ghost");
    assert_eq!(results[4].duration_s, 0.0);

    let summary = RunSummary::from_results(results);
    assert_eq!((summary.passed, summary.failed, summary.errors, summary.skipped), (1, 1, 2, 1));
    assert!(!summary.all_passed);
}

#[test]
fn test_unknown_test_never_touches_the_app() {
    let (desktop, accessor) = desktop(true);
    let registry = TestRegistry::new();

    let results = Runner::new(&registry, &desktop).run(&names(&["ghost"]));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TestStatus::Skip);
    assert!(accessor.requested_pids().is_empty());
}

#[test]
fn test_cleanups_run_lifo_after_failure() {
    let (desktop, _) = desktop(true);
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut registry = TestRegistry::new();

    let seen = Rc::clone(&order);
    registry
        .register("with_cleanups", "s", move |ctx| {
            for (label, fails) in [("c1", false), ("c2", true), ("c3", false)] {
                let seen = Rc::clone(&seen);
                ctx.on_cleanup(move |_| {
                    seen.borrow_mut().push(label);
                    if fails {
                        Err(HarnessError::assertion("cleanup failed"))
                    } else {
                        Ok(())
                    }
                });
            }
            seen.borrow_mut().push("body");
            Err(HarnessError::assertion("body failed"))
        })
        .unwrap();

    let results = Runner::new(&registry, &desktop).run(&names(&["with_cleanups"]));
    assert_eq!(results[0].status, TestStatus::Fail);
    assert_eq!(results[0].message, "body failed");
    assert_eq!(order.borrow().as_slice(), ["body", "c3", "c2", "c1"]);
}

#[test]
fn test_cleanups_run_after_panic() {
    let (desktop, _) = desktop(true);
    let ran = Rc::new(RefCell::new(false));
    let mut registry = TestRegistry::new();

    let flag = Rc::clone(&ran);
    registry
        .register("panics_late", "s", move |ctx| {
            let flag = Rc::clone(&flag);
            ctx.on_cleanup(move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            });
            panic!("late failure");
        })
        .unwrap();

    let results = Runner::new(&registry, &desktop).run(&names(&["panics_late"]));
    assert_eq!(results[0].status, TestStatus::Error);
    assert!(*ran.borrow());
}

#[test]
fn test_missing_process_short_circuits() {
    let (desktop, accessor) = desktop(false);
    let calls = Rc::new(RefCell::new(0));
    let mut registry = TestRegistry::new();

    let counter = Rc::clone(&calls);
    registry
        .register("t1", "s1", move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        })
        .unwrap();

    let results = Runner::new(&registry, &desktop).run(&names(&["t1", "ghost"]));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "setup");
    assert_eq!(results[0].status, TestStatus::Error);
    assert_eq!(*calls.borrow(), 0);
    assert!(accessor.requested_pids().is_empty());
}
