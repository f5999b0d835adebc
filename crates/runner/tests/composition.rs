//! Hook composition across the registry, executor and render pass

use std::cell::RefCell;
use std::rc::Rc;

use thyme_common::{Location, Nesting, Page, PageHandle};
use thyme_runner::render::{build_results, ITEM_TAG};
use thyme_runner::{Contribution, Executor, Registry, RunSummary, Test, TestNode, TestRef};

type Log = Rc<RefCell<Vec<String>>>;

fn page() -> PageHandle {
    PageHandle::new(Page::new("composition", Location::new("index.html")))
}

fn wrapping(log: &Log, name: &str) -> Contribution {
    let log = log.clone();
    let label = name.to_string();
    Contribution::new(name).on_test_execute(move |proceed, _, _| {
        log.borrow_mut().push(format!("{}:in", label));
        proceed.run();
        log.borrow_mut().push(format!("{}:out", label));
    })
}

fn withholding(log: &Log, name: &str) -> Contribution {
    let log = log.clone();
    let label = name.to_string();
    Contribution::new(name).on_test_execute(move |_proceed, _, _| {
        log.borrow_mut().push(format!("{}:withheld", label));
    })
}

fn run_once(registry: &Registry, log: &Log) {
    let executor = Executor::new(registry, page(), Nesting::OuterFirst);
    let node: TestRef = Test::new("node");
    let body_log = log.clone();
    executor.execute(&node, move || body_log.borrow_mut().push("body".to_string()));
}

#[test]
fn test_registration_order_decides_nesting() {
    for names in [["a", "b", "c"], ["c", "b", "a"]] {
        let log: Log = Rc::default();
        let mut registry = Registry::new();
        for name in names {
            registry.register(wrapping(&log, name));
        }
        run_once(&registry, &log);

        let mut expected: Vec<String> = names.iter().map(|n| format!("{}:in", n)).collect();
        expected.push("body".to_string());
        expected.extend(names.iter().rev().map(|n| format!("{}:out", n)));
        assert_eq!(*log.borrow(), expected);
    }
}

#[test]
fn test_withheld_proceed_cuts_inner_hooks_and_body() {
    let log: Log = Rc::default();
    let mut registry = Registry::new();
    registry.register(wrapping(&log, "outer"));
    registry.register(withholding(&log, "gate"));
    registry.register(wrapping(&log, "inner"));
    run_once(&registry, &log);

    assert_eq!(
        *log.borrow(),
        vec!["outer:in", "gate:withheld", "outer:out"]
    );
}

#[test]
fn test_hooks_without_execute_do_not_join_the_chain() {
    let log: Log = Rc::default();
    let mut registry = Registry::new();
    registry.register(Contribution::new("render only").on_node_render(|_, _| {}));
    registry.register(wrapping(&log, "only"));
    run_once(&registry, &log);

    assert_eq!(*log.borrow(), vec!["only:in", "body", "only:out"]);
}

#[test]
fn test_counts_visit_only_leaves_at_any_depth() {
    let root = Test::new("root");
    let mut parent = root.clone();
    for depth in 0..5 {
        let next = parent.child(format!("level {}", depth));
        parent.child(format!("leaf {}", depth)).finish(Ok(()));
        parent = next;
    }
    parent.finish(Err("deepest".into()));

    let summary = RunSummary::count(&[root as TestRef]);
    assert_eq!(summary.total, 6);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_skipped_subtrees_never_reach_render_hooks() {
    let rendered: Log = Rc::default();
    let seen = rendered.clone();
    let mut registry = Registry::new();
    registry.register(Contribution::new("record").on_node_render(move |_, node| {
        seen.borrow_mut().push(node.full_key());
    }));

    let root = Test::new("root");
    let kept = root.child("kept");
    let dropped = root.child("dropped");
    dropped.child("inner");
    dropped.skip();

    let handle = page();
    let list = handle.update(|page| build_results(&registry, page, &[root.clone() as TestRef]));
    let items = handle.read(|page| page.query_tag_all(list.unwrap(), ITEM_TAG).len());

    assert_eq!(*rendered.borrow(), vec!["root", "root>kept"]);
    assert_eq!(items, 2);
    assert!(!kept.was_skipped());
}
