//! In-memory test tree and runner
//!
//! [`Test`] and [`TreeRunner`] are a small reference implementation of the
//! test-execution boundary. They execute depth-first, one node at a time,
//! and let leaves finish later through [`TreeRunner::resolve`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::execute::Executor;
use crate::node::{CompletionSender, Inspection, TestNode, TestRef, TestRunner, KEY_DELIMITER};

/// What a leaf does when executed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    /// Completes and passes immediately
    #[default]
    Pass,
    /// Completes immediately with a failure message
    Fail(String),
    /// Starts running and completes only when resolved
    Deferred,
}

/// Execution state of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotRun,
    Running,
    Complete,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotRun => write!(f, "not-run"),
            RunState::Running => write!(f, "running"),
            RunState::Complete => write!(f, "complete"),
        }
    }
}

/// A node of the in-memory test tree
pub struct Test {
    name: String,
    key: String,
    full_key: String,
    children: RefCell<Vec<Rc<Test>>>,
    body: RefCell<Body>,
    state: Cell<RunState>,
    skipped: Cell<bool>,
    error: RefCell<Option<String>>,
    inspection: RefCell<Option<Inspection>>,
}

impl Test {
    /// A top-level test.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        let key = key_for(&name);
        Rc::new(Self::with_keys(name, key.clone(), key))
    }

    /// Declare a child test below this one.
    pub fn child(self: &Rc<Self>, name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        let key = key_for(&name);
        let full_key = format!("{}{}{}", self.full_key, KEY_DELIMITER, key);
        let child = Rc::new(Self::with_keys(name, key, full_key));
        self.children.borrow_mut().push(child.clone());
        child
    }

    fn with_keys(name: String, key: String, full_key: String) -> Self {
        Self {
            name,
            key,
            full_key,
            children: RefCell::new(Vec::new()),
            body: RefCell::new(Body::default()),
            state: Cell::new(RunState::NotRun),
            skipped: Cell::new(false),
            error: RefCell::new(None),
            inspection: RefCell::new(None),
        }
    }

    pub fn set_body(&self, body: Body) {
        *self.body.borrow_mut() = body;
    }

    pub fn set_inspection(&self, inspection: Inspection) {
        *self.inspection.borrow_mut() = Some(inspection);
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Mark the node complete with the given outcome.
    pub fn finish(&self, outcome: Result<(), String>) {
        *self.error.borrow_mut() = outcome.err();
        self.state.set(RunState::Complete);
    }

    /// The node at `full_key` in this subtree.
    pub fn find(self: &Rc<Self>, full_key: &str) -> Option<Rc<Test>> {
        if self.full_key == full_key {
            return Some(self.clone());
        }
        let prefix = format!("{}{}", self.full_key, KEY_DELIMITER);
        if !full_key.starts_with(&prefix) {
            return None;
        }
        self.children
            .borrow()
            .iter()
            .find_map(|child| child.find(full_key))
    }

    fn child_tests(&self) -> Vec<Rc<Test>> {
        self.children.borrow().clone()
    }

    fn shown_children(&self) -> Vec<Rc<Test>> {
        self.child_tests()
            .into_iter()
            .filter(|child| !child.was_skipped())
            .collect()
    }

    /// Apply a leaf body. Returns true when the leaf now awaits resolution.
    fn settle(&self) -> bool {
        let body = self.body.borrow().clone();
        match body {
            Body::Pass => {
                self.finish(Ok(()));
                false
            }
            Body::Fail(message) => {
                self.finish(Err(message));
                false
            }
            Body::Deferred => true,
        }
    }
}

fn key_for(name: &str) -> String {
    name.trim().to_lowercase()
}

impl TestNode for Test {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn key(&self) -> String {
        self.key.clone()
    }

    fn full_key(&self) -> String {
        self.full_key.clone()
    }

    fn children(&self) -> Vec<TestRef> {
        self.child_tests()
            .into_iter()
            .map(|child| child as TestRef)
            .collect()
    }

    fn is_complete(&self) -> bool {
        if self.children.borrow().is_empty() {
            return self.state.get() == RunState::Complete;
        }
        self.state.get() != RunState::NotRun
            && self.shown_children().iter().all(|child| child.is_complete())
    }

    fn has_passed(&self) -> bool {
        if self.error.borrow().is_some() {
            return false;
        }
        if self.children.borrow().is_empty() {
            return self.state.get() == RunState::Complete;
        }
        self.shown_children().iter().all(|child| child.has_passed())
    }

    fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    fn skip(&self) {
        self.skipped.set(true);
    }

    fn was_skipped(&self) -> bool {
        self.skipped.get()
    }

    fn inspect(&self) -> Option<Inspection> {
        self.inspection.borrow().clone()
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("full_key", &self.full_key)
            .field("state", &self.state.get())
            .field("skipped", &self.skipped.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// Runs a forest of [`Test`]s depth-first.
///
/// The completion sender is held until every deferred leaf is resolved or
/// the run is aborted.
#[derive(Debug, Default)]
pub struct TreeRunner {
    tests: Vec<Rc<Test>>,
    completions: RefCell<Option<CompletionSender>>,
    awaiting: RefCell<Vec<Rc<Test>>>,
    aborted: Cell<bool>,
}

impl TreeRunner {
    pub fn new(tests: Vec<Rc<Test>>) -> Self {
        Self {
            tests,
            ..Default::default()
        }
    }

    /// Top-level tests with their concrete type.
    pub fn roots(&self) -> &[Rc<Test>] {
        &self.tests
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }

    /// Number of deferred leaves still running.
    pub fn awaiting(&self) -> usize {
        self.awaiting.borrow().len()
    }

    /// Finish a deferred leaf and report its top-level test.
    pub fn resolve(&self, full_key: &str, outcome: Result<(), String>) -> RunnerResult<()> {
        let leaf = {
            let mut awaiting = self.awaiting.borrow_mut();
            let position = awaiting
                .iter()
                .position(|test| test.full_key == full_key)
                .ok_or_else(|| RunnerError::NotPending(full_key.to_string()))?;
            awaiting.remove(position)
        };

        debug!("Resolved deferred test {} (passed: {})", full_key, outcome.is_ok());
        leaf.finish(outcome);

        if let Some(root) = self.tests.iter().find(|root| root.find(full_key).is_some()) {
            self.report(root);
        }
        self.release_if_settled();
        Ok(())
    }

    fn run_node(&self, executor: &Executor, node: &Rc<Test>) {
        let test: TestRef = node.clone();
        executor.execute(&test, || {
            if self.aborted.get() || node.was_skipped() {
                return;
            }
            node.state.set(RunState::Running);

            let children = node.child_tests();
            if children.is_empty() {
                if node.settle() {
                    self.awaiting.borrow_mut().push(node.clone());
                }
            } else {
                for child in &children {
                    self.run_node(executor, child);
                }
            }
        });
    }

    fn report(&self, root: &Rc<Test>) {
        if let Some(completions) = self.completions.borrow().as_ref() {
            completions.complete(root.clone());
        }
    }

    fn release_if_settled(&self) {
        if self.awaiting.borrow().is_empty() && self.completions.borrow_mut().take().is_some() {
            debug!("All tests settled, closing completion channel");
        }
    }
}

impl TestRunner for TreeRunner {
    fn tests(&self) -> Vec<TestRef> {
        self.tests.iter().map(|test| test.clone() as TestRef).collect()
    }

    fn start(&self, executor: Executor, completions: CompletionSender) {
        info!("Running {} top-level test(s)...", self.tests.len());
        *self.completions.borrow_mut() = Some(completions);

        for root in &self.tests {
            if self.aborted.get() {
                break;
            }
            self.run_node(&executor, root);
            self.report(root);
        }

        self.release_if_settled();
    }

    fn abort(&self) {
        if self.aborted.replace(true) {
            return;
        }
        info!("Run aborted");
        self.completions.borrow_mut().take();
    }
}
