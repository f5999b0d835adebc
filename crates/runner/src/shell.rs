//! Host runner shell
//!
//! Owns the registry, the page and the black-box runner for one run:
//!
//! ```text
//! Idle -> PageBuilding -> Running -> DebouncingCompletion -> Idle
//! ```
//!
//! Every completed top-level node has its result subtree rebuilt from
//! scratch and re-arms the debounce timer. When the timer fires the shell
//! counts the tree and hands the summary to every run-complete hook.

use std::fmt;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use thyme_common::{ElementId, Nesting, Page, PageHandle, ThymeConfig};
use tokio::time::{self, Instant, Sleep};
use tracing::{debug, info};

use crate::contribution::Registry;
use crate::execute::Executor;
use crate::node::{completion_channel, TestRef, TestRunner};
use crate::render::{build_results, setup_page, PageRegions};
use crate::summary::RunSummary;

/// DOM id of the summary and controls region
pub const HEADER_ID: &str = "thyme-header";

/// DOM id of the rendered results region
pub const RESULTS_ID: &str = "thyme-results";

/// Default quiet period before a run-complete signal
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Lifecycle state of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    PageBuilding,
    Running,
    DebouncingCompletion,
}

impl fmt::Display for ShellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellState::Idle => write!(f, "idle"),
            ShellState::PageBuilding => write!(f, "page-building"),
            ShellState::Running => write!(f, "running"),
            ShellState::DebouncingCompletion => write!(f, "debouncing-completion"),
        }
    }
}

/// Cancel-and-reschedule timer. At most one signal is ever pending.
struct Debounce {
    window: Duration,
    timer: Pin<Box<Sleep>>,
    armed: bool,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            timer: Box::pin(time::sleep(window)),
            armed: false,
        }
    }

    /// Arm the timer, pushing back any pending deadline.
    fn arm(&mut self) {
        self.timer.as_mut().reset(Instant::now() + self.window);
        self.armed = true;
    }

    /// Wait for the pending deadline, if any. Returns whether one was pending.
    async fn flush(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.timer.as_mut().await;
        self.armed = false;
        true
    }
}

/// Result lists currently on the page, one per top-level node. Nodes are
/// told apart by identity since keys need not be unique.
#[derive(Default)]
struct Rendered(Vec<(TestRef, ElementId)>);

impl Rendered {
    fn take(&mut self, node: &TestRef) -> Option<ElementId> {
        let index = self.0.iter().position(|(shown, _)| Rc::ptr_eq(shown, node))?;
        Some(self.0.swap_remove(index).1)
    }

    fn insert(&mut self, node: &TestRef, list: ElementId) {
        self.0.push((node.clone(), list));
    }
}

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    /// The page, with every contribution's decoration applied
    pub page: PageHandle,
    /// Summary handed to the last run-complete signal
    pub summary: RunSummary,
    /// Top-level completion events received
    pub completions: usize,
    /// Run-complete signals fired
    pub signals: usize,
}

/// Drives one run of a [`TestRunner`] and renders it onto a page.
pub struct Shell {
    registry: Registry,
    runner: Rc<dyn TestRunner>,
    page: PageHandle,
    nesting: Nesting,
    debounce: Duration,
    state: ShellState,
}

impl Shell {
    pub fn new(registry: Registry, runner: Rc<dyn TestRunner>, page: Page) -> Self {
        Self {
            registry,
            runner,
            page: PageHandle::new(page),
            nesting: Nesting::default(),
            debounce: DEFAULT_DEBOUNCE,
            state: ShellState::Idle,
        }
    }

    /// Apply the nesting order and debounce window from `config`.
    pub fn configure(self, config: &ThymeConfig) -> Self {
        self.with_nesting(config.nesting).with_debounce(config.debounce())
    }

    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    pub fn page(&self) -> &PageHandle {
        &self.page
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    fn transition(&mut self, next: ShellState) {
        if self.state != next {
            debug!("Shell {} -> {}", self.state, next);
            self.state = next;
        }
    }

    /// Build the page, start the runner and process completions until the
    /// runner releases its completion sender.
    ///
    /// A run that reports no completion at all still gets one run-complete
    /// signal.
    pub async fn run(mut self) -> RunOutcome {
        self.transition(ShellState::PageBuilding);
        let regions = self.build_page();

        self.transition(ShellState::Running);
        let (completions, mut events) = completion_channel();
        let executor = Executor::new(&self.registry, self.page.clone(), self.nesting);
        info!(
            "Starting run with {} contribution(s), {} execution hook(s)",
            self.registry.len(),
            executor.depth()
        );
        self.runner.start(executor, completions);

        let mut debounce = Debounce::new(self.debounce);
        let mut rendered = Rendered::default();
        let mut received = 0;
        let mut signals = 0;
        let mut summary = RunSummary::default();

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(node) => {
                        received += 1;
                        self.render_top_level(&node, regions.results, &mut rendered);
                        debounce.arm();
                        self.transition(ShellState::DebouncingCompletion);
                    }
                    None => break,
                },

                () = debounce.timer.as_mut(), if debounce.armed => {
                    debounce.armed = false;
                    summary = self.complete();
                    signals += 1;
                    self.transition(ShellState::Idle);
                }
            }
        }

        if debounce.flush().await || received == 0 {
            summary = self.complete();
            signals += 1;
        }
        self.transition(ShellState::Idle);

        info!(
            "Run finished: {} ({} completion(s), {} signal(s))",
            summary, received, signals
        );
        RunOutcome {
            page: self.page,
            summary,
            completions: received,
            signals,
        }
    }

    fn build_page(&self) -> PageRegions {
        self.page.update(|page| {
            let body = page.body();
            let header = page.append_element(body, "div");
            page.set_attr(header, "id", HEADER_ID);
            let results = page.append_element(body, "div");
            page.set_attr(results, "id", RESULTS_ID);

            let regions = PageRegions { header, results };
            setup_page(&self.registry, page, &regions);
            regions
        })
    }

    /// Replace the rendered subtree of a reported top-level node. A node
    /// that is not complete loses whatever was rendered for it before.
    fn render_top_level(&self, node: &TestRef, results: ElementId, rendered: &mut Rendered) {
        let previous = rendered.take(node);
        if !node.is_complete() {
            debug!("Top-level test '{}' not complete yet", node.full_key());
            if let Some(old) = previous {
                self.page.update(|page| page.remove(old));
            }
            return;
        }

        self.page.update(|page| {
            let built = build_results(&self.registry, page, std::slice::from_ref(node));
            match (previous, built) {
                (Some(old), Some(list)) => {
                    page.replace(old, list);
                    rendered.insert(node, list);
                }
                (None, Some(list)) => {
                    page.append_child(results, list);
                    rendered.insert(node, list);
                }
                (Some(old), None) => page.remove(old),
                (None, None) => {}
            }
        });
    }

    fn complete(&self) -> RunSummary {
        let summary = RunSummary::count(&self.runner.tests());
        debug!("Run-complete signal: {}", summary);
        let hooks = self.registry.complete_hooks();
        self.page.update(|page| {
            for hook in &hooks {
                hook(page, &summary);
            }
        });
        summary
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("registry", &self.registry)
            .field("nesting", &self.nesting)
            .field("debounce", &self.debounce)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::Contribution;
    use crate::node::{CompletionSender, TestNode};
    use crate::tree::Test;
    use std::cell::{Cell, RefCell};
    use thyme_common::Location;

    /// Emits completions when told to instead of running anything.
    #[derive(Default)]
    struct Scripted {
        tests: Vec<TestRef>,
        completions: RefCell<Option<CompletionSender>>,
        started: Cell<bool>,
    }

    impl Scripted {
        fn send(&self, node: &TestRef) {
            if let Some(completions) = self.completions.borrow().as_ref() {
                completions.complete(node.clone());
            }
        }

        fn close(&self) {
            self.completions.borrow_mut().take();
        }
    }

    impl TestRunner for Scripted {
        fn tests(&self) -> Vec<TestRef> {
            self.tests.clone()
        }

        fn start(&self, _executor: Executor, completions: CompletionSender) {
            self.started.set(true);
            *self.completions.borrow_mut() = Some(completions);
        }

        fn abort(&self) {
            self.close();
        }
    }

    fn finished(name: &str) -> TestRef {
        let test = Test::new(name);
        test.finish(Ok(()));
        test
    }

    fn counting_registry(signals: &Rc<Cell<usize>>) -> Registry {
        let seen = signals.clone();
        let mut registry = Registry::new();
        registry.register(
            Contribution::new("name")
                .on_node_render(|visual, node| visual.append_text(&node.name())),
        );
        registry.register(
            Contribution::new("count").on_run_complete(move |_, _| seen.set(seen.get() + 1)),
        );
        registry
    }

    async fn drive(runner: &Scripted, nodes: &[TestRef], gap: Duration) {
        for node in nodes {
            time::sleep(gap).await;
            runner.send(node);
        }
        runner.close();
    }

    fn shell(registry: Registry, runner: &Rc<Scripted>) -> Shell {
        Shell::new(
            registry,
            runner.clone() as Rc<dyn TestRunner>,
            Page::new("t", Location::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_completions_fires_once() {
        let nodes = vec![finished("a"), finished("b"), finished("c")];
        let runner = Rc::new(Scripted {
            tests: nodes.clone(),
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let (outcome, ()) = tokio::join!(
            shell.run(),
            drive(&runner, &nodes, Duration::from_millis(1))
        );

        assert_eq!(signals.get(), 1);
        assert_eq!(outcome.signals, 1);
        assert_eq!(outcome.completions, 3);
        assert_eq!(outcome.summary.passed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_completions_fire_once_each() {
        let nodes = vec![finished("a"), finished("b"), finished("c")];
        let runner = Rc::new(Scripted {
            tests: nodes.clone(),
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let (outcome, ()) = tokio::join!(
            shell.run(),
            drive(&runner, &nodes, Duration::from_millis(50))
        );

        assert_eq!(signals.get(), 3);
        assert_eq!(outcome.signals, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_run_still_signals_once() {
        let runner = Rc::new(Scripted::default());
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let none: Vec<TestRef> = Vec::new();
        let (outcome, ()) = tokio::join!(shell.run(), drive(&runner, &none, Duration::ZERO));

        assert!(runner.started.get());
        assert_eq!(signals.get(), 1);
        assert_eq!(outcome.summary, RunSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_is_built_before_runner_starts() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let seen = order.clone();
        let mut registry = Registry::new();
        registry.register(Contribution::new("setup").on_page_setup(move |page, regions| {
            seen.borrow_mut().push("setup");
            page.append_text(regions.header, "header");
        }));

        let runner = Rc::new(Scripted::default());
        let shell = shell(registry, &runner);
        assert_eq!(shell.state(), ShellState::Idle);

        let (outcome, ()) = tokio::join!(shell.run(), async {
            order.borrow_mut().push(if runner.started.get() { "started" } else { "pending" });
            runner.close();
        });

        assert_eq!(*order.borrow(), vec!["setup", "started"]);
        outcome.page.read(|page| {
            let header = page.find_by_id(HEADER_ID).unwrap();
            assert_eq!(page.text_content(header), "header");
            assert!(page.find_by_id(RESULTS_ID).is_some());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_completion_replaces_rendered_subtree() {
        let a = finished("a");
        let runner = Rc::new(Scripted {
            tests: vec![a.clone()],
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let nodes = vec![a.clone(), a.clone()];
        let (outcome, ()) = tokio::join!(
            shell.run(),
            drive(&runner, &nodes, Duration::from_millis(1))
        );

        outcome.page.read(|page| {
            let results = page.find_by_id(RESULTS_ID).unwrap();
            assert_eq!(page.query_tag_all(results, "li").len(), 1);
            assert_eq!(page.text_content(results), "a");
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_incomplete_top_level_is_not_rendered() {
        let pending: TestRef = Test::new("pending");
        let runner = Rc::new(Scripted {
            tests: vec![pending.clone()],
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let nodes = vec![pending.clone()];
        let (outcome, ()) = tokio::join!(
            shell.run(),
            drive(&runner, &nodes, Duration::from_millis(1))
        );

        assert!(!pending.is_complete());
        assert_eq!(signals.get(), 1);
        assert_eq!(outcome.summary.incomplete(), 1);
        outcome.page.read(|page| {
            let results = page.find_by_id(RESULTS_ID).unwrap();
            assert!(page.children(results).is_empty());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_level_reported_incomplete_loses_earlier_rendering() {
        let a = Test::new("a");
        a.finish(Ok(()));
        let node: TestRef = a.clone();
        let runner = Rc::new(Scripted {
            tests: vec![node.clone()],
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let (outcome, ()) = tokio::join!(shell.run(), async {
            runner.send(&node);
            time::sleep(Duration::from_millis(50)).await;
            a.child("late");
            runner.send(&node);
            runner.close();
        });

        assert_eq!(signals.get(), 2);
        outcome.page.read(|page| {
            let results = page.find_by_id(RESULTS_ID).unwrap();
            assert!(page.children(results).is_empty());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_levels_sharing_a_key_render_separately() {
        let upper: TestRef = finished("Teapot");
        let lower: TestRef = finished("teapot ");
        assert_eq!(upper.full_key(), lower.full_key());

        let nodes = vec![upper, lower];
        let runner = Rc::new(Scripted {
            tests: nodes.clone(),
            ..Default::default()
        });
        let signals = Rc::new(Cell::new(0));
        let shell = shell(counting_registry(&signals), &runner);

        let (outcome, ()) = tokio::join!(
            shell.run(),
            drive(&runner, &nodes, Duration::from_millis(1))
        );

        outcome.page.read(|page| {
            let results = page.find_by_id(RESULTS_ID).unwrap();
            assert_eq!(page.children(results).len(), 2);
            assert_eq!(page.text_content(results), "Teapotteapot ");
        });
    }
}
