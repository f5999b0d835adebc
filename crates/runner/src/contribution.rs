//! Contributions and the registry that orders them
//!
//! A [`Contribution`] is a bundle of optional hooks supplied by one feature
//! module. Modules never see each other: they share only the page and the
//! test nodes handed to their hooks. The [`Registry`] keeps contributions in
//! registration order, which decides both how execution hooks nest and the
//! order in which render hooks decorate an element.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thyme_common::{Page, PageHandle};
use tracing::debug;

use crate::execute::Proceed;
use crate::node::TestRef;
use crate::render::{PageRegions, VisualNode};
use crate::summary::RunSummary;

/// Called once when the page is built, with its header and results regions.
pub type PageSetupHook = dyn Fn(&mut Page, &PageRegions);

/// Wraps the execution of one test node. Call `proceed.run()` to continue
/// inward; dropping it skips the rest of the chain for that node.
pub type ExecuteHook = dyn Fn(Proceed<'_>, &TestRef, &PageHandle);

/// Decorates the freshly created element that represents a test node.
pub type RenderHook = dyn Fn(&mut VisualNode<'_>, &TestRef);

/// Called after a burst of top-level completions has settled.
pub type CompleteHook = dyn Fn(&mut Page, &RunSummary);

/// The recognised hook names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PageSetup,
    TestExecute,
    NodeRender,
    RunComplete,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::PageSetup,
        HookKind::TestExecute,
        HookKind::NodeRender,
        HookKind::RunComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::PageSetup => "onPageSetup",
            HookKind::TestExecute => "onTestExecute",
            HookKind::NodeRender => "onNodeRender",
            HookKind::RunComplete => "onRunComplete",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// A bundle of optional hooks contributed by one module.
#[derive(Clone)]
pub struct Contribution {
    name: String,
    page_setup: Option<Rc<PageSetupHook>>,
    test_execute: Option<Rc<ExecuteHook>>,
    node_render: Option<Rc<RenderHook>>,
    run_complete: Option<Rc<CompleteHook>>,
}

impl Contribution {
    /// An empty contribution; add hooks with the `on_*` builders.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_setup: None,
            test_execute: None,
            node_render: None,
            run_complete: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on_page_setup(mut self, hook: impl Fn(&mut Page, &PageRegions) + 'static) -> Self {
        self.page_setup = Some(Rc::new(hook));
        self
    }

    pub fn on_test_execute(
        mut self,
        hook: impl Fn(Proceed<'_>, &TestRef, &PageHandle) + 'static,
    ) -> Self {
        self.test_execute = Some(Rc::new(hook));
        self
    }

    pub fn on_node_render(mut self, hook: impl Fn(&mut VisualNode<'_>, &TestRef) + 'static) -> Self {
        self.node_render = Some(Rc::new(hook));
        self
    }

    pub fn on_run_complete(mut self, hook: impl Fn(&mut Page, &RunSummary) + 'static) -> Self {
        self.run_complete = Some(Rc::new(hook));
        self
    }

    /// Whether this contribution supplies the given hook.
    pub fn implements(&self, kind: HookKind) -> bool {
        match kind {
            HookKind::PageSetup => self.page_setup.is_some(),
            HookKind::TestExecute => self.test_execute.is_some(),
            HookKind::NodeRender => self.node_render.is_some(),
            HookKind::RunComplete => self.run_complete.is_some(),
        }
    }

    pub(crate) fn page_setup_hook(&self) -> Option<&Rc<PageSetupHook>> {
        self.page_setup.as_ref()
    }

    pub(crate) fn execute_hook(&self) -> Option<&Rc<ExecuteHook>> {
        self.test_execute.as_ref()
    }

    pub(crate) fn render_hook(&self) -> Option<&Rc<RenderHook>> {
        self.node_render.as_ref()
    }

    pub(crate) fn complete_hook(&self) -> Option<&Rc<CompleteHook>> {
        self.run_complete.as_ref()
    }
}

impl fmt::Debug for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks: Vec<&str> = HookKind::ALL
            .into_iter()
            .filter(|kind| self.implements(*kind))
            .map(|kind| kind.as_str())
            .collect();
        f.debug_struct("Contribution")
            .field("name", &self.name)
            .field("hooks", &hooks)
            .finish()
    }
}

/// Ordered list of contributions.
///
/// Append-only: there is no removal and no de-duplication.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    contributions: Vec<Contribution>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution.
    pub fn register(&mut self, contribution: Contribution) {
        debug!(
            "Registered contribution '{}' at position {}",
            contribution.name(),
            self.contributions.len()
        );
        self.contributions.push(contribution);
    }

    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// All contributions in registration order.
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Contributions implementing `kind`, in registration order.
    pub fn implementing(&self, kind: HookKind) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(move |contribution| contribution.implements(kind))
    }

    /// Contributions implementing the hook called `name`.
    ///
    /// Unrecognised names match nothing.
    pub fn hooks_named(&self, name: &str) -> Vec<&Contribution> {
        match name.parse::<HookKind>() {
            Ok(kind) => self.implementing(kind).collect(),
            Err(()) => Vec::new(),
        }
    }

    pub(crate) fn page_setup_hooks(&self) -> Vec<Rc<PageSetupHook>> {
        self.contributions
            .iter()
            .filter_map(|c| c.page_setup_hook().cloned())
            .collect()
    }

    pub(crate) fn execute_hooks(&self) -> Vec<Rc<ExecuteHook>> {
        self.contributions
            .iter()
            .filter_map(|c| c.execute_hook().cloned())
            .collect()
    }

    pub(crate) fn render_hooks(&self) -> Vec<Rc<RenderHook>> {
        self.contributions
            .iter()
            .filter_map(|c| c.render_hook().cloned())
            .collect()
    }

    pub(crate) fn complete_hooks(&self) -> Vec<Rc<CompleteHook>> {
        self.contributions
            .iter()
            .filter_map(|c| c.complete_hook().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(Contribution::new("a").on_page_setup(|_, _| {}));
        registry.register(
            Contribution::new("b")
                .on_test_execute(|proceed, _, _| proceed.run())
                .on_run_complete(|_, _| {}),
        );
        registry.register(Contribution::new("c").on_page_setup(|_, _| {}));
        registry.register(Contribution::new("a").on_node_render(|_, _| {}));
        registry
    }

    #[test]
    fn test_register_keeps_order_and_duplicates() {
        let registry = registry();
        let names: Vec<&str> = registry.contributions().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_hooks_named_filters_in_order() {
        let registry = registry();
        let names: Vec<&str> = registry
            .hooks_named("onPageSetup")
            .into_iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(registry.hooks_named("onRunComplete").len(), 1);
        assert_eq!(registry.execute_hooks().len(), 1);
        assert_eq!(registry.render_hooks().len(), 1);
    }

    #[test]
    fn test_unknown_hook_name_matches_nothing() {
        let registry = registry();
        assert!(registry.hooks_named("onSomethingElse").is_empty());
        assert!(registry.hooks_named("").is_empty());
    }

    #[test]
    fn test_debug_lists_implemented_hooks() {
        let contribution = Contribution::new("x").on_run_complete(|_, _| {});
        let debug = format!("{:?}", contribution);
        assert!(debug.contains("onRunComplete"));
        assert!(!debug.contains("onPageSetup"));
    }
}
