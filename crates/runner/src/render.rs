//! Render-pass dispatcher
//!
//! Two passes share one shape: every hook is called once, in registration
//! order, with the same mutable output target.
//!
//! * Page setup runs once per page with the header and results regions.
//! * Node render runs once per displayed test node with a fresh empty
//!   element. Result trees are always rebuilt from scratch, nothing is
//!   carried over between rebuilds.
//!
//! A panicking hook is not contained: it unwinds out of the pass.

use thyme_common::{ElementId, Page};

use crate::contribution::Registry;
use crate::node::TestRef;

/// Container tag for a list of sibling test elements
pub const LIST_TAG: &str = "ul";

/// Tag of the element representing one test node
pub const ITEM_TAG: &str = "li";

/// The two page regions contributions populate at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRegions {
    /// Global summary and controls
    pub header: ElementId,
    /// Rendered result trees
    pub results: ElementId,
}

/// Mutable handle to the element being built for one test node.
#[derive(Debug)]
pub struct VisualNode<'a> {
    page: &'a mut Page,
    element: ElementId,
}

impl<'a> VisualNode<'a> {
    pub fn new(page: &'a mut Page, element: ElementId) -> Self {
        Self { page, element }
    }

    /// The element this node renders into.
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn page(&self) -> &Page {
        &*self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut *self.page
    }

    /// Append a child element and return it.
    pub fn append_element(&mut self, tag: &str) -> ElementId {
        self.page.append_element(self.element, tag)
    }

    /// Append a child element carrying `class`.
    pub fn append_icon(&mut self, tag: &str, class: &str) -> ElementId {
        let child = self.page.append_element(self.element, tag);
        self.page.add_class(child, class);
        child
    }

    pub fn append_text(&mut self, text: &str) {
        self.page.append_text(self.element, text);
    }

    pub fn add_class(&mut self, class: &str) {
        self.page.add_class(self.element, class);
    }

    pub fn remove_class(&mut self, class: &str) {
        self.page.remove_class(self.element, class);
    }
}

/// Run every page-setup hook once, in registration order.
pub fn setup_page(registry: &Registry, page: &mut Page, regions: &PageRegions) {
    for hook in registry.page_setup_hooks() {
        hook(page, regions);
    }
}

/// Build the element for one test node by running every render hook on it.
///
/// The element is created detached; the caller decides where it goes.
pub fn render_node(registry: &Registry, page: &mut Page, node: &TestRef) -> ElementId {
    let element = page.create_element(ITEM_TAG);
    let mut visual = VisualNode::new(page, element);
    for hook in registry.render_hooks() {
        hook(&mut visual, node);
    }
    element
}

/// Build the result tree for `tests` and return its list container.
///
/// Skipped nodes, and with them their subtrees, are left out. Returns `None`
/// when nothing remains to show.
pub fn build_results(registry: &Registry, page: &mut Page, tests: &[TestRef]) -> Option<ElementId> {
    let shown: Vec<&TestRef> = tests.iter().filter(|t| !t.was_skipped()).collect();
    if shown.is_empty() {
        return None;
    }

    let list = page.create_element(LIST_TAG);
    for test in shown {
        let item = render_node(registry, page, test);
        if let Some(children) = build_results(registry, page, &test.children()) {
            page.append_child(item, children);
        }
        page.append_child(list, item);
    }
    Some(list)
}
