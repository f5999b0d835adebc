//! Built-in contributions
//!
//! Each submodule exposes a `NAME` and a `contribution(..)` constructor. The
//! modules never reference one another; whatever state one of them keeps is
//! captured by its own hooks.

use std::rc::Rc;

use thyme_common::{ElementId, Location, PreferenceStore};
use tracing::debug;

use crate::contribution::{Contribution, Registry};
use crate::error::{RunnerError, RunnerResult};
use crate::node::TestRunner;
use crate::render::VisualNode;

pub mod big_title;
pub mod dom_fixture;
pub mod error_text;
pub mod expand_collapse;
pub mod favicon;
pub mod filter;
pub mod header_state;
pub mod hide_passed;
pub mod inspect;
pub mod passed_failed_icon;
pub mod test_count;
pub mod test_name;
pub mod view_code;

/// Class shared by every per-test icon
pub const TEST_ICON: &str = "thyme-test-icon";

/// Class marking a per-test icon as clickable
pub const TEST_BUTTON: &str = "thyme-test-button";

/// Class shared by the header controls
pub const HEADER_SECTION: &str = "thyme-header-section";

/// Built-in contribution names in registration order
pub const DEFAULT_ORDER: [&str; 13] = [
    dom_fixture::NAME,
    header_state::NAME,
    big_title::NAME,
    favicon::NAME,
    test_count::NAME,
    expand_collapse::NAME,
    passed_failed_icon::NAME,
    test_name::NAME,
    error_text::NAME,
    filter::NAME,
    inspect::NAME,
    view_code::NAME,
    hide_passed::NAME,
];

/// What the built-in contributions need from the host.
#[derive(Clone)]
pub struct Builtins {
    /// Page address, source of the filter expression
    pub location: Location,
    /// Store for collapsed and hide-passed state
    pub preferences: Rc<dyn PreferenceStore>,
    /// The runner, aborted when a new filter is submitted
    pub runner: Rc<dyn TestRunner>,
}

impl Builtins {
    /// Every built-in contribution, in default order.
    pub fn all(&self) -> Vec<Contribution> {
        vec![
            dom_fixture::contribution(),
            header_state::contribution(),
            big_title::contribution(),
            favicon::contribution(),
            test_count::contribution(),
            expand_collapse::contribution(self.preferences.clone()),
            passed_failed_icon::contribution(),
            test_name::contribution(),
            error_text::contribution(),
            filter::contribution(&self.location, self.runner.clone()),
            inspect::contribution(),
            view_code::contribution(),
            hide_passed::contribution(self.preferences.clone()),
        ]
    }

    /// A registry holding every built-in except those named in `disabled`.
    pub fn registry(&self, disabled: &[String]) -> RunnerResult<Registry> {
        if let Some(unknown) = disabled
            .iter()
            .find(|name| !DEFAULT_ORDER.contains(&name.as_str()))
        {
            return Err(RunnerError::UnknownContribution(unknown.clone()));
        }

        let mut registry = Registry::new();
        for contribution in self.all() {
            if disabled.iter().any(|name| name == contribution.name()) {
                debug!("Contribution '{}' disabled", contribution.name());
                continue;
            }
            registry.register(contribution);
        }
        Ok(registry)
    }
}

/// Append a clickable per-test icon carrying `icon`.
pub(crate) fn append_button(visual: &mut VisualNode<'_>, icon: &str) -> ElementId {
    let button = visual.append_icon("i", TEST_ICON);
    let page = visual.page_mut();
    page.add_class(button, TEST_BUTTON);
    page.add_class(button, icon);
    button
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving one contribution in isolation.

    use super::*;
    use crate::execute::Executor;
    use crate::node::TestRef;
    use crate::render::{render_node, setup_page, PageRegions};
    use crate::summary::RunSummary;
    use thyme_common::{Nesting, Page, PageHandle};

    pub fn page_at(href: &str) -> Page {
        Page::new("Report", Location::new(href))
    }

    pub fn registry_of(contribution: Contribution) -> Registry {
        let mut registry = Registry::new();
        registry.register(contribution);
        registry
    }

    /// Run the page-setup hooks on fresh header and results regions.
    pub fn setup(registry: &Registry, page: &mut Page) -> PageRegions {
        let body = page.body();
        let header = page.append_element(body, "div");
        let results = page.append_element(body, "div");
        let regions = PageRegions { header, results };
        setup_page(registry, page, &regions);
        regions
    }

    pub fn render(registry: &Registry, page: &mut Page, node: &TestRef) -> ElementId {
        render_node(registry, page, node)
    }

    /// Execute `node` through the hooks, running `body` at the centre.
    pub fn execute(registry: &Registry, page: &PageHandle, node: &TestRef, body: impl FnOnce()) {
        Executor::new(registry, page.clone(), Nesting::OuterFirst).execute(node, body);
    }

    pub fn complete(registry: &Registry, page: &mut Page, summary: &RunSummary) {
        for hook in registry.complete_hooks() {
            hook(page, summary);
        }
    }
}
