//! Path filter read from the page's query string
//!
//! The `filter` parameter is a `>`-separated list of key segments matched
//! depth by depth. A node at depth `i` matches when its key equals segment
//! `i`, when it contains segment `i` and `i` is the last segment, or when it
//! sits below the filtered path. Nodes that do not match are skipped and
//! their execution is withheld.

use std::cell::Cell;
use std::rc::Rc;

use thyme_common::{ElementId, Location};
use tracing::debug;

use crate::contribution::Contribution;
use crate::node::{TestRunner, KEY_DELIMITER};
use crate::plugins::{append_button, HEADER_SECTION};

pub const NAME: &str = "filter";

/// Query parameter carrying the filter expression
pub const PARAM: &str = "filter";

pub const FORM_ID: &str = "thyme-settings";
pub const INPUT_ID: &str = "thyme-filter";
pub const FILTER_ICON: &str = "icon-filter";

/// A parsed filter expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    raw: String,
    parts: Vec<String>,
}

impl Filter {
    pub fn parse(raw: &str) -> Self {
        let parts = raw
            .to_lowercase()
            .split(KEY_DELIMITER)
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();
        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    /// The filter in `location`'s query string; empty when absent.
    pub fn from_location(location: &Location) -> Self {
        Self::parse(&location.param(PARAM).unwrap_or_default())
    }

    /// The expression as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether a node with `key` at `depth` passes the filter.
    pub fn matches(&self, key: &str, depth: usize) -> bool {
        let Some(part) = self.parts.get(depth) else {
            return true;
        };
        key == part || (depth == self.parts.len() - 1 && key.contains(part.as_str()))
    }
}

#[derive(Debug, Clone, Copy)]
struct Controls {
    form: ElementId,
    input: ElementId,
}

pub fn contribution(location: &Location, runner: Rc<dyn TestRunner>) -> Contribution {
    let filter = Rc::new(Filter::from_location(location));
    let action = location.href().to_string();
    let controls: Rc<Cell<Option<Controls>>> = Rc::new(Cell::new(None));
    let depth = Rc::new(Cell::new(0usize));

    let installed = controls.clone();
    let shown = filter.clone();

    Contribution::new(NAME)
        .on_page_setup(move |page, regions| {
            let form = page.append_element(regions.header, "form");
            page.set_attr(form, "id", FORM_ID);
            page.add_class(form, HEADER_SECTION);
            page.set_attr(form, "action", &action);
            page.append_text(form, "Filter");

            let input = page.append_element(form, "input");
            page.set_attr(input, "id", INPUT_ID);
            page.set_attr(input, "type", "search");
            page.set_attr(input, "name", PARAM);
            page.set_value(input, shown.raw());
            page.focus(input);

            let runner = runner.clone();
            page.add_listener(form, "submit", move |_, _| runner.abort());
            page.add_listener(form, "search", move |page, _| page.submit_form(form));

            installed.set(Some(Controls { form, input }));
        })
        .on_node_render(move |visual, node| {
            let icon = append_button(visual, FILTER_ICON);
            let Some(Controls { form, input }) = controls.get() else {
                return;
            };
            let full_key = node.full_key();
            visual.page_mut().add_listener(icon, "click", move |page, _| {
                page.set_value(input, &full_key);
                page.submit_form(form);
            });
        })
        .on_test_execute(move |proceed, node, _| {
            let level = depth.get();
            if !filter.matches(&node.key(), level) {
                debug!("Filtered out '{}'", node.full_key());
                node.skip();
                return;
            }

            depth.set(level + 1);
            proceed.run();
            depth.set(level);
        })
}
