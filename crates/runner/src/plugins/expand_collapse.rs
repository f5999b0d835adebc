//! Collapsible groups, remembered per test path

use std::rc::Rc;

use thyme_common::{ElementId, Page, PreferenceStore};

use crate::contribution::Contribution;
use crate::plugins::{TEST_BUTTON, TEST_ICON};

pub const NAME: &str = "expand-collapse";

pub const COLLAPSED: &str = "is-collapsed";
pub const CARET_COLLAPSED: &str = "icon-caret-right";
pub const CARET_EXPANDED: &str = "icon-caret-down";

/// Preference key holding the collapsed flag of the test at `full_key`.
pub fn preference_key(full_key: &str) -> String {
    format!("thyme-collapsed-{}", full_key)
}

pub fn contribution(preferences: Rc<dyn PreferenceStore>) -> Contribution {
    Contribution::new(NAME).on_node_render(move |visual, node| {
        let icon = visual.append_icon("i", TEST_ICON);
        visual.page_mut().add_class(icon, TEST_BUTTON);

        if node.is_leaf() {
            return;
        }

        let element = visual.element();
        let key = preference_key(&node.full_key());
        apply(visual.page_mut(), element, icon, preferences.is_set(&key));

        let preferences = preferences.clone();
        visual.page_mut().add_listener(icon, "click", move |page, _| {
            let collapsed = !preferences.is_set(&key);
            if collapsed {
                preferences.set(&key, "true");
            } else {
                preferences.remove(&key);
            }
            apply(page, element, icon, collapsed);
        });
    })
}

fn apply(page: &mut Page, element: ElementId, icon: ElementId, collapsed: bool) {
    page.remove_class(icon, CARET_COLLAPSED);
    page.remove_class(icon, CARET_EXPANDED);
    if collapsed {
        page.add_class(icon, CARET_COLLAPSED);
    } else {
        page.add_class(icon, CARET_EXPANDED);
    }
    page.toggle_class(element, COLLAPSED, collapsed);
}
