//! Checkbox hiding passed results, remembered across page loads

use std::rc::Rc;

use thyme_common::{ElementId, Page, PreferenceStore};

use crate::contribution::Contribution;
use crate::plugins::HEADER_SECTION;

pub const NAME: &str = "hide-passed";

/// Preference holding `"true"` or `"false"`
pub const PREFERENCE_KEY: &str = "isHidePassedChecked";

pub const HIDING: &str = "is-hiding-passed";
pub const PASSED: &str = "is-passed";
pub const FAILED: &str = "is-failed";

pub fn contribution(preferences: Rc<dyn PreferenceStore>) -> Contribution {
    Contribution::new(NAME)
        .on_page_setup(move |page, regions| {
            let label = page.append_element(regions.header, "label");
            page.add_class(label, HEADER_SECTION);

            let checkbox = page.append_element(label, "input");
            page.set_attr(checkbox, "type", "checkbox");
            let checked = preferences.get(PREFERENCE_KEY).as_deref() == Some("true");
            page.set_checked(checkbox, checked);

            page.append_text(label, "Hide Passed");

            let results = regions.results;
            apply(page, preferences.as_ref(), checkbox, results);

            let preferences = preferences.clone();
            page.add_listener(checkbox, "change", move |page, _| {
                apply(page, preferences.as_ref(), checkbox, results);
            });
        })
        .on_node_render(|visual, node| {
            visual.add_class(if node.has_passed() { PASSED } else { FAILED });
        })
}

fn apply(page: &mut Page, preferences: &dyn PreferenceStore, checkbox: ElementId, results: ElementId) {
    let checked = page.is_checked(checkbox);
    preferences.set(PREFERENCE_KEY, &checked.to_string());
    page.toggle_class(results, HIDING, checked);
}
