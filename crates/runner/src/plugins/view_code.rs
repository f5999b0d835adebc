//! Expandable view of a test body's source

use std::cell::Cell;
use std::rc::Rc;

use crate::contribution::Contribution;
use crate::plugins::append_button;

pub const NAME: &str = "view-code";

pub const CODE_ICON: &str = "icon-code";
pub const CODE: &str = "thyme-code";
pub const VISIBLE: &str = "is-thyme-code-visible";

/// The body of a function's source: everything between its first and last
/// lines.
pub fn body_of(source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if lines.len() <= 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_node_render(|visual, node| {
        let Some(inspection) = node.inspect() else {
            return;
        };

        let icon = append_button(visual, CODE_ICON);
        let code = visual.append_element("code");
        let page = visual.page_mut();
        page.add_class(code, CODE);
        page.append_text(code, &body_of(inspection.source().unwrap_or_default()));

        let visible = Rc::new(Cell::new(false));
        page.add_listener(icon, "click", move |page, _| {
            visible.set(!visible.get());
            page.toggle_class(code, VISIBLE, visible.get());
        });
    })
}
