use tracing::debug;

use crate::contribution::Contribution;
use crate::plugins::append_button;

pub const NAME: &str = "inspect";

pub const INSPECT_ICON: &str = "icon-signin";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_node_render(|visual, node| {
        let Some(inspection) = node.inspect() else {
            return;
        };

        let icon = append_button(visual, INSPECT_ICON);
        let full_key = node.full_key();
        visual.page_mut().add_listener(icon, "click", move |_, _| {
            debug!("Inspecting '{}'", full_key);
            inspection.invoke();
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Inspection, TestRef};
    use crate::plugins::testing::*;
    use crate::tree::Test;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_uninspectable_test_gets_nothing() {
        let registry = registry_of(contribution());
        let mut page = page_at("index.html");
        let element = render(&registry, &mut page, &(Test::new("plain") as TestRef));
        assert!(page.child_nodes(element).is_empty());
    }

    #[test]
    fn test_click_invokes_inspection() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let test = Test::new("inspectable");
        test.set_inspection(Inspection::new(move || seen.set(seen.get() + 1)));

        let registry = registry_of(contribution());
        let mut page = page_at("index.html");
        let element = render(&registry, &mut page, &(test as TestRef));

        let icon = page.children(element)[0];
        assert!(page.has_class(icon, INSPECT_ICON));
        assert_eq!(calls.get(), 0);

        page.dispatch(icon, "click");
        assert_eq!(calls.get(), 1);
    }
}
